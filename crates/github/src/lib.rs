//! GHCR cleanup GitHub infrastructure adapter.
//!
//! Implements [`cleanup::PackageRegistry`] for container packages using the
//! GitHub Packages REST API (`/orgs/{org}/packages/...` and
//! `/users/{username}/packages/...`).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain selection or fallback rules.
//! Authentication, pagination, URL encoding and HTTP status mapping are handled
//! here; the [`cleanup`] crate never sees them.

#![warn(missing_docs)]

pub mod client;
pub mod pagination;
pub mod wire;

pub use client::{ClientBuildError, GitHubConfig, GitHubPackagesClient, DEFAULT_API_URL};
