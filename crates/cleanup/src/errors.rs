//! Error types for the cleanup domain.
//!
//! Errors fall into three groups, each caught at a different scope:
//!
//! - [`ConfigError`]: caller mistakes in the run inputs. Raised before any
//!   network access and abort the whole run.
//! - [`RegistryError`] / [`ScanError`]: a single registry call or a single
//!   image failed. Recorded against that image or version; the run continues
//!   and the final status is derived from the recorded failures.
//! - [`PlanError`]: the plan artifact could not be encoded or decoded.

use thiserror::Error;

use crate::{OwnerName, PackageName};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Invalid run configuration. The run never starts with one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `older_than_days` is not a non-negative integer.
    #[error("older_than_days must be a non-negative integer. Received: {value}")]
    InvalidAge {
        /// The rejected input.
        value: String,
    },

    /// `older_than_days` parsed but reaches before the representable time range.
    #[error("older_than_days is too large to compute a cutoff. Received: {value}")]
    AgeOutOfRange {
        /// The rejected input.
        value: u32,
    },

    /// One comma-separated PR number entry was not a digit string.
    #[error("Invalid PR number \"{value}\". Use comma-separated integers, e.g. 123,456")]
    InvalidPrNumber {
        /// The rejected entry, trimmed.
        value: String,
    },

    /// `pr_numbers` was non-empty but contained only separators and whitespace.
    #[error("pr_numbers was provided but no valid PR numbers were parsed.")]
    EmptyPrSelection,

    /// `image_name` was non-empty but contained only separators and whitespace.
    #[error("image_name was provided but no valid values were parsed.")]
    EmptyImageList,

    /// No image name was given and no default could be derived.
    #[error("Could not resolve image_name. Provide image_name directly.")]
    UnresolvedDefaultImage,

    /// An image name does not begin with the expected registry host.
    #[error("image_name must start with {host}/. Received: {value}")]
    WrongRegistryHost {
        /// Registry host the name must start with.
        host: String,
        /// The rejected image name.
        value: String,
    },

    /// An image name is missing its owner or package segment.
    #[error("image_name must look like {host}/<owner>/<package>. Received: {value}")]
    MalformedImageName {
        /// Registry host expected in front of the owner.
        host: String,
        /// The rejected image name.
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Registry calls
// ---------------------------------------------------------------------------

/// A failed call to the package registry.
///
/// Produced by [`crate::PackageRegistry`] implementations. The domain only
/// inspects [`RegistryError::status`] to decide between scope fallback,
/// a permission hint, and a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The API answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the canonical reason phrase.
        message: String,
    },

    /// The request never produced an HTTP response (DNS, TLS, timeout, decode).
    #[error("{message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
}

impl RegistryError {
    /// Returns the HTTP status, if the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RegistryError::Api { status, .. } => Some(*status),
            RegistryError::Transport { .. } => None,
        }
    }

    /// Returns the error message without the status prefix.
    pub fn message(&self) -> &str {
        match self {
            RegistryError::Api { message, .. } | RegistryError::Transport { message } => message,
        }
    }

    /// `true` for 404 and 422: the owner was addressed under the wrong scope.
    pub fn is_wrong_scope(&self) -> bool {
        matches!(self.status(), Some(404) | Some(422))
    }

    /// `true` for 403.
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }
}

// ---------------------------------------------------------------------------
// Per-image planning failures
// ---------------------------------------------------------------------------

/// Why a single image could not be scanned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Listing under organization scope was refused.
    #[error(
        "Forbidden while listing GHCR package versions for {owner}/{package}. \
         Ensure this repository has package admin access and GITHUB_TOKEN can manage package versions."
    )]
    Forbidden {
        /// Package owner.
        owner: OwnerName,
        /// Package name.
        package: PackageName,
    },

    /// Any other listing failure, including a failed user-scope fallback.
    #[error("{0}")]
    Registry(#[from] RegistryError),
}

// ---------------------------------------------------------------------------
// Plan artifact
// ---------------------------------------------------------------------------

/// The delete plan could not be serialised or deserialised.
#[derive(Debug, Error)]
pub enum PlanError {
    /// JSON encoding or decoding failed.
    #[error("Invalid delete plan: {0}")]
    Json(#[from] serde_json::Error),
}
