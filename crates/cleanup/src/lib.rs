//! Core domain for GHCR pull-request image cleanup.
//!
//! Cleanup runs in two stages, usually in separate CI jobs with an approval
//! gate between them:
//!
//! 1. [`Planner`] lists package versions for each image, applies the PR-tag
//!    selection policy and produces a [`DeletePlan`]. It never deletes.
//! 2. [`Deleter`] reads that plan and deletes every listed version, falling
//!    back from organization to user scope per version.
//!
//! The plan is the only state shared between the stages.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! Registry access goes through [`PackageRegistry`] and time through [`Clock`];
//! infrastructure crates supply the implementations.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`PackageVersionId`, `PrNumber`, `OwnerName`, etc.) |
//! | [`types`] | Shared value types (`Timestamp`, `OwnerScope`, `PackageVersion`) |
//! | [`errors`] | Configuration, registry, scan and plan errors |
//! | [`image`] | `registry-host/owner/package` parsing |
//! | [`selection`] | PR-tag extraction, allow-list, per-version classification |
//! | [`config`] | Validated run configuration for both stages |
//! | [`plan`] | The delete plan artifact |
//! | [`ports`] | `PackageRegistry` and `Clock` traits |
//! | [`planner`] | Stage 1 |
//! | [`deleter`] | Stage 2 |
//! | [`summary`] | Markdown run summaries |

pub mod config;
pub mod deleter;
pub mod errors;
pub mod identifiers;
pub mod image;
pub mod plan;
pub mod planner;
pub mod ports;
pub mod selection;
pub mod summary;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{
    parse_older_than_days, DeleteConfig, PlanConfig, PlanInputs, DEFAULT_DELETE_MODE,
    DEFAULT_OLDER_THAN_DAYS,
};
pub use deleter::{DeleteOutcome, Deleter, DeletionFailure, DeletionResult};
pub use errors::{ConfigError, PlanError, RegistryError, ScanError};
pub use identifiers::{CleanupRunId, OwnerName, PackageName, PackageVersionId, PrNumber};
pub use image::{ImageReference, DEFAULT_REGISTRY_HOST};
pub use plan::{DeletePlan, ImagePlan, PlannedVersion};
pub use planner::{ImageScan, PlanOutcome, Planner};
pub use ports::{Clock, FixedClock, PackageRegistry, SystemClock};
pub use selection::{classify, pr_number_from_tag, Disposition, PrSelection, SelectionCriteria};
pub use summary::{render_delete_summary, render_plan_summary};
pub use types::{OwnerScope, PackageVersion, Timestamp};
