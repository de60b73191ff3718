//! Port traits implemented by infrastructure crates.
//!
//! The planner and deleter only see these traits. HTTP, authentication and
//! pagination live behind [`PackageRegistry`] in the `github` crate; the wall
//! clock lives behind [`Clock`] so "now" is the only non-deterministic input
//! to a plan.

use async_trait::async_trait;

use crate::{
    OwnerName, OwnerScope, PackageName, PackageVersion, PackageVersionId, RegistryError, Timestamp,
};

/// Read and delete access to container package versions.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Lists every version of `package` owned by `owner`, addressed under `scope`.
    ///
    /// Implementations follow pagination to the end; a partial list is never returned.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Api`] with the response status when the API refuses
    /// the request (404/422 when the owner is not of the given scope).
    async fn list_versions(
        &self,
        owner: &OwnerName,
        package: &PackageName,
        scope: OwnerScope,
    ) -> Result<Vec<PackageVersion>, RegistryError>;

    /// Deletes one version of `package` owned by `owner`, addressed under `scope`.
    async fn delete_version(
        &self,
        owner: &OwnerName,
        package: &PackageName,
        id: PackageVersionId,
        scope: OwnerScope,
    ) -> Result<(), RegistryError>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> Timestamp;
}

/// [`Clock`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// [`Clock`] that always returns the same instant. Used in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
