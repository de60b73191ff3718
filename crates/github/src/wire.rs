//! JSON shapes returned by the GitHub Packages API.
//!
//! Only the fields the cleanup needs are declared; everything else in the
//! response is ignored.

use cleanup::{PackageVersion, PackageVersionId};
use serde::Deserialize;

/// One element of `GET .../packages/container/{name}/versions`.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageVersionResponse {
    /// Numeric version id used in the delete URL.
    pub id: u64,
    /// Last modification time (RFC 3339).
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Creation time (RFC 3339).
    #[serde(default)]
    pub created_at: Option<String>,
    /// Package-type specific metadata; absent on some GHES versions.
    #[serde(default)]
    pub metadata: Option<VersionMetadata>,
}

/// `metadata` object of a version.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionMetadata {
    /// Present for container packages.
    #[serde(default)]
    pub container: Option<ContainerMetadata>,
}

/// `metadata.container` object of a version.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerMetadata {
    /// Tags currently pointing at this version.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<PackageVersionResponse> for PackageVersion {
    fn from(value: PackageVersionResponse) -> Self {
        let tags = value
            .metadata
            .and_then(|m| m.container)
            .map(|c| c.tags)
            .unwrap_or_default();
        PackageVersion {
            id: PackageVersionId::new(value.id),
            tags,
            updated_at: value.updated_at,
            created_at: value.created_at,
        }
    }
}

/// Error body GitHub attaches to 4xx/5xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error text.
    pub message: String,
}

/// Extracts `message` from an error body, if the body is GitHub's JSON error shape.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
}
