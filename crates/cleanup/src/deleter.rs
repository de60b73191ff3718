//! Stage 2: execute a [`DeletePlan`].
//!
//! The plan is trusted as-is: no tag, selection or age check is repeated here.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use crate::{
    DeletePlan, ImagePlan, OwnerName, OwnerScope, PackageName, PackageRegistry, PackageVersionId,
    PlannedVersion, RegistryError,
};

/// A version that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    /// The version that is still present.
    pub id: PackageVersionId,
    /// Description including the last status and message seen.
    pub error: String,
}

/// Outcome for one image of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionResult {
    /// `owner/package` label.
    pub image: String,
    /// Versions listed in the plan for this image.
    pub planned: usize,
    /// Versions deleted under either scope.
    pub deleted: usize,
    /// Versions that could not be deleted.
    pub failures: Vec<DeletionFailure>,
}

impl DeletionResult {
    /// Number of failed versions.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Everything a delete run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// `generatedAt` of the executed plan, or `unknown`.
    pub planned_at: String,
    /// `cutoffIso` of the executed plan, or `unknown`.
    pub cutoff: String,
    /// One result per plan image, in plan order.
    pub results: Vec<DeletionResult>,
}

impl DeleteOutcome {
    /// Failed versions across all images.
    pub fn failed_total(&self) -> usize {
        self.results.iter().map(DeletionResult::failed).sum()
    }

    /// Deleted versions across all images.
    pub fn deleted_total(&self) -> usize {
        self.results.iter().map(|r| r.deleted).sum()
    }

    /// `true` if any version failed to delete.
    pub fn is_failure(&self) -> bool {
        self.failed_total() > 0
    }
}

/// Deletes the versions listed in a plan.
pub struct Deleter {
    registry: Arc<dyn PackageRegistry>,
}

impl Deleter {
    /// Creates a deleter over `registry`.
    pub fn new(registry: Arc<dyn PackageRegistry>) -> Self {
        Self { registry }
    }

    /// Attempts every version of every image in `plan`, one at a time.
    ///
    /// Failures are recorded and never stop the remaining work.
    pub async fn run(&self, plan: &DeletePlan) -> DeleteOutcome {
        info!(
            images = plan.images.len(),
            versions = plan.candidate_count(),
            planned_at = plan.generated_at_or_unknown(),
            "Deleting planned package versions"
        );

        let mut results = Vec::with_capacity(plan.images.len());
        for image in &plan.images {
            let span = info_span!("delete_image", image = %image.image);
            results.push(self.delete_image(image).instrument(span).await);
        }

        DeleteOutcome {
            planned_at: plan.generated_at_or_unknown().to_string(),
            cutoff: plan.cutoff_or_unknown().to_string(),
            results,
        }
    }

    async fn delete_image(&self, image: &ImagePlan) -> DeletionResult {
        let mut result = DeletionResult {
            image: format!("{}/{}", image.owner, image.package_name),
            planned: image.versions.len(),
            deleted: 0,
            failures: Vec::new(),
        };

        let (Some(owner), Some(package)) = (
            OwnerName::new(image.owner.as_str()),
            PackageName::new(image.package_name.as_str()),
        ) else {
            for version in &image.versions {
                let error = "Plan entry is missing its owner or package name".to_string();
                warn!(version_id = %version.id, "[{}] {error}", result.image);
                result.failures.push(DeletionFailure {
                    id: version.id,
                    error,
                });
            }
            return result;
        };

        for version in &image.versions {
            match self.delete_version(&owner, &package, version).await {
                Ok(scope) => {
                    result.deleted += 1;
                    info!(
                        version_id = %version.id,
                        scope = %scope,
                        "[{owner}/{package}] Deleted version {} ({})",
                        version.id,
                        version.tags.join(", "),
                    );
                }
                Err(last) => {
                    let error = failure_message(&last);
                    warn!(
                        version_id = %version.id,
                        "[{owner}/{package}] Failed to delete version {}: {error}",
                        version.id,
                    );
                    result.failures.push(DeletionFailure {
                        id: version.id,
                        error,
                    });
                }
            }
        }
        result
    }

    /// Tries each scope in [`OwnerScope::FALLBACK_ORDER`]. Only 404/422 moves
    /// on to the next scope; the first success or any other error ends the
    /// attempt.
    async fn delete_version(
        &self,
        owner: &OwnerName,
        package: &PackageName,
        version: &PlannedVersion,
    ) -> Result<OwnerScope, RegistryError> {
        let mut last_error = None;
        for scope in OwnerScope::FALLBACK_ORDER {
            match self
                .registry
                .delete_version(owner, package, version.id, scope)
                .await
            {
                Ok(()) => return Ok(scope),
                Err(e) if e.is_wrong_scope() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| RegistryError::Transport {
            message: "no owner scope attempted".to_string(),
        }))
    }
}

fn failure_message(last: &RegistryError) -> String {
    let status = last
        .status()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let message = match last.message() {
        "" => "unknown",
        m => m,
    };
    format!(
        "Delete failed in both owner scopes (org/user). Last status={status} message={message}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_includes_status_and_message() {
        let msg = failure_message(&RegistryError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        });
        assert_eq!(
            msg,
            "Delete failed in both owner scopes (org/user). Last status=500 message=Internal Server Error"
        );
    }

    #[test]
    fn failure_message_marks_missing_status_unknown() {
        let msg = failure_message(&RegistryError::Transport {
            message: String::new(),
        });
        assert!(msg.ends_with("Last status=unknown message=unknown"));
    }
}
