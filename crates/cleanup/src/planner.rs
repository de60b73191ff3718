//! Stage 1: scan the registry and build a [`DeletePlan`]. Never deletes anything.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use crate::selection::{classify, Disposition, SelectionCriteria};
use crate::{
    Clock, ConfigError, DeletePlan, ImagePlan, ImageReference, OwnerScope, PackageRegistry,
    PackageVersion, PlanConfig, PlannedVersion, PrSelection, ScanError,
};

/// Per-image scan counts for the plan summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageScan {
    /// `owner/package` for scanned images, the raw input name for failed ones.
    pub image: String,
    /// Every version the registry returned, tagged or not.
    pub versions_scanned: usize,
    /// Versions selected for deletion.
    pub candidates: usize,
    /// Versions with both PR and non-PR tags.
    pub protected_mixed: usize,
    /// Versions whose PR numbers only partially overlap the allow-list.
    pub skipped_by_selection: usize,
    /// Versions at or after the cutoff.
    pub skipped_by_age: usize,
    /// Versions with a missing or unparseable timestamp.
    pub skipped_no_timestamp: usize,
    /// Why the image could not be scanned, if it could not.
    pub error: Option<ScanError>,
}

impl ImageScan {
    fn failed(image: &ImageReference, error: ScanError) -> Self {
        Self {
            image: image.raw().to_string(),
            error: Some(error),
            ..Self::default()
        }
    }
}

/// Everything a planning run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    /// The artifact for the delete stage.
    pub plan: DeletePlan,
    /// One scan record per input image, in processing order.
    pub scans: Vec<ImageScan>,
    /// Raw names of every image that was processed.
    pub image_names: Vec<String>,
    /// The allow-list the plan was built with.
    pub prs: PrSelection,
}

impl PlanOutcome {
    /// Total candidates across all images.
    pub fn candidate_count(&self) -> usize {
        self.plan.candidate_count()
    }

    /// Number of images that could not be scanned.
    pub fn failed_images(&self) -> usize {
        self.scans.iter().filter(|s| s.error.is_some()).count()
    }

    /// `true` if any image failed.
    pub fn is_failure(&self) -> bool {
        self.failed_images() > 0
    }
}

/// Scans images and selects versions for deletion.
pub struct Planner {
    registry: Arc<dyn PackageRegistry>,
    clock: Arc<dyn Clock>,
}

impl Planner {
    /// Creates a planner over `registry`, reading the time from `clock`.
    pub fn new(registry: Arc<dyn PackageRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Scans every configured image and builds the plan.
    ///
    /// The clock is read once; `generatedAt` and `cutoffIso` both derive from
    /// that reading. Images are processed one at a time and a failure on one
    /// image is recorded in its [`ImageScan`] without stopping the others.
    ///
    /// # Errors
    ///
    /// [`ConfigError::AgeOutOfRange`] if the cutoff cannot be represented.
    /// Registry failures are never returned here.
    pub async fn run(&self, config: &PlanConfig) -> Result<PlanOutcome, ConfigError> {
        let now = self.clock.now();
        let cutoff = now
            .days_before(config.older_than_days)
            .ok_or(ConfigError::AgeOutOfRange {
                value: config.older_than_days,
            })?;
        let criteria = SelectionCriteria {
            prs: config.prs.clone(),
            cutoff,
        };

        info!(
            images = config.images.len(),
            selection = %config.prs,
            older_than_days = config.older_than_days,
            cutoff = %cutoff,
            "Planning PR image cleanup (dry-run)"
        );

        let mut plan = DeletePlan {
            generated_at: now.to_iso8601(),
            older_than_days: config.older_than_days,
            cutoff_iso: cutoff.to_iso8601(),
            selected_prs: config.prs.as_slice().to_vec(),
            images: Vec::new(),
        };
        let mut scans = Vec::with_capacity(config.images.len());

        for image in &config.images {
            let span = info_span!("scan_image", image = %image);
            match self.scan_image(image, &criteria).instrument(span).await {
                Ok((image_plan, scan)) => {
                    plan.images.push(image_plan);
                    scans.push(scan);
                }
                Err(error) => {
                    warn!(image = %image, "[{image}] {error}");
                    scans.push(ImageScan::failed(image, error));
                }
            }
        }

        Ok(PlanOutcome {
            plan,
            scans,
            image_names: config.images.iter().map(|i| i.raw().to_string()).collect(),
            prs: config.prs.clone(),
        })
    }

    async fn scan_image(
        &self,
        image: &ImageReference,
        criteria: &SelectionCriteria,
    ) -> Result<(ImagePlan, ImageScan), ScanError> {
        let versions = self.list_versions(image).await?;
        let label = image.label();

        let mut scan = ImageScan {
            image: label.clone(),
            versions_scanned: versions.len(),
            ..ImageScan::default()
        };
        let mut planned = Vec::new();

        for version in versions {
            match classify(&version, criteria) {
                Disposition::Untagged | Disposition::NotPrRelated | Disposition::OutOfSelection => {}
                Disposition::ProtectedMixed => scan.protected_mixed += 1,
                Disposition::SkippedBySelection { .. } => scan.skipped_by_selection += 1,
                Disposition::SkippedNoTimestamp { .. } => scan.skipped_no_timestamp += 1,
                Disposition::SkippedByAge { .. } => scan.skipped_by_age += 1,
                Disposition::Candidate { updated_at, .. } => {
                    info!(
                        version_id = %version.id,
                        "[dry-run] [{label}] Would delete version {} ({}) updated_at={updated_at}",
                        version.id,
                        version.tags.join(", "),
                    );
                    planned.push(PlannedVersion {
                        id: version.id,
                        tags: version.tags,
                        updated_at,
                    });
                }
            }
        }
        scan.candidates = planned.len();

        info!(
            versions_scanned = scan.versions_scanned,
            candidates = scan.candidates,
            protected_mixed = scan.protected_mixed,
            skipped_by_selection = scan.skipped_by_selection,
            skipped_by_age = scan.skipped_by_age,
            skipped_no_timestamp = scan.skipped_no_timestamp,
            "Scanned {label}"
        );

        let image_plan = ImagePlan {
            image: label,
            owner: image.owner().to_string(),
            package_name: image.package().to_string(),
            versions: planned,
        };
        Ok((image_plan, scan))
    }

    /// Organization scope first; 404/422 falls back to user scope, 403 gets a
    /// permission hint, anything else is returned as-is.
    async fn list_versions(&self, image: &ImageReference) -> Result<Vec<PackageVersion>, ScanError> {
        let (owner, package) = (image.owner(), image.package());
        match self
            .registry
            .list_versions(owner, package, OwnerScope::Organization)
            .await
        {
            Ok(versions) => Ok(versions),
            Err(e) if e.is_wrong_scope() => {
                info!(
                    status = e.status(),
                    "{owner} is not an organization package owner; listing as user"
                );
                Ok(self
                    .registry
                    .list_versions(owner, package, OwnerScope::User)
                    .await?)
            }
            Err(e) if e.is_forbidden() => Err(ScanError::Forbidden {
                owner: owner.clone(),
                package: package.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
