//! The delete plan: the only artifact passed from the planner to the deleter.
//!
//! Written once per planning run and read once by the deleter. There is no
//! schema version; the deleter accepts missing arrays and timestamps so a
//! hand-trimmed plan still loads.

use serde::{Deserialize, Serialize};

use crate::{PackageVersionId, PlanError, PrNumber};

/// Placeholder shown in summaries for plan timestamps that are absent.
pub const UNKNOWN: &str = "unknown";

/// Versions selected for deletion, grouped by image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePlan {
    /// When the plan was produced (ISO-8601).
    #[serde(default)]
    pub generated_at: String,

    /// The age threshold the plan was produced with.
    #[serde(default)]
    pub older_than_days: u32,

    /// `generated_at` minus `older_than_days` (ISO-8601).
    #[serde(default)]
    pub cutoff_iso: String,

    /// The PR allow-list, empty when every PR was in scope.
    #[serde(default)]
    pub selected_prs: Vec<PrNumber>,

    /// One entry per successfully scanned image, in processing order.
    #[serde(default)]
    pub images: Vec<ImagePlan>,
}

/// Candidates for one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePlan {
    /// `owner/package` label.
    pub image: String,
    /// Package owner.
    pub owner: String,
    /// Package name.
    pub package_name: String,
    /// Versions to delete.
    #[serde(default)]
    pub versions: Vec<PlannedVersion>,
}

/// One version to delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedVersion {
    /// Registry version identifier.
    pub id: PackageVersionId,
    /// Tags at planning time.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Timestamp the age check used, as reported by the registry.
    #[serde(default)]
    pub updated_at: String,
}

impl DeletePlan {
    /// Total number of versions across all images.
    pub fn candidate_count(&self) -> usize {
        self.images.iter().map(|image| image.versions.len()).sum()
    }

    /// `generated_at`, or [`UNKNOWN`] if the plan did not carry one.
    pub fn generated_at_or_unknown(&self) -> &str {
        non_empty_or_unknown(&self.generated_at)
    }

    /// `cutoff_iso`, or [`UNKNOWN`] if the plan did not carry one.
    pub fn cutoff_or_unknown(&self) -> &str {
        non_empty_or_unknown(&self.cutoff_iso)
    }

    /// Serialises the plan as pretty-printed JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> Result<String, PlanError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Parses a plan from JSON.
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn non_empty_or_unknown(value: &str) -> &str {
    if value.is_empty() {
        UNKNOWN
    } else {
        value
    }
}
