//! Markdown run summaries for the CI job page.

use std::fmt;

use crate::{DeleteConfig, DeleteOutcome, PlanOutcome};

/// Renders the planner summary.
pub fn render_plan_summary(outcome: &PlanOutcome) -> String {
    PlanSummary(outcome).to_string()
}

/// Renders the deleter summary.
pub fn render_delete_summary(config: &DeleteConfig, outcome: &DeleteOutcome) -> String {
    DeleteSummary { config, outcome }.to_string()
}

struct PlanSummary<'a>(&'a PlanOutcome);

impl fmt::Display for PlanSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;
        let plan = &outcome.plan;

        writeln!(f, "## GHCR PR image cleanup plan (stage 1)\n")?;
        writeln!(f, "Images: `{}`", outcome.image_names.join(", "))?;
        writeln!(f, "Mode: `dry-run`")?;
        writeln!(f, "Selection: `{}`", outcome.prs)?;
        writeln!(f, "Older than days: `{}`", plan.older_than_days)?;
        writeln!(f, "Cutoff (UTC): `{}`", plan.cutoff_iso)?;
        writeln!(f, "Total candidates: `{}`\n", outcome.candidate_count())?;

        for scan in &outcome.scans {
            writeln!(f, "### {}", scan.image)?;
            writeln!(f, "Versions scanned: `{}`", scan.versions_scanned)?;
            writeln!(f, "Candidates: `{}`", scan.candidates)?;
            writeln!(f, "Protected (mixed PR/non-PR tags): `{}`", scan.protected_mixed)?;
            writeln!(
                f,
                "Skipped (partial selection overlap): `{}`",
                scan.skipped_by_selection
            )?;
            writeln!(f, "Skipped (newer than cutoff): `{}`", scan.skipped_by_age)?;
            writeln!(
                f,
                "Skipped (missing/invalid timestamp): `{}`",
                scan.skipped_no_timestamp
            )?;
            if let Some(error) = &scan.error {
                writeln!(f, "Error: `{error}`")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

struct DeleteSummary<'a> {
    config: &'a DeleteConfig,
    outcome: &'a DeleteOutcome,
}

impl fmt::Display for DeleteSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.outcome;

        writeln!(f, "## GHCR PR image cleanup delete ({})\n", self.config.mode)?;
        writeln!(f, "Planned at: `{}`", outcome.planned_at)?;
        writeln!(f, "Cutoff (UTC): `{}`\n", outcome.cutoff)?;

        for result in &outcome.results {
            writeln!(f, "### {}", result.image)?;
            writeln!(f, "Planned: `{}`", result.planned)?;
            writeln!(f, "Deleted: `{}`", result.deleted)?;
            writeln!(f, "Failed: `{}`", result.failed())?;
            for failure in &result.failures {
                writeln!(f, "- `{}`: {}", failure.id, failure.error)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
