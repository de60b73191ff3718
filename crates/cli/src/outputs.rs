//! File-system side of a run: the plan artifact and the CI output files.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use cleanup::DeletePlan;
use tracing::info;

/// Writes `plan` as pretty-printed JSON, creating parent directories as needed.
pub fn write_plan(path: &Path, plan: &DeletePlan) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let json = plan.to_json_pretty()?;
    std::fs::write(path, json).with_context(|| format!("writing plan to {}", path.display()))?;
    info!(path = %path.display(), "Wrote delete plan");
    Ok(())
}

/// Reads and parses the plan written by the planner.
pub fn read_plan(path: &Path) -> anyhow::Result<DeletePlan> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading plan from {}", path.display()))?;
    DeletePlan::from_json(&json).with_context(|| format!("parsing plan {}", path.display()))
}

/// Appends `name=value` to the step output file. Only logged when no file is set.
pub fn set_output(path: Option<&Path>, name: &str, value: &str) -> anyhow::Result<()> {
    match usable(path) {
        Some(path) => append(path, &format!("{name}={value}\n"))
            .with_context(|| format!("writing step output to {}", path.display())),
        None => {
            info!("{name}={value}");
            Ok(())
        }
    }
}

/// Appends the Markdown summary to the step summary file, or prints it to stdout.
pub fn write_summary(path: Option<&Path>, markdown: &str) -> anyhow::Result<()> {
    match usable(path) {
        Some(path) => append(path, markdown)
            .with_context(|| format!("writing step summary to {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(markdown.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn usable(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

fn append(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())
}
