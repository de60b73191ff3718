//! GHCR cleanup CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: flags and environment variables via `clap`,
//!    validated into [`cleanup::PlanConfig`] / [`cleanup::DeleteConfig`]
//!    before any network access.
//! 2. **Wire observability**: `tracing-subscriber` with text or JSON output.
//!    Every event carries the run's [`cleanup::CleanupRunId`] through the root span.
//! 3. **Construct infrastructure**: a [`github::GitHubPackagesClient`] and the
//!    system clock, injected into the selected stage.
//! 4. **Run the stage** and turn recorded failures into a non-zero exit code
//!    once all work has been attempted and the summary written.

mod args;
mod observability;
mod outputs;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cleanup::{
    render_delete_summary, render_plan_summary, CleanupRunId, DeleteConfig, Deleter, PlanConfig,
    Planner, SystemClock,
};
use github::GitHubPackagesClient;
use tracing::{error, info_span, Instrument};

use crate::args::{Cli, Command, DeleteArgs, PlanArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    observability::init(cli.log_format);

    let run_id = CleanupRunId::new_random();
    let span = info_span!("ghcr_cleanup", run_id = %run_id, stage = cli.command.name());

    match run(cli).instrument(span).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Command::Plan(args) => run_plan(&cli, args).await,
        Command::Delete(args) => run_delete(&cli, args).await,
    }
}

async fn run_plan(cli: &Cli, args: &PlanArgs) -> anyhow::Result<ExitCode> {
    let config = PlanConfig::from_inputs(&args.inputs())?;
    let registry = Arc::new(
        GitHubPackagesClient::new(cli.github_config()).context("creating GitHub client")?,
    );
    let planner = Planner::new(registry, Arc::new(SystemClock));

    let outcome = planner.run(&config).await?;

    outputs::write_plan(&cli.plan_file, &outcome.plan)?;
    outputs::set_output(
        args.github_output.as_deref(),
        "candidate_count",
        &outcome.candidate_count().to_string(),
    )?;
    outputs::write_summary(cli.step_summary.as_deref(), &render_plan_summary(&outcome))?;

    let failed = outcome.failed_images();
    if failed > 0 {
        error!("Failed to process {failed} image(s). Check logs/summary.");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_delete(cli: &Cli, args: &DeleteArgs) -> anyhow::Result<ExitCode> {
    let config = DeleteConfig::new(args.delete_mode.as_deref());
    let plan = outputs::read_plan(&cli.plan_file)?;
    let registry = Arc::new(
        GitHubPackagesClient::new(cli.github_config()).context("creating GitHub client")?,
    );
    let deleter = Deleter::new(registry);

    let outcome = deleter.run(&plan).await;

    outputs::write_summary(
        cli.step_summary.as_deref(),
        &render_delete_summary(&config, &outcome),
    )?;

    let failed = outcome.failed_total();
    if failed > 0 {
        error!("Failed to delete {failed} package version(s). Check logs/summary.");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
