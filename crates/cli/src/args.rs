//! Command line and environment configuration.
//!
//! Every option can also be supplied through the environment variable named
//! in its `env` attribute, which is how the CI workflow passes its inputs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use cleanup::{PlanInputs, DEFAULT_REGISTRY_HOST};
use github::{GitHubConfig, DEFAULT_API_URL};

/// Default plan artifact location, relative to the working directory.
pub const DEFAULT_PLAN_FILE: &str = "delete-plan.json";

#[derive(Debug, Parser)]
#[command(
    name = "ghcr-cleanup",
    version,
    about = "Plan and delete pull-request container images in GHCR"
)]
pub struct Cli {
    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Plan artifact written by `plan` and read by `delete`.
    #[arg(long, env = "PLAN_FILE", default_value = DEFAULT_PLAN_FILE, global = true)]
    pub plan_file: PathBuf,

    /// File the Markdown run summary is appended to. Printed to stdout when unset.
    #[arg(long, env = "GITHUB_STEP_SUMMARY", global = true)]
    pub step_summary: Option<PathBuf>,

    /// GitHub REST API base URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Token with package read/delete permission.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Connection settings for the GitHub adapter.
    pub fn github_config(&self) -> GitHubConfig {
        GitHubConfig {
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            ..GitHubConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stage 1: scan images and write the delete plan (dry-run).
    Plan(PlanArgs),
    /// Stage 2: delete every version listed in the plan.
    Delete(DeleteArgs),
}

impl Command {
    /// Stage name used on the root span.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Plan(_) => "plan",
            Command::Delete(_) => "delete",
        }
    }
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Comma-separated image names (`ghcr.io/<owner>/<package>`).
    /// Defaults to the current repository's image.
    #[arg(long, env = "IMAGE_NAME")]
    pub image_name: Option<String>,

    /// Comma-separated PR numbers to restrict cleanup to. Default: all PRs.
    #[arg(long, env = "PR_NUMBERS")]
    pub pr_numbers: Option<String>,

    /// Only versions older than this many days are planned. Default: 7.
    #[arg(long, env = "OLDER_THAN_DAYS")]
    pub older_than_days: Option<String>,

    /// Namespace for the default image. Defaults to the repository owner.
    #[arg(long, env = "IMAGE_NAMESPACE")]
    pub image_namespace: Option<String>,

    /// Registry host every image name must start with.
    #[arg(long, env = "REGISTRY_HOST", default_value = DEFAULT_REGISTRY_HOST)]
    pub registry_host: String,

    /// Current repository as `owner/name`, used to derive the default image.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Step output file `candidate_count` is appended to.
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,
}

impl PlanArgs {
    /// Raw planner inputs for validation by [`cleanup::PlanConfig::from_inputs`].
    pub fn inputs(&self) -> PlanInputs {
        PlanInputs {
            image_names: self.image_name.clone(),
            repository: self.repository.clone(),
            image_namespace: self.image_namespace.clone(),
            registry_host: Some(self.registry_host.clone()),
            pr_numbers: self.pr_numbers.clone(),
            older_than_days: self.older_than_days.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Label shown in the summary heading, e.g. `stage 2` or `manual`.
    #[arg(long, env = "DELETE_MODE")]
    pub delete_mode: Option<String>,
}
