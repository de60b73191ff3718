//! Run configuration for both stages.
//!
//! Raw key/value inputs are validated once into [`PlanConfig`] or
//! [`DeleteConfig`] and then passed explicitly into [`crate::Planner::run`] and
//! [`crate::Deleter::run`]. All validation happens here, before any network
//! access.

use crate::{ConfigError, ImageReference, PrSelection, DEFAULT_REGISTRY_HOST};

/// Default age threshold in days.
pub const DEFAULT_OLDER_THAN_DAYS: u32 = 7;

/// Default report heading label for the delete stage.
pub const DEFAULT_DELETE_MODE: &str = "stage 2";

/// Unvalidated planner inputs, as read from flags or the environment.
#[derive(Debug, Clone, Default)]
pub struct PlanInputs {
    /// Comma-separated image names. Blank means "derive from the repository".
    pub image_names: Option<String>,
    /// `owner/name` of the current repository, used for the default image.
    pub repository: Option<String>,
    /// Namespace for the default image. Falls back to the repository owner.
    pub image_namespace: Option<String>,
    /// Registry host image names must live on. Defaults to `ghcr.io`.
    pub registry_host: Option<String>,
    /// Comma-separated PR allow-list. Blank means all PRs.
    pub pr_numbers: Option<String>,
    /// Age threshold in days. Blank means [`DEFAULT_OLDER_THAN_DAYS`].
    pub older_than_days: Option<String>,
}

/// Validated planner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanConfig {
    /// Distinct images to scan, in first-seen order.
    pub images: Vec<ImageReference>,
    /// PR allow-list.
    pub prs: PrSelection,
    /// Versions must be older than this many days.
    pub older_than_days: u32,
}

impl PlanConfig {
    /// Validates `inputs`.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]; the first invalid input wins.
    pub fn from_inputs(inputs: &PlanInputs) -> Result<Self, ConfigError> {
        let older_than_days = parse_older_than_days(inputs.older_than_days.as_deref())?;
        let prs = PrSelection::parse(inputs.pr_numbers.as_deref())?;

        let host = inputs
            .registry_host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_REGISTRY_HOST);

        let images = resolve_image_names(inputs, host)?
            .iter()
            .map(|raw| ImageReference::parse(raw, host))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            images,
            prs,
            older_than_days,
        })
    }
}

/// Validated delete-stage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Free-form label used only in the summary heading.
    pub mode: String,
}

impl DeleteConfig {
    /// Builds the configuration, defaulting a blank mode to [`DEFAULT_DELETE_MODE`].
    pub fn new(mode: Option<&str>) -> Self {
        let mode = mode
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_DELETE_MODE);
        Self {
            mode: mode.to_string(),
        }
    }
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Parses the age threshold. Blank input means [`DEFAULT_OLDER_THAN_DAYS`].
pub fn parse_older_than_days(input: Option<&str>) -> Result<u32, ConfigError> {
    let value = input.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Ok(DEFAULT_OLDER_THAN_DAYS);
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::InvalidAge {
            value: value.to_string(),
        });
    }
    value.parse().map_err(|_| ConfigError::InvalidAge {
        value: value.to_string(),
    })
}

/// Returns the de-duplicated list of raw image names to scan.
fn resolve_image_names(inputs: &PlanInputs, host: &str) -> Result<Vec<String>, ConfigError> {
    let explicit = inputs
        .image_names
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();

    let names: Vec<String> = if explicit.is_empty() {
        vec![default_image_name(inputs, host)?]
    } else {
        let names: Vec<String> = explicit
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .collect();
        if names.is_empty() {
            return Err(ConfigError::EmptyImageList);
        }
        names
    };

    // Exact string match: `ghcr.io/acme/app` and `ghcr.io/acme/app:latest`
    // stay distinct and are both scanned.
    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    Ok(unique)
}

/// `<host>/<namespace>/<repository name>`.
fn default_image_name(inputs: &PlanInputs, host: &str) -> Result<String, ConfigError> {
    let repository = inputs.repository.as_deref().map(str::trim).unwrap_or_default();
    let (repo_owner, repo_name) = match repository.split_once('/') {
        Some((owner, name)) => (owner.trim(), name.trim()),
        None => ("", repository),
    };
    if repo_name.is_empty() {
        return Err(ConfigError::UnresolvedDefaultImage);
    }

    let namespace = inputs
        .image_namespace
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(repo_owner);
    if namespace.is_empty() {
        return Err(ConfigError::UnresolvedDefaultImage);
    }

    Ok(format!("{host}/{namespace}/{repo_name}"))
}
