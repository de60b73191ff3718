//! Canonical image names and the owner/package pair they resolve to.

use crate::{ConfigError, OwnerName, PackageName};

/// Default registry host for image names.
pub const DEFAULT_REGISTRY_HOST: &str = "ghcr.io";

/// A parsed `registry-host/owner/package[:tag|@digest]` image name.
///
/// Any tag or digest suffix is dropped during parsing; only the owner and
/// package are used for registry lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    raw: String,
    owner: OwnerName,
    package: PackageName,
}

impl ImageReference {
    /// Parses `raw` as an image on `registry_host`.
    ///
    /// The owner is everything between the host and the next `/`; the package
    /// is the remainder, which may itself contain `/`. A `@digest` suffix is
    /// removed before a `:tag` suffix.
    ///
    /// # Errors
    ///
    /// [`ConfigError::WrongRegistryHost`] if `raw` is not under `registry_host`,
    /// [`ConfigError::MalformedImageName`] if the owner or package is empty.
    pub fn parse(raw: &str, registry_host: &str) -> Result<Self, ConfigError> {
        let prefix = format!("{registry_host}/");
        let path = raw
            .strip_prefix(&prefix)
            .ok_or_else(|| ConfigError::WrongRegistryHost {
                host: registry_host.to_string(),
                value: raw.to_string(),
            })?;

        let malformed = || ConfigError::MalformedImageName {
            host: registry_host.to_string(),
            value: raw.to_string(),
        };

        let (owner, rest) = path.split_once('/').ok_or_else(malformed)?;
        let package = strip_reference(rest);

        Ok(Self {
            raw: raw.to_string(),
            owner: OwnerName::new(owner).ok_or_else(malformed)?,
            package: PackageName::new(package).ok_or_else(malformed)?,
        })
    }

    /// The image name exactly as it was supplied.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The package owner.
    pub fn owner(&self) -> &OwnerName {
        &self.owner
    }

    /// The package name with any tag or digest removed.
    pub fn package(&self) -> &PackageName {
        &self.package
    }

    /// `owner/package`, used to label the image in plans and summaries.
    pub fn label(&self) -> String {
        format!("{}/{}", self.owner, self.package)
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn strip_reference(package: &str) -> &str {
    let package = package.split('@').next().unwrap_or(package);
    package.split(':').next().unwrap_or(package)
}
