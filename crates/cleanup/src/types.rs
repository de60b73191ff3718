//! Shared value types for the cleanup domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values and participate in the selection and deletion decisions.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::PackageVersionId;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parses an RFC 3339 timestamp with any offset, normalising it to UTC.
    ///
    /// Returns `None` for empty or unparseable input.
    pub fn parse(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value.trim())
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Returns the timestamp `days` whole days earlier, or `None` if that
    /// falls outside the representable range.
    pub fn days_before(self, days: u32) -> Option<Self> {
        self.0
            .checked_sub_signed(Duration::days(i64::from(days)))
            .map(Self)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Formats as ISO-8601 with millisecond precision and a `Z` suffix,
    /// e.g. `2026-10-19T08:00:00.000Z`.
    pub fn to_iso8601(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}

// ---------------------------------------------------------------------------
// Ownership scope
// ---------------------------------------------------------------------------

/// Which account type a package owner is addressed as.
///
/// The packages API has separate organization and user endpoints and offers no
/// generic lookup, so callers try [`OwnerScope::FALLBACK_ORDER`] in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerScope {
    /// `/orgs/{org}/packages/...`
    Organization,
    /// `/users/{username}/packages/...`
    User,
}

impl OwnerScope {
    /// Fixed trial order: organization first, then user.
    pub const FALLBACK_ORDER: [OwnerScope; 2] = [OwnerScope::Organization, OwnerScope::User];

    /// Short label used in log lines.
    pub fn label(self) -> &'static str {
        match self {
            OwnerScope::Organization => "org",
            OwnerScope::User => "user",
        }
    }
}

impl std::fmt::Display for OwnerScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Registry metadata
// ---------------------------------------------------------------------------

/// One version of a container package as reported by the registry.
///
/// Read-only: this system never changes a version except by deleting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersion {
    /// Owner-scoped version identifier.
    pub id: PackageVersionId,

    /// Container tags in registry order. Empty for untagged (dangling) versions.
    pub tags: Vec<String>,

    /// Last-updated time as reported, unparsed.
    pub updated_at: Option<String>,

    /// Creation time as reported, unparsed. Only consulted when `updated_at`
    /// is missing or empty.
    pub created_at: Option<String>,
}

impl PackageVersion {
    /// Returns the raw timestamp the age check uses: `updated_at` if present
    /// and non-empty, otherwise `created_at` if present and non-empty.
    pub fn reported_timestamp(&self) -> Option<&str> {
        [self.updated_at.as_deref(), self.created_at.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn version(updated_at: Option<&str>, created_at: Option<&str>) -> PackageVersion {
        PackageVersion {
            id: PackageVersionId::new(1),
            tags: vec![],
            updated_at: updated_at.map(String::from),
            created_at: created_at.map(String::from),
        }
    }

    #[test]
    fn reported_timestamp_prefers_updated_at() {
        let v = version(Some("2026-01-02T00:00:00Z"), Some("2026-01-01T00:00:00Z"));
        assert_eq!(v.reported_timestamp(), Some("2026-01-02T00:00:00Z"));
    }

    #[test]
    fn reported_timestamp_falls_back_to_created_at() {
        assert_eq!(
            version(None, Some("2026-01-01T00:00:00Z")).reported_timestamp(),
            Some("2026-01-01T00:00:00Z")
        );
        assert_eq!(
            version(Some(""), Some("2026-01-01T00:00:00Z")).reported_timestamp(),
            Some("2026-01-01T00:00:00Z")
        );
        assert_eq!(version(None, None).reported_timestamp(), None);
    }

    #[test]
    fn parse_normalises_offsets_to_utc() {
        let ts = Timestamp::parse("2026-03-01T10:00:00+02:00").expect("valid timestamp");
        assert_eq!(ts.to_iso8601(), "2026-03-01T08:00:00.000Z");
        assert!(Timestamp::parse("not a date").is_none());
        assert!(Timestamp::parse("").is_none());
    }

    #[test]
    fn days_before_subtracts_whole_days() {
        let now = Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap());
        let cutoff = now.days_before(7).expect("in range");
        assert_eq!(cutoff.to_iso8601(), "2026-10-12T12:00:00.000Z");
        assert_eq!(now.days_before(0), Some(now));
    }

    #[test]
    fn fallback_order_is_org_then_user() {
        assert_eq!(
            OwnerScope::FALLBACK_ORDER,
            [OwnerScope::Organization, OwnerScope::User]
        );
        assert_eq!(OwnerScope::Organization.to_string(), "org");
    }
}
