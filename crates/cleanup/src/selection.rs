//! Selection policy: which package versions are deletion candidates.
//!
//! A version is a candidate only if every one of its tags is a PR build tag
//! (`<name>-pr<digits>-<7+ hex>`), all of its PR numbers are in scope, and its
//! timestamp is strictly older than the cutoff. The checks run in a fixed
//! order and the first one that rejects the version decides which bucket it
//! is reported in; see [`classify`].

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::{ConfigError, PackageVersion, PrNumber, Timestamp};

fn pr_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)-pr([0-9]+)-[0-9a-f]{7,}$").expect("PR tag pattern is a valid regex")
    })
}

/// Extracts the PR number from a tag ending in `-pr<digits>-<7+ hex chars>`
/// (case-insensitive). Returns `None` for any other tag.
pub fn pr_number_from_tag(tag: &str) -> Option<PrNumber> {
    pr_tag_pattern()
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .and_then(|m| PrNumber::new(m.as_str()))
}

// ---------------------------------------------------------------------------
// PR allow-list
// ---------------------------------------------------------------------------

/// The optional PR-number allow-list.
///
/// Empty means every PR is in scope. A non-empty input that parses to nothing
/// is rejected rather than silently widened to "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrSelection {
    prs: Vec<PrNumber>,
}

impl PrSelection {
    /// Selects every PR.
    pub fn all() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list of PR numbers.
    ///
    /// `None` or blank input selects every PR. Entries are trimmed, empty
    /// entries are ignored, duplicates are dropped, and first-seen order is kept.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPrNumber`] for any entry that is not a digit string,
    /// [`ConfigError::EmptyPrSelection`] if the input was non-blank but held no entries.
    pub fn parse(input: Option<&str>) -> Result<Self, ConfigError> {
        let input = input.map(str::trim).unwrap_or_default();
        if input.is_empty() {
            return Ok(Self::all());
        }

        let mut prs: Vec<PrNumber> = Vec::new();
        for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let pr = PrNumber::new(entry).ok_or_else(|| ConfigError::InvalidPrNumber {
                value: entry.to_string(),
            })?;
            if !prs.contains(&pr) {
                prs.push(pr);
            }
        }

        if prs.is_empty() {
            return Err(ConfigError::EmptyPrSelection);
        }
        Ok(Self { prs })
    }

    /// Builds a selection from already-validated PR numbers.
    pub fn from_prs(prs: impl IntoIterator<Item = PrNumber>) -> Self {
        let mut out: Vec<PrNumber> = Vec::new();
        for pr in prs {
            if !out.contains(&pr) {
                out.push(pr);
            }
        }
        Self { prs: out }
    }

    /// `true` when no allow-list was given.
    pub fn is_all(&self) -> bool {
        self.prs.is_empty()
    }

    /// `true` if `pr` is in the allow-list. Always `false` for [`PrSelection::all`].
    pub fn contains(&self, pr: &PrNumber) -> bool {
        self.prs.contains(pr)
    }

    /// PR numbers in first-seen order.
    pub fn as_slice(&self) -> &[PrNumber] {
        &self.prs
    }

    /// PR numbers in ascending numeric order.
    pub fn sorted(&self) -> Vec<PrNumber> {
        let mut prs = self.prs.clone();
        prs.sort_by(PrNumber::numeric_cmp);
        prs
    }
}

impl std::fmt::Display for PrSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_all() {
            return f.write_str("ALL");
        }
        let sorted: Vec<String> = self.sorted().iter().map(PrNumber::to_string).collect();
        f.write_str(&sorted.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Criteria and classification
// ---------------------------------------------------------------------------

/// Everything [`classify`] needs to judge a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    /// PR-number allow-list.
    pub prs: PrSelection,
    /// Versions must be strictly older than this to be deleted.
    pub cutoff: Timestamp,
}

/// Where a single version ends up after the selection policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// No tags at all. Not eligible and not reported.
    Untagged,
    /// No tag carries a PR number. Not eligible and not reported.
    NotPrRelated,
    /// Some tags carry a PR number and some do not; never deleted.
    ProtectedMixed,
    /// None of the version's PR numbers is in the allow-list. Not reported.
    OutOfSelection,
    /// Some, but not all, of the version's PR numbers are in the allow-list.
    SkippedBySelection {
        /// Distinct PR numbers found on the version's tags.
        prs: Vec<PrNumber>,
    },
    /// The timestamp is missing or unparseable.
    SkippedNoTimestamp {
        /// Distinct PR numbers found on the version's tags.
        prs: Vec<PrNumber>,
    },
    /// The timestamp is at or after the cutoff.
    SkippedByAge {
        /// Distinct PR numbers found on the version's tags.
        prs: Vec<PrNumber>,
        /// The timestamp as reported by the registry.
        updated_at: String,
    },
    /// Selected for deletion.
    Candidate {
        /// Distinct PR numbers found on the version's tags.
        prs: Vec<PrNumber>,
        /// The timestamp as reported by the registry.
        updated_at: String,
    },
}

/// Applies the selection policy to one version.
///
/// Checks, in order: tags present; at least one PR tag; all tags are PR tags;
/// PR numbers within the allow-list; timestamp present and valid; timestamp
/// strictly before the cutoff.
pub fn classify(version: &PackageVersion, criteria: &SelectionCriteria) -> Disposition {
    if version.tags.is_empty() {
        return Disposition::Untagged;
    }

    let extracted: Vec<Option<PrNumber>> = version
        .tags
        .iter()
        .map(|tag| pr_number_from_tag(tag))
        .collect();

    if extracted.iter().all(Option::is_none) {
        return Disposition::NotPrRelated;
    }
    if extracted.iter().any(Option::is_none) {
        return Disposition::ProtectedMixed;
    }

    let mut seen = HashSet::new();
    let prs: Vec<PrNumber> = extracted
        .into_iter()
        .flatten()
        .filter(|pr| seen.insert(pr.clone()))
        .collect();

    if !criteria.prs.is_all() && !prs.iter().all(|pr| criteria.prs.contains(pr)) {
        return if prs.iter().any(|pr| criteria.prs.contains(pr)) {
            Disposition::SkippedBySelection { prs }
        } else {
            Disposition::OutOfSelection
        };
    }

    let Some(raw) = version.reported_timestamp() else {
        return Disposition::SkippedNoTimestamp { prs };
    };
    let Some(timestamp) = Timestamp::parse(raw) else {
        return Disposition::SkippedNoTimestamp { prs };
    };

    let updated_at = raw.to_string();
    if timestamp >= criteria.cutoff {
        Disposition::SkippedByAge { prs, updated_at }
    } else {
        Disposition::Candidate { prs, updated_at }
    }
}
