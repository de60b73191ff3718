//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`PackageVersionId`] with a pull request number even though both are
//! integers as far as GitHub is concerned.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — GitHub-integer-backed
// ---------------------------------------------------------------------------

/// Identifies one version of a container package.
///
/// Assigned by GitHub and only meaningful together with the owner and package
/// name it was listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageVersionId(u64);

impl PackageVersionId {
    /// Creates a new identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PackageVersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — digit-string-backed
// ---------------------------------------------------------------------------

/// A pull request number as it appears in an image tag or in the selection input.
///
/// Kept as the digit string it was parsed from: `"012"` and `"12"` are different values,
/// matching how tags and the allow-list are compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrNumber(String);

impl PrNumber {
    /// Creates a [`PrNumber`], returning `None` unless `value` is a non-empty
    /// run of ASCII digits.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(v))
        } else {
            None
        }
    }

    /// Returns the digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Orders two PR numbers by numeric value without parsing them into a
    /// fixed-width integer. Ties fall back to the raw string so `"07"` and `"7"`
    /// still have a stable order.
    pub fn numeric_cmp(&self, other: &Self) -> Ordering {
        let a = self.0.trim_start_matches('0');
        let b = other.0.trim_start_matches('0');
        a.len()
            .cmp(&b.len())
            .then_with(|| a.cmp(b))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl std::fmt::Display for PrNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single invocation of either cleanup stage.
///
/// Generated fresh for every CLI invocation and recorded on the root span so
/// all activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CleanupRunId(Uuid);

impl CleanupRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for CleanupRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed (registry names)
// ---------------------------------------------------------------------------

string_id! {
    /// The account that owns a package: either an organization login or a
    /// user login. Which of the two it is cannot be told from the name.
    OwnerName
}

string_id! {
    /// A container package name within an owner, with any tag or digest
    /// suffix already removed. May contain `/`.
    PackageName
}
