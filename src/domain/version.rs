//! Three-component semantic versions
//!
//! GitLab release numbers are always `MAJOR.MINOR.PATCH` with decimal
//! components. Anything else (prefixes, pre-release suffixes, missing parts)
//! is rejected instead of being coerced into a version.

use crate::error::VersionError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A `major.minor.patch` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    /// Create a version from its components
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted string of exactly three numeric components
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let mut parts = trimmed.split('.');

        let mut next = || -> Result<u64, VersionError> {
            let part = parts
                .next()
                .ok_or_else(|| VersionError::invalid(input, "expected three components"))?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::invalid(
                    input,
                    format!("component '{}' is not a decimal number", part),
                ));
            }
            part.parse()
                .map_err(|_| VersionError::invalid(input, format!("component '{}' overflows", part)))
        };

        let major = next()?;
        let minor = next()?;
        let patch = next()?;

        if parts.next().is_some() {
            return Err(VersionError::invalid(input, "more than three components"));
        }

        Ok(Self::new(major, minor, patch))
    }

    /// The (major, minor) pair this version belongs to
    pub fn track(&self) -> (u64, u64) {
        (self.major, self.minor)
    }
}

/// Compare two versions lexicographically on (major, minor, patch)
pub fn compare(a: &SemanticVersion, b: &SemanticVersion) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
