//! Upgrade decision result type

use super::SemanticVersion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of resolving an upgrade path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpgradeDecision {
    /// No single safe hop leads to the latest supported version
    NoSafePath,
    /// The current version already is the latest supported version
    AlreadyLatest,
    /// A single safe hop to `target` exists
    UpgradePossible { target: SemanticVersion },
}

impl UpgradeDecision {
    /// Returns the target version if an upgrade is possible
    pub fn target(&self) -> Option<SemanticVersion> {
        match self {
            UpgradeDecision::UpgradePossible { target } => Some(*target),
            _ => None,
        }
    }
}

impl fmt::Display for UpgradeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeDecision::NoSafePath => write!(f, "no safe upgrade path"),
            UpgradeDecision::AlreadyLatest => write!(f, "already at latest"),
            UpgradeDecision::UpgradePossible { target } => write!(f, "upgrade to {}", target),
        }
    }
}
