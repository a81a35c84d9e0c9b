//! Orchestration phases and terminal outcomes

use super::{BackupManifest, SemanticVersion};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of an update run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Reading the current version and resolving the upgrade path
    Checking,
    /// Taking the full backup
    BackingUp,
    /// Pulling the image, rewriting the compose file and redeploying
    Deploying,
    /// Waiting for the container to report healthy
    Verifying,
    /// Sweeping stale backups
    Cleanup,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Checking => write!(f, "checking"),
            Phase::BackingUp => write!(f, "backing up"),
            Phase::Deploying => write!(f, "deploying"),
            Phase::Verifying => write!(f, "verifying"),
            Phase::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// Terminal outcome of an update run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Upgrade applied and verified
    Success,
    /// Already at the latest supported version
    SkippedNoUpdate,
    /// No safe single-hop upgrade exists
    SkippedNoPath,
    /// A fatal error aborted the run
    Failed { phase: Phase, message: String },
}

impl RunOutcome {
    /// Returns true if the run failed
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }

    /// Process exit code for this outcome: 0 on success or skip, 1 on failure
    pub fn exit_code(&self) -> u8 {
        if self.is_failure() {
            1
        } else {
            0
        }
    }
}

/// State of one update run, discarded when the process exits
#[derive(Debug, Clone)]
pub struct OrchestrationRun {
    /// Version read from the container, once known
    pub current_version: Option<SemanticVersion>,
    /// Version selected by the resolver, once known
    pub target_version: Option<SemanticVersion>,
    /// Backup manifest, once the backup phase started
    pub backup_manifest: Option<BackupManifest>,
    /// Terminal outcome
    pub outcome: RunOutcome,
}

impl OrchestrationRun {
    /// Create a run that has not resolved anything yet
    pub(crate) fn new() -> Self {
        Self {
            current_version: None,
            target_version: None,
            backup_manifest: None,
            outcome: RunOutcome::Success,
        }
    }
}
