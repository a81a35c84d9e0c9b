//! Core domain models for gitlab-autoupdate
//!
//! This module contains the fundamental types used throughout the application:
//! - Semantic versions and their ordering
//! - Upgrade decisions produced by the resolver
//! - Backup manifest describing one run's artifacts
//! - Orchestration phases and terminal outcomes

mod backup_manifest;
mod decision;
mod outcome;
mod version;

pub use backup_manifest::{BackupItems, BackupManifest};
pub use decision::UpgradeDecision;
pub use outcome::{OrchestrationRun, Phase, RunOutcome};
pub use version::{compare, SemanticVersion};
