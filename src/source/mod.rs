//! Sources of supported GitLab versions
//!
//! This module provides:
//! - The version source trait consumed by the orchestrator
//! - The GitLab releases API source
//! - Reduction of a release list to the supported (maintained) tracks

mod gitlab;

pub use gitlab::{parse_release_tag, GitLabReleasesSource, DEFAULT_RELEASES_URL};

use crate::domain::SemanticVersion;
use crate::error::ResolutionError;
use crate::upgrade::normalize;
use async_trait::async_trait;

/// Number of release tracks GitLab maintains (current + two previous minors)
pub const DEFAULT_SUPPORTED_TRACKS: usize = 3;

/// Trait for supported version sources
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Human readable location of the source
    fn location(&self) -> &str;

    /// Fetch the set of currently supported versions
    async fn supported_versions(&self) -> Result<Vec<SemanticVersion>, ResolutionError>;
}

/// Keep the highest patch of each of the `tracks` newest (major, minor) tracks
pub fn newest_tracks(versions: &[SemanticVersion], tracks: usize) -> Vec<SemanticVersion> {
    let mut rungs = normalize(versions);
    rungs.truncate(tracks);
    rungs
}
