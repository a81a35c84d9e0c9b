//! GitLab releases API source
//!
//! Fetches releases from the GitLab project's releases endpoint.
//! API endpoint: https://gitlab.com/api/v4/projects/13083/releases

use super::{newest_tracks, VersionSource};
use crate::client::HttpClient;
use crate::domain::SemanticVersion;
use crate::error::ResolutionError;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, error, info};

/// Releases of the gitlab-org/gitlab project
pub const DEFAULT_RELEASES_URL: &str =
    "https://gitlab.com/api/v4/projects/13083/releases?per_page=100";

// Stable release tags; release candidates and other suffixes are ignored
static RELEASE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v(\d+\.\d+\.\d+)(?:-ee)?$").unwrap());

/// Single entry of the releases response
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

/// GitLab releases API source
pub struct GitLabReleasesSource {
    client: HttpClient,
    url: String,
    tracks: usize,
}

impl GitLabReleasesSource {
    /// Create a source reading `url` and keeping `tracks` release tracks
    pub fn new(client: HttpClient, url: impl Into<String>, tracks: usize) -> Self {
        Self {
            client,
            url: url.into(),
            tracks,
        }
    }

    fn versions_from_releases(&self, releases: &[Release]) -> Result<Vec<SemanticVersion>, ResolutionError> {
        let versions: Vec<SemanticVersion> = releases
            .iter()
            .filter_map(|release| {
                let parsed = parse_release_tag(&release.tag_name);
                if parsed.is_none() {
                    debug!(tag = %release.tag_name, "ignoring release tag");
                }
                parsed
            })
            .collect();

        if versions.is_empty() {
            error!("No stable releases found in GitLab API response");
            return Err(ResolutionError::malformed(
                &self.url,
                "no release tag of the form vX.Y.Z",
            ));
        }

        Ok(newest_tracks(&versions, self.tracks))
    }
}

/// Parse a release tag such as `v18.7.1` or `v18.7.1-ee`
pub fn parse_release_tag(tag: &str) -> Option<SemanticVersion> {
    let captures = RELEASE_TAG_RE.captures(tag.trim())?;
    captures.get(1)?.as_str().parse().ok()
}

#[async_trait]
impl VersionSource for GitLabReleasesSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn supported_versions(&self) -> Result<Vec<SemanticVersion>, ResolutionError> {
        let releases: Vec<Release> = self.client.get_json(&self.url).await?;
        let supported = self.versions_from_releases(&releases)?;

        info!(
            "Supported GitLab versions: {}",
            supported
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(supported)
    }
}
