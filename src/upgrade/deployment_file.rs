//! Compose file image reference rewriting
//!
//! The compose file pins GitLab with a line of the exact form
//! `image: '<repo>:<version>-ce.0'`. Rewriting is a literal replacement of
//! that line; if the old line is not present verbatim the file is left
//! untouched and an error is returned.

use crate::domain::SemanticVersion;
use crate::error::DeploymentFileError;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Default image repository for GitLab CE
pub const DEFAULT_IMAGE_REPO: &str = "gitlab/gitlab-ce";

/// Image tag for a GitLab CE version
pub fn image_tag(version: &SemanticVersion) -> String {
    format!("{}-ce.0", version)
}

/// Full image reference, e.g. `gitlab/gitlab-ce:18.8.0-ce.0`
pub fn image_reference(repo: &str, version: &SemanticVersion) -> String {
    format!("{}:{}", repo, image_tag(version))
}

/// The exact compose line pinning `version`
pub fn image_line(repo: &str, version: &SemanticVersion) -> String {
    format!("image: '{}'", image_reference(repo, version))
}

/// A compose file whose GitLab image reference can be rewritten
#[derive(Debug, Clone)]
pub struct DeploymentFile {
    /// Path to the compose file
    path: PathBuf,
    /// Image repository used in the image line
    image_repo: String,
}

impl DeploymentFile {
    /// Create a deployment file handle for the default GitLab CE image
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_repo(path, DEFAULT_IMAGE_REPO)
    }

    /// Create a deployment file handle for a custom image repository
    pub fn with_repo(path: impl Into<PathBuf>, image_repo: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            image_repo: image_repo.into(),
        }
    }

    /// Replace the image line for `old` with the one for `new`
    pub fn replace_version(
        &self,
        old: &SemanticVersion,
        new: &SemanticVersion,
    ) -> Result<(), DeploymentFileError> {
        if !self.path.exists() {
            return Err(DeploymentFileError::NotFound {
                path: self.path.clone(),
            });
        }

        let content = fs::read_to_string(&self.path).map_err(|e| DeploymentFileError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;

        let updated = rewrite_image_line(&content, &self.image_repo, old, new).ok_or_else(|| {
            DeploymentFileError::ImageLineNotFound {
                path: self.path.clone(),
                line: image_line(&self.image_repo, old),
            }
        })?;

        fs::write(&self.path, updated).map_err(|e| DeploymentFileError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;

        info!(
            "Updated GitLab version in compose file from {} to {}",
            old, new
        );
        Ok(())
    }
}

/// Replace the first occurrence of the old image line, or None when it is absent
pub fn rewrite_image_line(
    content: &str,
    repo: &str,
    old: &SemanticVersion,
    new: &SemanticVersion,
) -> Option<String> {
    let old_line = image_line(repo, old);
    if !content.contains(&old_line) {
        return None;
    }
    Some(content.replacen(&old_line, &image_line(repo, new), 1))
}
