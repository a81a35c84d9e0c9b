//! Upgrade path resolution and compose file rewriting
//!
//! This module provides:
//! - The safe-upgrade-path resolver
//! - Rewriting of the GitLab image reference in the compose file

mod deployment_file;
mod resolver;

pub use deployment_file::{
    image_line, image_reference, rewrite_image_line, DeploymentFile, DEFAULT_IMAGE_REPO,
};
pub use resolver::{normalize, resolve};
