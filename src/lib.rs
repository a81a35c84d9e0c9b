//! gitlab-autoupdate - safe automatic updates for GitLab CE in Docker Compose
//!
//! This library provides the core functionality of the updater:
//! - Resolving a safe single-hop upgrade from the supported release tracks
//! - Backing up configuration and application data before an update
//! - Deploying the new image and verifying the container's health
//! - Notifying the outcome through ntfy

pub mod backup;
pub mod cli;
pub mod client;
pub mod domain;
pub mod error;
pub mod health;
pub mod logging;
pub mod notify;
pub mod orchestrator;
pub mod runtime;
pub mod source;
pub mod upgrade;
