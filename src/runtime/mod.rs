//! Container runtime gateway
//!
//! This module provides:
//! - A command runner capability with concurrent stdout/stderr draining
//! - The Docker / Docker Compose gateway built on top of it

mod command;
mod docker;
#[cfg(test)]
pub(crate) mod fake;

pub use command::{argv, CommandOutput, CommandRunner, LineCallback, Stream, SystemCommandRunner};
pub use docker::{parse_version_manifest, DockerGateway};
