//! Docker and Docker Compose gateway
//!
//! Translates the operations the updater needs into `docker` command lines and
//! runs them through a [`CommandRunner`].

use super::command::{argv, CommandOutput, CommandRunner, LineCallback};
use crate::domain::SemanticVersion;
use crate::error::{CommandError, ResolutionError};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error};

/// Docker CLI binary
const DOCKER: &str = "docker";

/// File inside the GitLab container listing the installed version
const VERSION_MANIFEST_PATH: &str = "/opt/gitlab/version-manifest.txt";

/// Gateway to the container runtime
#[derive(Clone)]
pub struct DockerGateway {
    runner: Arc<dyn CommandRunner>,
}

impl DockerGateway {
    /// Create a gateway running commands through `runner`
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Run `command` inside `container`
    pub async fn exec(
        &self,
        container: &str,
        command: &[&str],
        on_line: LineCallback<'_>,
    ) -> Result<CommandOutput, CommandError> {
        let mut args = argv([DOCKER, "exec", container]);
        args.extend(command.iter().map(|s| s.to_string()));
        self.run(&args, on_line).await
    }

    /// `docker compose -f <file> down`
    pub async fn compose_down(&self, compose_file: &Path) -> Result<CommandOutput, CommandError> {
        let file = compose_file.display().to_string();
        self.run(&argv([DOCKER, "compose", "-f", file.as_str(), "down"]), &|_, _| {})
            .await
    }

    /// `docker compose -f <file> up -d`
    pub async fn compose_up(&self, compose_file: &Path) -> Result<CommandOutput, CommandError> {
        let file = compose_file.display().to_string();
        self.run(&argv([DOCKER, "compose", "-f", file.as_str(), "up", "-d"]), &|_, _| {})
            .await
    }

    /// `docker pull <image>`
    pub async fn pull_image(&self, image: &str) -> Result<CommandOutput, CommandError> {
        self.run(&argv([DOCKER, "pull", image]), &|_, _| {}).await
    }

    /// Health status reported by the container's healthcheck (`healthy`, `starting`, ...)
    pub async fn health_status(&self, container: &str) -> Result<CommandOutput, CommandError> {
        self.run(
            &argv([
                DOCKER,
                "inspect",
                "--format",
                "{{.State.Health.Status}}",
                container,
            ]),
            &|_, _| {},
        )
        .await
    }

    /// Read the installed GitLab version from the container's version manifest
    pub async fn read_current_version(
        &self,
        container: &str,
    ) -> Result<SemanticVersion, ResolutionError> {
        let output = self
            .exec(container, &["cat", VERSION_MANIFEST_PATH], &|_, _| {})
            .await?;

        if !output.success() {
            error!(
                "Error getting current GitLab version: {}",
                output.stderr.trim()
            );
            return Err(ResolutionError::VersionRead {
                container: container.to_string(),
                message: format!("exit code {}: {}", output.exit_code, output.stderr.trim()),
            });
        }

        parse_version_manifest(&output.stdout).ok_or_else(|| {
            let first_line = output.stdout.lines().next().unwrap_or_default().trim();
            error!("Unexpected version format: {}", first_line);
            ResolutionError::UnexpectedVersionFormat {
                container: container.to_string(),
                output: first_line.to_string(),
            }
        })
    }

    async fn run(
        &self,
        args: &[String],
        on_line: LineCallback<'_>,
    ) -> Result<CommandOutput, CommandError> {
        debug!(command = %args.join(" "), "running command");
        let output = self.runner.run_streaming(args, on_line).await?;
        debug!(exit_code = output.exit_code, "command finished");
        Ok(output)
    }
}

/// Extract the version from a version manifest, e.g. `gitlab-ce 18.7.1` on the first line
pub fn parse_version_manifest(content: &str) -> Option<SemanticVersion> {
    let first_line = content.lines().next()?;
    let mut fields = first_line.split_whitespace();
    let _component = fields.next()?;
    let version = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    version.parse().ok()
}
