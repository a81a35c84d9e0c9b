//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ResolutionError: current version or supported versions could not be determined
//! - BackupError: a backup step failed
//! - DeployError: image pull, compose file rewrite or compose down/up failed
//! - HealthError: the container did not become healthy in time
//! - NotifyError: a notification could not be delivered (never fatal)
//! - CommandError: an external command could not be run at all

use crate::domain::Phase;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort an update run
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Version resolution errors
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Backup errors
    #[error(transparent)]
    Backup(#[from] BackupError),

    /// Deploy errors
    #[error(transparent)]
    Deploy(#[from] DeployError),

    /// Health check errors
    #[error(transparent)]
    Health(#[from] HealthError),
}

impl UpdateError {
    /// The phase this error aborted
    pub fn phase(&self) -> Phase {
        match self {
            UpdateError::Resolution(_) => Phase::Checking,
            UpdateError::Backup(_) => Phase::BackingUp,
            UpdateError::Deploy(_) => Phase::Deploying,
            UpdateError::Health(_) => Phase::Verifying,
        }
    }
}

/// A string that is not a `major.minor.patch` version
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version '{input}': {message}")]
    Invalid { input: String, message: String },
}

impl VersionError {
    /// Creates a new Invalid error
    pub fn invalid(input: impl Into<String>, message: impl Into<String>) -> Self {
        VersionError::Invalid {
            input: input.into(),
            message: message.into(),
        }
    }
}

/// Errors raised when an external command cannot be executed
#[derive(Error, Debug)]
pub enum CommandError {
    /// The argument vector was empty
    #[error("empty command")]
    Empty,

    /// The process could not be started
    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading output or waiting for the process failed
    #[error("failed while running '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors determining the current version or the supported versions
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Reading the version manifest inside the container failed
    #[error("failed to read current GitLab version from container '{container}': {message}")]
    VersionRead { container: String, message: String },

    /// The version manifest did not contain a parsable version
    #[error("unexpected version format received from container '{container}': '{output}'")]
    UnexpectedVersionFormat { container: String, output: String },

    /// The version source could not be reached
    #[error("failed to fetch supported versions from {url}: {message}")]
    SourceUnreachable { url: String, message: String },

    /// The version source answered with an unexpected document
    #[error("malformed supported versions response from {url}: {message}")]
    SourceMalformed { url: String, message: String },

    /// Running a command failed
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl ResolutionError {
    /// Creates a new SourceUnreachable error
    pub fn unreachable(url: impl Into<String>, message: impl Into<String>) -> Self {
        ResolutionError::SourceUnreachable {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new SourceMalformed error
    pub fn malformed(url: impl Into<String>, message: impl Into<String>) -> Self {
        ResolutionError::SourceMalformed {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Step of the full backup that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStep {
    CreateDirectory,
    CopyComposeFile,
    CopyEnvFile,
    CreateArchive,
    LocateArchive,
    MoveArchive,
}

impl fmt::Display for BackupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupStep::CreateDirectory => write!(f, "creating backup directory"),
            BackupStep::CopyComposeFile => write!(f, "copying compose file"),
            BackupStep::CopyEnvFile => write!(f, "copying env file"),
            BackupStep::CreateArchive => write!(f, "creating GitLab backup archive"),
            BackupStep::LocateArchive => write!(f, "locating GitLab backup archive"),
            BackupStep::MoveArchive => write!(f, "moving GitLab backup archive"),
        }
    }
}

/// A backup step failed; earlier steps are not undone
#[derive(Error, Debug)]
#[error("backup failed while {step}: {cause}")]
pub struct BackupError {
    pub step: BackupStep,
    pub cause: String,
}

impl BackupError {
    /// Creates a new BackupError
    pub fn new(step: BackupStep, cause: impl Into<String>) -> Self {
        Self {
            step,
            cause: cause.into(),
        }
    }

    /// Creates a BackupError from an IO error at `path`
    pub fn io(step: BackupStep, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(step, format!("{}: {}", path.into().display(), source))
    }
}

/// Errors rewriting the image reference in the compose file
#[derive(Error, Debug)]
pub enum DeploymentFileError {
    /// Compose file does not exist
    #[error("cannot find a valid docker-compose file at path: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read the compose file
    #[error("failed to read docker-compose file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the compose file
    #[error("failed to write docker-compose file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The expected image line is not present verbatim
    #[error("image line \"{line}\" was not found in {path}")]
    ImageLineNotFound { path: PathBuf, line: String },
}

/// Errors during the deploy phase; nothing is rolled back
#[derive(Error, Debug)]
pub enum DeployError {
    /// `docker pull` failed
    #[error("failed to pull image {image} (exit code {exit_code}): {stderr}")]
    PullFailed {
        image: String,
        exit_code: i32,
        stderr: String,
    },

    /// Compose file rewrite failed
    #[error(transparent)]
    DeploymentFile(#[from] DeploymentFileError),

    /// `docker compose down` failed
    #[error("failed to bring down GitLab container (exit code {exit_code}), stderr: {stderr}, stdout: {stdout}")]
    ComposeDown {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// `docker compose up` failed
    #[error("failed to bring up GitLab container (exit code {exit_code}), stderr: {stderr}, stdout: {stdout}")]
    ComposeUp {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// Running a command failed
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Errors verifying the redeployed container
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HealthError {
    /// The container never reported healthy
    #[error("GitLab did not become healthy after {attempts} attempts")]
    Timeout { attempts: u32 },
}

/// Errors delivering a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The request could not be sent
    #[error("failed to send notification: {message}")]
    Request { message: String },

    /// The endpoint rejected the notification
    #[error("failed to send notification: HTTP {status}")]
    Status { status: u16 },
}
