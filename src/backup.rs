//! Full backup before an update and sweeping of stale backups
//!
//! A full backup consists of, strictly in order:
//! 1. creating `<backup dir>/backup-<timestamp>`
//! 2. copying the compose file
//! 3. copying the env file, if it exists
//! 4. running `gitlab-backup create` inside the container
//! 5. locating the archive GitLab wrote to its backup directory
//! 6. moving that archive into the run's backup directory
//!
//! Steps are not undone when a later one fails; a partial backup directory is
//! left for the operator to inspect.

use crate::domain::{BackupItems, BackupManifest};
use crate::error::{BackupError, BackupStep};
use crate::runtime::{DockerGateway, Stream};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info, warn};

/// Seconds in one day
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Sequences the steps of a full backup for one run
pub struct BackupCoordinator {
    manifest: BackupManifest,
    gateway: DockerGateway,
}

impl BackupCoordinator {
    /// Create a coordinator for the run described by `manifest`
    pub fn new(manifest: BackupManifest, gateway: DockerGateway) -> Self {
        Self { manifest, gateway }
    }

    /// Manifest of this run
    pub fn manifest(&self) -> &BackupManifest {
        &self.manifest
    }

    /// Run every backup step in order, stopping at the first failure
    pub async fn perform_full_backup(
        &self,
        compose_file: &Path,
        container: &str,
        env_file: &Path,
        remote_backup_dir: &Path,
    ) -> Result<BackupItems, BackupError> {
        self.create_backup_dir()?;
        let compose_copy = self.backup_compose_file(compose_file)?;
        let env_copy = self.backup_env_file_if_exists(env_file)?;
        let archive = self.create_gitlab_backup(container, remote_backup_dir).await?;

        Ok(BackupItems {
            compose_file: Some(compose_copy),
            env_file: env_copy,
            application_archive: archive,
        })
    }

    /// Create the run's backup directory; an existing directory is fine
    pub fn create_backup_dir(&self) -> Result<PathBuf, BackupError> {
        let run_dir = self.manifest.run_dir();
        fs::create_dir_all(&run_dir)
            .map_err(|e| BackupError::io(BackupStep::CreateDirectory, &run_dir, e))?;
        Ok(run_dir)
    }

    /// Copy the compose file into the backup directory under its own name
    pub fn backup_compose_file(&self, compose_file: &Path) -> Result<PathBuf, BackupError> {
        let destination = self.manifest.destination_for(compose_file).ok_or_else(|| {
            BackupError::new(
                BackupStep::CopyComposeFile,
                format!("invalid compose file path: {}", compose_file.display()),
            )
        })?;

        fs::copy(compose_file, &destination)
            .map_err(|e| BackupError::io(BackupStep::CopyComposeFile, compose_file, e))?;

        info!("Backed up compose file to: {}", destination.display());
        Ok(destination)
    }

    /// Copy the env file into the backup directory if it exists
    pub fn backup_env_file_if_exists(&self, env_file: &Path) -> Result<Option<PathBuf>, BackupError> {
        if !env_file.exists() {
            info!("No .env file found to backup.");
            return Ok(None);
        }

        let destination = self.manifest.destination_for(env_file).ok_or_else(|| {
            BackupError::new(
                BackupStep::CopyEnvFile,
                format!("invalid env file path: {}", env_file.display()),
            )
        })?;

        fs::copy(env_file, &destination)
            .map_err(|e| BackupError::io(BackupStep::CopyEnvFile, env_file, e))?;

        info!("Backed up env file to: {}", destination.display());
        Ok(Some(destination))
    }

    /// Create the application backup inside the container and move the archive next to the config copies
    pub async fn create_gitlab_backup(
        &self,
        container: &str,
        remote_backup_dir: &Path,
    ) -> Result<PathBuf, BackupError> {
        info!("Creating GitLab backup inside the Docker container...");

        let backup_arg = format!("BACKUP={}", self.manifest.archive_name());
        let output = self
            .gateway
            .exec(
                container,
                &["gitlab-backup", "create", &backup_arg],
                &|stream, line| {
                    let line = line.trim();
                    if line.is_empty() {
                        return;
                    }
                    match stream {
                        Stream::Stdout => info!("[Gitlab Backup] {}", line),
                        Stream::Stderr => error!("[Gitlab Backup ERROR] {}", line),
                    }
                },
            )
            .await
            .map_err(|e| BackupError::new(BackupStep::CreateArchive, e.to_string()))?;

        if !output.success() {
            return Err(BackupError::new(
                BackupStep::CreateArchive,
                format!("GitLab backup command failed with exit code {}", output.exit_code),
            ));
        }

        let remote_archive = self.manifest.remote_archive_path(remote_backup_dir);
        if !remote_archive.exists() {
            return Err(BackupError::new(
                BackupStep::LocateArchive,
                format!(
                    "expected GitLab backup file not found at: {}",
                    remote_archive.display()
                ),
            ));
        }

        self.create_backup_dir()?;
        let destination = self.manifest.application_archive();
        move_file(&remote_archive, &destination).await.map_err(|e| {
            error!("Failed to move GitLab backup file: {}", e);
            BackupError::io(BackupStep::MoveArchive, &remote_archive, e)
        })?;

        info!("GitLab backup completed successfully: {}", destination.display());
        Ok(destination)
    }
}

/// Rename `from` to `to`, copying and deleting when the rename crosses filesystems
async fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => return Ok(()),
        Err(e) => debug!(
            "Rename of {} to {} failed, copying instead: {}",
            from.display(),
            to.display(),
            e
        ),
    }
    tokio::fs::copy(from, to).await?;
    tokio::fs::remove_file(from).await
}

/// Delete backup directories older than `days`; `days <= 0` disables the sweep
///
/// Failures are logged and never propagated. Returns the removed directories.
pub fn delete_backups_older_than_days(backup_root: &Path, days: i64) -> Vec<PathBuf> {
    delete_backups_older_than(backup_root, days, SystemTime::now())
}

/// Same as [`delete_backups_older_than_days`] with an explicit current time
pub fn delete_backups_older_than(backup_root: &Path, days: i64, now: SystemTime) -> Vec<PathBuf> {
    if days <= 0 {
        info!("Deletion of old backups is disabled.");
        return Vec::new();
    }

    let max_age = Duration::from_secs((days as u64).saturating_mul(SECONDS_PER_DAY));
    let Some(cutoff) = now.checked_sub(max_age) else {
        return Vec::new();
    };

    match sweep(backup_root, cutoff) {
        Ok(removed) => removed,
        Err(e) => {
            warn!("Failed to delete old backups in {}: {}", backup_root.display(), e);
            Vec::new()
        }
    }
}

fn sweep(backup_root: &Path, cutoff: SystemTime) -> io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for entry in fs::read_dir(backup_root)? {
        let path = entry?.path();

        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!("Failed to inspect {}: {}", path.display(), e);
                continue;
            }
        };
        if !metadata.is_dir() {
            continue;
        }

        let is_stale = metadata.modified().map(|m| m < cutoff).unwrap_or(false);
        if !is_stale {
            continue;
        }

        match fs::remove_dir_all(&path) {
            Ok(()) => {
                info!("Deleted old backup: {}", path.display());
                removed.push(path);
            }
            Err(e) => warn!("Failed to delete old backup {}: {}", path.display(), e),
        }
    }

    Ok(removed)
}
