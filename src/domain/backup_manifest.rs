//! Backup manifest for a single update run
//!
//! The manifest fixes the timestamp of the run, and with it the name of the
//! backup directory and of the archive GitLab produces inside the container.

use std::path::{Path, PathBuf};

/// Prefix of the archive name handed to `gitlab-backup create`
const ARCHIVE_PREFIX: &str = "gitlab-auto-updater-backup-";

/// Suffix GitLab appends to the archive name it writes
const GITLAB_ARCHIVE_SUFFIX: &str = "_gitlab_backup.tar";

/// File name of the archive inside the run directory
const LOCAL_ARCHIVE_NAME: &str = "gitlab_backup.tar";

/// Artifacts captured under one timestamped backup directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupManifest {
    base_path: PathBuf,
    timestamp: i64,
    items: Option<BackupItems>,
}

impl BackupManifest {
    /// Create a manifest rooted at `base_path` for the run started at `timestamp` (unix millis)
    pub fn new(base_path: impl Into<PathBuf>, timestamp: i64) -> Self {
        Self {
            base_path: base_path.into(),
            timestamp,
            items: None,
        }
    }

    /// The same manifest recording the items a completed backup produced
    pub fn with_items(self, items: BackupItems) -> Self {
        Self {
            items: Some(items),
            ..self
        }
    }

    /// Items captured, absent until the backup completed
    pub fn items(&self) -> Option<&BackupItems> {
        self.items.as_ref()
    }

    /// Directory of this run's backup: `<base>/backup-<timestamp>`
    pub fn run_dir(&self) -> PathBuf {
        self.base_path.join(format!("backup-{}", self.timestamp))
    }

    /// Name passed as `BACKUP=` to `gitlab-backup create`
    pub fn archive_name(&self) -> String {
        format!("{}{}", ARCHIVE_PREFIX, self.timestamp)
    }

    /// Where GitLab writes the archive on the host
    pub fn remote_archive_path(&self, remote_backup_dir: &Path) -> PathBuf {
        remote_backup_dir.join(format!("{}{}", self.archive_name(), GITLAB_ARCHIVE_SUFFIX))
    }

    /// Where the archive ends up inside the run directory
    pub fn application_archive(&self) -> PathBuf {
        self.run_dir().join(LOCAL_ARCHIVE_NAME)
    }

    /// Destination of a copied configuration file, keeping its file name
    pub fn destination_for(&self, source: &Path) -> Option<PathBuf> {
        source.file_name().map(|name| self.run_dir().join(name))
    }
}

/// Items a completed backup produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupItems {
    /// Copied compose file
    pub compose_file: Option<PathBuf>,
    /// Copied env file, absent when the source did not exist
    pub env_file: Option<PathBuf>,
    /// Application archive moved out of GitLab's backup directory
    pub application_archive: PathBuf,
}
