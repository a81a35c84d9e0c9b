//! CLI argument parsing module for gitlab-autoupdate

use crate::source::{DEFAULT_RELEASES_URL, DEFAULT_SUPPORTED_TRACKS};
use crate::upgrade::DEFAULT_IMAGE_REPO;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Automatic updater for GitLab CE running in Docker Compose
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gitlab-autoupdate",
    version,
    about = "Safely update a Docker Compose GitLab CE instance one release at a time"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level, overridden by RUST_LOG
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Do not print the summary line on exit
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check for a safe upgrade and apply it
    Run(RunArgs),
}

/// Options of the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Skip the backup before updating
    #[arg(long)]
    pub skip_backup: bool,

    /// Delete backups older than this many days (0 disables deletion)
    #[arg(long, value_name = "DAYS", default_value_t = 30)]
    pub delete_old_backups: i64,

    /// Directory the backups are written to
    #[arg(long, default_value = "./backups")]
    pub backup_dir: PathBuf,

    /// Host directory GitLab writes its backup archives to
    #[arg(long, default_value = "/var/opt/gitlab/backups")]
    pub gitlab_backup_dir: PathBuf,

    /// Env file of the compose stack
    #[arg(long, default_value = "./.env")]
    pub gitlab_env_file: PathBuf,

    /// Compose file running GitLab
    #[arg(long, default_value = "./docker-compose.yml")]
    pub docker_compose_file: PathBuf,

    /// Name of the GitLab container
    #[arg(long, default_value = "gitlab")]
    pub docker_container_name: String,

    /// ntfy topic URL for notifications
    #[arg(long, env = "NTFY_URL")]
    pub ntfy_url: Option<String>,

    /// ntfy access token
    #[arg(long, env = "NTFY_AUTH_TOKEN", hide_env_values = true)]
    pub ntfy_auth_token: Option<String>,

    /// GitLab releases API endpoint
    #[arg(long, default_value = DEFAULT_RELEASES_URL)]
    pub releases_url: String,

    /// Number of newest release tracks considered supported
    #[arg(
        long,
        default_value_t = DEFAULT_SUPPORTED_TRACKS,
        value_parser = parse_tracks
    )]
    pub supported_tracks: usize,

    /// Docker image repository of GitLab
    #[arg(long, default_value = DEFAULT_IMAGE_REPO)]
    pub image_repo: String,
}

/// Log verbosity
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive for the env filter
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn parse_tracks(s: &str) -> Result<usize, String> {
    let tracks: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of tracks: {}", s))?;
    if tracks == 0 {
        return Err("at least one release track is required".to_string());
    }
    Ok(tracks)
}
