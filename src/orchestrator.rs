//! Update orchestrator for coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination: check → backup → deploy → verify → cleanup
//! - Fail-fast handling: the first fatal error ends the run, nothing is rolled back
//! - The single place that logs critical errors and sends the error notification

use crate::backup::{delete_backups_older_than_days, BackupCoordinator};
use crate::cli::RunArgs;
use crate::critical;
use crate::domain::{
    BackupManifest, OrchestrationRun, RunOutcome, SemanticVersion, UpgradeDecision,
};
use crate::error::{DeployError, UpdateError};
use crate::health::{verify_healthy, ContainerHealthProbe, HealthPolicy, HealthProbe};
use crate::logging::LogHistory;
use crate::notify::NotificationDispatcher;
use crate::runtime::DockerGateway;
use crate::source::VersionSource;
use crate::upgrade::{image_reference, resolve, DeploymentFile, DEFAULT_IMAGE_REPO};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Configuration of an update run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// Skip the backup phase
    pub skip_backup: bool,
    /// Age in days after which backups are swept, `<= 0` disables the sweep
    pub delete_old_backups_days: i64,
    /// Root of the backup directories
    pub backup_dir: PathBuf,
    /// Host directory GitLab writes its archives to
    pub gitlab_backup_dir: PathBuf,
    /// Env file of the compose stack
    pub env_file: PathBuf,
    /// Compose file running GitLab
    pub compose_file: PathBuf,
    /// Name of the GitLab container
    pub container: String,
    /// Docker image repository of GitLab
    pub image_repo: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            skip_backup: false,
            delete_old_backups_days: 30,
            backup_dir: PathBuf::from("./backups"),
            gitlab_backup_dir: PathBuf::from("/var/opt/gitlab/backups"),
            env_file: PathBuf::from("./.env"),
            compose_file: PathBuf::from("./docker-compose.yml"),
            container: "gitlab".to_string(),
            image_repo: DEFAULT_IMAGE_REPO.to_string(),
        }
    }
}

impl UpdaterConfig {
    /// Build the configuration from the `run` command's arguments
    pub fn from_cli(args: &RunArgs) -> Self {
        Self {
            skip_backup: args.skip_backup,
            delete_old_backups_days: args.delete_old_backups,
            backup_dir: args.backup_dir.clone(),
            gitlab_backup_dir: args.gitlab_backup_dir.clone(),
            env_file: args.gitlab_env_file.clone(),
            compose_file: args.docker_compose_file.clone(),
            container: args.docker_container_name.clone(),
            image_repo: args.image_repo.clone(),
        }
    }
}

/// Orchestrator for one update run
pub struct UpdateOrchestrator {
    /// Run configuration
    config: UpdaterConfig,
    /// Container runtime
    gateway: DockerGateway,
    /// Supported versions
    source: Arc<dyn VersionSource>,
    /// Outcome notifications
    notifier: NotificationDispatcher,
    /// Log lines of this run, attached to error notifications
    history: LogHistory,
    /// Post-deploy health check
    health_probe: Arc<dyn HealthProbe>,
    /// Retry policy of the health check
    health_policy: HealthPolicy,
}

impl UpdateOrchestrator {
    /// Create an orchestrator probing the configured container's health
    pub fn new(
        config: UpdaterConfig,
        gateway: DockerGateway,
        source: Arc<dyn VersionSource>,
        notifier: NotificationDispatcher,
        history: LogHistory,
    ) -> Self {
        let health_probe = Arc::new(ContainerHealthProbe::new(
            gateway.clone(),
            config.container.clone(),
        ));
        Self {
            config,
            gateway,
            source,
            notifier,
            history,
            health_probe,
            health_policy: HealthPolicy::default(),
        }
    }

    /// Replace the health probe
    pub fn with_health_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.health_probe = probe;
        self
    }

    /// Replace the health retry policy
    pub fn with_health_policy(mut self, policy: HealthPolicy) -> Self {
        self.health_policy = policy;
        self
    }

    /// Run the update workflow
    pub async fn run(&self) -> OrchestrationRun {
        self.run_at(Utc::now().timestamp_millis()).await
    }

    /// Run the update workflow, naming the backup after `timestamp` (unix millis)
    pub async fn run_at(&self, timestamp: i64) -> OrchestrationRun {
        let mut run = OrchestrationRun::new();

        run.outcome = match self.execute(&mut run, timestamp).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let phase = e.phase();
                let message = e.to_string();
                critical!("GitLab update failed while {}: {}", phase, message);
                self.notifier
                    .notify_error(
                        &format!("GitLab update failed: {}", message),
                        &self.history.snapshot(),
                    )
                    .await;
                RunOutcome::Failed { phase, message }
            }
        };

        run
    }

    async fn execute(
        &self,
        run: &mut OrchestrationRun,
        timestamp: i64,
    ) -> Result<RunOutcome, UpdateError> {
        // Checking
        info!("Checking for GitLab updates...");
        let current = self
            .gateway
            .read_current_version(&self.config.container)
            .await?;
        run.current_version = Some(current);
        info!("Current GitLab version: {}", current);

        let supported = self.source.supported_versions().await?;
        let target = match resolve(&supported, current) {
            UpgradeDecision::NoSafePath => {
                let message = format!(
                    "No safe upgrade path found from GitLab {}. Manual upgrade required.",
                    current
                );
                warn!("{}", message);
                self.notifier.notify_warning(&message).await;
                return Ok(RunOutcome::SkippedNoPath);
            }
            UpgradeDecision::AlreadyLatest => {
                let message = format!("GitLab is already at the latest version ({}).", current);
                info!("{}", message);
                self.notifier.notify_success(&message).await;
                return Ok(RunOutcome::SkippedNoUpdate);
            }
            UpgradeDecision::UpgradePossible { target } => target,
        };
        run.target_version = Some(target);
        info!("Safe upgrade path found: {} -> {}", current, target);

        // Backing up
        if self.config.skip_backup {
            info!("Skipping backup as requested.");
        } else {
            let manifest = BackupManifest::new(&self.config.backup_dir, timestamp);
            run.backup_manifest = Some(manifest.clone());
            let items = BackupCoordinator::new(manifest.clone(), self.gateway.clone())
                .perform_full_backup(
                    &self.config.compose_file,
                    &self.config.container,
                    &self.config.env_file,
                    &self.config.gitlab_backup_dir,
                )
                .await?;
            run.backup_manifest = Some(manifest.with_items(items));
        }

        // Deploying
        self.deploy(&current, &target).await?;

        // Verifying
        verify_healthy(self.health_probe.as_ref(), self.health_policy).await?;

        // Cleanup
        self.sweep_old_backups().await;

        let message = format!("GitLab successfully updated from {} to {}.", current, target);
        info!("{}", message);
        self.notifier.notify_success(&message).await;
        Ok(RunOutcome::Success)
    }

    /// Delete stale backups on the blocking pool; failures are warnings only
    async fn sweep_old_backups(&self) {
        let backup_root = self.config.backup_dir.clone();
        let days = self.config.delete_old_backups_days;
        let dispatch = tracing::dispatcher::get_default(|d| d.clone());

        let sweep = tokio::task::spawn_blocking(move || {
            tracing::dispatcher::with_default(&dispatch, || {
                delete_backups_older_than_days(&backup_root, days)
            })
        });
        if let Err(e) = sweep.await {
            warn!("Old backup cleanup did not complete: {}", e);
        }
    }

    /// Pull the new image, rewrite the compose file and recreate the container
    async fn deploy(
        &self,
        current: &SemanticVersion,
        target: &SemanticVersion,
    ) -> Result<(), DeployError> {
        let image = image_reference(&self.config.image_repo, target);
        info!("Pulling image {}...", image);
        let output = self.gateway.pull_image(&image).await?;
        if !output.success() {
            return Err(DeployError::PullFailed {
                image,
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        DeploymentFile::with_repo(&self.config.compose_file, &self.config.image_repo)
            .replace_version(current, target)?;

        info!("Stopping GitLab container...");
        let output = self.gateway.compose_down(&self.config.compose_file).await?;
        if !output.success() {
            return Err(DeployError::ComposeDown {
                exit_code: output.exit_code,
                stdout: output.stdout.trim().to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        info!("Starting GitLab container...");
        let output = self.gateway.compose_up(&self.config.compose_file).await?;
        if !output.success() {
            return Err(DeployError::ComposeUp {
                exit_code: output.exit_code,
                stdout: output.stdout.trim().to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        info!("GitLab container restarted with version {}.", target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Phase;
    use crate::error::ResolutionError;
    use crate::logging::capture;
    use crate::notify::fake::RecordingNotifier;
    use crate::notify::NotificationKind;
    use crate::runtime::fake::ScriptedRunner;
    use crate::runtime::CommandOutput;
    use async_trait::async_trait;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    const TIMESTAMP: i64 = 1_760_000_000_000;
    const COMPOSE: &str = "services:\n  web:\n    image: 'gitlab/gitlab-ce:18.7.1-ce.0'\n    restart: always\n";

    /// Source answering with a fixed list, or failing
    struct StaticSource(Option<Vec<SemanticVersion>>);

    impl StaticSource {
        fn versions(versions: &[&str]) -> Self {
            Self(Some(versions.iter().map(|s| s.parse().unwrap()).collect()))
        }

        fn unreachable() -> Self {
            Self(None)
        }
    }

    #[async_trait]
    impl VersionSource for StaticSource {
        fn location(&self) -> &str {
            "static"
        }

        async fn supported_versions(&self) -> Result<Vec<SemanticVersion>, ResolutionError> {
            self.0
                .clone()
                .ok_or_else(|| ResolutionError::unreachable("static", "connection refused"))
        }
    }

    struct Fixture {
        _dir: TempDir,
        config: UpdaterConfig,
        notifier: Arc<RecordingNotifier>,
        history: LogHistory,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_notifier(RecordingNotifier::default())
        }

        fn with_notifier(notifier: RecordingNotifier) -> Self {
            let dir = TempDir::new().unwrap();
            let compose_file = dir.path().join("docker-compose.yml");
            let gitlab_backup_dir = dir.path().join("gitlab-backups");
            fs::write(&compose_file, COMPOSE).unwrap();
            fs::create_dir_all(&gitlab_backup_dir).unwrap();

            let config = UpdaterConfig {
                backup_dir: dir.path().join("backups"),
                gitlab_backup_dir,
                env_file: dir.path().join(".env"),
                compose_file,
                ..UpdaterConfig::default()
            };

            Self {
                _dir: dir,
                config,
                notifier: Arc::new(notifier),
                history: LogHistory::new(),
            }
        }

        fn remote_archive(&self) -> PathBuf {
            BackupManifest::new(&self.config.backup_dir, TIMESTAMP)
                .remote_archive_path(&self.config.gitlab_backup_dir)
        }

        /// A container at 18.7.1 that backs up, deploys and turns healthy
        fn healthy_runner(&self) -> ScriptedRunner {
            let archive = self.remote_archive();
            ScriptedRunner::new()
                .on("version-manifest", CommandOutput::ok("gitlab-ce 18.7.1\n"))
                .on_with("gitlab-backup create", CommandOutput::ok("done\n"), move || {
                    fs::write(&archive, b"tar").unwrap()
                })
                .on("inspect", CommandOutput::ok("healthy\n"))
        }

        fn orchestrator(
            &self,
            runner: ScriptedRunner,
            source: StaticSource,
        ) -> (UpdateOrchestrator, Arc<ScriptedRunner>) {
            let runner = Arc::new(runner);
            let orchestrator = UpdateOrchestrator::new(
                self.config.clone(),
                DockerGateway::new(runner.clone()),
                Arc::new(source),
                NotificationDispatcher::new(self.notifier.clone()),
                self.history.clone(),
            )
            .with_health_policy(HealthPolicy {
                attempts: 3,
                delay: Duration::from_secs(30),
            });
            (orchestrator, runner)
        }

        fn compose(&self) -> String {
            fs::read_to_string(&self.config.compose_file).unwrap()
        }
    }

    fn supported() -> StaticSource {
        StaticSource::versions(&["18.8.0", "18.7.3", "18.6.5"])
    }

    #[tokio::test]
    async fn test_successful_update() {
        let fixture = Fixture::new();
        let (orchestrator, runner) = fixture.orchestrator(fixture.healthy_runner(), supported());

        let run = orchestrator.run_at(TIMESTAMP).await;

        assert_eq!(run.outcome, RunOutcome::Success);
        assert_eq!(run.current_version, Some(SemanticVersion::new(18, 7, 1)));
        assert_eq!(run.target_version, Some(SemanticVersion::new(18, 8, 0)));

        let compose_file = fixture.config.compose_file.display().to_string();
        assert_eq!(
            runner.calls(),
            vec![
                "docker exec gitlab cat /opt/gitlab/version-manifest.txt".to_string(),
                format!(
                    "docker exec gitlab gitlab-backup create BACKUP=gitlab-auto-updater-backup-{}",
                    TIMESTAMP
                ),
                "docker pull gitlab/gitlab-ce:18.8.0-ce.0".to_string(),
                format!("docker compose -f {} down", compose_file),
                format!("docker compose -f {} up -d", compose_file),
                "docker inspect --format {{.State.Health.Status}} gitlab".to_string(),
            ]
        );

        assert!(fixture.compose().contains("image: 'gitlab/gitlab-ce:18.8.0-ce.0'"));
        let manifest = run.backup_manifest.unwrap();
        let items = manifest.items().unwrap();
        assert_eq!(items.compose_file, Some(manifest.run_dir().join("docker-compose.yml")));
        assert_eq!(items.env_file, None);
        assert_eq!(items.application_archive, manifest.application_archive());
        assert!(items.application_archive.exists());
        assert!(manifest.run_dir().join("docker-compose.yml").exists());

        let sent = fixture.notifier.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, NotificationKind::Success);
        assert!(sent[0].2.contains("18.7.1"));
        assert!(sent[0].2.contains("18.8.0"));
    }

    #[tokio::test]
    async fn test_already_latest() {
        let fixture = Fixture::new();
        let (orchestrator, runner) = fixture.orchestrator(
            ScriptedRunner::new().on("version-manifest", CommandOutput::ok("gitlab-ce 18.8.0\n")),
            supported(),
        );

        let run = orchestrator.run_at(TIMESTAMP).await;

        assert_eq!(run.outcome, RunOutcome::SkippedNoUpdate);
        assert_eq!(runner.calls().len(), 1);
        assert_eq!(fixture.compose(), COMPOSE);
        let sent = fixture.notifier.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, NotificationKind::Success);
    }

    #[tokio::test]
    async fn test_no_safe_path() {
        let fixture = Fixture::new();
        let (orchestrator, runner) = fixture.orchestrator(
            ScriptedRunner::new().on("version-manifest", CommandOutput::ok("gitlab-ce 18.2.8\n")),
            supported(),
        );

        let run = orchestrator.run_at(TIMESTAMP).await;

        assert_eq!(run.outcome, RunOutcome::SkippedNoPath);
        assert_eq!(run.outcome.exit_code(), 0);
        assert!(run.target_version.is_none());
        assert_eq!(runner.calls().len(), 1);
        assert!(!fixture.config.backup_dir.exists());
        let sent = fixture.notifier.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, NotificationKind::Warning);
    }

    #[tokio::test]
    async fn test_major_hop_from_penultimate_rung() {
        let fixture = Fixture::new();
        fs::write(
            &fixture.config.compose_file,
            "image: 'gitlab/gitlab-ce:18.11.3-ce.0'\n",
        )
        .unwrap();
        let (orchestrator, runner) = fixture.orchestrator(
            ScriptedRunner::new()
                .on("version-manifest", CommandOutput::ok("gitlab-ce 18.11.3\n"))
                .on("inspect", CommandOutput::ok("healthy\n")),
            StaticSource::versions(&["19.0.0", "18.11.3", "18.10.6"]),
        );
        let mut config = fixture.config.clone();
        config.skip_backup = true;
        let orchestrator = UpdateOrchestrator { config, ..orchestrator };

        let run = orchestrator.run_at(TIMESTAMP).await;

        assert_eq!(run.outcome, RunOutcome::Success);
        assert!(run.backup_manifest.is_none());
        assert!(!runner.calls().iter().any(|c| c.contains("gitlab-backup")));
        assert_eq!(fixture.compose(), "image: 'gitlab/gitlab-ce:19.0.0-ce.0'\n");
    }

    #[tokio::test]
    async fn test_version_read_failure() {
        let fixture = Fixture::new();
        let history = fixture.history.clone();
        let _guard = capture(&history);
        let (orchestrator, runner) = fixture.orchestrator(
            ScriptedRunner::new().on(
                "version-manifest",
                CommandOutput::failed(1, "Error: No such container: gitlab"),
            ),
            supported(),
        );

        let run = orchestrator.run_at(TIMESTAMP).await;

        assert!(matches!(
            run.outcome,
            RunOutcome::Failed {
                phase: Phase::Checking,
                ..
            }
        ));
        assert_eq!(run.outcome.exit_code(), 1);
        assert_eq!(runner.calls().len(), 1);

        let sent = fixture.notifier.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, NotificationKind::Error);
        assert!(sent[0].2.contains("\n\nLogs:\n"));
        assert!(sent[0].2.contains("[CRITICAL] GitLab update failed while checking"));
    }

    #[tokio::test]
    async fn test_source_failure() {
        let fixture = Fixture::new();
        let (orchestrator, runner) =
            fixture.orchestrator(fixture.healthy_runner(), StaticSource::unreachable());

        let run = orchestrator.run_at(TIMESTAMP).await;

        assert!(matches!(
            run.outcome,
            RunOutcome::Failed {
                phase: Phase::Checking,
                ..
            }
        ));
        assert_eq!(run.current_version, Some(SemanticVersion::new(18, 7, 1)));
        assert_eq!(runner.calls().len(), 1);
        assert_eq!(fixture.compose(), COMPOSE);
    }

    #[tokio::test]
    async fn test_backup_failure_stops_before_deploy() {
        let fixture = Fixture::new();
        let (orchestrator, runner) = fixture.orchestrator(
            ScriptedRunner::new()
                .on("version-manifest", CommandOutput::ok("gitlab-ce 18.7.1\n"))
                .on("gitlab-backup", CommandOutput::failed(1, "rake aborted!")),
            supported(),
        );

        let run = orchestrator.run_at(TIMESTAMP).await;

        match &run.outcome {
            RunOutcome::Failed { phase, message } => {
                assert_eq!(*phase, Phase::BackingUp);
                assert!(message.contains("exit code 1"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!runner.calls().iter().any(|c| c.contains("pull")));
        assert_eq!(fixture.compose(), COMPOSE);
        // Partial backup is left in place
        assert!(run.backup_manifest.unwrap().run_dir().exists());
    }

    #[tokio::test]
    async fn test_pull_failure_leaves_compose_file() {
        let fixture = Fixture::new();
        let (orchestrator, runner) = fixture.orchestrator(
            fixture
                .healthy_runner()
                .on("docker pull", CommandOutput::failed(1, "manifest unknown")),
            supported(),
        );

        let run = orchestrator.run_at(TIMESTAMP).await;

        match &run.outcome {
            RunOutcome::Failed { phase, message } => {
                assert_eq!(*phase, Phase::Deploying);
                assert!(message.contains("gitlab/gitlab-ce:18.8.0-ce.0"));
                assert!(message.contains("manifest unknown"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(fixture.compose(), COMPOSE);
        assert!(!runner.calls().iter().any(|c| c.contains(" down")));
        assert_eq!(fixture.notifier.messages()[0].0, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_missing_image_line_stops_before_compose_down() {
        let fixture = Fixture::new();
        fs::write(
            &fixture.config.compose_file,
            "image: 'gitlab/gitlab-ce:latest'\n",
        )
        .unwrap();
        let (orchestrator, runner) = fixture.orchestrator(fixture.healthy_runner(), supported());

        let run = orchestrator.run_at(TIMESTAMP).await;

        assert!(matches!(
            run.outcome,
            RunOutcome::Failed {
                phase: Phase::Deploying,
                ..
            }
        ));
        assert_eq!(fixture.compose(), "image: 'gitlab/gitlab-ce:latest'\n");
        assert!(!runner.calls().iter().any(|c| c.contains(" down")));
    }

    #[tokio::test]
    async fn test_compose_up_failure() {
        let fixture = Fixture::new();
        let (orchestrator, runner) = fixture.orchestrator(
            fixture
                .healthy_runner()
                .on(" up -d", CommandOutput::failed(1, "port is already allocated")),
            supported(),
        );

        let run = orchestrator.run_at(TIMESTAMP).await;

        match &run.outcome {
            RunOutcome::Failed { phase, message } => {
                assert_eq!(*phase, Phase::Deploying);
                assert!(message.contains("port is already allocated"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        // No rollback of the rewritten compose file
        assert!(fixture.compose().contains("18.8.0-ce.0"));
        assert!(!runner.calls().iter().any(|c| c.contains("inspect")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_timeout() {
        let fixture = Fixture::new();
        let (orchestrator, runner) = fixture.orchestrator(
            ScriptedRunner::new()
                .on("version-manifest", CommandOutput::ok("gitlab-ce 18.7.1\n"))
                .on("inspect", CommandOutput::ok("unhealthy\n")),
            supported(),
        );
        let mut config = fixture.config.clone();
        config.skip_backup = true;
        let orchestrator = UpdateOrchestrator { config, ..orchestrator };

        let run = orchestrator.run_at(TIMESTAMP).await;

        assert_eq!(
            run.outcome,
            RunOutcome::Failed {
                phase: Phase::Verifying,
                message: "GitLab did not become healthy after 3 attempts".to_string(),
            }
        );
        let probes = runner.calls().iter().filter(|c| c.contains("inspect")).count();
        assert_eq!(probes, 3);
    }

    #[tokio::test]
    async fn test_cleanup_sweeps_old_backups() {
        let fixture = Fixture::new();
        let (orchestrator, _) = fixture.orchestrator(fixture.healthy_runner(), supported());
        let orchestrator = UpdateOrchestrator {
            config: UpdaterConfig {
                delete_old_backups_days: 0,
                ..fixture.config.clone()
            },
            ..orchestrator
        };
        let history = fixture.history.clone();
        let _guard = capture(&history);

        let run = orchestrator.run_at(TIMESTAMP).await;

        assert_eq!(run.outcome, RunOutcome::Success);
        assert!(history
            .snapshot()
            .iter()
            .any(|l| l.contains("Deletion of old backups is disabled.")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cleanup_removes_expired_backups() {
        let fixture = Fixture::new();
        let expired = fixture.config.backup_dir.join("backup-1700000000000");
        fs::create_dir_all(&expired).unwrap();
        let forty_days_ago = std::time::SystemTime::now() - Duration::from_secs(40 * 24 * 60 * 60);
        fs::File::open(&expired)
            .unwrap()
            .set_modified(forty_days_ago)
            .unwrap();
        let (orchestrator, _) = fixture.orchestrator(fixture.healthy_runner(), supported());
        let history = fixture.history.clone();
        let _guard = capture(&history);

        let run = orchestrator.run_at(TIMESTAMP).await;

        assert_eq!(run.outcome, RunOutcome::Success);
        assert!(!expired.exists());
        assert!(run.backup_manifest.unwrap().run_dir().exists());
        assert!(history
            .snapshot()
            .iter()
            .any(|l| l.contains("[INFO] Deleted old backup:")));
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_change_outcome() {
        let fixture = Fixture::with_notifier(RecordingNotifier::failing());
        let (orchestrator, _) = fixture.orchestrator(fixture.healthy_runner(), supported());

        let run = orchestrator.run_at(TIMESTAMP).await;

        assert_eq!(run.outcome, RunOutcome::Success);
        assert_eq!(fixture.notifier.messages().len(), 1);
    }

    #[test]
    fn test_config_from_cli() {
        use crate::cli::{Cli, Command};
        use clap::Parser;

        let cli = Cli::parse_from([
            "gitlab-autoupdate",
            "run",
            "--skip-backup",
            "--delete-old-backups",
            "7",
            "--docker-container-name",
            "gitlab-web",
        ]);
        let Command::Run(args) = cli.command;
        let config = UpdaterConfig::from_cli(&args);

        assert!(config.skip_backup);
        assert_eq!(config.delete_old_backups_days, 7);
        assert_eq!(config.container, "gitlab-web");
        assert_eq!(config.compose_file, PathBuf::from("./docker-compose.yml"));
        assert_eq!(config.image_repo, DEFAULT_IMAGE_REPO);
    }
}
