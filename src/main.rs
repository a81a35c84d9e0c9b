//! gitlab-autoupdate - safe automatic updates for GitLab CE in Docker Compose

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use gitlab_autoupdate::cli::{Cli, Command, RunArgs};
use gitlab_autoupdate::client::HttpClient;
use gitlab_autoupdate::domain::{OrchestrationRun, RunOutcome, SemanticVersion};
use gitlab_autoupdate::logging::{init_logging, LogHistory};
use gitlab_autoupdate::notify::{NotificationDispatcher, NtfyNotifier};
use gitlab_autoupdate::orchestrator::{UpdateOrchestrator, UpdaterConfig};
use gitlab_autoupdate::runtime::{DockerGateway, SystemCommandRunner};
use gitlab_autoupdate::source::GitLabReleasesSource;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let history = LogHistory::new();
    init_logging(cli.log_level.as_filter(), &history).context("failed to initialize logging")?;

    let Command::Run(args) = &cli.command;
    let orchestrator = build_orchestrator(args, history)?;
    let result = orchestrator.run().await;

    if !cli.quiet {
        println!("{}", summary(&result));
    }

    Ok(ExitCode::from(result.outcome.exit_code()))
}

/// Wire the orchestrator's collaborators from the command line
fn build_orchestrator(args: &RunArgs, history: LogHistory) -> anyhow::Result<UpdateOrchestrator> {
    let client = HttpClient::new().context("failed to create HTTP client")?;

    let notifier = match &args.ntfy_url {
        Some(url) => NotificationDispatcher::new(Arc::new(NtfyNotifier::new(
            client.clone(),
            url.clone(),
            args.ntfy_auth_token.clone(),
        ))),
        None => NotificationDispatcher::disabled(),
    };

    let source = GitLabReleasesSource::new(client, args.releases_url.clone(), args.supported_tracks);
    let gateway = DockerGateway::new(Arc::new(SystemCommandRunner::new()));

    Ok(UpdateOrchestrator::new(
        UpdaterConfig::from_cli(args),
        gateway,
        Arc::new(source),
        notifier,
        history,
    ))
}

/// One-line colored summary of the run
fn summary(run: &OrchestrationRun) -> String {
    match &run.outcome {
        RunOutcome::Success => format!(
            "{} updated {} → {}",
            "✓".green().bold(),
            version(run.current_version),
            version(run.target_version)
        ),
        RunOutcome::SkippedNoUpdate => format!(
            "{} already up to date ({})",
            "✓".green().bold(),
            version(run.current_version)
        ),
        RunOutcome::SkippedNoPath => format!(
            "{} no safe upgrade path from {}",
            "!".yellow().bold(),
            version(run.current_version)
        ),
        RunOutcome::Failed { phase, message } => format!(
            "{} failed while {}: {}",
            "✗".red().bold(),
            phase,
            message
        ),
    }
}

fn version(v: Option<SemanticVersion>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
}
