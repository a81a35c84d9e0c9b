//! Post-deploy health verification
//!
//! The verifier polls a probe a bounded number of times with a fixed delay
//! between attempts. This is the only place the updater retries anything.

use crate::error::HealthError;
use crate::runtime::DockerGateway;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// Default number of probe attempts
pub const DEFAULT_ATTEMPTS: u32 = 10;

/// Default delay between two attempts
pub const DEFAULT_DELAY: Duration = Duration::from_secs(30);

/// Status string the container healthcheck reports once GitLab is ready
const HEALTHY: &str = "healthy";

/// Trait for a single health check
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Returns Ok(true) if the service is healthy right now
    async fn check(&self) -> anyhow::Result<bool>;
}

/// Probe reading the Docker healthcheck status of a container
pub struct ContainerHealthProbe {
    gateway: DockerGateway,
    container: String,
}

impl ContainerHealthProbe {
    pub fn new(gateway: DockerGateway, container: impl Into<String>) -> Self {
        Self {
            gateway,
            container: container.into(),
        }
    }
}

#[async_trait]
impl HealthProbe for ContainerHealthProbe {
    async fn check(&self) -> anyhow::Result<bool> {
        let output = self.gateway.health_status(&self.container).await?;
        if !output.success() {
            anyhow::bail!(
                "docker inspect exited with code {}: {}",
                output.exit_code,
                output.stderr.trim()
            );
        }
        Ok(output.stdout.trim() == HEALTHY)
    }
}

/// Retry policy of the health verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    /// Maximum number of probe attempts
    pub attempts: u32,
    /// Delay between two attempts
    pub delay: Duration,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

/// Poll `probe` until it reports healthy or the attempts are exhausted
///
/// A probe error counts as a failed attempt. No delay follows the last attempt.
pub async fn verify_healthy(probe: &dyn HealthProbe, policy: HealthPolicy) -> Result<(), HealthError> {
    for attempt in 1..=policy.attempts {
        info!(
            "Checking GitLab health (Attempt {}/{})...",
            attempt, policy.attempts
        );

        match probe.check().await {
            Ok(true) => {
                info!("GitLab is healthy.");
                return Ok(());
            }
            Ok(false) => warn!("GitLab is not healthy yet."),
            Err(e) => warn!("Health check failed: {:#}", e),
        }

        if attempt < policy.attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    Err(HealthError::Timeout {
        attempts: policy.attempts,
    })
}
