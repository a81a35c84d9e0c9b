//! Outcome notifications
//!
//! This module provides:
//! - The notifier trait and message kinds
//! - The ntfy notifier
//! - A best-effort dispatcher that never lets a delivery failure escape

mod ntfy;

pub use ntfy::NtfyNotifier;

use crate::error::NotifyError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Class of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    /// ntfy priority: 1 for success, 5 otherwise
    pub fn priority(&self) -> u8 {
        match self {
            NotificationKind::Success => 1,
            NotificationKind::Warning | NotificationKind::Error => 5,
        }
    }

    /// ntfy emoji tag
    pub fn emoji_tag(&self) -> &'static str {
        match self {
            NotificationKind::Success => "white_check_mark",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "x",
        }
    }

    /// Title of the message
    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::Success => "GitLab Update Successful",
            NotificationKind::Warning => "GitLab Update Warning",
            NotificationKind::Error => "GitLab Update Failed",
        }
    }
}

/// Trait for notification channels
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message
    async fn send(&self, kind: NotificationKind, title: &str, message: &str)
        -> Result<(), NotifyError>;
}

/// Body of an error notification: the message followed by the log history
pub fn error_body(message: &str, log_lines: &[String]) -> String {
    format!("{}\n\nLogs:\n{}", message, log_lines.join("\n"))
}

/// Best-effort front for an optional notifier
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    notifier: Option<Arc<dyn Notifier>>,
}

impl NotificationDispatcher {
    /// Dispatcher delivering through `notifier`
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier: Some(notifier),
        }
    }

    /// Dispatcher that drops every message
    pub fn disabled() -> Self {
        Self { notifier: None }
    }

    /// Returns true if a notifier is configured
    pub fn is_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    pub async fn notify_success(&self, message: &str) {
        self.deliver(NotificationKind::Success, message).await;
    }

    pub async fn notify_warning(&self, message: &str) {
        self.deliver(NotificationKind::Warning, message).await;
    }

    /// Error notification carrying the full log history
    pub async fn notify_error(&self, message: &str, log_lines: &[String]) {
        self.deliver(NotificationKind::Error, &error_body(message, log_lines))
            .await;
    }

    async fn deliver(&self, kind: NotificationKind, message: &str) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        match notifier.send(kind, kind.title(), message).await {
            Ok(()) => info!("Notification sent successfully."),
            Err(e) => warn!("Failed to send notification: {}", e),
        }
    }
}
