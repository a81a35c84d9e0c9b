//! ntfy notifier
//!
//! Publishes one POST per message to an ntfy topic URL. Title, priority and
//! tags travel as headers, the message as the plain-text body.

use super::{NotificationKind, Notifier};
use crate::client::HttpClient;
use crate::error::NotifyError;
use async_trait::async_trait;

/// Tag identifying messages from this tool
const APP_TAG: &str = "gitlab-updater";

/// ntfy notifier
pub struct NtfyNotifier {
    client: HttpClient,
    url: String,
    auth_token: Option<String>,
}

impl NtfyNotifier {
    /// Create a notifier posting to `url`, optionally authenticating with a bearer token
    pub fn new(client: HttpClient, url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            auth_token,
        }
    }

    /// Headers for a message of `kind` titled `title`
    fn headers(&self, kind: NotificationKind, title: &str) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Title", title.to_string()),
            ("Priority", kind.priority().to_string()),
            ("Tags", format!("{},{}", APP_TAG, kind.emoji_tag())),
        ];
        if let Some(token) = &self.auth_token {
            headers.push(("Authorization", format!("Bearer {}", token)));
        }
        headers
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    async fn send(
        &self,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        self.client
            .post_text(&self.url, &self.headers(kind, title), message.to_string())
            .await
    }
}
