//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - JSON GET for the version source
//! - Plain-text POST for notifications
//!
//! Requests are never retried; a failed request is reported to the caller.

use crate::error::{NotifyError, ResolutionError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("gitlab-autoupdate/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Perform a GET request and parse the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ResolutionError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ResolutionError::unreachable(url, "request timed out")
            } else {
                ResolutionError::unreachable(url, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::unreachable(url, format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolutionError::unreachable(url, format!("failed to read body: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| ResolutionError::malformed(url, format!("failed to parse JSON: {}", e)))
    }

    /// Perform a POST request with a plain-text body and extra headers
    pub async fn post_text(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: String,
    ) -> Result<(), NotifyError> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request.send().await.map_err(|e| NotifyError::Request {
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
