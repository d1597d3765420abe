// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use plugsync_core::{PlugsyncError, Transport};
use reqwest::Url;
use tracing::debug;

/// Fetches manifest and plugin text over HTTP(S).
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport whose requests fail after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, PlugsyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("plugsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| transport_error("failed to build HTTP client", e))?;
        Ok(Self { client })
    }
}

fn transport_error(message: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> PlugsyncError {
    PlugsyncError::Transport {
        message: message.into(),
        source: Some(Box::new(source)),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, PlugsyncError> {
        let parsed = if query.is_empty() {
            Url::parse(url)
        } else {
            Url::parse_with_params(url, query.iter().copied())
        }
        .map_err(|e| transport_error(format!("invalid URL {url}"), e))?;

        debug!(url = %parsed, "GET");
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| transport_error(format!("request to {url} failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlugsyncError::Transport {
                message: format!("{url} returned HTTP {status}"),
                source: None,
            });
        }

        response
            .text()
            .await
            .map_err(|e| transport_error(format!("failed to read body from {url}"), e))
    }
}
