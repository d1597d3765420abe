// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport serving canned bodies.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use plugsync_core::{PlugsyncError, Transport};

/// A request observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

/// Transport double keyed by URL, ignoring the query string.
///
/// Requests for URLs without a registered body fail with a transport error,
/// as an unreachable server would.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url: &str, body: impl Into<String>) -> Self {
        self.set_response(url, body);
        self
    }

    /// Replaces the body served for `url` from now on.
    pub fn set_response(&self, url: &str, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(url.to_string(), body.into());
    }

    /// Registers a manifest as newline-joined lines.
    pub fn with_manifest(self, url: &str, lines: &[&str]) -> Self {
        self.with_response(url, lines.join("\n"))
    }

    /// Every request made so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, PlugsyncError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedRequest {
                url: url.to_string(),
                query: query
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });

        let body = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(url)
            .cloned();
        match body {
            Some(body) => Ok(body),
            None => {
                tracing::debug!(url, "mock transport has no response registered");
                Err(PlugsyncError::Transport {
                    message: format!("no route to {url}"),
                    source: None,
                })
            }
        }
    }
}
