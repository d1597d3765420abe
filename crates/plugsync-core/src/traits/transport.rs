// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound text transport for manifest and plugin downloads.

use async_trait::async_trait;

use crate::error::PlugsyncError;

/// Fetches text documents over the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET of `url` with the given query pairs and returns the body.
    ///
    /// Unreachable servers and non-success statuses are
    /// [`PlugsyncError::Transport`].
    async fn fetch_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, PlugsyncError>;
}
