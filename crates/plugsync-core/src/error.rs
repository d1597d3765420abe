// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for plugsync.
//!
//! Every variant is recoverable from the host's point of view: the update
//! engine logs it and abandons only the operation that produced it.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::PluginKey;

/// The primary error type used across plugsync crates.
#[derive(Debug, Error)]
pub enum PlugsyncError {
    /// Configuration errors (invalid values, missing roots).
    #[error("configuration error: {0}")]
    Config(String),

    /// The manifest server or a plugin download was unreachable.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A manifest record did not match the declared schema.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// Downloaded content does not declare the version the manifest promised.
    #[error(
        "integrity check failed for {key}: expected version {expected}, found {}",
        .found.as_deref().unwrap_or("no version marker")
    )]
    Integrity {
        key: PluginKey,
        expected: String,
        found: Option<String>,
    },

    /// Writing or deleting a plugin file failed.
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The host rejected a capability call (deactivate, restart).
    #[error("host error: {0}")]
    Host(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
