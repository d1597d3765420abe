// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host capability surface consumed by the updater.

use async_trait::async_trait;

use crate::error::PlugsyncError;
use crate::types::{HostEvent, PluginKey, ReloadOutcome};

/// Narrow set of operations the updater may ask of the running host.
///
/// Implementations must tolerate being called from a background task.
#[async_trait]
pub trait HostControl: Send + Sync + 'static {
    /// Version string of the running host, sent with the manifest request.
    fn host_version(&self) -> String;

    /// Whether the host runs in its debug/development mode.
    fn debug_mode(&self) -> bool;

    /// Stops accepting new jobs. Running jobs continue.
    async fn pause_intake(&self);

    /// Resumes accepting new jobs.
    async fn unpause_intake(&self);

    /// Returns true while any job is in flight.
    async fn has_active_jobs(&self) -> bool;

    /// Performs a full process restart.
    async fn restart(&self) -> Result<(), PlugsyncError>;

    /// Deactivates the live instance of a running component plugin.
    async fn deactivate(&self, name: &str) -> Result<(), PlugsyncError>;

    /// Re-imports the given plugins without restarting the process.
    async fn reload_plugins(&self, keys: &[PluginKey]) -> ReloadOutcome;

    /// Announces a domain event to the host's listeners.
    async fn dispatch_event(&self, event: HostEvent);
}
