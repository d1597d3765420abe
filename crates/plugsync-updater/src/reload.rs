// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hot-reload of the plugins written during a cycle.

use plugsync_core::{CycleResult, HostControl, HostEvent, PluginKey, ReloadOutcome};
use tracing::{info, warn};

/// Asks the host to reload exactly `updated` and announces the update.
///
/// An empty set is [`CycleResult::NoUpdate`] and makes no host call. A
/// reload the host could not complete downgrades the result to
/// [`CycleResult::PluginsUpdatedRestartRequired`].
pub async fn reload_updated(host: &dyn HostControl, updated: &[PluginKey]) -> CycleResult {
    if updated.is_empty() {
        info!("no plugin updates available");
        return CycleResult::NoUpdate;
    }

    let outcome = host.reload_plugins(updated).await;
    let result = match outcome {
        ReloadOutcome::Reloaded => {
            info!(count = updated.len(), "updated plugins reloaded");
            CycleResult::PluginsUpdated
        }
        ReloadOutcome::RestartRequired { keys, reason } => {
            warn!(
                plugins = ?keys,
                reason = %reason,
                "restart required to reload the updated plugins"
            );
            CycleResult::PluginsUpdatedRestartRequired
        }
    };

    host.dispatch_event(HostEvent::PluginsUpdated(updated.to_vec()))
        .await;
    result
}
