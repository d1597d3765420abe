// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host used when plugsync runs as its own process.
//!
//! There are no jobs and no live plugin instances, so reloading means
//! re-indexing the plugin trees and a restart has nothing to restart.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use plugsync_core::{HostControl, HostEvent, PlugsyncError, PluginKey, ReloadOutcome};
use tracing::{debug, info};

use crate::registry::FsRegistry;

pub struct StandaloneHost {
    registry: Arc<FsRegistry>,
    debug: bool,
    paused: AtomicBool,
}

impl StandaloneHost {
    pub fn new(registry: Arc<FsRegistry>, debug: bool) -> Self {
        Self {
            registry,
            debug,
            paused: AtomicBool::new(false),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    async fn reindex(&self) -> Result<usize, PlugsyncError> {
        let registry = Arc::clone(&self.registry);
        tokio::task::spawn_blocking(move || registry.reindex())
            .await
            .map_err(|e| PlugsyncError::Internal(format!("reindex task failed: {e}")))
    }
}

#[async_trait]
impl HostControl for StandaloneHost {
    fn host_version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn debug_mode(&self) -> bool {
        self.debug
    }

    async fn pause_intake(&self) {
        self.paused.store(true, Ordering::SeqCst);
        debug!("intake paused");
    }

    async fn unpause_intake(&self) {
        self.paused.store(false, Ordering::SeqCst);
        debug!("intake resumed");
    }

    async fn has_active_jobs(&self) -> bool {
        false
    }

    async fn restart(&self) -> Result<(), PlugsyncError> {
        info!("restart requested, re-indexing plugins");
        self.reindex().await?;
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn deactivate(&self, name: &str) -> Result<(), PlugsyncError> {
        debug!(name, "no live instance to deactivate");
        Ok(())
    }

    async fn reload_plugins(&self, keys: &[PluginKey]) -> ReloadOutcome {
        match self.reindex().await {
            Ok(count) => {
                debug!(reloaded = keys.len(), indexed = count, "plugins re-indexed");
                ReloadOutcome::Reloaded
            }
            Err(e) => ReloadOutcome::RestartRequired {
                keys: keys.to_vec(),
                reason: e.to_string(),
            },
        }
    }

    async fn dispatch_event(&self, event: HostEvent) {
        match &event {
            HostEvent::PluginsUpdated(keys) => {
                info!(event = event.name(), plugins = ?keys, "event dispatched");
            }
        }
    }
}
