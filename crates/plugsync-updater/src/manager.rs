// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The update manager: cycle orchestration, restart decisions and periodic
//! scheduling.
//!
//! All mutable state sits in one [`UpdateState`] behind a tokio mutex, and a
//! separate cycle lock keeps two update cycles from interleaving. Cycles run
//! on a background task (see [`UpdateManager::spawn_check`]) or inside the
//! periodic loop, never on a caller's request path.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use plugsync_config::model::PlugsyncConfig;
use plugsync_core::{CycleResult, HostControl, PluginKey, PluginRegistry, Transport};
use plugsync_plugin::{
    parse_manifest_text, plan_updates, resolve_blacklist, AutoReloadWatcher, ParsedManifest,
    PluginDownloader, PluginNaming, PluginRemover, UpdateManifest,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::reload::reload_updated;

/// Mutable state shared by cycles, the watcher and the restart logic.
struct UpdateState {
    last_check: Option<DateTime<Utc>>,
    /// Set once any cycle ended with a reload the host could not complete.
    restart_required: bool,
    /// A restart is owed once running jobs finish.
    deferred_restart: bool,
    /// Application version announced by the last manifest, if newer.
    app_version: Option<String>,
    watcher: AutoReloadWatcher,
}

/// Point-in-time view of the update state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateInfo {
    pub app_update_available: bool,
    pub app_version: Option<String>,
    pub restart_required: bool,
    pub last_check: Option<DateTime<Utc>>,
}

/// Runs update cycles against a host.
pub struct UpdateManager {
    config: PlugsyncConfig,
    host: Arc<dyn HostControl>,
    registry: Arc<dyn PluginRegistry>,
    transport: Arc<dyn Transport>,
    naming: PluginNaming,
    downloader: PluginDownloader,
    remover: PluginRemover,
    started_at: DateTime<Utc>,
    state: Mutex<UpdateState>,
    cycle_lock: Mutex<()>,
}

impl UpdateManager {
    pub fn new(
        config: PlugsyncConfig,
        host: Arc<dyn HostControl>,
        registry: Arc<dyn PluginRegistry>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let plugins = &config.plugins;
        let naming = PluginNaming::new(&plugins.source_extension, &plugins.compiled_extension);
        let downloader = PluginDownloader::new(Arc::clone(&transport), plugins.override_root());
        let remover = PluginRemover::new(
            plugins.override_root(),
            plugins.bundled_root(),
            naming.clone(),
            plugins.activatable_kinds.clone(),
            plugins.self_key(),
        );
        let watcher = AutoReloadWatcher::new(plugins.namespaces.clone(), naming.clone());

        Self {
            config,
            host,
            registry,
            transport,
            naming,
            downloader,
            remover,
            started_at: Utc::now(),
            state: Mutex::new(UpdateState {
                last_check: None,
                restart_required: false,
                deferred_restart: false,
                app_version: None,
                watcher,
            }),
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PlugsyncConfig {
        &self.config
    }

    /// Runs the startup check when `check_on_start` is enabled.
    pub async fn activate(&self) -> Option<CycleResult> {
        if !self.config.update.check_on_start {
            return None;
        }
        Some(self.check_for_updates().await)
    }

    /// Starts a cycle on a background task.
    pub fn spawn_check(self: &Arc<Self>) -> JoinHandle<CycleResult> {
        let manager = Arc::clone(self);
        tokio::spawn(async move { manager.check_for_updates().await })
    }

    /// Runs one full update cycle with job intake paused, then decides
    /// between resuming intake, restarting now, or deferring the restart.
    pub async fn check_for_updates(&self) -> CycleResult {
        let _cycle = self.cycle_lock.lock().await;

        self.host.pause_intake().await;
        let result = self.run_cycle().await;
        info!(result = %result, code = result.code(), "update cycle finished");

        if result.requires_restart() {
            self.state.lock().await.restart_required = true;

            if self.config.update.auto_restart {
                if self.host.has_active_jobs().await {
                    self.state.lock().await.deferred_restart = true;
                    warn!("jobs are active, will restart once they are done");
                } else {
                    self.restart().await;
                }
                return result;
            }
            warn!("restart the host to use the updated plugins");
        }

        if self.state.lock().await.deferred_restart {
            debug!("restart still owed, job intake stays paused");
            return result;
        }
        self.host.unpause_intake().await;
        result
    }

    /// Performs a deferred restart. Called by the host when its last running
    /// job finishes; returns whether a restart was owed.
    pub async fn on_all_jobs_finished(&self) -> bool {
        let owed = std::mem::take(&mut self.state.lock().await.deferred_restart);
        if !owed {
            return false;
        }
        warn!("jobs are done, restarting to reload the updated plugins");
        self.restart().await;
        true
    }

    /// One scheduler tick. Returns the cycle result if a check ran.
    pub async fn tick(&self) -> Option<CycleResult> {
        let update = &self.config.update;
        if self.host.debug_mode() {
            if update.reload_plugins_in_debug {
                self.autoreload_plugins().await;
            }
            if update.skip_update_in_debug {
                return None;
            }
        }

        if update.check_periodically && self.check_due(Utc::now()).await {
            return Some(self.check_for_updates().await);
        }
        None
    }

    /// Ticks every `tick_secs` until `token` is cancelled. A cycle already in
    /// progress is allowed to finish.
    pub async fn run_periodic(&self, token: CancellationToken) {
        let period = self.config.update.tick().max(std::time::Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(tick_secs = self.config.update.tick_secs, "periodic update loop started");
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("periodic update loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    pub async fn info(&self) -> UpdateInfo {
        let state = self.state.lock().await;
        UpdateInfo {
            app_update_available: state.app_version.is_some(),
            app_version: state.app_version.clone(),
            restart_required: state.restart_required,
            last_check: state.last_check,
        }
    }

    /// Deletes plugins from every plugin root. Returns those actually
    /// removed.
    pub async fn remove_plugins(&self, keys: &[PluginKey]) -> BTreeSet<PluginKey> {
        let mut sorted = keys.to_vec();
        sorted.sort();
        sorted.dedup();

        let removed = self.remover.remove(self.host.as_ref(), &sorted).await;
        for key in &removed {
            info!(kind = %key.kind, name = %key.name, "removed plugin");
        }
        removed
    }

    /// Reloads plugins whose source changed on disk since the last scan.
    pub async fn autoreload_plugins(&self) -> bool {
        let mut state = self.state.lock().await;
        state
            .watcher
            .scan(self.registry.as_ref(), self.host.as_ref())
            .await
    }

    async fn check_due(&self, now: DateTime<Utc>) -> bool {
        let last = self.state.lock().await.last_check.unwrap_or(self.started_at);
        match (now - last).to_std() {
            Ok(elapsed) => elapsed > self.config.update.check_interval(),
            Err(_) => false,
        }
    }

    async fn restart(&self) {
        if let Err(e) = self.host.restart().await {
            error!(error = %e, "restart failed, resuming job intake");
            self.host.unpause_intake().await;
        }
    }

    async fn run_cycle(&self) -> CycleResult {
        let Some(server_url) = self.config.update.server_url.as_deref() else {
            debug!("no update server configured, skipping check");
            return CycleResult::NoUpdate;
        };

        let host_version = self.host.host_version();
        let fetched = self
            .transport
            .fetch_text(server_url, &[("v", host_version.as_str())])
            .await;
        self.state.lock().await.last_check = Some(Utc::now());

        let text = match fetched {
            Ok(text) => text,
            Err(e) => {
                warn!(url = server_url, error = %e, "unable to reach the update server");
                return CycleResult::NoUpdate;
            }
        };

        let manifest = match parse_manifest_text(&text) {
            Ok(manifest) => manifest,
            Err(e) => {
                error!(error = %e, "invalid update manifest");
                return CycleResult::NoUpdate;
            }
        };

        match manifest {
            ParsedManifest::Empty => {
                debug!("update server returned nothing");
                CycleResult::NoUpdate
            }
            ParsedManifest::AppUpdateAvailable { version } => {
                info!(version = %version, current = %host_version, "new application version available");
                self.state.lock().await.app_version = Some(version);
                CycleResult::AppUpdateAvailable
            }
            ParsedManifest::Plugins(manifest) => {
                info!("no new application version available");
                self.state.lock().await.app_version = None;
                self.update_plugins(manifest).await
            }
        }
    }

    async fn update_plugins(&self, manifest: UpdateManifest) -> CycleResult {
        for rejected in &manifest.rejected {
            warn!(line = ?rejected.line(), error = %rejected, "skipping malformed manifest record");
        }

        let UpdateManifest {
            url_template,
            records,
            blacklist,
            ..
        } = manifest;

        let resolution = resolve_blacklist(
            records,
            &blacklist,
            &self.config.plugins.self_key(),
            &self.naming,
        );
        if !resolution.removals.is_empty() {
            let removed = self
                .remover
                .remove(self.host.as_ref(), &resolution.removals)
                .await;
            for key in &removed {
                info!(kind = %key.kind, name = %key.name, "removed blacklisted plugin");
            }
        }

        let plan = plan_updates(resolution.retained, self.registry.as_ref(), &self.naming);
        let report = self.downloader.download_all(&plan, &url_template).await;
        if !report.updated.is_empty() {
            info!(count = report.updated.len(), "plugins updated");
        }

        reload_updated(self.host.as_ref(), &report.updated).await
    }
}
