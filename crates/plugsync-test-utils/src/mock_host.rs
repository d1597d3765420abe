// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock host that records the updater's requests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use plugsync_core::{HostControl, HostEvent, PlugsyncError, PluginKey, ReloadOutcome};

/// A host double with scripted answers and a call log.
///
/// Recorded state is exposed through synchronous accessors so assertions do
/// not need an executor.
pub struct MockHost {
    version: String,
    debug: bool,
    paused: AtomicBool,
    pause_calls: AtomicUsize,
    unpause_calls: AtomicUsize,
    active_jobs: AtomicBool,
    restarts: AtomicUsize,
    fail_deactivate: bool,
    reload_outcome: Mutex<ReloadOutcome>,
    deactivated: Mutex<Vec<String>>,
    reloads: Mutex<Vec<Vec<PluginKey>>>,
    events: Mutex<Vec<HostEvent>>,
}

impl MockHost {
    /// A host at version `0.4.10`, not in debug mode, with no active jobs,
    /// whose reloads always succeed.
    pub fn new() -> Self {
        Self {
            version: "0.4.10".to_string(),
            debug: false,
            paused: AtomicBool::new(false),
            pause_calls: AtomicUsize::new(0),
            unpause_calls: AtomicUsize::new(0),
            active_jobs: AtomicBool::new(false),
            restarts: AtomicUsize::new(0),
            fail_deactivate: false,
            reload_outcome: Mutex::new(ReloadOutcome::Reloaded),
            deactivated: Mutex::new(Vec::new()),
            reloads: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_active_jobs(self, active: bool) -> Self {
        self.active_jobs.store(active, Ordering::SeqCst);
        self
    }

    pub fn with_reload_outcome(self, outcome: ReloadOutcome) -> Self {
        *lock(&self.reload_outcome) = outcome;
        self
    }

    /// Every `deactivate` call fails with a host error.
    pub fn failing_deactivate(mut self) -> Self {
        self.fail_deactivate = true;
        self
    }

    /// Flips the active-jobs flag of a shared host.
    pub fn set_active_jobs(&self, active: bool) {
        self.active_jobs.store(active, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn pause_calls(&self) -> usize {
        self.pause_calls.load(Ordering::SeqCst)
    }

    pub fn unpause_calls(&self) -> usize {
        self.unpause_calls.load(Ordering::SeqCst)
    }

    pub fn restart_count(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }

    pub fn deactivated(&self) -> Vec<String> {
        lock(&self.deactivated).clone()
    }

    /// Key sets passed to `reload_plugins`, in call order.
    pub fn reload_requests(&self) -> Vec<Vec<PluginKey>> {
        lock(&self.reloads).clone()
    }

    pub fn events(&self) -> Vec<HostEvent> {
        lock(&self.events).clone()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl HostControl for MockHost {
    fn host_version(&self) -> String {
        self.version.clone()
    }

    fn debug_mode(&self) -> bool {
        self.debug
    }

    async fn pause_intake(&self) {
        self.pause_calls.fetch_add(1, Ordering::SeqCst);
        self.paused.store(true, Ordering::SeqCst);
    }

    async fn unpause_intake(&self) {
        self.unpause_calls.fetch_add(1, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
    }

    async fn has_active_jobs(&self) -> bool {
        self.active_jobs.load(Ordering::SeqCst)
    }

    async fn restart(&self) -> Result<(), PlugsyncError> {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn deactivate(&self, name: &str) -> Result<(), PlugsyncError> {
        lock(&self.deactivated).push(name.to_string());
        if self.fail_deactivate {
            return Err(PlugsyncError::Host(format!("{name} is not running")));
        }
        Ok(())
    }

    async fn reload_plugins(&self, keys: &[PluginKey]) -> ReloadOutcome {
        lock(&self.reloads).push(keys.to_vec());
        lock(&self.reload_outcome).clone()
    }

    async fn dispatch_event(&self, event: HostEvent) {
        lock(&self.events).push(event);
    }
}
