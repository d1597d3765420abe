// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the update engine and its collaborators.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identity of a plugin: its kind (the directory it lives under) and its
/// normalized name (file name without extension).
///
/// Ordering is `(kind, name)`, which is the processing order of an update
/// cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PluginKey {
    pub kind: String,
    pub name: String,
}

impl PluginKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.name)
    }
}

/// Outcome of one update cycle.
///
/// The numeric codes are part of the external contract and are used as the
/// exit status of `plugsync check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum CycleResult {
    /// Nothing changed on disk.
    NoUpdate = 0,
    /// Plugins were updated and hot-reloaded.
    PluginsUpdated = 1,
    /// Plugins were updated but at least one needs a full restart.
    PluginsUpdatedRestartRequired = 2,
    /// A new application version was announced; nothing was applied.
    AppUpdateAvailable = 3,
}

impl CycleResult {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn requires_restart(self) -> bool {
        self == CycleResult::PluginsUpdatedRestartRequired
    }
}

/// Per-plugin decision made against the installed registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    /// No installed counterpart exists.
    New,
    /// The manifest version is strictly greater than the installed one.
    Upgrade { installed: String },
    /// Installed version is equal or newer.
    Skip,
}

/// What the host reports after being asked to hot-reload a set of plugins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Every requested plugin was swapped in place.
    Reloaded,
    /// Some plugins could not be swapped (e.g. an instance is in use).
    RestartRequired {
        keys: Vec<PluginKey>,
        reason: String,
    },
}

impl ReloadOutcome {
    pub fn is_reloaded(&self) -> bool {
        matches!(self, ReloadOutcome::Reloaded)
    }
}

/// Domain events announced to the host's event dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Plugins written to disk during an update cycle.
    PluginsUpdated(Vec<PluginKey>),
}

impl HostEvent {
    /// Name under which the host dispatches the event.
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::PluginsUpdated(_) => "plugin_updated",
        }
    }
}

/// One plugin module currently loaded by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    /// Dotted qualified name, e.g. `plugins.hoster.Foo`.
    pub qualified_name: String,
    /// File the module was loaded from.
    pub file: PathBuf,
}
