// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of the host's plugin registry.

use crate::types::{LoadedModule, PluginKey};

/// Snapshot queries against the host-owned plugin registry.
///
/// The updater never mutates the registry; the host refreshes it after a
/// successful reload.
pub trait PluginRegistry: Send + Sync {
    /// Installed version string for a plugin, if it is installed.
    fn installed_version(&self, key: &PluginKey) -> Option<String>;

    /// Whether the host manages plugins of this kind.
    fn is_known_kind(&self, kind: &str) -> bool;

    /// Plugin modules currently loaded in the process.
    fn loaded_modules(&self) -> Vec<LoadedModule>;
}
