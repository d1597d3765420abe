// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Development-mode auto-reload of plugin sources edited on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use plugsync_core::{HostControl, LoadedModule, PluginKey, PluginRegistry, ReloadOutcome};
use tracing::{debug, info, warn};

use crate::naming::PluginNaming;

/// Last observed modification time per plugin.
#[derive(Debug, Default)]
pub struct ModificationClock {
    seen: HashMap<PluginKey, SystemTime>,
}

impl ModificationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `mtime` for `key`. Returns true only when a previous
    /// observation exists and `mtime` is strictly newer; a first sighting
    /// only seeds the clock.
    pub fn observe(&mut self, key: &PluginKey, mtime: SystemTime) -> bool {
        match self.seen.get_mut(key) {
            None => {
                self.seen.insert(key.clone(), mtime);
                false
            }
            Some(prev) if *prev < mtime => {
                *prev = mtime;
                true
            }
            Some(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Watches loaded plugin modules and asks the host to reload those whose
/// source changed since the previous scan.
#[derive(Debug)]
pub struct AutoReloadWatcher {
    namespaces: Vec<String>,
    naming: PluginNaming,
    clock: ModificationClock,
}

impl AutoReloadWatcher {
    pub fn new(namespaces: Vec<String>, naming: PluginNaming) -> Self {
        Self {
            namespaces,
            naming,
            clock: ModificationClock::new(),
        }
    }

    /// Plugins whose source file is newer than at the previous scan.
    pub fn collect_changes(&mut self, registry: &dyn PluginRegistry) -> Vec<PluginKey> {
        let mut changed = Vec::new();

        for module in registry.loaded_modules() {
            let Some(key) = self.plugin_key(&module) else {
                continue;
            };
            if !registry.is_known_kind(&key.kind) {
                continue;
            }

            let source = self.source_path(&module.file);
            let mtime = match std::fs::metadata(&source).and_then(|m| {
                if m.is_file() {
                    m.modified()
                } else {
                    Err(std::io::Error::other("not a regular file"))
                }
            }) {
                Ok(mtime) => mtime,
                Err(e) => {
                    debug!(module = %module.qualified_name, error = %e, "skipping module without source file");
                    continue;
                }
            };

            if self.clock.observe(&key, mtime) {
                changed.push(key);
            }
        }

        changed.sort();
        changed.dedup();
        changed
    }

    /// Runs one scan and reloads any changed plugins. Returns true only if a
    /// reload was requested and succeeded.
    pub async fn scan(&mut self, registry: &dyn PluginRegistry, host: &dyn HostControl) -> bool {
        let changed = self.collect_changes(registry);
        if changed.is_empty() {
            return false;
        }

        info!(plugins = ?changed, "reloading modified plugins");
        match host.reload_plugins(&changed).await {
            ReloadOutcome::Reloaded => true,
            ReloadOutcome::RestartRequired { keys, reason } => {
                warn!(plugins = ?keys, reason = %reason, "modified plugins could not be reloaded");
                false
            }
        }
    }

    /// `(kind, name)` from a qualified name like `plugins.hoster.Foo`, when
    /// the module lives in a watched namespace.
    fn plugin_key(&self, module: &LoadedModule) -> Option<PluginKey> {
        let qualified = module.qualified_name.as_str();
        let in_namespace = self.namespaces.iter().any(|ns| {
            qualified
                .strip_prefix(ns.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
        });
        if !in_namespace || qualified.matches('.').count() < 2 {
            return None;
        }

        let mut parts = qualified.rsplitn(3, '.');
        let name = parts.next()?;
        let kind = parts.next()?;
        Some(PluginKey::new(kind, name))
    }

    /// Maps a compiled module path to its source file.
    fn source_path(&self, file: &Path) -> PathBuf {
        let compiled = self.naming.compiled_extension();
        match file.extension() {
            Some(ext) if ext == compiled => file.with_extension(self.naming.source_extension()),
            _ => file.to_path_buf(),
        }
    }
}
