// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Installed-plugin index built by scanning the plugin roots.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use plugsync_config::model::PluginsConfig;
use plugsync_core::{LoadedModule, PluginKey, PluginRegistry};
use plugsync_plugin::download::extract_version_marker;
use plugsync_plugin::PluginNaming;
use serde::Serialize;
use tracing::{debug, warn};

/// Module namespace of plugins under the bundled root.
pub const BUNDLED_NAMESPACE: &str = "plugins";
/// Module namespace of plugins under the override root.
pub const OVERRIDE_NAMESPACE: &str = "userplugins";

/// One plugin found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPlugin {
    /// Version from the file's version marker, if it has one.
    pub version: Option<String>,
    pub path: PathBuf,
    pub namespace: &'static str,
}

#[derive(Debug, Default)]
struct Index {
    plugins: BTreeMap<PluginKey, InstalledPlugin>,
    kinds: BTreeSet<String>,
}

/// Registry over the override and bundled trees. A plugin in the override
/// tree shadows the bundled one.
#[derive(Debug)]
pub struct FsRegistry {
    roots: Vec<(&'static str, PathBuf)>,
    naming: PluginNaming,
    index: RwLock<Index>,
}

impl FsRegistry {
    /// Creates the registry and performs the first scan.
    pub fn new(config: &PluginsConfig) -> Self {
        let registry = Self {
            roots: vec![
                (OVERRIDE_NAMESPACE, config.override_root()),
                (BUNDLED_NAMESPACE, config.bundled_root()),
            ],
            naming: PluginNaming::new(&config.source_extension, &config.compiled_extension),
            index: RwLock::new(Index::default()),
        };
        registry.reindex();
        registry
    }

    /// Rescans both roots. Returns the number of plugins found.
    pub fn reindex(&self) -> usize {
        let mut index = Index::default();
        for (namespace, root) in &self.roots {
            scan_root(*namespace, root, &self.naming, &mut index);
        }
        let count = index.plugins.len();
        debug!(count, "plugin index rebuilt");

        *self
            .index
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = index;
        count
    }

    /// Every indexed plugin, ordered by key.
    pub fn plugins(&self) -> Vec<(PluginKey, InstalledPlugin)> {
        self.read()
            .plugins
            .iter()
            .map(|(k, p)| (k.clone(), p.clone()))
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Index> {
        self.index.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn scan_root(namespace: &'static str, root: &Path, naming: &PluginNaming, index: &mut Index) {
    let kinds = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(root = %root.display(), error = %e, "plugin root not readable");
            return;
        }
    };

    for kind_dir in kinds.flatten() {
        let kind_path = kind_dir.path();
        if !kind_path.is_dir() {
            continue;
        }
        let Some(kind) = kind_dir.file_name().to_str().map(str::to_string) else {
            continue;
        };
        index.kinds.insert(kind.clone());

        let Ok(files) = std::fs::read_dir(&kind_path) else {
            continue;
        };
        for file in files.flatten() {
            let path = file.path();
            if path.extension().and_then(|e| e.to_str()) != Some(naming.source_extension()) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let key = naming.key_for(&kind, file_name);
            if index.plugins.contains_key(&key) {
                continue;
            }

            let version = match std::fs::read_to_string(&path) {
                Ok(content) => extract_version_marker(&content).map(str::to_string),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unable to read plugin");
                    None
                }
            };
            index.plugins.insert(
                key,
                InstalledPlugin {
                    version,
                    path,
                    namespace,
                },
            );
        }
    }
}

impl PluginRegistry for FsRegistry {
    fn installed_version(&self, key: &PluginKey) -> Option<String> {
        // Installed without a marker compares as the lowest version.
        self.read()
            .plugins
            .get(key)
            .map(|p| p.version.clone().unwrap_or_default())
    }

    fn is_known_kind(&self, kind: &str) -> bool {
        self.read().kinds.contains(kind)
    }

    fn loaded_modules(&self) -> Vec<LoadedModule> {
        self.read()
            .plugins
            .iter()
            .map(|(key, plugin)| LoadedModule {
                qualified_name: format!("{}.{}.{}", plugin.namespace, key.kind, key.name),
                file: plugin.path.clone(),
            })
            .collect()
    }
}
