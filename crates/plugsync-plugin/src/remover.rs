// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deletes plugin files from the override and bundled trees.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use plugsync_core::{HostControl, PluginKey};
use tracing::{debug, error};

use crate::naming::PluginNaming;

/// Removes plugin sources and legacy compiled artifacts.
#[derive(Debug, Clone)]
pub struct PluginRemover {
    /// Search roots, override first.
    roots: Vec<PathBuf>,
    naming: PluginNaming,
    activatable_kinds: Vec<String>,
    self_key: PluginKey,
}

impl PluginRemover {
    pub fn new(
        override_root: impl Into<PathBuf>,
        bundled_root: impl Into<PathBuf>,
        naming: PluginNaming,
        activatable_kinds: Vec<String>,
        self_key: PluginKey,
    ) -> Self {
        Self {
            roots: vec![override_root.into(), bundled_root.into()],
            naming,
            activatable_kinds,
            self_key,
        }
    }

    /// Deletes every given plugin and returns those that had at least one file
    /// deleted.
    ///
    /// Live instances of activatable kinds are deactivated first; a failed
    /// deactivation does not stop the removal.
    pub async fn remove(&self, host: &dyn HostControl, keys: &[PluginKey]) -> BTreeSet<PluginKey> {
        let mut removed = BTreeSet::new();
        if keys.is_empty() {
            return removed;
        }

        debug!(plugins = ?keys, "requested deletion of plugins");

        for key in keys {
            if *key == self.self_key {
                debug!(plugin = %key, "refusing to delete the updater itself");
                continue;
            }

            if self.activatable_kinds.iter().any(|k| *k == key.kind) {
                if let Err(e) = host.deactivate(&key.name).await {
                    debug!(plugin = %key, error = %e, "deactivation before removal failed");
                }
            }

            let candidates = self.candidate_files(key);
            let deleted = tokio::task::spawn_blocking(move || delete_existing(&candidates)).await;
            match deleted {
                Ok(true) => {
                    removed.insert(key.clone());
                }
                Ok(false) => {}
                Err(e) => error!(plugin = %key, error = %e, "removal task failed"),
            }
        }

        removed
    }

    /// Source and compiled file paths for `key` under every root, in search
    /// order.
    pub fn candidate_files(&self, key: &PluginKey) -> Vec<PathBuf> {
        let files = [
            self.naming.source_file(&key.name),
            self.naming.compiled_file(&key.name),
        ];
        self.roots
            .iter()
            .flat_map(|root| files.iter().map(move |f| root.join(&key.kind).join(f)))
            .collect()
    }
}

/// Deletes each path that exists with exactly that spelling. Returns true if
/// anything was deleted.
fn delete_existing(paths: &[PathBuf]) -> bool {
    let mut any = false;
    for path in paths {
        if !exists_case_sensitive(path) {
            continue;
        }
        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed plugin file");
                any = true;
            }
            Err(e) => error!(path = %path.display(), error = %e, "error removing plugin file"),
        }
    }
    any
}

/// `Path::exists`, but on case-insensitive filesystems `foo.py` does not
/// count as an existing `Foo.py`.
pub fn exists_case_sensitive(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        return false;
    };
    std::fs::read_dir(dir)
        .map(|entries| entries.flatten().any(|entry| entry.file_name() == name))
        .unwrap_or(false)
}
