// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock plugin registry built from a fixed description.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use plugsync_core::{LoadedModule, PluginKey, PluginRegistry};

/// Registry double. Kinds of installed plugins are known automatically.
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    installed: HashMap<PluginKey, String>,
    kinds: BTreeSet<String>,
    modules: Vec<LoadedModule>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_installed(mut self, kind: &str, name: &str, version: &str) -> Self {
        self.kinds.insert(kind.to_string());
        self.installed
            .insert(PluginKey::new(kind, name), version.to_string());
        self
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kinds.insert(kind.to_string());
        self
    }

    pub fn with_loaded_module(mut self, qualified_name: &str, file: &Path) -> Self {
        self.modules.push(LoadedModule {
            qualified_name: qualified_name.to_string(),
            file: file.to_path_buf(),
        });
        self
    }
}

impl PluginRegistry for MockRegistry {
    fn installed_version(&self, key: &PluginKey) -> Option<String> {
        self.installed.get(key).cloned()
    }

    fn is_known_kind(&self, kind: &str) -> bool {
        self.kinds.contains(kind)
    }

    fn loaded_modules(&self) -> Vec<LoadedModule> {
        self.modules.clone()
    }
}
