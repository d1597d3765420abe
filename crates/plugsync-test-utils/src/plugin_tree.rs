// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary on-disk plugin roots.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// An override root and a bundled root under one temporary directory.
/// Both are removed when the fixture is dropped.
pub struct PluginTree {
    dir: TempDir,
}

impl PluginTree {
    /// Creates empty `userplugins/` and `plugins/` roots.
    ///
    /// Panics if the temporary directory cannot be created.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("userplugins")).expect("failed to create override root");
        std::fs::create_dir_all(dir.path().join("plugins")).expect("failed to create bundled root");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn override_root(&self) -> PathBuf {
        self.dir.path().join("userplugins")
    }

    pub fn bundled_root(&self) -> PathBuf {
        self.dir.path().join("plugins")
    }

    /// Writes `<override>/<kind>/<file>` and returns its path.
    pub fn write_override(&self, kind: &str, file: &str, content: &str) -> PathBuf {
        write_under(&self.override_root(), kind, file, content)
    }

    /// Writes `<bundled>/<kind>/<file>` and returns its path.
    pub fn write_bundled(&self, kind: &str, file: &str, content: &str) -> PathBuf {
        write_under(&self.bundled_root(), kind, file, content)
    }

    /// Contents of `<override>/<kind>/<file>`, if present.
    pub fn read_override(&self, kind: &str, file: &str) -> Option<String> {
        std::fs::read_to_string(self.override_root().join(kind).join(file)).ok()
    }
}

impl Default for PluginTree {
    fn default() -> Self {
        Self::new()
    }
}

fn write_under(root: &Path, kind: &str, file: &str, content: &str) -> PathBuf {
    let dir = root.join(kind);
    std::fs::create_dir_all(&dir).expect("failed to create kind directory");
    let path = dir.join(file);
    std::fs::write(&path, content).expect("failed to write plugin file");
    path
}
