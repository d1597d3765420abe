// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File naming conventions for plugin sources and legacy compiled artifacts.

use plugsync_core::PluginKey;

/// Maps plugin file names to normalized plugin names and back.
///
/// Legacy compiled artifacts are named `<Name>_<tag>.<compiled>`; sources are
/// `<Name>.<source>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginNaming {
    source_extension: String,
    compiled_extension: String,
}

impl PluginNaming {
    /// Extensions are given without the leading dot.
    pub fn new(source_extension: impl Into<String>, compiled_extension: impl Into<String>) -> Self {
        Self {
            source_extension: source_extension.into(),
            compiled_extension: compiled_extension.into(),
        }
    }

    pub fn source_extension(&self) -> &str {
        &self.source_extension
    }

    pub fn compiled_extension(&self) -> &str {
        &self.compiled_extension
    }

    /// Normalized plugin name for a manifest file name.
    ///
    /// `Foo_25.pyc` and `Foo.py` both normalize to `Foo`. A name with neither
    /// suffix is returned unchanged.
    pub fn normalize(&self, file_name: &str) -> String {
        if let Some(stem) = strip_dotted_suffix(file_name, &self.compiled_extension) {
            return match stem.find('_') {
                Some(idx) => stem[..idx].to_string(),
                None => stem.to_string(),
            };
        }
        strip_dotted_suffix(file_name, &self.source_extension)
            .unwrap_or(file_name)
            .to_string()
    }

    /// Plugin key for a manifest `(type, name)` pair.
    pub fn key_for(&self, kind: &str, file_name: &str) -> PluginKey {
        PluginKey::new(kind, self.normalize(file_name))
    }

    /// `Foo` -> `Foo.py`
    pub fn source_file(&self, name: &str) -> String {
        format!("{name}.{}", self.source_extension)
    }

    /// `Foo` -> `Foo.pyc`
    pub fn compiled_file(&self, name: &str) -> String {
        format!("{name}.{}", self.compiled_extension)
    }
}

/// Drops everything from the last dot on; used for blacklist names.
pub fn strip_extension(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
}

fn strip_dotted_suffix<'a>(file_name: &'a str, extension: &str) -> Option<&'a str> {
    file_name
        .strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
}
