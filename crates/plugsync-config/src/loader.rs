// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports `./plugsync.toml` > `~/.config/plugsync/plugsync.toml` >
//! `/etc/plugsync/plugsync.toml`, with `PLUGSYNC_` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PlugsyncConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/plugsync/plugsync.toml`
/// 3. `~/.config/plugsync/plugsync.toml`
/// 4. `./plugsync.toml`
/// 5. `PLUGSYNC_*` environment variables
pub fn load_config() -> Result<PlugsyncConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PlugsyncConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlugsyncConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PlugsyncConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlugsyncConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PlugsyncConfig::default()))
        .merge(Toml::file("/etc/plugsync/plugsync.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("plugsync/plugsync.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("plugsync.toml"))
        .merge(env_provider())
}

/// Environment provider mapping the section prefix of a variable to a dot.
///
/// `Env::split("_")` would turn `PLUGSYNC_UPDATE_SERVER_URL` into
/// `update.server.url`; only the first underscore after a known section
/// name becomes a separator, so `update.reload_plugins_in_debug` survives.
fn env_provider() -> Env {
    Env::prefixed("PLUGSYNC_").map(|key| {
        let key_str = key.as_str();
        for section in SECTIONS {
            if let Some(rest) = key_str
                .strip_prefix(section)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}

/// Top-level config sections addressable from the environment.
const SECTIONS: [&str; 3] = ["agent", "update", "plugins"];
