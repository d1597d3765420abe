// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for plugsync.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::path::PathBuf;
use std::time::Duration;

use plugsync_core::PluginKey;
use serde::{Deserialize, Serialize};

/// Top-level plugsync configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlugsyncConfig {
    /// Process-level settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Update check and restart policy.
    #[serde(default)]
    pub update: UpdateConfig,

    /// Plugin tree layout and naming conventions.
    #[serde(default)]
    pub plugins: PluginsConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Development mode. Enables plugin auto-reload on file change.
    #[serde(default)]
    pub debug: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            debug: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Update check and restart policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateConfig {
    /// Manifest server. `None` disables remote checks.
    #[serde(default)]
    pub server_url: Option<String>,

    /// Hours between periodic checks.
    #[serde(default = "default_check_interval_hours")]
    pub check_interval_hours: u64,

    /// Lower bound applied to `check_interval_hours`.
    #[serde(default = "default_min_check_interval_hours")]
    pub min_check_interval_hours: u64,

    /// Seconds between scheduler ticks.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,

    /// Restart automatically when updated plugins cannot be hot-reloaded.
    #[serde(default = "default_true")]
    pub auto_restart: bool,

    /// Run a check as soon as the updater is activated.
    #[serde(default = "default_true")]
    pub check_on_start: bool,

    /// Run checks periodically.
    #[serde(default = "default_true")]
    pub check_periodically: bool,

    /// In debug mode, reload plugins whose files changed on disk.
    #[serde(default = "default_true")]
    pub reload_plugins_in_debug: bool,

    /// In debug mode, never apply remote updates.
    #[serde(default)]
    pub skip_update_in_debug: bool,

    /// Per-request timeout for manifest and plugin downloads.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            check_interval_hours: default_check_interval_hours(),
            min_check_interval_hours: default_min_check_interval_hours(),
            tick_secs: default_tick_secs(),
            auto_restart: true,
            check_on_start: true,
            check_periodically: true,
            reload_plugins_in_debug: true,
            skip_update_in_debug: false,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl UpdateConfig {
    /// Effective time between periodic checks, never below the minimum.
    pub fn check_interval(&self) -> Duration {
        let hours = self.check_interval_hours.max(self.min_check_interval_hours);
        Duration::from_secs(hours.saturating_mul(60 * 60))
    }

    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_check_interval_hours() -> u64 {
    8
}

fn default_min_check_interval_hours() -> u64 {
    3
}

fn default_tick_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Plugin tree layout and naming conventions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Writable tree that downloads land in; searched first.
    #[serde(default = "default_override_root")]
    pub override_root: String,

    /// Tree shipped with the host.
    #[serde(default = "default_bundled_root")]
    pub bundled_root: String,

    /// Extension of plugin source files.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Extension of legacy compiled artifacts.
    #[serde(default = "default_compiled_extension")]
    pub compiled_extension: String,

    /// Kinds whose plugins run as live components and must be deactivated
    /// before removal.
    #[serde(default = "default_activatable_kinds")]
    pub activatable_kinds: Vec<String>,

    /// Module namespaces that hold plugin modules.
    #[serde(default = "default_namespaces")]
    pub namespaces: Vec<String>,

    /// Kind of the updater's own plugin.
    #[serde(default = "default_self_kind")]
    pub self_kind: String,

    /// Name of the updater's own plugin. Never blacklisted or removed.
    #[serde(default = "default_self_name")]
    pub self_name: String,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            override_root: default_override_root(),
            bundled_root: default_bundled_root(),
            source_extension: default_source_extension(),
            compiled_extension: default_compiled_extension(),
            activatable_kinds: default_activatable_kinds(),
            namespaces: default_namespaces(),
            self_kind: default_self_kind(),
            self_name: default_self_name(),
        }
    }
}

impl PluginsConfig {
    pub fn self_key(&self) -> PluginKey {
        PluginKey::new(&self.self_kind, &self.self_name)
    }

    pub fn override_root(&self) -> PathBuf {
        PathBuf::from(&self.override_root)
    }

    pub fn bundled_root(&self) -> PathBuf {
        PathBuf::from(&self.bundled_root)
    }
}

fn default_override_root() -> String {
    dirs::data_dir()
        .map(|p| p.join("plugsync").join("userplugins"))
        .unwrap_or_else(|| PathBuf::from("userplugins"))
        .to_string_lossy()
        .to_string()
}

fn default_bundled_root() -> String {
    "plugins".to_string()
}

fn default_source_extension() -> String {
    "py".to_string()
}

fn default_compiled_extension() -> String {
    "pyc".to_string()
}

fn default_activatable_kinds() -> Vec<String> {
    vec!["addon".to_string()]
}

fn default_namespaces() -> Vec<String> {
    vec!["plugins".to_string(), "userplugins".to_string()]
}

fn default_self_kind() -> String {
    "addon".to_string()
}

fn default_self_name() -> String {
    "UpdateManager".to_string()
}
