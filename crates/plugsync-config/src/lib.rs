// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for plugsync.
//!
//! Settings come from compiled defaults, then `plugsync.toml` files
//! (system, user, working directory), then `PLUGSYNC_*` environment
//! variables. Unknown keys are rejected with a suggestion, and every value
//! is validated before the config is handed out.
//!
//! ```no_run
//! let config = plugsync_config::load_and_validate().expect("config errors");
//! println!("downloads go to {}", config.plugins.override_root);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::PlugsyncConfig;

/// Loads from the standard locations and validates.
pub fn load_and_validate() -> Result<PlugsyncConfig, Vec<ConfigError>> {
    checked(loader::load_config(), collect_toml_sources)
}

/// Loads an explicit file (plus environment overrides) and validates.
pub fn load_and_validate_path(path: &Path) -> Result<PlugsyncConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path.to_path_buf()).into_iter().collect()
    })
}

/// Loads a TOML string and validates.
pub fn load_and_validate_str(toml_content: &str) -> Result<PlugsyncConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validates a loaded config, or turns the figment error into diagnostics.
/// `sources` is only read on failure, to give spans to unknown keys.
fn checked(
    loaded: Result<PlugsyncConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<PlugsyncConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

fn read_source(path: PathBuf) -> Option<(String, String)> {
    let content = std::fs::read_to_string(&path).ok()?;
    Some((path.display().to_string(), content))
}

/// Every `plugsync.toml` the standard lookup would read, most specific
/// first.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join("plugsync.toml"))
        .unwrap_or_else(|_| PathBuf::from("plugsync.toml"));
    let user = dirs::config_dir().map(|d| d.join("plugsync").join("plugsync.toml"));
    let system = PathBuf::from("/etc/plugsync/plugsync.toml");

    std::iter::once(local)
        .chain(user)
        .chain(std::iter::once(system))
        .filter_map(read_source)
        .collect()
}
