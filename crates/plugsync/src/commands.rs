// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.

use std::io::IsTerminal;

use plugsync_core::{CycleResult, PlugsyncError, PluginKey};
use plugsync_updater::{install_signal_handler, UpdateInfo, UpdateManager};
use serde::Serialize;
use tracing::info;

use crate::registry::FsRegistry;

/// Runs one update cycle. The result code doubles as the exit status.
pub async fn run_check(manager: &UpdateManager) -> CycleResult {
    let result = manager.check_for_updates().await;
    println!("{result}");
    result
}

/// Removes the named plugins of one kind from every plugin root.
pub async fn run_remove(manager: &UpdateManager, kind: &str, names: &[String]) -> usize {
    let keys: Vec<PluginKey> = names.iter().map(|n| PluginKey::new(kind, n)).collect();
    let removed = manager.remove_plugins(&keys).await;

    for key in &keys {
        if removed.contains(key) {
            println!("removed {key}");
        } else {
            println!("not found {key}");
        }
    }
    removed.len()
}

/// Runs the startup check, then the periodic loop until SIGINT/SIGTERM.
pub async fn run_watch(manager: &UpdateManager) {
    let token = install_signal_handler();
    if let Some(result) = manager.activate().await {
        info!(result = %result, "startup check finished");
    }
    manager.run_periodic(token).await;
}

#[derive(Debug, Serialize)]
pub struct PluginStatus {
    pub kind: String,
    pub name: String,
    pub version: Option<String>,
    pub source: &'static str,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub host_version: String,
    pub server_url: Option<String>,
    pub plugins: Vec<PluginStatus>,
    pub update: UpdateInfo,
}

pub async fn run_status(
    manager: &UpdateManager,
    registry: &FsRegistry,
    json: bool,
    plain: bool,
) -> Result<(), PlugsyncError> {
    let status = StatusResponse {
        host_version: env!("CARGO_PKG_VERSION").to_string(),
        server_url: manager.config().update.server_url.clone(),
        plugins: registry
            .plugins()
            .into_iter()
            .map(|(key, plugin)| PluginStatus {
                kind: key.kind,
                name: key.name,
                version: plugin.version,
                source: plugin.namespace,
            })
            .collect(),
        update: manager.info().await,
    };

    if json {
        let text = serde_json::to_string_pretty(&status)
            .map_err(|e| PlugsyncError::Internal(format!("failed to serialize status: {e}")))?;
        println!("{text}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status, use_color);
    }
    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    use colored::Colorize;

    println!();
    println!("  plugsync {}", status.host_version);
    println!("  {}", "-".repeat(35));
    match &status.server_url {
        Some(url) => println!("    Server:   {url}"),
        None if use_color => println!("    Server:   {}", "not configured".yellow()),
        None => println!("    Server:   not configured"),
    }
    println!("    Plugins:  {}", status.plugins.len());
    println!();

    for plugin in &status.plugins {
        let version = plugin.version.as_deref().unwrap_or("?");
        if use_color {
            println!(
                "    [{}] {} {} ({})",
                plugin.kind.cyan(),
                plugin.name.bold(),
                version.green(),
                plugin.source.dimmed()
            );
        } else {
            println!(
                "    [{}] {} {} ({})",
                plugin.kind, plugin.name, version, plugin.source
            );
        }
    }
}
