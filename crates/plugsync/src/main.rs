// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! plugsync - keeps a plugin tree in sync with a remote update manifest.
//!
//! This is the binary entry point. It runs the update engine against a
//! standalone host backed by the plugin directories themselves.

mod commands;
mod host;
mod registry;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use plugsync_updater::{HttpTransport, UpdateManager};

use crate::host::StandaloneHost;
use crate::registry::FsRegistry;

/// Exit status for configuration errors.
const EXIT_CONFIG: u8 = 78;
/// Exit status for failures outside an update cycle.
const EXIT_FAILURE: u8 = 70;

/// plugsync - keeps a plugin tree in sync with a remote update manifest.
#[derive(Parser, Debug)]
#[command(name = "plugsync", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one update check. Exits with the cycle result code (0-3).
    Check,
    /// Delete plugins from the override and bundled trees.
    Remove {
        /// Plugin kind (directory name), e.g. `hoster`.
        kind: String,
        /// Plugin names without extension.
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Show installed plugins and update state.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Check on start, then periodically until interrupted.
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => plugsync_config::load_and_validate_path(path),
        None => plugsync_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            plugsync_config::render_errors(&errors);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    init_tracing(&config.agent.log_level);

    let transport = match HttpTransport::new(config.update.request_timeout()) {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            eprintln!("plugsync: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    let registry = Arc::new(FsRegistry::new(&config.plugins));
    let host = Arc::new(StandaloneHost::new(Arc::clone(&registry), config.agent.debug));
    let manager = UpdateManager::new(config, host, registry.clone(), transport);

    match cli.command {
        Commands::Check => ExitCode::from(commands::run_check(&manager).await.code()),
        Commands::Remove { kind, names } => {
            commands::run_remove(&manager, &kind, &names).await;
            ExitCode::SUCCESS
        }
        Commands::Status { json, plain } => {
            match commands::run_status(&manager, &registry, json, plain).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("plugsync: {e}");
                    ExitCode::from(EXIT_FAILURE)
                }
            }
        }
        Commands::Watch => {
            commands::run_watch(&manager).await;
            ExitCode::SUCCESS
        }
    }
}

/// Logs go to stderr so command output on stdout stays parseable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("plugsync={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
