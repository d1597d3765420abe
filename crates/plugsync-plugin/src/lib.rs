// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin update engine: manifest parsing, blacklist resolution, version
//! decisions, download-and-verify, and on-disk removal.
//!
//! Each stage is a plain function or a small struct over the collaborator
//! traits from `plugsync-core`; `plugsync-updater` strings them together into
//! an update cycle.

pub mod blacklist;
pub mod download;
pub mod manifest;
pub mod naming;
pub mod remover;
pub mod version;
pub mod watcher;

pub use blacklist::{resolve_blacklist, BlacklistResolution};
pub use download::{DownloadError, DownloadReport, PluginDownloader};
pub use manifest::{
    parse_manifest, parse_manifest_text, ManifestError, ParsedManifest, PluginRecord,
    RecordSchema, UpdateManifest,
};
pub use naming::PluginNaming;
pub use remover::PluginRemover;
pub use version::{decide, parse_version_number, plan_updates, PlannedUpdate};
pub use watcher::{AutoReloadWatcher, ModificationClock};
