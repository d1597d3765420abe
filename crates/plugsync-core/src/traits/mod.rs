// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits the update engine is written against.
//!
//! The host implements [`HostControl`] and [`PluginRegistry`]; the transport
//! is usually the reqwest-backed client from `plugsync-updater`.

pub mod host;
pub mod registry;
pub mod transport;

pub use host::HostControl;
pub use registry::PluginRegistry;
pub use transport::Transport;
