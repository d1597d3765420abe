// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for plugsync.
//!
//! Provides in-memory implementations of the collaborator traits and an
//! on-disk plugin tree fixture, so update cycles can be exercised without a
//! network or a real host.
//!
//! # Components
//!
//! - [`MockHost`] - Records every host call and returns scripted outcomes
//! - [`MockRegistry`] - Installed versions and loaded modules from a builder
//! - [`MockTransport`] - Serves canned bodies by URL
//! - [`PluginTree`] - Temporary override and bundled plugin roots

pub mod mock_host;
pub mod mock_registry;
pub mod mock_transport;
pub mod plugin_tree;

pub use mock_host::MockHost;
pub use mock_registry::MockRegistry;
pub use mock_transport::MockTransport;
pub use plugin_tree::PluginTree;
