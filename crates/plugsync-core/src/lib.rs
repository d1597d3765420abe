// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for plugsync.
//!
//! This crate provides the error type, the plugin identity types, and the
//! collaborator traits (host control, installed registry, transport) that the
//! update engine is written against. Hosts embed plugsync by implementing the
//! traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PlugsyncError;
pub use types::{CycleResult, HostEvent, LoadedModule, PluginKey, ReloadOutcome, UpdateDecision};

pub use traits::{HostControl, PluginRegistry, Transport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugsync_error_has_all_variants() {
        let _config = PlugsyncError::Config("test".into());
        let _transport = PlugsyncError::Transport {
            message: "unreachable".into(),
            source: None,
        };
        let _malformed = PlugsyncError::MalformedRecord {
            line: 4,
            reason: "expected 3 fields, found 2".into(),
        };
        let _integrity = PlugsyncError::Integrity {
            key: PluginKey::new("plugin", "Foo"),
            expected: "2.0".into(),
            found: None,
        };
        let _fs = PlugsyncError::Filesystem {
            path: "/tmp/x".into(),
            source: std::io::Error::other("denied"),
        };
        let _host = PlugsyncError::Host("gone".into());
        let _internal = PlugsyncError::Internal("test".into());
    }

    #[test]
    fn cycle_result_codes_are_stable() {
        assert_eq!(CycleResult::NoUpdate.code(), 0);
        assert_eq!(CycleResult::PluginsUpdated.code(), 1);
        assert_eq!(CycleResult::PluginsUpdatedRestartRequired.code(), 2);
        assert_eq!(CycleResult::AppUpdateAvailable.code(), 3);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_host<T: HostControl>() {}
        fn _assert_registry<T: PluginRegistry>() {}
        fn _assert_transport<T: Transport>() {}
    }
}
