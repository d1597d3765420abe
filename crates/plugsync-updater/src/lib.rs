// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update cycle orchestration for plugsync.
//!
//! [`UpdateManager`] owns the single-writer update state and runs the cycle:
//! pause intake, fetch and parse the manifest, remove blacklisted plugins,
//! download and verify updates, reload, then decide between resuming intake,
//! restarting, or deferring the restart until running jobs finish.

pub mod manager;
pub mod reload;
pub mod shutdown;
pub mod transport;

pub use manager::{UpdateInfo, UpdateManager};
pub use reload::reload_updated;
pub use shutdown::install_signal_handler;
pub use transport::HttpTransport;
