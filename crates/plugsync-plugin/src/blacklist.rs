// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blacklist resolution.
//!
//! Blacklisted plugins are dropped from the update plan and handed to the
//! [`PluginRemover`](crate::remover::PluginRemover) for deletion. The
//! updater's own key is never blacklisted.

use std::collections::BTreeSet;

use plugsync_core::PluginKey;
use tracing::{debug, warn};

use crate::manifest::PluginRecord;
use crate::naming::{strip_extension, PluginNaming};

/// Update plan after blacklist resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlacklistResolution {
    /// Update records still eligible for a decision.
    pub retained: Vec<PluginRecord>,
    /// Sorted, deduplicated keys to delete from disk.
    pub removals: Vec<PluginKey>,
    /// Update records dropped because their key is blacklisted.
    pub dropped: Vec<PluginRecord>,
}

/// Splits `records` into retained and dropped entries and computes the
/// removal list.
///
/// Every update record whose normalized key is blacklisted is dropped, not
/// only the first one.
pub fn resolve_blacklist(
    records: Vec<PluginRecord>,
    blacklist: &[PluginRecord],
    self_key: &PluginKey,
    naming: &PluginNaming,
) -> BlacklistResolution {
    let mut removals = BTreeSet::new();
    for entry in blacklist {
        let key = PluginKey::new(&entry.kind, strip_extension(&entry.file_name));
        if &key == self_key {
            warn!(plugin = %key, "ignoring blacklist entry for the updater itself");
            continue;
        }
        removals.insert(key);
    }

    let (dropped, retained): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|record| removals.contains(&naming.key_for(&record.kind, &record.file_name)));

    for record in &dropped {
        debug!(
            kind = %record.kind,
            name = %record.file_name,
            line = record.line,
            "dropping blacklisted plugin from update plan"
        );
    }

    BlacklistResolution {
        retained,
        removals: removals.into_iter().collect(),
        dropped,
    }
}
