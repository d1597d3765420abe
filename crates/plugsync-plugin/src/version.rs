// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-plugin update decisions against the installed registry.
//!
//! Versions are compared as plain numbers parsed from their leading numeric
//! token, so `1.10` sorts below `1.9`. Manifests publish versions with that
//! ordering in mind.

use std::collections::BTreeMap;

use plugsync_core::{PluginKey, PluginRegistry, UpdateDecision};
use tracing::warn;

use crate::manifest::PluginRecord;
use crate::naming::PluginNaming;

/// A manifest record paired with its key and decision.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate {
    pub key: PluginKey,
    pub record: PluginRecord,
    pub decision: UpdateDecision,
}

impl PlannedUpdate {
    /// Version the manifest promises for this plugin.
    pub fn target_version(&self) -> &str {
        &self.record.version
    }
}

/// Parses the leading `digits[.digits]` token of a version string.
///
/// `"1.10.2"` yields `1.1`; `"v2"` yields `None`.
pub fn parse_version_number(version: &str) -> Option<f64> {
    let version = version.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (idx, ch) in version.char_indices() {
        match ch {
            '0'..='9' => end = idx + 1,
            '.' if !seen_dot => {
                seen_dot = true;
                end = idx + 1;
            }
            _ => break,
        }
    }

    let token = version[..end].trim_end_matches('.');
    if !token.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Decides what to do with one plugin.
///
/// Missing installed version means `New` whatever the declared version is.
/// An installed version that does not parse counts as `0`; a declared
/// version that does not parse never upgrades.
pub fn decide(installed: Option<&str>, declared: &str) -> UpdateDecision {
    let Some(installed) = installed else {
        return UpdateDecision::New;
    };

    let Some(declared_num) = parse_version_number(declared) else {
        warn!(version = declared, "manifest version is not numeric, skipping");
        return UpdateDecision::Skip;
    };
    let installed_num = parse_version_number(installed).unwrap_or(0.0);

    if declared_num > installed_num {
        UpdateDecision::Upgrade {
            installed: installed.to_string(),
        }
    } else {
        UpdateDecision::Skip
    }
}

/// Classifies every record, ordered by `(kind, name)`.
///
/// Several records for the same key collapse into the one appearing last in
/// the manifest.
pub fn plan_updates(
    records: Vec<PluginRecord>,
    registry: &dyn PluginRegistry,
    naming: &PluginNaming,
) -> Vec<PlannedUpdate> {
    let mut by_key: BTreeMap<PluginKey, PluginRecord> = BTreeMap::new();
    for record in records {
        let key = naming.key_for(&record.kind, &record.file_name);
        if let Some(previous) = by_key.insert(key.clone(), record) {
            warn!(
                plugin = %key,
                replaced_line = previous.line,
                "duplicate manifest entry, keeping the later one"
            );
        }
    }

    by_key
        .into_iter()
        .map(|(key, record)| {
            let installed = registry.installed_version(&key);
            let decision = decide(installed.as_deref(), &record.version);
            PlannedUpdate {
                key,
                record,
                decision,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{parse_manifest, ParsedManifest};
    use plugsync_test_utils::MockRegistry;

    fn records(lines: &[&str]) -> Vec<PluginRecord> {
        let mut all = vec!["None", "u", "type|name|version"];
        all.extend_from_slice(lines);
        match parse_manifest(&all).unwrap() {
            ParsedManifest::Plugins(m) => m.records,
            other => panic!("expected plugins, got {other:?}"),
        }
    }

    fn naming() -> PluginNaming {
        PluginNaming::new("py", "pyc")
    }

    #[test]
    fn parses_leading_numeric_token() {
        assert_eq!(parse_version_number("1.2"), Some(1.2));
        assert_eq!(parse_version_number("2"), Some(2.0));
        assert_eq!(parse_version_number(" 0.51 "), Some(0.51));
        assert_eq!(parse_version_number("1.10.2"), Some(1.1));
        assert_eq!(parse_version_number("3.0beta"), Some(3.0));
        assert_eq!(parse_version_number("1."), Some(1.0));
        assert_eq!(parse_version_number(".5"), Some(0.5));
        assert_eq!(parse_version_number("v1.2"), None);
        assert_eq!(parse_version_number("."), None);
        assert_eq!(parse_version_number(""), None);
    }

    #[test]
    fn multi_segment_versions_compare_numerically() {
        // 1.10 parses to 1.1, which is below 1.9.
        assert_eq!(decide(Some("1.9"), "1.10"), UpdateDecision::Skip);
    }

    #[test]
    fn absent_install_is_new_regardless_of_version() {
        assert_eq!(decide(None, "2.0"), UpdateDecision::New);
        assert_eq!(decide(None, "0"), UpdateDecision::New);
        assert_eq!(decide(None, "garbage"), UpdateDecision::New);
    }

    #[test]
    fn greater_version_upgrades() {
        assert_eq!(
            decide(Some("1.1"), "1.2"),
            UpdateDecision::Upgrade {
                installed: "1.1".to_string()
            }
        );
    }

    #[test]
    fn equal_or_lower_version_skips() {
        assert_eq!(decide(Some("2.0"), "2.0"), UpdateDecision::Skip);
        assert_eq!(decide(Some("2.0"), "2"), UpdateDecision::Skip);
        assert_eq!(decide(Some("2.0"), "1.9"), UpdateDecision::Skip);
    }

    #[test]
    fn unparseable_installed_version_counts_as_zero() {
        assert!(matches!(decide(Some("dev"), "0.1"), UpdateDecision::Upgrade { .. }));
    }

    #[test]
    fn unparseable_declared_version_skips_installed_plugin() {
        assert_eq!(decide(Some("1.0"), "latest"), UpdateDecision::Skip);
    }

    #[test]
    fn plan_is_sorted_by_kind_then_name() {
        let registry = MockRegistry::new();
        let plan = plan_updates(
            records(&["hoster|Zed.py|1.0", "crypter|Beta.py|1.0", "hoster|Alpha.py|1.0"]),
            &registry,
            &naming(),
        );
        let keys: Vec<String> = plan.iter().map(|p| p.key.to_string()).collect();
        assert_eq!(keys, vec!["[crypter] Beta", "[hoster] Alpha", "[hoster] Zed"]);
    }

    #[test]
    fn plan_uses_registry_versions() {
        let registry = MockRegistry::new()
            .with_installed("hoster", "Old", "1.1")
            .with_installed("hoster", "Same", "2.0");
        let plan = plan_updates(
            records(&["hoster|Old.py|1.2", "hoster|Same.py|2.0", "hoster|Fresh.py|0.1"]),
            &registry,
            &naming(),
        );
        let decisions: Vec<(&str, &UpdateDecision)> = plan
            .iter()
            .map(|p| (p.key.name.as_str(), &p.decision))
            .collect();
        assert_eq!(
            decisions,
            vec![
                ("Fresh", &UpdateDecision::New),
                (
                    "Old",
                    &UpdateDecision::Upgrade {
                        installed: "1.1".to_string()
                    }
                ),
                ("Same", &UpdateDecision::Skip),
            ]
        );
    }

    #[test]
    fn legacy_compiled_names_share_the_source_key() {
        let registry = MockRegistry::new().with_installed("hoster", "Foo", "1.0");
        let plan = plan_updates(records(&["hoster|Foo_27.pyc|1.5"]), &registry, &naming());
        assert_eq!(plan[0].key, PluginKey::new("hoster", "Foo"));
        assert!(matches!(plan[0].decision, UpdateDecision::Upgrade { .. }));
    }

    #[test]
    fn duplicate_keys_keep_last_manifest_entry() {
        let registry = MockRegistry::new();
        let plan = plan_updates(
            records(&["hoster|Foo.py|2.0", "hoster|Foo.py|2.5"]),
            &registry,
            &naming(),
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].target_version(), "2.5");
    }
}
