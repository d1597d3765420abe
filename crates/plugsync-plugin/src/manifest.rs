// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update manifest parsing.
//!
//! The manifest is line oriented:
//!
//! ```text
//! None                                  <- or a new application version
//! http://host/%(type)s/%(name)s         <- download url template
//! type|name|version                     <- record schema
//! hoster|Foo.py|2.0                     <- update records
//! BLACKLIST                             <- optional marker
//! crypter|Bar.py|1.0                    <- blacklisted records
//! ```
//!
//! A record that does not fit the schema is rejected on its own; the rest of
//! the manifest is still used.

use std::collections::BTreeMap;

use plugsync_core::PlugsyncError;
use thiserror::Error;

/// First-line sentinel meaning "no new application version".
pub const NO_APP_UPDATE: &str = "None";

/// Line separating update records from blacklisted records.
pub const BLACKLIST_MARKER: &str = "BLACKLIST";

const FIELD_SEPARATOR: char = '|';

/// Schema fields every record must carry.
pub const REQUIRED_FIELDS: [&str; 3] = ["type", "name", "version"];

/// Errors raised while decoding a manifest.
///
/// Line numbers are 1-based positions in the manifest text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("manifest ends before the {what} line")]
    MissingHeader { what: &'static str },

    #[error("schema on line {line} lacks required field `{field}`")]
    InvalidSchema { line: usize, field: &'static str },

    #[error("record on line {line} has {found} fields, schema declares {expected}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("record on line {line} has an invalid `{field}` value `{value}`")]
    InvalidValue {
        line: usize,
        field: &'static str,
        value: String,
    },
}

impl ManifestError {
    pub fn line(&self) -> Option<usize> {
        match self {
            ManifestError::MissingHeader { .. } => None,
            ManifestError::InvalidSchema { line, .. }
            | ManifestError::FieldCount { line, .. }
            | ManifestError::InvalidValue { line, .. } => Some(*line),
        }
    }
}

impl From<ManifestError> for PlugsyncError {
    fn from(err: ManifestError) -> Self {
        PlugsyncError::MalformedRecord {
            line: err.line().unwrap_or(0),
            reason: err.to_string(),
        }
    }
}

/// Ordered field names from the manifest's schema line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    fields: Vec<String>,
}

impl RecordSchema {
    /// Parses a `field|field|...` line, requiring `type`, `name` and `version`.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, ManifestError> {
        let fields: Vec<String> = line
            .split(FIELD_SEPARATOR)
            .map(|f| f.trim().to_string())
            .collect();
        for required in REQUIRED_FIELDS {
            if !fields.iter().any(|f| f == required) {
                return Err(ManifestError::InvalidSchema {
                    line: line_no,
                    field: required,
                });
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Zips a record line against the schema.
    pub fn decode(&self, line: &str, line_no: usize) -> Result<PluginRecord, ManifestError> {
        let values: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if values.len() != self.fields.len() {
            return Err(ManifestError::FieldCount {
                line: line_no,
                expected: self.fields.len(),
                found: values.len(),
            });
        }

        let fields: BTreeMap<String, String> = self
            .fields
            .iter()
            .cloned()
            .zip(values.into_iter().map(|v| v.trim().to_string()))
            .collect();

        let take = |field: &'static str| -> Result<String, ManifestError> {
            let value = fields.get(field).cloned().unwrap_or_default();
            if is_valid_path_component(&value) {
                Ok(value)
            } else {
                Err(ManifestError::InvalidValue {
                    line: line_no,
                    field,
                    value,
                })
            }
        };

        let kind = take("type")?;
        let file_name = take("name")?;
        let version = fields.get("version").cloned().unwrap_or_default();
        if version.is_empty() {
            return Err(ManifestError::InvalidValue {
                line: line_no,
                field: "version",
                value: version,
            });
        }

        Ok(PluginRecord {
            line: line_no,
            kind,
            file_name,
            version,
            fields,
        })
    }
}

/// `type` and `name` end up as path components under the plugin roots.
fn is_valid_path_component(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '\0'])
}

/// One validated manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRecord {
    /// Manifest line the record came from.
    pub line: usize,
    /// Value of the `type` field.
    pub kind: String,
    /// Value of the `name` field, a file name such as `Foo.py`.
    pub file_name: String,
    /// Value of the `version` field.
    pub version: String,
    fields: BTreeMap<String, String>,
}

impl PluginRecord {
    /// Any schema field, including the ones surfaced as struct fields.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

/// Plugin section of a manifest whose first line is the `None` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateManifest {
    pub url_template: String,
    pub schema: RecordSchema,
    pub records: Vec<PluginRecord>,
    pub blacklist: Vec<PluginRecord>,
    /// Records dropped because they did not fit the schema.
    pub rejected: Vec<ManifestError>,
}

/// Result of decoding the manifest text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedManifest {
    /// The server returned nothing.
    Empty,
    /// A new application version exists; plugin records are not read.
    AppUpdateAvailable { version: String },
    /// No application update; plugin records follow.
    Plugins(UpdateManifest),
}

/// Splits text into lines and parses them.
pub fn parse_manifest_text(text: &str) -> Result<ParsedManifest, ManifestError> {
    let lines: Vec<&str> = text.lines().collect();
    parse_manifest(&lines)
}

/// Parses manifest lines.
///
/// Fails only when the header lines are missing or the schema lacks a
/// required field. Record-level problems are collected in
/// [`UpdateManifest::rejected`].
pub fn parse_manifest<S: AsRef<str>>(lines: &[S]) -> Result<ParsedManifest, ManifestError> {
    let lines: Vec<&str> = lines.iter().map(|l| l.as_ref().trim_end()).collect();
    if lines.iter().all(|l| l.trim().is_empty()) {
        return Ok(ParsedManifest::Empty);
    }

    let marker = lines[0].trim();
    if marker != NO_APP_UPDATE {
        return Ok(ParsedManifest::AppUpdateAvailable {
            version: marker.to_string(),
        });
    }

    let url_template = lines
        .get(1)
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .ok_or(ManifestError::MissingHeader {
            what: "download url template",
        })?
        .to_string();
    let schema_line = lines
        .get(2)
        .ok_or(ManifestError::MissingHeader { what: "schema" })?;
    let schema = RecordSchema::parse(schema_line, 3)?;

    let mut manifest = UpdateManifest {
        url_template,
        schema,
        records: Vec::new(),
        blacklist: Vec::new(),
        rejected: Vec::new(),
    };

    let mut in_blacklist = false;
    for (idx, line) in lines.iter().enumerate().skip(3) {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        if !in_blacklist && line.trim() == BLACKLIST_MARKER {
            in_blacklist = true;
            continue;
        }
        match manifest.schema.decode(line, line_no) {
            Ok(record) if in_blacklist => manifest.blacklist.push(record),
            Ok(record) => manifest.records.push(record),
            Err(e) => manifest.rejected.push(e),
        }
    }

    Ok(ParsedManifest::Plugins(manifest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn plugins(lines: &[&str]) -> UpdateManifest {
        match parse_manifest(lines).unwrap() {
            ParsedManifest::Plugins(m) => m,
            other => panic!("expected plugin manifest, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_empty_manifest() {
        let lines: [&str; 0] = [];
        assert_eq!(parse_manifest(&lines).unwrap(), ParsedManifest::Empty);
        assert_eq!(parse_manifest_text("").unwrap(), ParsedManifest::Empty);
        assert_eq!(parse_manifest_text("\n  \n").unwrap(), ParsedManifest::Empty);
    }

    #[test]
    fn app_version_line_short_circuits() {
        let parsed = parse_manifest(&["0.5.0", "http://x/%(name)s", "type|name|version"]).unwrap();
        assert_eq!(
            parsed,
            ParsedManifest::AppUpdateAvailable {
                version: "0.5.0".to_string()
            }
        );
    }

    #[test]
    fn parses_records_against_schema() {
        let m = plugins(&[
            "None",
            "http://x/%(type)s/%(name)s",
            "type|name|version",
            "plugin|Foo.py|2.0",
            "hoster|Bar.py|1.5",
        ]);
        assert_eq!(m.url_template, "http://x/%(type)s/%(name)s");
        assert_eq!(m.schema.fields(), &["type", "name", "version"]);
        assert_eq!(m.records.len(), 2);
        assert_eq!(m.records[0].kind, "plugin");
        assert_eq!(m.records[0].file_name, "Foo.py");
        assert_eq!(m.records[0].version, "2.0");
        assert_eq!(m.records[0].line, 4);
        assert!(m.blacklist.is_empty());
        assert!(m.rejected.is_empty());
    }

    #[test]
    fn schema_order_is_positional() {
        let m = plugins(&["None", "u", "version|name|type", "2.0|Foo.py|hoster"]);
        assert_eq!(m.records[0].kind, "hoster");
        assert_eq!(m.records[0].version, "2.0");
    }

    #[test]
    fn extra_schema_fields_are_kept() {
        let m = plugins(&["None", "u", "type|name|version|size", "hoster|Foo.py|2.0|1024"]);
        assert_eq!(m.records[0].get("size"), Some("1024"));
    }

    #[test]
    fn splits_at_blacklist_marker() {
        let m = plugins(&[
            "None",
            "u",
            "type|name|version",
            "hoster|Foo.py|2.0",
            "BLACKLIST",
            "crypter|Bad.py|0.1",
        ]);
        assert_eq!(m.records.len(), 1);
        assert_eq!(m.blacklist.len(), 1);
        assert_eq!(m.blacklist[0].file_name, "Bad.py");
    }

    #[test]
    fn field_count_mismatch_rejects_only_that_record() {
        let m = plugins(&[
            "None",
            "u",
            "type|name|version",
            "hoster|Short.py",
            "hoster|Long.py|1.0|extra",
            "hoster|Good.py|1.0",
        ]);
        assert_eq!(m.records.len(), 1);
        assert_eq!(m.records[0].file_name, "Good.py");
        assert_eq!(
            m.rejected,
            vec![
                ManifestError::FieldCount {
                    line: 4,
                    expected: 3,
                    found: 2
                },
                ManifestError::FieldCount {
                    line: 5,
                    expected: 3,
                    found: 4
                },
            ]
        );
    }

    #[test]
    fn path_like_names_are_rejected() {
        let m = plugins(&[
            "None",
            "u",
            "type|name|version",
            "hoster|../../etc/passwd|1.0",
            "..|Foo.py|1.0",
            "hoster||1.0",
        ]);
        assert!(m.records.is_empty());
        assert_eq!(m.rejected.len(), 3);
    }

    #[test]
    fn empty_version_is_rejected() {
        let m = plugins(&["None", "u", "type|name|version", "hoster|Foo.py|"]);
        assert!(m.records.is_empty());
        assert!(matches!(
            m.rejected[0],
            ManifestError::InvalidValue { field: "version", .. }
        ));
    }

    #[test]
    fn schema_without_version_fails_manifest() {
        let err = parse_manifest(&["None", "u", "type|name"]).unwrap_err();
        assert_eq!(
            err,
            ManifestError::InvalidSchema {
                line: 3,
                field: "version"
            }
        );
    }

    #[test]
    fn missing_header_lines_fail_manifest() {
        assert_eq!(
            parse_manifest(&["None"]).unwrap_err(),
            ManifestError::MissingHeader {
                what: "download url template"
            }
        );
        assert_eq!(
            parse_manifest(&["None", "u"]).unwrap_err(),
            ManifestError::MissingHeader { what: "schema" }
        );
    }

    #[test]
    fn carriage_returns_and_blank_lines_are_ignored() {
        let m = parse_manifest_text("None\r\nu\r\ntype|name|version\r\n\r\nhoster|Foo.py|2.0\r\n")
            .unwrap();
        let ParsedManifest::Plugins(m) = m else {
            panic!("expected plugins");
        };
        assert_eq!(m.records.len(), 1);
        assert_eq!(m.records[0].version, "2.0");
    }

    #[test]
    fn manifest_error_converts_to_malformed_record() {
        let err: PlugsyncError = ManifestError::FieldCount {
            line: 7,
            expected: 3,
            found: 1,
        }
        .into();
        assert!(matches!(err, PlugsyncError::MalformedRecord { line: 7, .. }));
    }

    proptest! {
        #[test]
        fn mismatched_field_counts_are_always_rejected(extra in 1usize..6, short in 1usize..3) {
            let long_line = format!("hoster|Foo.py|1.0{}", "|x".repeat(extra));
            let short_line = ["hoster", "Foo.py", "1.0"][..3 - short].join("|");
            let m = plugins(&["None", "u", "type|name|version", long_line.as_str(), short_line.as_str()]);
            prop_assert!(m.records.is_empty());
            prop_assert_eq!(m.rejected.len(), 2);
        }

        #[test]
        fn well_formed_records_round_through_schema(
            kind in "[a-z]{1,8}",
            name in "[A-Za-z][A-Za-z0-9]{0,10}",
            major in 0u32..20,
            minor in 0u32..100,
        ) {
            let version = format!("{major}.{minor}");
            let line = format!("{kind}|{name}.py|{version}");
            let m = plugins(&["None", "u", "type|name|version", line.as_str()]);
            prop_assert_eq!(m.records.len(), 1);
            prop_assert_eq!(&m.records[0].kind, &kind);
            prop_assert_eq!(&m.records[0].version, &version);
        }
    }
}
