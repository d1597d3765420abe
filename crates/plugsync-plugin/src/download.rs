// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Download, verify, and install plugin sources.
//!
//! Downloads run strictly one after another. A failure is logged and only
//! affects its own plugin; the batch always runs to completion.
//!
//! Content is installed only when it declares, via a
//! `__version__ = "x.y"` assignment, exactly the version the manifest
//! promised. Files are written to a temporary sibling, flushed and synced,
//! then renamed over the target, so a plugin file is either the old one or
//! the complete new one.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use plugsync_core::{PluginKey, PlugsyncError, Transport, UpdateDecision};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::manifest::PluginRecord;
use crate::version::PlannedUpdate;

/// Matches `__version__ = "1.2"`, `__version = '0.51'` and similar.
static VERSION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"__version\w*\s*=\s*["']([0-9][0-9.]*)["']"#).expect("valid version regex")
});

/// `%(field)s` placeholders and `%%` escapes in download url templates.
static TEMPLATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%%|%\(([^)]*)\)s").expect("valid template regex"));

/// Why a single plugin was not installed.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("url template references unknown field `{field}`")]
    Template { field: String },

    #[error(transparent)]
    Transport(PlugsyncError),

    #[error("version mismatch: manifest declares {expected}, content declares {}", .found.as_deref().unwrap_or("nothing"))]
    Integrity {
        expected: String,
        found: Option<String>,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Converts into the crate-wide error, attaching the plugin key.
    pub fn into_plugsync_error(self, key: &PluginKey) -> PlugsyncError {
        match self {
            DownloadError::Template { field } => PlugsyncError::Config(format!(
                "url template references unknown field `{field}` for {key}"
            )),
            DownloadError::Transport(e) => e,
            DownloadError::Integrity { expected, found } => PlugsyncError::Integrity {
                key: key.clone(),
                expected,
                found,
            },
            DownloadError::Write { path, source } => PlugsyncError::Filesystem { path, source },
        }
    }
}

/// Outcome of a download pass.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Keys whose download, verification and write all succeeded, in
    /// processing order.
    pub updated: Vec<PluginKey>,
    /// Keys that were attempted and failed.
    pub failed: Vec<(PluginKey, DownloadError)>,
}

/// Fetches plugin sources and installs them under the override root.
pub struct PluginDownloader {
    transport: Arc<dyn Transport>,
    override_root: PathBuf,
}

impl PluginDownloader {
    pub fn new(transport: Arc<dyn Transport>, override_root: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            override_root: override_root.into(),
        }
    }

    /// Where a record's file is installed.
    pub fn target_path(&self, record: &PluginRecord) -> PathBuf {
        self.override_root.join(&record.kind).join(&record.file_name)
    }

    /// Processes every non-skipped entry of `plan` in order.
    pub async fn download_all(&self, plan: &[PlannedUpdate], url_template: &str) -> DownloadReport {
        let mut report = DownloadReport::default();

        for update in plan {
            match &update.decision {
                UpdateDecision::Skip => continue,
                UpdateDecision::New => info!(
                    kind = %update.key.kind,
                    name = %update.key.name,
                    version = %update.target_version(),
                    "new plugin"
                ),
                UpdateDecision::Upgrade { installed } => info!(
                    kind = %update.key.kind,
                    name = %update.key.name,
                    from = %installed,
                    to = %update.target_version(),
                    "new version of plugin"
                ),
            }

            match self.download(update, url_template).await {
                Ok(()) => report.updated.push(update.key.clone()),
                Err(e) => {
                    error!(file = %update.record.file_name, error = %e, "error updating plugin");
                    report.failed.push((update.key.clone(), e));
                }
            }
        }

        report
    }

    /// Fetches, verifies and installs one plugin.
    pub async fn download(&self, update: &PlannedUpdate, url_template: &str) -> Result<(), DownloadError> {
        let url = render_url(url_template, &update.record)?;
        debug!(plugin = %update.key, url = %url, "fetching plugin");

        let content = self
            .transport
            .fetch_text(&url, &[])
            .await
            .map_err(DownloadError::Transport)?;

        verify_version(&content, update.target_version())?;

        let target = self.target_path(&update.record);
        tokio::task::spawn_blocking(move || write_atomically(&target, content.as_bytes()))
            .await
            .map_err(|e| DownloadError::Write {
                path: self.target_path(&update.record),
                source: std::io::Error::other(e),
            })?
    }
}

/// Substitutes `%(field)s` placeholders with record values.
pub fn render_url(template: &str, record: &PluginRecord) -> Result<String, DownloadError> {
    let mut url = String::with_capacity(template.len());
    let mut last = 0;

    for caps in TEMPLATE_TOKEN.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        url.push_str(&template[last..whole.start()]);
        match caps.get(1) {
            Some(field) => {
                let value = record.get(field.as_str()).ok_or_else(|| DownloadError::Template {
                    field: field.as_str().to_string(),
                })?;
                url.push_str(value);
            }
            None => url.push('%'),
        }
        last = whole.end();
    }
    url.push_str(&template[last..]);

    Ok(url)
}

/// Version declared inside plugin source, if any.
pub fn extract_version_marker(content: &str) -> Option<&str> {
    VERSION_MARKER
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn verify_version(content: &str, expected: &str) -> Result<(), DownloadError> {
    match extract_version_marker(content) {
        Some(found) if found == expected => Ok(()),
        found => Err(DownloadError::Integrity {
            expected: expected.to_string(),
            found: found.map(str::to_string),
        }),
    }
}

/// Writes through a temporary file in the target directory and renames it
/// into place. The temporary file is removed on every failure path.
fn write_atomically(target: &Path, bytes: &[u8]) -> Result<(), DownloadError> {
    let write_err = |source: std::io::Error| DownloadError::Write {
        path: target.to_path_buf(),
        source,
    };

    let dir = target.parent().ok_or_else(|| {
        write_err(std::io::Error::other("target has no parent directory"))
    })?;
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(target).map_err(|e| write_err(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{parse_manifest, ParsedManifest};
    use plugsync_test_utils::MockTransport;

    fn record(line: &str) -> PluginRecord {
        match parse_manifest(&["None", "u", "type|name|version", line]).unwrap() {
            ParsedManifest::Plugins(mut m) => m.records.remove(0),
            other => panic!("expected plugins, got {other:?}"),
        }
    }

    fn planned(line: &str, decision: UpdateDecision) -> PlannedUpdate {
        let record = record(line);
        PlannedUpdate {
            key: PluginKey::new(&record.kind, record.file_name.trim_end_matches(".py")),
            record,
            decision,
        }
    }

    #[test]
    fn renders_python_style_placeholders() {
        let r = record("hoster|Foo.py|2.0");
        assert_eq!(
            render_url("http://x/%(type)s/%(name)s", &r).unwrap(),
            "http://x/hoster/Foo.py"
        );
        assert_eq!(
            render_url("http://x/get?f=%(name)s&v=%(version)s&pct=100%%", &r).unwrap(),
            "http://x/get?f=Foo.py&v=2.0&pct=100%"
        );
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let r = record("hoster|Foo.py|2.0");
        let err = render_url("http://x/%(size)s", &r).unwrap_err();
        assert!(matches!(err, DownloadError::Template { field } if field == "size"));
    }

    #[test]
    fn extracts_version_markers() {
        assert_eq!(extract_version_marker("__version__ = \"2.0\"\n"), Some("2.0"));
        assert_eq!(extract_version_marker("    __version = '0.51'"), Some("0.51"));
        assert_eq!(extract_version_marker("__version__='1.2.3'"), Some("1.2.3"));
        assert_eq!(extract_version_marker("version = \"2.0\""), None);
        assert_eq!(extract_version_marker("__version__ = VERSION"), None);
        assert_eq!(extract_version_marker(""), None);
    }

    #[tokio::test]
    async fn writes_verified_content_under_override_root() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            MockTransport::new().with_response("http://x/hoster/Foo.py", "__version__ = \"2.0\"\n"),
        );
        let downloader = PluginDownloader::new(transport, dir.path());
        let update = planned("hoster|Foo.py|2.0", UpdateDecision::New);

        downloader.download(&update, "http://x/%(type)s/%(name)s").await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("hoster/Foo.py")).unwrap();
        assert_eq!(written, "__version__ = \"2.0\"\n");
    }

    #[tokio::test]
    async fn replaces_existing_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("hoster")).unwrap();
        std::fs::write(dir.path().join("hoster/Foo.py"), "__version__ = \"1.0\"").unwrap();

        let transport = Arc::new(
            MockTransport::new().with_response("http://x/Foo.py", "__version__ = \"1.1\""),
        );
        let downloader = PluginDownloader::new(transport, dir.path());
        let update = planned(
            "hoster|Foo.py|1.1",
            UpdateDecision::Upgrade {
                installed: "1.0".into(),
            },
        );
        downloader.download(&update, "http://x/%(name)s").await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("hoster/Foo.py")).unwrap();
        assert_eq!(written, "__version__ = \"1.1\"");
        let leftovers = std::fs::read_dir(dir.path().join("hoster")).unwrap().count();
        assert_eq!(leftovers, 1, "no temporary files remain");
    }

    #[tokio::test]
    async fn mismatched_marker_is_rejected_and_nothing_written() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            MockTransport::new().with_response("http://x/Foo.py", "__version__ = \"1.9\""),
        );
        let downloader = PluginDownloader::new(transport, dir.path());
        let update = planned("hoster|Foo.py|2.0", UpdateDecision::New);

        let err = downloader.download(&update, "http://x/%(name)s").await.unwrap_err();
        assert!(matches!(
            err,
            DownloadError::Integrity { ref expected, found: Some(ref found) }
                if expected == "2.0" && found == "1.9"
        ));
        assert!(!dir.path().join("hoster/Foo.py").exists());
    }

    #[tokio::test]
    async fn download_all_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            MockTransport::new()
                .with_response("http://x/A.py", "__version__ = \"1.0\"")
                .with_response("http://x/B.py", "no marker here")
                .with_response("http://x/D.py", "__version__ = \"4.0\""),
        );
        let downloader = PluginDownloader::new(transport, dir.path());
        let plan = vec![
            planned("hoster|A.py|1.0", UpdateDecision::New),
            planned("hoster|B.py|2.0", UpdateDecision::New),
            planned("hoster|C.py|3.0", UpdateDecision::New),
            planned("hoster|D.py|4.0", UpdateDecision::New),
            planned("hoster|E.py|5.0", UpdateDecision::Skip),
        ];

        let report = downloader.download_all(&plan, "http://x/%(name)s").await;

        assert_eq!(
            report.updated,
            vec![PluginKey::new("hoster", "A"), PluginKey::new("hoster", "D")]
        );
        assert_eq!(report.failed.len(), 2);
        assert!(matches!(report.failed[0].1, DownloadError::Integrity { found: None, .. }));
        assert!(matches!(report.failed[1].1, DownloadError::Transport(_)));
        assert!(!dir.path().join("hoster/E.py").exists());
    }

    #[tokio::test]
    async fn unwritable_target_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the kind directory should be.
        std::fs::write(dir.path().join("hoster"), "not a directory").unwrap();
        let transport = Arc::new(
            MockTransport::new().with_response("http://x/Foo.py", "__version__ = \"1.0\""),
        );
        let downloader = PluginDownloader::new(transport, dir.path());
        let update = planned("hoster|Foo.py|1.0", UpdateDecision::New);

        let err = downloader.download(&update, "http://x/%(name)s").await.unwrap_err();
        assert!(matches!(err, DownloadError::Write { .. }));
    }

    #[test]
    fn download_errors_convert_with_key() {
        let key = PluginKey::new("hoster", "Foo");
        let err = DownloadError::Integrity {
            expected: "2.0".into(),
            found: Some("1.9".into()),
        }
        .into_plugsync_error(&key);
        assert!(matches!(err, PlugsyncError::Integrity { key: k, .. } if k == key));
    }
}
