// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::PlugsyncConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &PlugsyncConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if let Some(url) = &config.update.server_url {
        let url = url.trim();
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));
        match rest {
            Some(host) if !host.is_empty() => {}
            _ => fail(format!(
                "update.server_url `{url}` must be an http:// or https:// URL"
            )),
        }
    }

    if config.update.check_interval_hours == 0 {
        fail("update.check_interval_hours must be at least 1".to_string());
    }

    if config.update.tick_secs == 0 {
        fail("update.tick_secs must be at least 1".to_string());
    }

    if config.update.request_timeout_secs == 0 {
        fail("update.request_timeout_secs must be at least 1".to_string());
    }

    let plugins = &config.plugins;
    for (key, value) in [
        ("plugins.override_root", &plugins.override_root),
        ("plugins.bundled_root", &plugins.bundled_root),
        ("plugins.source_extension", &plugins.source_extension),
        ("plugins.compiled_extension", &plugins.compiled_extension),
        ("plugins.self_kind", &plugins.self_kind),
        ("plugins.self_name", &plugins.self_name),
    ] {
        if value.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    for (key, ext) in [
        ("plugins.source_extension", &plugins.source_extension),
        ("plugins.compiled_extension", &plugins.compiled_extension),
    ] {
        if ext.starts_with('.') {
            fail(format!("{key} `{ext}` must not start with a dot"));
        }
    }

    if !plugins.source_extension.is_empty()
        && plugins.source_extension == plugins.compiled_extension
    {
        fail(format!(
            "plugins.source_extension and plugins.compiled_extension must differ, both are `{}`",
            plugins.source_extension
        ));
    }

    if plugins.override_root == plugins.bundled_root {
        fail(format!(
            "plugins.override_root and plugins.bundled_root must differ, both are `{}`",
            plugins.override_root
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = PlugsyncConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn non_http_server_url_fails_validation() {
        let mut config = PlugsyncConfig::default();
        config.update.server_url = Some("ftp://updates.example.org".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "update.server_url"));
    }

    #[test]
    fn bare_scheme_server_url_fails_validation() {
        let mut config = PlugsyncConfig::default();
        config.update.server_url = Some("https://".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn identical_extensions_fail_validation() {
        let mut config = PlugsyncConfig::default();
        config.plugins.compiled_extension = "py".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "must differ"));
    }

    #[test]
    fn dotted_extension_fails_validation() {
        let mut config = PlugsyncConfig::default();
        config.plugins.source_extension = ".py".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "must not start with a dot"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = PlugsyncConfig::default();
        config.update.tick_secs = 0;
        config.update.check_interval_hours = 0;
        config.plugins.bundled_root = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let config: PlugsyncConfig = toml::from_str(
            r#"
            [update]
            server_url = "http://updatemanager.example.org"
            check_interval_hours = 12

            [plugins]
            override_root = "/srv/userplugins"
            bundled_root = "/opt/app/plugins"
            "#,
        )
        .unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.update.min_check_interval_hours, 3);
    }
}
