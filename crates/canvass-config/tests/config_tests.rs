// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Canvass configuration system.

use canvass_config::diagnostic::ConfigError;
use canvass_config::model::{CanvassConfig, WriteMethod};
use canvass_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_canvass_config() {
    let toml = r#"
[store]
url = "https://bot.example.com/api/data"
timeout_secs = 5
write_method = "put"
user_agent = "ops-console"

[console]
log_level = "debug"
max_cycle_attempts = 3
retry_backoff_ms = 250

[export]
csv_file_name = "driver_feedback.csv"
backup_dir = "/var/backups/canvass"
recent_history_limit = 50
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.store.url, "https://bot.example.com/api/data");
    assert_eq!(config.store.timeout_secs, 5);
    assert_eq!(config.store.write_method, WriteMethod::Put);
    assert_eq!(config.store.user_agent, "ops-console");
    assert_eq!(config.console.log_level, "debug");
    assert_eq!(config.console.max_cycle_attempts, 3);
    assert_eq!(config.console.retry_backoff_ms, 250);
    assert_eq!(config.export.csv_file_name, "driver_feedback.csv");
    assert_eq!(config.export.backup_dir, "/var/backups/canvass");
    assert_eq!(config.export.recent_history_limit, 50);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert!(config.store.url.is_empty());
    assert_eq!(config.store.timeout_secs, 10);
    assert_eq!(config.store.write_method, WriteMethod::Post);
    assert!(config.store.user_agent.starts_with("canvass/"));
    assert_eq!(config.console.log_level, "info");
    assert_eq!(config.console.max_cycle_attempts, 1);
    assert_eq!(config.console.retry_backoff_ms, 500);
    assert_eq!(config.export.csv_file_name, "survey_feedback.csv");
    assert_eq!(config.export.backup_dir, ".");
    assert_eq!(config.export.recent_history_limit, 20);
}

#[test]
fn unknown_field_in_store_produces_error() {
    let toml = r#"
[store]
ulr = "https://example.com"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("ulr"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown keys become diagnostics with a suggestion and a source span.
#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let toml = "[store]\nulr = \"https://example.com\"\n";

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key,
                suggestion,
                span,
                ..
            } => Some((key.clone(), suggestion.clone(), *span)),
            _ => None,
        })
        .expect("should produce an UnknownKey diagnostic");

    assert_eq!(unknown.0, "ulr");
    assert_eq!(unknown.1.as_deref(), Some("url"));
    assert!(unknown.2.is_some(), "span should point into the inline source");
}

#[test]
fn unknown_write_method_is_rejected() {
    let toml = r#"
[store]
write_method = "patch"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn validation_errors_are_reported_after_parsing() {
    let toml = r#"
[store]
url = "bot.example.com/api/data"
timeout_secs = 0
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// Dotted keys are how `CANVASS_STORE_URL` lands after env mapping.
#[test]
fn dotted_override_sets_store_url() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: CanvassConfig = Figment::new()
        .merge(Serialized::defaults(CanvassConfig::default()))
        .merge(Toml::string("[store]\nurl = \"https://from-toml.example\"\n"))
        .merge(("store.url", "https://from-env.example"))
        .merge(("store.timeout_secs", 3))
        .extract()
        .expect("should merge env override");

    assert_eq!(config.store.url, "https://from-env.example");
    assert_eq!(config.store.timeout_secs, 3);
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_file_silently_skipped() {
    let config = canvass_config::load_config_from_path(std::path::Path::new(
        "/nonexistent/path/canvass.toml",
    ))
    .expect("missing file should be silently skipped");
    assert_eq!(config.console.max_cycle_attempts, 1);
}
