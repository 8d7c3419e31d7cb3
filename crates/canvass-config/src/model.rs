// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Canvass survey console.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Canvass configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CanvassConfig {
    /// Remote document store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Console behavior settings.
    #[serde(default)]
    pub console: ConsoleConfig,

    /// History export and backup settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// HTTP verb used to overwrite the stored document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMethod {
    #[default]
    Post,
    Put,
}

/// Remote document store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Endpoint holding the shared document. Empty means not configured.
    #[serde(default)]
    pub url: String,

    /// Per-request timeout in seconds. Each store call is a single attempt.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Verb used for full-document writes.
    #[serde(default)]
    pub write_method: WriteMethod,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout_secs(),
            write_method: WriteMethod::default(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("canvass/{}", env!("CARGO_PKG_VERSION"))
}

/// Console behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How many times a whole fetch-merge-write cycle is attempted when the
    /// store is unavailable. 1 disables retries.
    #[serde(default = "default_max_cycle_attempts")]
    pub max_cycle_attempts: u32,

    /// Pause between cycle attempts, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_cycle_attempts: default_max_cycle_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_cycle_attempts() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    500
}

/// History export and backup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// File name for the submissions CSV.
    #[serde(default = "default_csv_file_name")]
    pub csv_file_name: String,

    /// Directory JSON backups are written to.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    /// How many submissions the recent-history view shows.
    #[serde(default = "default_recent_history_limit")]
    pub recent_history_limit: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_file_name: default_csv_file_name(),
            backup_dir: default_backup_dir(),
            recent_history_limit: default_recent_history_limit(),
        }
    }
}

fn default_csv_file_name() -> String {
    "survey_feedback.csv".to_string()
}

fn default_backup_dir() -> String {
    ".".to_string()
}

fn default_recent_history_limit() -> usize {
    20
}
