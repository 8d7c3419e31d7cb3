// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Canvass survey console.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use canvass_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("store: {}", config.store.url);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{
    config_paths, load_config, load_config_from_path, load_config_from_paths,
    load_config_from_str,
};
pub use model::CanvassConfig;

use std::path::{Path, PathBuf};

/// Loads the XDG hierarchy plus environment and validates the result.
pub fn load_and_validate() -> Result<CanvassConfig, Vec<ConfigError>> {
    let paths = loader::config_paths();
    checked(loader::load_config_from_paths(&paths), || read_sources(&paths))
}

/// Loads one explicit file plus environment and validates the result.
pub fn load_and_validate_path(path: &Path) -> Result<CanvassConfig, Vec<ConfigError>> {
    let paths = [path.to_path_buf()];
    checked(loader::load_config_from_paths(&paths), || read_sources(&paths))
}

/// Loads an inline TOML document (no files, no environment) and validates it.
pub fn load_and_validate_str(toml_content: &str) -> Result<CanvassConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Turns a figment failure into diagnostics (reading `sources` only then) or
/// runs semantic validation on a successful extract.
fn checked(
    loaded: Result<CanvassConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<CanvassConfig, Vec<ConfigError>> {
    let config =
        loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Contents of the files in `paths` that exist, keyed by the absolute path
/// figment reports as an error's origin.
fn read_sources(paths: &[PathBuf]) -> Vec<(String, String)> {
    paths
        .iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(path).ok()?;
            let shown = std::path::absolute(path).unwrap_or_else(|_| path.clone());
            Some((shown.display().to_string(), content))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_skip_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("canvass.toml");
        std::fs::write(&present, "[console]\nlog_level = \"debug\"\n").unwrap();
        let missing = dir.path().join("absent.toml");

        let sources = read_sources(&[missing, present.clone()]);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].0, present.display().to_string());
        assert!(sources[0].1.contains("log_level"));
    }

    #[test]
    fn unknown_key_in_file_points_at_that_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canvass.toml");
        std::fs::write(&path, "[store]\ntimout_secs = 3\n").unwrap();

        let errors = load_and_validate_path(&path).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { suggestion: Some(s), .. } if s == "timeout_secs"
        )));
    }

    #[test]
    fn semantic_errors_come_from_validation() {
        let errors = load_and_validate_str("[export]\nrecent_history_limit = 0\n").unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { .. })));
    }
}
