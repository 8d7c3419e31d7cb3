// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./canvass.toml` > `~/.config/canvass/canvass.toml` > `/etc/canvass/canvass.toml`
//! with environment variable overrides via `CANVASS_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CanvassConfig;

/// TOML files consulted by [`load_config`], lowest precedence first.
///
/// 1. `/etc/canvass/canvass.toml` (system-wide)
/// 2. `~/.config/canvass/canvass.toml` (user XDG config)
/// 3. `./canvass.toml` (local directory)
///
/// `CANVASS_*` environment variables are merged over all of them.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/canvass/canvass.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("canvass").join("canvass.toml"));
    }
    paths.push(PathBuf::from("canvass.toml"));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
pub fn load_config() -> Result<CanvassConfig, figment::Error> {
    load_config_from_paths(&config_paths())
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CanvassConfig, figment::Error> {
    load_config_from_paths(&[path.to_path_buf()])
}

/// Load configuration from `paths` (later files win) with env var overrides.
///
/// Missing files are skipped.
pub fn load_config_from_paths(paths: &[PathBuf]) -> Result<CanvassConfig, figment::Error> {
    build_figment(paths).extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CanvassConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CanvassConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Defaults, then each file in `paths`, then the environment.
pub fn build_figment(paths: &[PathBuf]) -> Figment {
    paths
        .iter()
        .fold(
            Figment::new().merge(Serialized::defaults(CanvassConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `CANVASS_STORE_TIMEOUT_SECS`
/// must map to `store.timeout_secs`, not `store.timeout.secs`.
fn env_provider() -> Env {
    Env::prefixed("CANVASS_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    key.replacen("store_", "store.", 1)
        .replacen("console_", "console.", 1)
        .replacen("export_", "export.", 1)
}
