// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-document JSON backups.
//!
//! A backup is the document exactly as fetched, unknown fields included, so
//! it can be pushed back to a store by hand.

use std::path::{Path, PathBuf};

use canvass_core::{CanvassError, Document};
use chrono::NaiveDate;
use tracing::info;

use crate::export_error;

/// `database_backup_<YYYY-MM-DD>.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("database_backup_{}.json", date.format("%Y-%m-%d"))
}

/// Pretty-printed JSON for `document`.
pub fn backup_json(document: &Document) -> Result<String, CanvassError> {
    serde_json::to_string_pretty(document).map_err(export_error)
}

/// Writes a backup of `document` into `dir`, returning the file path.
///
/// A backup taken earlier the same day is overwritten.
pub fn write_backup(dir: &Path, document: &Document, date: NaiveDate) -> Result<PathBuf, CanvassError> {
    if !dir.is_dir() {
        return Err(export_error(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("backup directory not found: {}", dir.display()),
        )));
    }

    let path = dir.join(backup_file_name(date));
    let body = backup_json(document)?;
    std::fs::write(&path, body.as_bytes()).map_err(export_error)?;

    info!(
        path = %path.display(),
        bytes = body.len(),
        "document backup written"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvass_test_utils::fixtures::sample_document;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn file_name_carries_the_date() {
        assert_eq!(backup_file_name(date()), "database_backup_2026-10-16.json");
    }

    #[test]
    fn backup_is_pretty_and_parses_back() {
        let doc = sample_document();
        let json = backup_json(&doc).unwrap();
        assert!(json.contains('\n'));
        assert_eq!(Document::from_json_slice(json.as_bytes()).unwrap(), doc);
    }

    #[test]
    fn unknown_fields_are_kept_in_backups() {
        let doc = Document::from_json_slice(br#"{"bot_stats": {"sent": 4}}"#).unwrap();
        let json = backup_json(&doc).unwrap();
        assert!(json.contains("bot_stats"));
    }

    #[test]
    fn writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_backup(dir.path(), &sample_document(), date()).unwrap();
        assert_eq!(path, dir.path().join("database_backup_2026-10-16.json"));
        let body = std::fs::read(&path).unwrap();
        assert_eq!(
            Document::from_json_slice(&body).unwrap(),
            sample_document()
        );
    }

    #[test]
    fn missing_directory_is_an_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_backup(&missing, &sample_document(), date()).unwrap_err();
        assert!(matches!(err, CanvassError::Export { .. }));
    }
}
