// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only views over a fetched document: the submissions CSV, full JSON
//! backups, and the recent-history listing.
//!
//! Nothing here writes to the document store.

pub mod backup;
pub mod history;

pub use backup::{backup_file_name, backup_json, write_backup};
pub use history::{history_csv, recent_submissions, write_csv};

use canvass_core::CanvassError;

pub(crate) fn export_error<E>(source: E) -> CanvassError
where
    E: std::error::Error + Send + Sync + 'static,
{
    CanvassError::Export {
        source: Box::new(source),
    }
}
