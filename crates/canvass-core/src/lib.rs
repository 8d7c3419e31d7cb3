// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Canvass survey console.
//!
//! This crate provides the shared [`Document`] model that the console and the
//! survey bot both read and overwrite, the workspace-wide [`CanvassError`]
//! taxonomy, and the [`DocumentStore`] capability that every store backend
//! implements.

pub mod error;
pub mod model;
pub mod traits;

// Re-export key items at crate root for ergonomic imports.
pub use error::CanvassError;
pub use model::{
    Answer, BroadcastMessage, Document, Group, GroupId, Question, QuestionKind, ScheduledMessage,
    Submission, WeeklySchedule,
};
pub use traits::DocumentStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvass_error_has_all_variants() {
        let _store = CanvassError::StoreUnavailable {
            message: "test".into(),
            source: None,
        };
        let _validation = CanvassError::ValidationFailed {
            message: "test".into(),
        };
        let _gap = CanvassError::PolicyGap {
            field: "test".into(),
        };
        let _mismatch = CanvassError::PolicyMismatch {
            field: "test".into(),
            policy: "test".into(),
        };
        let _config = CanvassError::Config("test".into());
        let _export = CanvassError::Export {
            source: Box::new(std::io::Error::other("test")),
        };
        let _internal = CanvassError::Internal("test".into());
    }

    #[test]
    fn only_store_failures_are_retryable() {
        let store = CanvassError::StoreUnavailable {
            message: "connection refused".into(),
            source: None,
        };
        assert!(store.is_retryable());
        assert!(!CanvassError::validation("empty text").is_retryable());
        assert!(!CanvassError::PolicyGap { field: "x".into() }.is_retryable());
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_document_store<T: DocumentStore>() {}
    }
}
