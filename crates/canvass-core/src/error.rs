// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Canvass survey console.

use thiserror::Error;

/// The primary error type used across the document store, reconciler, and console.
#[derive(Debug, Error)]
pub enum CanvassError {
    /// The remote document store could not be reached or answered badly
    /// (network failure, timeout, non-2xx status, malformed body).
    ///
    /// Callers must assume the operation had no effect.
    #[error("store unavailable: {message}")]
    StoreUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A mutation violates an entity invariant or targets something that does
    /// not exist. Raised before any network call; local state is unchanged.
    #[error("validation failed: {message}")]
    ValidationFailed { message: String },

    /// A top-level document field has no merge policy registered.
    #[error("no merge policy registered for document field `{field}`")]
    PolicyGap { field: String },

    /// A registered merge policy cannot be applied to the field's shape.
    #[error("merge policy `{policy}` cannot be applied to document field `{field}`")]
    PolicyMismatch { field: String, policy: String },

    /// Configuration or client construction errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failures while writing exports (CSV, JSON backups).
    #[error("export error: {source}")]
    Export {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CanvassError {
    /// Shorthand for a [`CanvassError::ValidationFailed`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Shorthand for a [`CanvassError::StoreUnavailable`] wrapping a source error.
    pub fn store<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StoreUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether retrying the whole persist cycle could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}
