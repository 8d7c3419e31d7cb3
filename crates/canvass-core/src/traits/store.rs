// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store trait for the shared survey document.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CanvassError;
use crate::model::Document;

/// A GET/PUT-style key-value store holding exactly one [`Document`].
///
/// The store offers no transactions, locking, or versioning. Every write is a
/// full overwrite, so all merge logic must happen before
/// [`replace_document`](DocumentStore::replace_document) is called.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Returns the human-readable name of this store backend.
    fn name(&self) -> &str;

    /// Fetches the last successfully stored document.
    ///
    /// A store that has never been written yields [`Document::default()`],
    /// never an error.
    async fn fetch_document(&self) -> Result<Document, CanvassError>;

    /// Overwrites the stored document in full.
    ///
    /// On error, callers must not assume any write occurred.
    async fn replace_document(&self, document: &Document) -> Result<(), CanvassError>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_document(&self) -> Result<Document, CanvassError> {
        (**self).fetch_document().await
    }

    async fn replace_document(&self, document: &Document) -> Result<(), CanvassError> {
        (**self).replace_document(document).await
    }
}
