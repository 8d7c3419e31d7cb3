// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory document store for deterministic testing.
//!
//! `MemoryStore` implements `DocumentStore` over a single in-memory slot. It
//! can inject store failures and play the bot's side of the protocol
//! (discovering groups, appending submissions, consuming broadcasts), either
//! immediately or wedged between a console fetch and its write.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use canvass_core::{BroadcastMessage, CanvassError, Document, DocumentStore, Group, Submission};

type AgentWrite = Box<dyn FnOnce(&mut Document) + Send>;

/// Which store operation an injected failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Fetch,
    Replace,
}

/// A mock document store for testing.
#[derive(Clone, Default)]
pub struct MemoryStore {
    document: Arc<Mutex<Option<Document>>>,
    writes: Arc<Mutex<Vec<Document>>>,
    failures: Arc<Mutex<VecDeque<Op>>>,
    after_fetch: Arc<Mutex<VecDeque<AgentWrite>>>,
    fetches: Arc<AtomicUsize>,
    replaces: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// A store that has never been written.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `document`.
    pub fn with_document(document: Document) -> Self {
        Self {
            document: Arc::new(Mutex::new(Some(document))),
            ..Self::default()
        }
    }

    /// Make the next call of `op` fail with `StoreUnavailable`.
    pub async fn fail_next(&self, op: Op) {
        self.failures.lock().await.push_back(op);
    }

    /// Run `write` against the stored document right after the next
    /// successful fetch, as if the bot saved between the console's fetch and
    /// its write.
    pub async fn agent_writes_after_fetch<F>(&self, write: F)
    where
        F: FnOnce(&mut Document) + Send + 'static,
    {
        self.after_fetch.lock().await.push_back(Box::new(write));
    }

    /// The stored document, or `None` if nothing was ever written.
    pub async fn stored(&self) -> Option<Document> {
        self.document.lock().await.clone()
    }

    /// Every document written through `replace_document`, oldest first.
    pub async fn writes(&self) -> Vec<Document> {
        self.writes.lock().await.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn replace_count(&self) -> usize {
        self.replaces.load(Ordering::SeqCst)
    }

    /// Bot-side write: a newly discovered chat.
    pub async fn agent_discovers(&self, group: Group) {
        self.agent_write(|doc| doc.groups.push(group)).await;
    }

    /// Bot-side write: a completed survey.
    pub async fn agent_appends(&self, submission: Submission) {
        self.agent_write(|doc| doc.history.push(submission)).await;
    }

    /// Bot-side write: take the pending broadcast, if any.
    pub async fn agent_consumes_broadcast(&self) -> Option<BroadcastMessage> {
        let mut slot = self.document.lock().await;
        slot.get_or_insert_with(Document::default)
            .broadcast_queue
            .take()
    }

    async fn agent_write(&self, write: impl FnOnce(&mut Document)) {
        let mut slot = self.document.lock().await;
        write(slot.get_or_insert_with(Document::default));
    }

    async fn take_failure(&self, op: Op) -> Result<(), CanvassError> {
        let mut failures = self.failures.lock().await;
        if failures.front() == Some(&op) {
            failures.pop_front();
            return Err(CanvassError::StoreUnavailable {
                message: format!("injected {op:?} failure"),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_document(&self) -> Result<Document, CanvassError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.take_failure(Op::Fetch).await?;

        let fetched = self.document.lock().await.clone().unwrap_or_default();
        if let Some(write) = self.after_fetch.lock().await.pop_front() {
            self.agent_write(write).await;
        }
        Ok(fetched)
    }

    async fn replace_document(&self, document: &Document) -> Result<(), CanvassError> {
        self.replaces.fetch_add(1, Ordering::SeqCst);
        self.take_failure(Op::Replace).await?;

        *self.document.lock().await = Some(document.clone());
        self.writes.lock().await.push(document.clone());
        Ok(())
    }
}
