// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persist cycles against the shared document store.
//!
//! A cycle is: apply the mutation to a copy of the baseline, fetch the store,
//! reconcile, overwrite the store, adopt the result. The baseline sits behind
//! a single async mutex that is held for the whole cycle, so a second submit
//! queues behind the first instead of reading a baseline the first has not
//! finalized yet.
//!
//! Questions, the scheduled queue, and the weekly schedule are overwritten
//! from the baseline on every cycle. Callers should `refresh()` before a
//! submit when the baseline may predate another console's edits.

use std::time::Duration;

use canvass_config::model::ConsoleConfig;
use canvass_core::{BroadcastMessage, CanvassError, Document, DocumentStore, GroupId};
use canvass_reconcile::Reconciler;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::mutation::{Mutation, WorkingCopy};

/// How often a whole cycle is attempted when the store is unavailable.
///
/// A failed write is not proof that nothing was written: a timed-out request
/// may still have landed. Cycles that queue a broadcast are therefore never
/// retried once the write has been attempted, so the bot cannot receive the
/// same message twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

impl From<&ConsoleConfig> for RetryPolicy {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            max_attempts: config.max_cycle_attempts.max(1),
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

/// Outcome of a successful persist cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// The new local baseline. Its `broadcast_queue` is always empty.
    pub document: Document,
    /// The broadcast this cycle handed to the bot, if it produced one.
    pub handed_off: Option<BroadcastMessage>,
    /// Groups the bot discovered since the baseline was loaded.
    pub discovered_groups: Vec<GroupId>,
}

/// The administrator's side of the shared document.
pub struct Console<S> {
    store: S,
    reconciler: Reconciler,
    retry: RetryPolicy,
    clock: fn() -> DateTime<Utc>,
    baseline: Mutex<Document>,
}

impl<S: DocumentStore> Console<S> {
    /// A console with an empty baseline. Call [`refresh`](Self::refresh) first.
    pub fn new(store: S) -> Self {
        Self {
            store,
            reconciler: Reconciler::default(),
            retry: RetryPolicy::default(),
            clock: Utc::now,
            baseline: Mutex::new(Document::default()),
        }
    }

    /// A console whose retry behavior comes from the `[console]` section.
    pub fn from_config(store: S, config: &ConsoleConfig) -> Self {
        Self::new(store).with_retry(RetryPolicy::from(config))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Overrides the wall clock used for scheduled-message ids.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The current local baseline.
    pub async fn snapshot(&self) -> Document {
        self.baseline.lock().await.clone()
    }

    /// Replaces the local baseline with the store's current document and
    /// returns the document as fetched.
    ///
    /// A broadcast still pending in the store is returned but not adopted:
    /// the local mailbox only ever holds a message queued by this console,
    /// otherwise the next save would hand the bot the same message again.
    /// On failure the baseline is left as it was.
    pub async fn refresh(&self) -> Result<Document, CanvassError> {
        let mut baseline = self.baseline.lock().await;
        let fetched = self.store.fetch_document().await?;
        debug!(
            store = self.store.name(),
            questions = fetched.questions.len(),
            groups = fetched.groups.len(),
            submissions = fetched.history.len(),
            broadcast_pending = fetched.broadcast_queue.is_some(),
            "baseline refreshed"
        );
        let mut next = fetched.clone();
        next.broadcast_queue = None;
        *baseline = next;
        Ok(fetched)
    }

    /// Runs one persist cycle for `mutation`.
    ///
    /// Validation failures return before any network call. Store failures
    /// leave the baseline as it was; a failed fetch also leaves the store
    /// untouched.
    pub async fn submit(&self, mutation: Mutation) -> Result<Reconciled, CanvassError> {
        self.cycle(mutation).await.map_err(|failure| failure.error)
    }

    /// Like [`submit`](Self::submit), but repeats the whole cycle (never just
    /// the write) while the store is unavailable, up to the retry policy.
    ///
    /// A broadcast is not re-sent after a failed write; see [`RetryPolicy`].
    pub async fn submit_with_retry(&self, mutation: Mutation) -> Result<Reconciled, CanvassError> {
        let queues_broadcast = matches!(mutation, Mutation::QueueBroadcast(_));
        let mut attempt = 1;
        loop {
            let failure = match self.cycle(mutation.clone()).await {
                Ok(reconciled) => return Ok(reconciled),
                Err(failure) => failure,
            };
            if !failure.error.is_retryable() || attempt >= self.retry.max_attempts {
                return Err(failure.error);
            }
            if queues_broadcast && failure.step == Step::Replace {
                warn!(
                    attempt,
                    error = %failure.error,
                    "write of a queued broadcast failed, not retrying"
                );
                return Err(failure.error);
            }
            warn!(
                attempt,
                max_attempts = self.retry.max_attempts,
                step = ?failure.step,
                error = %failure.error,
                "persist cycle failed, retrying"
            );
            tokio::time::sleep(self.retry.backoff).await;
            attempt += 1;
        }
    }

    async fn cycle(&self, mutation: Mutation) -> Result<Reconciled, CycleFailure> {
        let mut baseline = self.baseline.lock().await;
        let kind = mutation.kind();

        let mut working = WorkingCopy::from(baseline.clone());
        mutation
            .apply(&mut working, (self.clock)())
            .map_err(Step::Apply.fails())?;

        let fetched = self
            .store
            .fetch_document()
            .await
            .map_err(Step::Fetch.fails())?;
        let merged = self
            .reconciler
            .reconcile(&working.document, &fetched, &working.removals)
            .map_err(Step::Reconcile.fails())?;
        self.store
            .replace_document(&merged)
            .await
            .map_err(Step::Replace.fails())?;

        let discovered_groups: Vec<GroupId> = merged
            .groups
            .iter()
            .filter(|g| working.document.group(&g.id).is_none())
            .map(|g| g.id.clone())
            .collect();
        let handed_off = working.document.broadcast_queue.take();

        let mut next = merged;
        next.broadcast_queue = None;
        *baseline = next.clone();

        info!(
            mutation = kind,
            store = self.store.name(),
            discovered = discovered_groups.len(),
            handed_off = handed_off.is_some(),
            "document persisted"
        );

        Ok(Reconciled {
            document: next,
            handed_off,
            discovered_groups,
        })
    }
}

/// The part of a persist cycle that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Apply,
    Fetch,
    Reconcile,
    Replace,
}

impl Step {
    fn fails(self) -> impl FnOnce(CanvassError) -> CycleFailure {
        move |error| CycleFailure { step: self, error }
    }
}

struct CycleFailure {
    step: Step,
    error: CanvassError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvass_core::{Group, Question};
    use canvass_test_utils::memory_store::Op;
    use canvass_test_utils::MemoryStore;

    fn fixed_clock() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_760_000_000_000).unwrap_or_default()
    }

    #[tokio::test]
    async fn refresh_seeds_baseline() {
        let store = MemoryStore::with_document(Document {
            questions: vec![Question::text("Q1")],
            ..Default::default()
        });
        let console = Console::new(store);
        let doc = console.refresh().await.unwrap();
        assert_eq!(doc.questions.len(), 1);
        assert_eq!(console.snapshot().await, doc);
    }

    #[tokio::test]
    async fn refresh_does_not_adopt_a_pending_broadcast() {
        let store = MemoryStore::with_document(Document {
            broadcast_queue: Some(BroadcastMessage::new("Hello")),
            ..Default::default()
        });
        let console = Console::new(store);
        let fetched = console.refresh().await.unwrap();
        assert_eq!(fetched.broadcast_queue, Some(BroadcastMessage::new("Hello")));
        assert!(console.snapshot().await.broadcast_queue.is_none());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_baseline() {
        let store = MemoryStore::with_document(Document {
            questions: vec![Question::text("Q1")],
            ..Default::default()
        });
        let console = Console::new(store.clone());
        console.refresh().await.unwrap();

        store.fail_next(Op::Fetch).await;
        assert!(console.refresh().await.is_err());
        assert_eq!(console.snapshot().await.questions.len(), 1);
    }

    #[tokio::test]
    async fn validation_failure_makes_no_network_call() {
        let store = MemoryStore::new();
        let console = Console::new(store.clone());
        let err = console
            .submit(Mutation::AddQuestion(Question::choice("Mood?", vec![])))
            .await
            .unwrap_err();
        assert!(matches!(err, CanvassError::ValidationFailed { .. }));
        assert_eq!(store.fetch_count(), 0);
        assert_eq!(store.replace_count(), 0);
    }

    #[tokio::test]
    async fn fetch_failure_aborts_before_writing() {
        let store = MemoryStore::new();
        let console = Console::new(store.clone());
        store.fail_next(Op::Fetch).await;

        let err = console
            .submit(Mutation::AddQuestion(Question::text("Q1")))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.replace_count(), 0);
        assert!(store.stored().await.is_none());
        assert!(console.snapshot().await.questions.is_empty());
    }

    #[tokio::test]
    async fn write_failure_keeps_baseline() {
        let store = MemoryStore::new();
        let console = Console::new(store.clone());
        store.fail_next(Op::Replace).await;

        assert!(console
            .submit(Mutation::QueueBroadcast(BroadcastMessage::new("Hello")))
            .await
            .is_err());
        assert_eq!(console.snapshot().await, Document::default());
    }

    #[tokio::test]
    async fn broadcast_is_handed_off_and_reset_locally() {
        let store = MemoryStore::new();
        let console = Console::new(store.clone());

        let result = console
            .submit(Mutation::QueueBroadcast(BroadcastMessage::new("Hello")))
            .await
            .unwrap();
        assert_eq!(result.handed_off, Some(BroadcastMessage::new("Hello")));
        assert!(result.document.broadcast_queue.is_none());
        assert!(console.snapshot().await.broadcast_queue.is_none());
        assert_eq!(
            store.stored().await.unwrap().broadcast_queue,
            Some(BroadcastMessage::new("Hello"))
        );
    }

    #[tokio::test]
    async fn discovered_groups_are_reported() {
        let store = MemoryStore::new();
        let console = Console::new(store.clone());
        console.refresh().await.unwrap();
        store.agent_discovers(Group::new(42, "new chat")).await;

        let result = console
            .submit(Mutation::AddQuestion(Question::text("Q1")))
            .await
            .unwrap();
        assert_eq!(result.discovered_groups, vec![GroupId::Number(42)]);
    }

    #[tokio::test]
    async fn retry_repeats_the_whole_cycle() {
        let store = MemoryStore::new();
        let console = Console::new(store.clone()).with_retry(RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(1),
        });
        store.fail_next(Op::Replace).await;

        console
            .submit_with_retry(Mutation::AddQuestion(Question::text("Q1")))
            .await
            .unwrap();
        assert_eq!(store.fetch_count(), 2);
        assert_eq!(store.replace_count(), 2);
        assert_eq!(store.stored().await.unwrap().questions.len(), 1);
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_attempts() {
        let store = MemoryStore::new();
        let console = Console::new(store.clone()).with_retry(RetryPolicy {
            max_attempts: 2,
            backoff: Duration::from_millis(1),
        });
        store.fail_next(Op::Fetch).await;
        store.fail_next(Op::Fetch).await;

        assert!(console
            .submit_with_retry(Mutation::AddQuestion(Question::text("Q1")))
            .await
            .is_err());
        assert_eq!(store.fetch_count(), 2);
        assert_eq!(store.replace_count(), 0);
    }

    #[tokio::test]
    async fn broadcast_is_not_retried_after_a_failed_write() {
        let store = MemoryStore::new();
        let console = Console::new(store.clone()).with_retry(RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(1),
        });
        store.fail_next(Op::Replace).await;

        let err = console
            .submit_with_retry(Mutation::QueueBroadcast(BroadcastMessage::new("Hello")))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.fetch_count(), 1);
        assert_eq!(store.replace_count(), 1);
    }

    #[tokio::test]
    async fn broadcast_is_retried_after_a_failed_fetch() {
        let store = MemoryStore::new();
        let console = Console::new(store.clone()).with_retry(RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(1),
        });
        store.fail_next(Op::Fetch).await;

        let result = console
            .submit_with_retry(Mutation::QueueBroadcast(BroadcastMessage::new("Hello")))
            .await
            .unwrap();
        assert_eq!(result.handed_off, Some(BroadcastMessage::new("Hello")));
        assert_eq!(store.fetch_count(), 2);
        assert_eq!(store.replace_count(), 1);
    }

    #[tokio::test]
    async fn validation_errors_are_not_retried() {
        let store = MemoryStore::new();
        let console = Console::new(store.clone()).with_retry(RetryPolicy {
            max_attempts: 5,
            backoff: Duration::from_millis(1),
        });
        assert!(console
            .submit_with_retry(Mutation::DeleteQuestion { index: 0 })
            .await
            .is_err());
        assert_eq!(store.fetch_count(), 0);
    }

    #[tokio::test]
    async fn injected_clock_seeds_schedule_ids() {
        let store = MemoryStore::new();
        let console = Console::new(store).with_clock(fixed_clock);
        let result = console
            .submit(Mutation::ScheduleMessage {
                text: "Shift starts soon".into(),
                time: fixed_clock(),
                include_survey: true,
            })
            .await
            .unwrap();
        assert_eq!(
            result.document.scheduled_queue[0].id,
            fixed_clock().timestamp_millis()
        );
    }

    #[test]
    fn retry_policy_from_config_never_drops_below_one() {
        let config = ConsoleConfig {
            max_cycle_attempts: 0,
            ..Default::default()
        };
        assert_eq!(RetryPolicy::from(&config).max_attempts, 1);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn persisted_cycle_is_logged() {
        let console = Console::new(MemoryStore::new());
        console
            .submit(Mutation::AddQuestion(Question::text("Q1")))
            .await
            .unwrap();
        assert!(logs_contain("document persisted"));
    }
}
