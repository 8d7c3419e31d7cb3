// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The merge engine.
//!
//! Resolves every top-level field of the document by exactly one policy from
//! the table. Unknown top-level keys, or fields without a table entry, are a
//! [`CanvassError::PolicyGap`]: dropping them silently would lose data the
//! other side wrote.

use std::collections::{BTreeMap, BTreeSet};

use canvass_core::{CanvassError, Document};
use strum::IntoEnumIterator;
use tracing::{debug, error};

use crate::keyed::{union_by_key, Keyed, Removals};
use crate::policy::{DocumentField, FieldPolicy, DEFAULT_POLICIES};

/// Merges the console's local document with a freshly fetched store document
/// using the default policy table and no removals.
pub fn reconcile(local: &Document, store: &Document) -> Result<Document, CanvassError> {
    Reconciler::default().reconcile(local, store, &Removals::default())
}

/// A merge engine bound to one policy table.
#[derive(Debug, Clone)]
pub struct Reconciler {
    policies: BTreeMap<DocumentField, FieldPolicy>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::with_policies(DEFAULT_POLICIES.iter().copied())
    }
}

impl Reconciler {
    /// Builds a reconciler from an explicit table. Later entries for the same
    /// field replace earlier ones.
    pub fn with_policies(policies: impl IntoIterator<Item = (DocumentField, FieldPolicy)>) -> Self {
        Self {
            policies: policies.into_iter().collect(),
        }
    }

    /// The policy registered for `field`, if any.
    pub fn policy(&self, field: DocumentField) -> Option<FieldPolicy> {
        self.policies.get(&field).copied()
    }

    /// Produces the document to persist from the local and store copies.
    pub fn reconcile(
        &self,
        local: &Document,
        store: &Document,
        removals: &Removals,
    ) -> Result<Document, CanvassError> {
        if let Some(key) = local.extra.keys().chain(store.extra.keys()).next() {
            error!(field = %key, "document field has no merge policy");
            return Err(CanvassError::PolicyGap { field: key.clone() });
        }

        let mut merged = Document::default();
        for field in DocumentField::iter() {
            let Some(policy) = self.policy(field) else {
                error!(%field, "document field has no merge policy");
                return Err(CanvassError::PolicyGap {
                    field: field.to_string(),
                });
            };
            debug!(%field, %policy, owner = policy.owner(), "resolving field");
            resolve_field(field, policy, local, store, removals, &mut merged)?;
        }
        Ok(merged)
    }
}

fn resolve_field(
    field: DocumentField,
    policy: FieldPolicy,
    local: &Document,
    store: &Document,
    removals: &Removals,
    merged: &mut Document,
) -> Result<(), CanvassError> {
    match field {
        DocumentField::Questions => {
            merged.questions = resolve_value(field, policy, &local.questions, &store.questions)?;
        }
        DocumentField::Groups => {
            merged.groups =
                resolve_keyed(field, policy, &local.groups, &store.groups, &removals.groups)?;
        }
        DocumentField::History => {
            merged.history = resolve_value(field, policy, &local.history, &store.history)?;
        }
        DocumentField::BroadcastQueue => {
            merged.broadcast_queue =
                resolve_slot(field, policy, &local.broadcast_queue, &store.broadcast_queue)?;
        }
        DocumentField::ScheduledQueue => {
            merged.scheduled_queue = resolve_keyed(
                field,
                policy,
                &local.scheduled_queue,
                &store.scheduled_queue,
                &removals.scheduled_messages,
            )?;
        }
        DocumentField::WeeklySchedule => {
            merged.weekly_schedule =
                resolve_value(field, policy, &local.weekly_schedule, &store.weekly_schedule)?;
        }
        DocumentField::LastWeeklyRun => {
            merged.last_weekly_run =
                resolve_value(field, policy, &local.last_weekly_run, &store.last_weekly_run)?;
        }
    }
    Ok(())
}

/// Whole-value fields: only the overwrite and pass-through policies apply.
fn resolve_value<T: Clone>(
    field: DocumentField,
    policy: FieldPolicy,
    local: &T,
    store: &T,
) -> Result<T, CanvassError> {
    match policy {
        FieldPolicy::ConsoleOverwrite => Ok(local.clone()),
        FieldPolicy::AgentPassThrough => Ok(store.clone()),
        FieldPolicy::KeyUnion | FieldPolicy::OneShotMailbox => Err(mismatch(field, policy)),
    }
}

fn resolve_keyed<T: Keyed + Clone>(
    field: DocumentField,
    policy: FieldPolicy,
    local: &[T],
    store: &[T],
    removed: &BTreeSet<T::Key>,
) -> Result<Vec<T>, CanvassError> {
    match policy {
        FieldPolicy::KeyUnion => Ok(union_by_key(local, store, removed)),
        FieldPolicy::ConsoleOverwrite => Ok(local.to_vec()),
        FieldPolicy::AgentPassThrough => Ok(store.to_vec()),
        FieldPolicy::OneShotMailbox => Err(mismatch(field, policy)),
    }
}

/// Optional single-value fields. An occupied local slot is fresh console
/// intent; an empty one must not clear what the bot has yet to consume.
fn resolve_slot<T: Clone>(
    field: DocumentField,
    policy: FieldPolicy,
    local: &Option<T>,
    store: &Option<T>,
) -> Result<Option<T>, CanvassError> {
    match policy {
        FieldPolicy::OneShotMailbox => Ok(local.clone().or_else(|| store.clone())),
        FieldPolicy::ConsoleOverwrite => Ok(local.clone()),
        FieldPolicy::AgentPassThrough => Ok(store.clone()),
        FieldPolicy::KeyUnion => Err(mismatch(field, policy)),
    }
}

fn mismatch(field: DocumentField, policy: FieldPolicy) -> CanvassError {
    error!(%field, %policy, "merge policy does not fit field shape");
    CanvassError::PolicyMismatch {
        field: field.to_string(),
        policy: policy.to_string(),
    }
}
