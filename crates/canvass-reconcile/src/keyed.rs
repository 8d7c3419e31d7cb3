// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyed collections and the key-union merge.

use std::collections::BTreeSet;

use canvass_core::{Group, GroupId, ScheduledMessage};

/// An entry with a stable identity inside a list field.
pub trait Keyed {
    type Key: Ord + Clone;

    fn key(&self) -> &Self::Key;
}

impl Keyed for Group {
    type Key = GroupId;

    fn key(&self) -> &GroupId {
        &self.id
    }
}

impl Keyed for ScheduledMessage {
    type Key = i64;

    fn key(&self) -> &i64 {
        &self.id
    }
}

/// Keys the console explicitly deleted during the current persist cycle.
///
/// A key-union merge would otherwise re-append a deleted entry straight from
/// the store copy. Removals only live for one cycle: once the delete has been
/// written, a later rediscovery by the bot is a genuine create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removals {
    pub groups: BTreeSet<GroupId>,
    pub scheduled_messages: BTreeSet<i64>,
}

impl Removals {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.scheduled_messages.is_empty()
    }
}

/// Local entries in order, then store entries whose key is neither present
/// locally nor removed. Local entries always win on conflicting keys.
pub fn union_by_key<T>(local: &[T], store: &[T], removed: &BTreeSet<T::Key>) -> Vec<T>
where
    T: Keyed + Clone,
{
    let mut seen: BTreeSet<T::Key> = local.iter().map(|e| e.key().clone()).collect();
    let mut merged = local.to_vec();
    for entry in store {
        if removed.contains(entry.key()) {
            continue;
        }
        if seen.insert(entry.key().clone()) {
            merged.push(entry.clone());
        }
    }
    merged
}
