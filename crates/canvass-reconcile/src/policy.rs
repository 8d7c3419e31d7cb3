// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The field ownership table.
//!
//! | Field | Owner | Policy |
//! |---|---|---|
//! | `questions` | console | overwrite |
//! | `groups` | shared | key union |
//! | `history` | bot | pass-through |
//! | `broadcast_queue` | console produces, bot consumes | one-shot mailbox |
//! | `scheduled_queue` | console | overwrite |
//! | `weekly_schedule` | console | overwrite |
//! | `last_weekly_run` | bot | pass-through |
//!
//! The bot runs the mirror image of this table. Changing an entry here
//! without changing it there breaks the protocol.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A top-level key of the shared document.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentField {
    Questions,
    Groups,
    History,
    BroadcastQueue,
    ScheduledQueue,
    WeeklySchedule,
    LastWeeklyRun,
}

/// How one field is resolved when the local and store copies disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FieldPolicy {
    /// Local value replaces the store value.
    ConsoleOverwrite,
    /// Local list first, then every store entry whose key the local list lacks.
    KeyUnion,
    /// Store value wins; the local copy is ignored.
    AgentPassThrough,
    /// A pending local value wins; otherwise the store value is kept.
    OneShotMailbox,
}

impl FieldPolicy {
    /// Which side owns the field under this policy, for logs and status output.
    pub fn owner(self) -> &'static str {
        match self {
            FieldPolicy::ConsoleOverwrite => "console",
            FieldPolicy::KeyUnion => "shared",
            FieldPolicy::AgentPassThrough => "agent",
            FieldPolicy::OneShotMailbox => "console->agent",
        }
    }
}

/// The policy table both sides of the protocol agree on.
pub const DEFAULT_POLICIES: &[(DocumentField, FieldPolicy)] = &[
    (DocumentField::Questions, FieldPolicy::ConsoleOverwrite),
    (DocumentField::Groups, FieldPolicy::KeyUnion),
    (DocumentField::History, FieldPolicy::AgentPassThrough),
    (DocumentField::BroadcastQueue, FieldPolicy::OneShotMailbox),
    (DocumentField::ScheduledQueue, FieldPolicy::ConsoleOverwrite),
    (DocumentField::WeeklySchedule, FieldPolicy::ConsoleOverwrite),
    (DocumentField::LastWeeklyRun, FieldPolicy::AgentPassThrough),
];
