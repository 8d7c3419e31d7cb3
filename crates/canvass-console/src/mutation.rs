// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrator intents and their in-memory application.
//!
//! A mutation validates its own invariants before touching the working copy.
//! The reconciler downstream trusts that its input is valid.

use canvass_core::{
    BroadcastMessage, CanvassError, Document, GroupId, Question, ScheduledMessage, WeeklySchedule,
};
use canvass_reconcile::Removals;
use chrono::{DateTime, Utc};

/// One administrator edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddQuestion(Question),
    UpdateQuestion { index: usize, question: Question },
    DeleteQuestion { index: usize },
    ToggleGroupEnabled { id: GroupId },
    ToggleGroupAdmin { id: GroupId },
    DeleteGroup { id: GroupId },
    ScheduleMessage {
        text: String,
        time: DateTime<Utc>,
        include_survey: bool,
    },
    CancelScheduled { id: i64 },
    QueueBroadcast(BroadcastMessage),
    SetWeeklySchedule(WeeklySchedule),
}

impl Mutation {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::AddQuestion(_) => "add_question",
            Mutation::UpdateQuestion { .. } => "update_question",
            Mutation::DeleteQuestion { .. } => "delete_question",
            Mutation::ToggleGroupEnabled { .. } => "toggle_group_enabled",
            Mutation::ToggleGroupAdmin { .. } => "toggle_group_admin",
            Mutation::DeleteGroup { .. } => "delete_group",
            Mutation::ScheduleMessage { .. } => "schedule_message",
            Mutation::CancelScheduled { .. } => "cancel_scheduled",
            Mutation::QueueBroadcast(_) => "queue_broadcast",
            Mutation::SetWeeklySchedule(_) => "set_weekly_schedule",
        }
    }

    /// Validates and applies this mutation to `copy`.
    ///
    /// `now` seeds scheduled-message ids. On error `copy` may be partially
    /// untouched but is never left invalid; callers discard it anyway.
    pub fn apply(self, copy: &mut WorkingCopy, now: DateTime<Utc>) -> Result<(), CanvassError> {
        let doc = &mut copy.document;
        match self {
            Mutation::AddQuestion(question) => {
                question.validate()?;
                doc.questions.push(question);
            }
            Mutation::UpdateQuestion { index, question } => {
                question.validate()?;
                let len = doc.questions.len();
                let slot = doc
                    .questions
                    .get_mut(index)
                    .ok_or_else(|| question_index_error(index, len))?;
                *slot = question;
            }
            Mutation::DeleteQuestion { index } => {
                if index >= doc.questions.len() {
                    return Err(question_index_error(index, doc.questions.len()));
                }
                doc.questions.remove(index);
            }
            Mutation::ToggleGroupEnabled { id } => {
                let group = doc.group_mut(&id).ok_or_else(|| unknown_group(&id))?;
                group.enabled = !group.enabled;
            }
            Mutation::ToggleGroupAdmin { id } => {
                let group = doc.group_mut(&id).ok_or_else(|| unknown_group(&id))?;
                group.is_admin = !group.is_admin;
            }
            Mutation::DeleteGroup { id } => {
                if doc.group(&id).is_none() {
                    return Err(unknown_group(&id));
                }
                doc.groups.retain(|g| g.id != id);
                copy.removals.groups.insert(id);
            }
            Mutation::ScheduleMessage {
                text,
                time,
                include_survey,
            } => {
                let message = ScheduledMessage {
                    id: next_schedule_id(doc, now),
                    text,
                    time,
                    include_survey,
                };
                message.validate()?;
                doc.scheduled_queue.push(message);
            }
            Mutation::CancelScheduled { id } => {
                let before = doc.scheduled_queue.len();
                doc.scheduled_queue.retain(|m| m.id != id);
                if doc.scheduled_queue.len() == before {
                    return Err(CanvassError::validation(format!(
                        "no scheduled message with id {id}"
                    )));
                }
                copy.removals.scheduled_messages.insert(id);
            }
            Mutation::QueueBroadcast(message) => {
                message.validate()?;
                doc.broadcast_queue = Some(message);
            }
            Mutation::SetWeeklySchedule(schedule) => {
                schedule.validate()?;
                doc.weekly_schedule = schedule;
            }
        }
        Ok(())
    }
}

/// The console's local document plus the deletions made in this cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingCopy {
    pub document: Document,
    pub removals: Removals,
}

impl From<Document> for WorkingCopy {
    fn from(document: Document) -> Self {
        Self {
            document,
            removals: Removals::default(),
        }
    }
}

/// Wall-clock milliseconds, bumped past every id already queued so ids stay
/// unique and increasing even when the clock stalls or steps back.
pub fn next_schedule_id(doc: &Document, now: DateTime<Utc>) -> i64 {
    let floor = doc
        .scheduled_queue
        .iter()
        .map(|m| m.id.saturating_add(1))
        .max()
        .unwrap_or(i64::MIN);
    now.timestamp_millis().max(floor)
}

fn question_index_error(index: usize, len: usize) -> CanvassError {
    CanvassError::validation(format!(
        "question index {index} is out of range ({len} questions)"
    ))
}

fn unknown_group(id: &GroupId) -> CanvassError {
    CanvassError::validation(format!("no group with id {id}"))
}
