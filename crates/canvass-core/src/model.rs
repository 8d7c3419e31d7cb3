// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The shared survey document and its entities.
//!
//! The wire format is a single JSON object. Every known top-level key is
//! optional on the wire: absent (or `null`) fields fall back to their default
//! instead of failing, because the schema grows over time and the bot and
//! the console are upgraded independently. Unknown top-level keys are kept in
//! [`Document::extra`] so the reconciler can refuse to silently drop them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::error::CanvassError;

/// The single shared aggregate both the console and the bot reconcile against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Survey questions, in the order the bot asks them. Console-owned.
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,

    /// Chats the bot knows about. Shared: the bot discovers, the console flags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<Group>,

    /// Submitted answers, append-only. Bot-owned.
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<Submission>,

    /// At most one pending broadcast. Console produces, bot consumes.
    #[serde(default, deserialize_with = "blank_message_as_none")]
    pub broadcast_queue: Option<BroadcastMessage>,

    /// Messages queued for delivery at a fixed time. Console-owned.
    #[serde(default, deserialize_with = "null_as_default")]
    pub scheduled_queue: Vec<ScheduledMessage>,

    /// The recurring weekly survey job. Console-owned.
    #[serde(default, deserialize_with = "null_as_default")]
    pub weekly_schedule: WeeklySchedule,

    /// Opaque marker of the last weekly run. Bot-owned; never interpreted here.
    ///
    /// An explicit `null` reads as `None` and is written back as an absent
    /// key. The bot treats both the same way.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_weekly_run: Option<serde_json::Value>,

    /// Top-level keys this build does not know about.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Document {
    /// Parses a document from the store's JSON body.
    ///
    /// An empty body or a literal `null` is the never-written store and yields
    /// the default document.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let parsed: Option<Self> = serde_json::from_slice(body)?;
        Ok(parsed.unwrap_or_default())
    }

    /// Looks up a group by id.
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    /// Looks up a group by id for mutation.
    pub fn group_mut(&mut self, id: &GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| &g.id == id)
    }

    /// Groups the bot should deliver surveys to.
    pub fn enabled_groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| g.enabled)
    }
}

/// Whether a question takes free text or one of a fixed set of options.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Text,
    Choice,
}

/// A single survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,

    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: QuestionKind,

    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
}

impl Question {
    /// A free-text question.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: QuestionKind::Text,
            options: Vec::new(),
        }
    }

    /// A multiple-choice question.
    pub fn choice(text: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            text: text.into(),
            kind: QuestionKind::Choice,
            options,
        }
    }

    /// Splits a comma-separated option list, trimming entries and dropping blanks.
    pub fn parse_options(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<(), CanvassError> {
        if self.text.trim().is_empty() {
            return Err(CanvassError::validation("question text must not be empty"));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(CanvassError::validation(format!(
                "question `{}` has a blank option",
                self.text
            )));
        }
        if self.kind == QuestionKind::Choice && self.options.is_empty() {
            return Err(CanvassError::validation(format!(
                "choice question `{}` needs at least one option",
                self.text
            )));
        }
        Ok(())
    }
}

/// Stable external identifier of a chat, as written by the bot.
///
/// Chat platforms hand out numeric ids, but the wire format is not ours to
/// narrow, so string ids are carried through as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupId {
    Number(i64),
    Text(String),
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupId::Number(n) => write!(f, "{n}"),
            GroupId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for GroupId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(n) => GroupId::Number(n),
            Err(_) => GroupId::Text(s.trim().to_string()),
        })
    }
}

impl From<i64> for GroupId {
    fn from(n: i64) -> Self {
        GroupId::Number(n)
    }
}

/// A chat the bot delivers surveys to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_admin: bool,
}

impl Group {
    pub fn new(id: impl Into<GroupId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: false,
            is_admin: false,
        }
    }
}

/// One question/answer pair inside a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
}

/// A completed survey, appended by the bot. Immutable once written.
///
/// `date` is kept exactly as the bot wrote it so the console never rewrites
/// bot-owned data when it passes history through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub answers: Vec<Answer>,
}

impl Submission {
    /// Parses `date` as RFC 3339, if it is one.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

/// The pending one-shot broadcast. On the wire it is a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BroadcastMessage {
    pub text: String,
}

impl BroadcastMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn validate(&self) -> Result<(), CanvassError> {
        if self.text.trim().is_empty() {
            return Err(CanvassError::validation("broadcast text must not be empty"));
        }
        Ok(())
    }
}

/// A message the bot sends once `time` has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,

    /// Read leniently (see [`parse_schedule_time`]); always written as RFC 3339.
    #[serde(default, deserialize_with = "lenient_time")]
    pub time: DateTime<Utc>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub include_survey: bool,
}

impl ScheduledMessage {
    pub fn validate(&self) -> Result<(), CanvassError> {
        if self.text.trim().is_empty() {
            return Err(CanvassError::validation(
                "scheduled message text must not be empty",
            ));
        }
        Ok(())
    }
}

/// The recurring weekly survey job.
///
/// `day_of_week` counts from Sunday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(default = "default_day_of_week")]
    pub day_of_week: u8,

    #[serde(default = "default_hour")]
    pub hour: u8,

    #[serde(default)]
    pub minute: u8,

    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self {
            day_of_week: default_day_of_week(),
            hour: default_hour(),
            minute: 0,
            enabled: false,
        }
    }
}

fn default_day_of_week() -> u8 {
    1 // Monday
}

fn default_hour() -> u8 {
    9
}

impl WeeklySchedule {
    pub fn validate(&self) -> Result<(), CanvassError> {
        if self.day_of_week > 6 {
            return Err(CanvassError::validation(format!(
                "weekly_schedule.day_of_week must be 0-6, got {}",
                self.day_of_week
            )));
        }
        if self.hour > 23 {
            return Err(CanvassError::validation(format!(
                "weekly_schedule.hour must be 0-23, got {}",
                self.hour
            )));
        }
        if self.minute > 59 {
            return Err(CanvassError::validation(format!(
                "weekly_schedule.minute must be 0-59, got {}",
                self.minute
            )));
        }
        Ok(())
    }
}

/// Deserializes `null` the same way as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses a scheduled time as RFC 3339 or, lacking an offset, as a naive
/// ISO-style timestamp taken to be UTC.
pub fn parse_schedule_time(raw: &str) -> Option<DateTime<Utc>> {
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Scheduled times arrive as strings or epoch milliseconds. Anything missing
/// or unreadable becomes the Unix epoch rather than failing the document.
fn lenient_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match &raw {
        None | Some(serde_json::Value::Null) => return Ok(DateTime::default()),
        Some(serde_json::Value::String(s)) => parse_schedule_time(s),
        Some(serde_json::Value::Number(n)) => {
            n.as_i64().and_then(DateTime::from_timestamp_millis)
        }
        Some(_) => None,
    };
    Ok(parsed.unwrap_or_else(|| {
        warn!(time = ?raw, "unreadable scheduled message time, using the epoch");
        DateTime::default()
    }))
}

/// An empty-string broadcast is no broadcast.
fn blank_message_as_none<'de, D>(deserializer: D) -> Result<Option<BroadcastMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    let message = Option::<BroadcastMessage>::deserialize(deserializer)?;
    Ok(message.filter(|m| !m.text.is_empty()))
}
