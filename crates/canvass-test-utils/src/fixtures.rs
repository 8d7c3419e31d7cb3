// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document fixtures.

use canvass_core::{Answer, Document, Group, GroupId, Question, ScheduledMessage, Submission};
use chrono::{TimeZone, Utc};

pub fn group(id: i64, name: &str, enabled: bool) -> Group {
    Group {
        id: GroupId::Number(id),
        name: name.to_string(),
        enabled,
        is_admin: false,
    }
}

pub fn submission(user: &str, date: &str, answers: &[(&str, &str)]) -> Submission {
    Submission {
        date: date.to_string(),
        user: user.to_string(),
        answers: answers
            .iter()
            .map(|(q, a)| Answer {
                question: q.to_string(),
                answer: a.to_string(),
            })
            .collect(),
    }
}

pub fn scheduled(id: i64, text: &str, unix_secs: i64) -> ScheduledMessage {
    ScheduledMessage {
        id,
        text: text.to_string(),
        time: Utc
            .timestamp_opt(unix_secs, 0)
            .single()
            .unwrap_or_default(),
        include_survey: false,
    }
}

/// A document as a running deployment might hold it.
pub fn sample_document() -> Document {
    Document {
        questions: vec![
            Question::text("How was your route today?"),
            Question::choice(
                "Was the vehicle clean?",
                vec!["yes".to_string(), "no".to_string()],
            ),
        ],
        groups: vec![
            group(-1001, "North depot", true),
            group(-1002, "South depot", false),
        ],
        history: vec![submission(
            "Dana",
            "2026-10-14T17:05:00Z",
            &[
                ("How was your route today?", "Busy, but fine"),
                ("Was the vehicle clean?", "yes"),
            ],
        )],
        ..Default::default()
    }
}
