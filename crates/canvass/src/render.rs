// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable views of the shared document.

use std::fmt::Write;

use canvass_core::{Document, Group, QuestionKind, ScheduledMessage, Submission, WeeklySchedule};
use chrono::Local;
use colored::Colorize;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Summary printed by `canvass show`.
pub fn document(doc: &Document) -> String {
    let mut out = String::new();
    section(&mut out, "Questions");
    out.push_str(&questions(doc));
    section(&mut out, "Groups");
    out.push_str(&groups(&doc.groups));
    section(&mut out, "Scheduled messages");
    out.push_str(&scheduled(&doc.scheduled_queue));
    section(&mut out, "Weekly survey");
    let _ = writeln!(out, "  {}", weekly(&doc.weekly_schedule));
    if let Some(pending) = &doc.broadcast_queue {
        section(&mut out, "Pending broadcast");
        let _ = writeln!(out, "  {}", pending.text);
    }
    let _ = writeln!(
        out,
        "\n{} submissions recorded",
        doc.history.len().to_string().bold()
    );
    out
}

pub fn questions(doc: &Document) -> String {
    if doc.questions.is_empty() {
        return format!("  {}\n", "no questions".dimmed());
    }
    let mut out = String::new();
    for (i, q) in doc.questions.iter().enumerate() {
        let _ = write!(out, "  {:>2}. {}", i + 1, q.text);
        if q.kind == QuestionKind::Choice {
            let _ = write!(out, " {}", format!("[{}]", q.options.join(", ")).cyan());
        }
        out.push('\n');
    }
    out
}

pub fn groups(groups: &[Group]) -> String {
    if groups.is_empty() {
        return format!("  {}\n", "no groups yet; the bot adds them as it joins chats".dimmed());
    }
    let mut out = String::new();
    for g in groups {
        let state = if g.enabled {
            "enabled".green()
        } else {
            "disabled".red()
        };
        let _ = write!(out, "  {:<16} {:<24} {}", g.id.to_string(), g.name, state);
        if g.is_admin {
            let _ = write!(out, " {}", "admin".yellow());
        }
        out.push('\n');
    }
    out
}

pub fn scheduled(queue: &[ScheduledMessage]) -> String {
    if queue.is_empty() {
        return format!("  {}\n", "nothing scheduled".dimmed());
    }
    let mut out = String::new();
    for m in queue {
        let _ = write!(
            out,
            "  {:<14} {}  {}",
            m.id,
            m.time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            m.text
        );
        if m.include_survey {
            let _ = write!(out, " {}", "+survey".cyan());
        }
        out.push('\n');
    }
    out
}

pub fn weekly(schedule: &WeeklySchedule) -> String {
    let day = DAY_NAMES
        .get(usize::from(schedule.day_of_week))
        .copied()
        .unwrap_or("?");
    let state = if schedule.enabled {
        "on".green()
    } else {
        "off".red()
    };
    format!(
        "{day} at {:02}:{:02} ({state})",
        schedule.hour, schedule.minute
    )
}

pub fn history(recent: &[&Submission]) -> String {
    if recent.is_empty() {
        return format!("{}\n", "no feedback yet".dimmed());
    }
    let mut out = String::new();
    for s in recent {
        let date = s
            .parsed_date()
            .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| s.date.clone());
        let _ = writeln!(out, "{} {}", date.dimmed(), s.user.bold());
        for a in &s.answers {
            let _ = writeln!(out, "  {}: {}", a.question, a.answer);
        }
    }
    out
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{}", title.bold().underline());
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvass_test_utils::fixtures::{sample_document, submission};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn questions_are_numbered_from_one() {
        plain();
        let out = questions(&sample_document());
        assert!(out.contains(" 1. How was your route today?"));
        assert!(out.contains(" 2. Was the vehicle clean? [yes, no]"));
    }

    #[test]
    fn groups_show_state() {
        plain();
        let out = groups(&sample_document().groups);
        assert!(out.contains("North depot"));
        assert!(out.contains("enabled"));
        assert!(out.contains("disabled"));
    }

    #[test]
    fn weekly_defaults_read_monday_nine() {
        plain();
        assert_eq!(weekly(&WeeklySchedule::default()), "Monday at 09:00 (off)");
    }

    #[test]
    fn history_falls_back_to_stored_date() {
        plain();
        let s = submission("Dana", "yesterday", &[("Q1", "fine")]);
        let out = history(&[&s]);
        assert!(out.contains("yesterday Dana"));
        assert!(out.contains("  Q1: fine"));
    }

    #[test]
    fn document_summary_has_every_section() {
        plain();
        let out = document(&sample_document());
        for title in ["Questions", "Groups", "Scheduled messages", "Weekly survey"] {
            assert!(out.contains(title), "missing {title}");
        }
        assert!(out.contains("1 submissions recorded"));
    }
}
