// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line surface and argument parsing.

use std::path::PathBuf;

use canvass_core::{CanvassError, GroupId};
use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};

/// Canvass - administrator console for a chat survey bot.
#[derive(Parser, Debug)]
#[command(name = "canvass", version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the shared document.
    Show {
        /// Print raw JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Manage survey questions.
    #[command(subcommand)]
    Question(QuestionCommand),
    /// Manage the chats the bot has joined.
    #[command(subcommand)]
    Group(GroupCommand),
    /// Queue a one-shot message for every enabled chat.
    Broadcast {
        /// Message text.
        text: String,
    },
    /// Manage timed messages.
    #[command(subcommand)]
    Schedule(ScheduleCommand),
    /// Show or change the weekly survey job.
    Weekly(WeeklyArgs),
    /// Write submissions or the full document to disk.
    #[command(subcommand)]
    Export(ExportCommand),
    /// List the most recent survey submissions.
    History {
        /// How many submissions to show (defaults to `export.recent_history_limit`).
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuestionCommand {
    /// Append a question.
    Add(QuestionArgs),
    /// Replace the question at a 1-based position.
    Edit {
        position: usize,
        #[command(flatten)]
        question: QuestionArgs,
    },
    /// Delete the question at a 1-based position.
    Rm { position: usize },
}

#[derive(Args, Debug)]
pub struct QuestionArgs {
    /// Question text.
    pub text: String,

    /// Comma-separated answer options; makes this a multiple-choice question.
    #[arg(long)]
    pub options: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    /// List known chats.
    List,
    /// Enable or disable survey delivery to a chat.
    Toggle {
        #[arg(allow_hyphen_values = true)]
        id: GroupId,
    },
    /// Grant or revoke admin status for a chat.
    Admin {
        #[arg(allow_hyphen_values = true)]
        id: GroupId,
    },
    /// Forget a chat.
    Rm {
        #[arg(allow_hyphen_values = true)]
        id: GroupId,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// Queue a message for a future time.
    Add {
        /// RFC 3339 timestamp, or `YYYY-MM-DD HH:MM` in local time.
        #[arg(value_parser = parse_when)]
        when: DateTime<Utc>,
        /// Message text.
        text: String,
        /// Start a survey after the message.
        #[arg(long)]
        survey: bool,
    },
    /// List pending timed messages.
    List,
    /// Cancel a pending timed message by id.
    Cancel { id: i64 },
}

#[derive(Args, Debug)]
pub struct WeeklyArgs {
    /// Day of week: 0-6 from Sunday, or a day name.
    #[arg(long, value_parser = parse_day)]
    pub day: Option<u8>,

    /// Time of day as `HH:MM`.
    #[arg(long, value_parser = parse_time)]
    pub at: Option<NaiveTime>,

    /// Turn the weekly survey on.
    #[arg(long, conflicts_with = "off")]
    pub on: bool,

    /// Turn the weekly survey off.
    #[arg(long)]
    pub off: bool,
}

impl WeeklyArgs {
    /// True when no change was requested.
    pub fn is_empty(&self) -> bool {
        self.day.is_none() && self.at.is_none() && !self.on && !self.off
    }
}

#[derive(Subcommand, Debug)]
pub enum ExportCommand {
    /// Write all answers as CSV.
    Csv {
        /// Output path (defaults to `export.csv_file_name`).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a dated JSON backup of the whole document.
    Backup {
        /// Output directory (defaults to `export.backup_dir`).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// Converts a 1-based position from the command line to an index.
pub fn position_to_index(position: usize) -> Result<usize, CanvassError> {
    position
        .checked_sub(1)
        .ok_or_else(|| CanvassError::validation("question positions start at 1"))
}

pub fn parse_when(input: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(input.trim(), "%Y-%m-%d %H:%M")
        .map_err(|_| format!("expected RFC 3339 or `YYYY-MM-DD HH:MM`, got `{input}`"))?;
    naive
        .and_local_timezone(Local)
        .single()
        .map(|at| at.with_timezone(&Utc))
        .ok_or_else(|| format!("`{input}` is ambiguous or skipped in local time"))
}

pub fn parse_day(input: &str) -> Result<u8, String> {
    const DAYS: [&str; 7] = [
        "sunday",
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
    ];
    let trimmed = input.trim();
    if let Ok(n) = trimmed.parse::<u8>() {
        return if n <= 6 {
            Ok(n)
        } else {
            Err(format!("day must be 0-6, got {n}"))
        };
    }
    let lower = trimmed.to_ascii_lowercase();
    DAYS.iter()
        .position(|d| lower == *d || lower == d[..3])
        .map(|i| i as u8)
        .ok_or_else(|| format!("unknown day `{input}`"))
}

pub fn parse_time(input: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| format!("expected `HH:MM`, got `{input}`"))
}
