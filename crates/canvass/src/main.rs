// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canvass - administrator console for a chat survey bot.
//!
//! This is the binary entry point. Every editing command runs exactly one
//! persist cycle against the shared document.

mod cli;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use canvass_config::model::CanvassConfig;
use canvass_console::{Console, Mutation};
use canvass_core::{BroadcastMessage, CanvassError, DocumentStore, Question, WeeklySchedule};
use canvass_store::HttpDocumentStore;
use chrono::Timelike;
use clap::Parser;
use colored::Colorize;
use tracing::debug;

use cli::{
    Cli, Commands, ExportCommand, GroupCommand, QuestionArgs, QuestionCommand, ScheduleCommand,
    WeeklyArgs,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => canvass_config::load_and_validate_path(path),
        None => canvass_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            canvass_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.console.log_level);
    if cli.plain || !std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        colored::control::set_override(false);
    }

    match run(cli.command, &config).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Connects to the configured store and executes one command.
async fn run(command: Commands, config: &CanvassConfig) -> Result<String, CanvassError> {
    let store = HttpDocumentStore::new(&config.store)?;
    debug!(url = store.url(), "using http document store");
    let console = Console::from_config(store, &config.console);
    execute(command, &console, config).await
}

/// Refreshes the baseline, then either renders it or submits one mutation.
async fn execute<S: DocumentStore>(
    command: Commands,
    console: &Console<S>,
    config: &CanvassConfig,
) -> Result<String, CanvassError> {
    let doc = console.refresh().await?;

    let mutation = match command {
        Commands::Show { json } => {
            return if json {
                serde_json::to_string_pretty(&doc)
                    .map(|s| s + "\n")
                    .map_err(|e| CanvassError::Internal(format!("failed to render document: {e}")))
            } else {
                Ok(render::document(&doc))
            };
        }
        Commands::Group(GroupCommand::List) => return Ok(render::groups(&doc.groups)),
        Commands::Schedule(ScheduleCommand::List) => {
            return Ok(render::scheduled(&doc.scheduled_queue));
        }
        Commands::History { limit } => {
            let limit = limit.unwrap_or(config.export.recent_history_limit);
            let recent = canvass_export::recent_submissions(&doc.history, limit);
            return Ok(render::history(&recent));
        }
        Commands::Weekly(args) if args.is_empty() => {
            return Ok(format!("{}\n", render::weekly(&doc.weekly_schedule)));
        }
        Commands::Export(ExportCommand::Csv { out }) => {
            let path = out.unwrap_or_else(|| PathBuf::from(&config.export.csv_file_name));
            let rows = canvass_export::write_csv(&doc.history, &path)?;
            return Ok(format!("{} {rows} rows to {}\n", "exported".green(), path.display()));
        }
        Commands::Export(ExportCommand::Backup { dir }) => {
            let dir = dir.unwrap_or_else(|| PathBuf::from(&config.export.backup_dir));
            let today = chrono::Local::now().date_naive();
            let path = canvass_export::write_backup(&dir, &doc, today)?;
            return Ok(format!("{} {}\n", "backup written to".green(), path.display()));
        }

        Commands::Question(QuestionCommand::Add(args)) => Mutation::AddQuestion(question(args)),
        Commands::Question(QuestionCommand::Edit { position, question: args }) => {
            Mutation::UpdateQuestion {
                index: cli::position_to_index(position)?,
                question: question(args),
            }
        }
        Commands::Question(QuestionCommand::Rm { position }) => Mutation::DeleteQuestion {
            index: cli::position_to_index(position)?,
        },
        Commands::Group(GroupCommand::Toggle { id }) => Mutation::ToggleGroupEnabled { id },
        Commands::Group(GroupCommand::Admin { id }) => Mutation::ToggleGroupAdmin { id },
        Commands::Group(GroupCommand::Rm { id }) => Mutation::DeleteGroup { id },
        Commands::Broadcast { text } => Mutation::QueueBroadcast(BroadcastMessage::new(text)),
        Commands::Schedule(ScheduleCommand::Add { when, text, survey }) => {
            Mutation::ScheduleMessage {
                text,
                time: when,
                include_survey: survey,
            }
        }
        Commands::Schedule(ScheduleCommand::Cancel { id }) => Mutation::CancelScheduled { id },
        Commands::Weekly(args) => {
            Mutation::SetWeeklySchedule(weekly(&args, doc.weekly_schedule))
        }
    };

    let kind = mutation.kind();
    let result = console.submit_with_retry(mutation).await?;

    let mut out = format!("{} {}\n", "saved".green().bold(), kind.replace('_', " "));
    if let Some(message) = &result.handed_off {
        out.push_str(&format!("broadcast queued for the bot: {}\n", message.text));
    }
    if !result.discovered_groups.is_empty() {
        let ids: Vec<String> = result
            .discovered_groups
            .iter()
            .map(ToString::to_string)
            .collect();
        out.push_str(&format!(
            "{} {}\n",
            "new groups from the bot:".yellow(),
            ids.join(", ")
        ));
    }
    Ok(out)
}

fn question(args: QuestionArgs) -> Question {
    match args.options {
        Some(raw) => Question::choice(args.text, Question::parse_options(&raw)),
        None => Question::text(args.text),
    }
}

/// Applies the requested changes over the stored schedule.
fn weekly(args: &WeeklyArgs, current: WeeklySchedule) -> WeeklySchedule {
    let mut next = current;
    if let Some(day) = args.day {
        next.day_of_week = day;
    }
    if let Some(at) = args.at {
        next.hour = at.hour() as u8;
        next.minute = at.minute() as u8;
    }
    if args.on {
        next.enabled = true;
    }
    if args.off {
        next.enabled = false;
    }
    next
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("canvass={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
