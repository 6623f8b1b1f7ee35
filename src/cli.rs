use chrono::{NaiveTime, Timelike};
use clap::{Parser, Subcommand};

use crate::{
    datetime::{self, NormalizationError, PickedDate, PickedTime},
    task::TaskId,
};

#[derive(Parser, Debug)]
#[command(
    name = "task-reminder",
    about = "Task list with exact-time reminders",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a task with a reminder.
    Add {
        #[arg(long)]
        content: String,
        /// Day of the reminder, `DD/MM/YYYY`.
        #[arg(long, value_parser = parse_date)]
        date: Option<PickedDate>,
        /// 24-hour clock time, `HH:MM`.
        #[arg(long, value_parser = parse_time)]
        time: Option<PickedTime>,
    },
    /// Change a task. Omitted fields keep their current value.
    Edit {
        id: TaskId,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_parser = parse_date)]
        date: Option<PickedDate>,
        #[arg(long, value_parser = parse_time)]
        time: Option<PickedTime>,
    },
    /// Delete one or more tasks.
    Delete {
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },
    /// Print every task, newest first.
    List {
        #[arg(long)]
        ascending: bool,
    },
    /// Keep reminders scheduled until Ctrl-C.
    Run,
}

fn parse_date(text: &str) -> Result<PickedDate, NormalizationError> {
    datetime::parse_display_date(text)
}

fn parse_time(text: &str) -> Result<PickedTime, chrono::ParseError> {
    let time = NaiveTime::parse_from_str(text.trim(), "%H:%M")?;
    Ok(PickedTime {
        hour: time.hour(),
        minute: time.minute(),
    })
}
