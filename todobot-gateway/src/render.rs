//! Presentation layer: turns engine outcomes into chat replies.
//!
//! The engine emits plain structured results; everything the user
//! actually sees lives here: checkbox markers, strikethrough for
//! completed tasks, the stats progress bar, corrective prompts for bad
//! arguments, and the static help screen. Each failure kind renders as
//! exactly one message class, and no-op notices render as
//! informational, never as errors.

use serde::{Deserialize, Serialize};
use todobot_core::command::Command;
use todobot_core::outcome::{ArgumentError, Failure, Notice, Outcome, Payload};
use todobot_core::task::{ListStats, Task};
use todobot_core::user::UserId;

/// Marker for a task that is not yet completed.
pub const UNCHECKED: &str = "☐";
/// Marker for a completed task.
pub const CHECKED: &str = "☑";

/// Number of cells in the stats progress bar.
const PROGRESS_BAR_WIDTH: usize = 20;

/// A rendered chat reply: a short title line and a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// One-line headline.
    pub title: String,
    /// Body text, possibly multiple lines.
    pub body: String,
}

impl Reply {
    fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Renders one command outcome into a reply addressed to `user`.
///
/// `prefix` is the configured command prefix, used in examples and
/// usage hints.
#[must_use]
pub fn render(user: &UserId, prefix: &str, outcome: &Outcome) -> Reply {
    match outcome {
        Outcome::Success(payload) => render_payload(user, prefix, payload),
        Outcome::Unchanged(notice) => render_notice(*notice),
        Outcome::Failure(failure) => render_failure(prefix, failure),
    }
}

fn render_payload(user: &UserId, prefix: &str, payload: &Payload) -> Reply {
    match payload {
        Payload::Added { text, ordinal } => Reply::new(
            "Task Added",
            format!("{UNCHECKED} {text}\nTask #{ordinal}"),
        ),
        Payload::Listing { tasks } => render_listing(user, prefix, tasks),
        Payload::Checked { task, .. } => {
            Reply::new("Task Completed!", format!("{CHECKED} {}", strike(&task.text)))
        }
        Payload::Unchecked { task, .. } => Reply::new(
            "Task Marked Incomplete",
            format!("{UNCHECKED} {}", task.text),
        ),
        Payload::Removed { task } => Reply::new("Task Removed", format!("Removed: {}", task.text)),
        Payload::Cleared { removed } => Reply::new(
            "List Cleared",
            format!("Removed all {removed} task(s) from your list."),
        ),
        Payload::CompletedCleared { removed } => Reply::new(
            "Completed Tasks Cleared",
            format!("Removed {removed} completed task(s)."),
        ),
        Payload::Stats(stats) => render_stats(*stats),
        Payload::Help => Reply::new("To-Do List Commands", help_body(prefix)),
    }
}

fn render_listing(user: &UserId, prefix: &str, tasks: &[Task]) -> Reply {
    if tasks.is_empty() {
        return Reply::new(
            "Your To-Do List",
            format!("Your list is empty! Use `{prefix}add <task>` to add tasks."),
        );
    }

    let mut lines: Vec<String> = Vec::with_capacity(tasks.len() + 1);
    for (idx, task) in tasks.iter().enumerate() {
        let (checkbox, text) = if task.completed {
            (CHECKED, strike(&task.text))
        } else {
            (UNCHECKED, task.text.clone())
        };
        lines.push(format!("**{}.** {checkbox} {text}", idx + 1));
    }
    let completed = tasks.iter().filter(|t| t.completed).count();
    lines.push(format!("{completed}/{} tasks completed", tasks.len()));

    Reply::new(format!("{user}'s To-Do List"), lines.join("\n"))
}

fn render_stats(stats: ListStats) -> Reply {
    let body = format!(
        "Total Tasks: {}\nCompleted: {}\nIncomplete: {}\nCompletion Rate: {:.1}%\n`{}`",
        stats.total,
        stats.completed,
        stats.incomplete,
        stats.completion_rate,
        progress_bar(stats.completion_rate),
    );
    Reply::new("Your To-Do Statistics", body)
}

fn render_notice(notice: Notice) -> Reply {
    let body = match notice {
        Notice::AlreadyCompleted { ordinal } => {
            format!("Task #{ordinal} is already completed!")
        }
        Notice::AlreadyIncomplete { ordinal } => {
            format!("Task #{ordinal} is already incomplete!")
        }
        Notice::NoCompletedTasks => "No completed tasks to remove!".to_string(),
    };
    Reply::new("Nothing To Do", body)
}

fn render_failure(prefix: &str, failure: &Failure) -> Reply {
    match failure {
        Failure::Argument(ArgumentError::MissingText) => Reply::new(
            "Missing Task Text",
            format!("Please provide a task! Example: `{prefix}add Buy groceries`"),
        ),
        Failure::Argument(ArgumentError::MissingNumber) => Reply::new(
            "Missing Task Number",
            format!("Please provide a task number! Example: `{prefix}check 1`"),
        ),
        Failure::Argument(ArgumentError::InvalidNumber { given }) => Reply::new(
            "Invalid Task Number",
            format!("`{given}` is not a valid number. Please provide a positive whole number."),
        ),
        Failure::EmptyList => Reply::new("Empty List", "Your to-do list is empty!"),
        Failure::OutOfRange { len, .. } => Reply::new(
            "Invalid Task Number",
            format!("Invalid task number! Please use a number between 1 and {len}."),
        ),
        Failure::NotSaved { detail } => Reply::new(
            "Saved In Memory Only",
            format!(
                "Your change was applied but could not be written to disk ({detail}). \
                 It may not survive a restart."
            ),
        ),
    }
}

/// Wraps text in chat-style strikethrough markers.
fn strike(text: &str) -> String {
    format!("~~{text}~~")
}

/// Builds the fixed-width progress bar for a completion rate in
/// percent.
fn progress_bar(completion_rate: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    // Safe: the rate is clamped to 0..=100, so filled fits in the bar.
    let filled = ((PROGRESS_BAR_WIDTH as f64 * completion_rate.clamp(0.0, 100.0)) / 100.0) as usize;
    let filled = filled.min(PROGRESS_BAR_WIDTH);
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

/// The static help screen, listing every command with its usage.
fn help_body(prefix: &str) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(Command::ALL.len() + 1);
    lines.push("Manage your personal to-do list with these commands:".to_string());
    for command in Command::ALL {
        let (args, description) = usage(command);
        let invocation = if args.is_empty() {
            format!("{prefix}{}", command.name())
        } else {
            format!("{prefix}{} {args}", command.name())
        };
        lines.push(format!("`{invocation}` - {description}"));
    }
    lines.join("\n")
}

/// Argument placeholder and description for the help screen.
const fn usage(command: Command) -> (&'static str, &'static str) {
    match command {
        Command::Add => ("<task>", "Add a new task to your to-do list"),
        Command::List => ("", "View all your tasks with checkboxes"),
        Command::Check => ("<number>", "Mark a task as completed"),
        Command::Uncheck => ("<number>", "Mark a task as incomplete"),
        Command::Remove => ("<number>", "Delete a task from your list"),
        Command::Clear => ("", "Remove all tasks from your list"),
        Command::ClearCompleted => ("", "Remove all completed tasks"),
        Command::Stats => ("", "View statistics about your tasks"),
        Command::Help => ("", "Show this command reference"),
    }
}
