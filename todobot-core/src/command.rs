//! Command processor: maps chat commands onto store operations.
//!
//! A stateless, single-step dispatcher over a fixed, closed command
//! set. Raw argument text is validated here, so the store is only ever
//! invoked with well-typed arguments; parsing failures become
//! [`ArgumentError`] outcomes without touching the store. Each command
//! is an independent, complete request/response — there is no session
//! or pending state between commands.

use crate::outcome::{ArgumentError, Failure, Notice, Outcome, Payload};
use crate::store::{Change, StoreError, TaskStore};
use crate::user::UserId;

/// The closed set of commands the processor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Append a task.
    Add,
    /// Show the current list.
    List,
    /// Mark a task completed.
    Check,
    /// Mark a task incomplete.
    Uncheck,
    /// Delete a task.
    Remove,
    /// Delete all tasks.
    Clear,
    /// Delete completed tasks only.
    ClearCompleted,
    /// Show aggregate statistics.
    Stats,
    /// Show the command reference.
    Help,
}

impl Command {
    /// All commands, in help-screen order.
    pub const ALL: [Self; 9] = [
        Self::Add,
        Self::List,
        Self::Check,
        Self::Uncheck,
        Self::Remove,
        Self::Clear,
        Self::ClearCompleted,
        Self::Stats,
        Self::Help,
    ];

    /// Looks a command up by its chat name. Names are case-sensitive
    /// (`clearCompleted`, not `clearcompleted`); anything outside the
    /// closed set is `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "add" => Some(Self::Add),
            "list" => Some(Self::List),
            "check" => Some(Self::Check),
            "uncheck" => Some(Self::Uncheck),
            "remove" => Some(Self::Remove),
            "clear" => Some(Self::Clear),
            "clearCompleted" => Some(Self::ClearCompleted),
            "stats" => Some(Self::Stats),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    /// The chat-facing command name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::List => "list",
            Self::Check => "check",
            Self::Uncheck => "uncheck",
            Self::Remove => "remove",
            Self::Clear => "clear",
            Self::ClearCompleted => "clearCompleted",
            Self::Stats => "stats",
            Self::Help => "help",
        }
    }
}

/// Runs one command for one user and returns the structured outcome.
///
/// `args` is the raw argument text after the command name. `help` and
/// `list` are read-only and never trigger persistence.
pub fn dispatch(store: &mut TaskStore, user: &UserId, command: Command, args: &str) -> Outcome {
    match command {
        Command::Add => add(store, user, args),
        Command::List => Outcome::Success(Payload::Listing {
            tasks: store.tasks(user).to_vec(),
        }),
        Command::Check => set_completed(store, user, args, true),
        Command::Uncheck => set_completed(store, user, args, false),
        Command::Remove => remove(store, user, args),
        Command::Clear => clear(store, user),
        Command::ClearCompleted => clear_completed(store, user),
        Command::Stats => stats(store, user),
        Command::Help => Outcome::Success(Payload::Help),
    }
}

fn add(store: &mut TaskStore, user: &UserId, args: &str) -> Outcome {
    let text = args.trim();
    if text.is_empty() {
        return Outcome::Failure(ArgumentError::MissingText.into());
    }
    match store.add_task(user, text) {
        Ok(ordinal) => Outcome::Success(Payload::Added {
            text: text.to_string(),
            ordinal,
        }),
        Err(e) => Outcome::Failure(store_failure(e)),
    }
}

fn set_completed(store: &mut TaskStore, user: &UserId, args: &str, completed: bool) -> Outcome {
    let ordinal = match parse_ordinal(args) {
        Ok(n) => n,
        Err(e) => return Outcome::Failure(e.into()),
    };
    match store.set_completed(user, ordinal, completed) {
        Ok(Change::Applied(task)) => Outcome::Success(if completed {
            Payload::Checked { ordinal, task }
        } else {
            Payload::Unchecked { ordinal, task }
        }),
        Ok(Change::Unchanged(_)) => Outcome::Unchanged(if completed {
            Notice::AlreadyCompleted { ordinal }
        } else {
            Notice::AlreadyIncomplete { ordinal }
        }),
        Err(e) => Outcome::Failure(store_failure(e)),
    }
}

fn remove(store: &mut TaskStore, user: &UserId, args: &str) -> Outcome {
    let ordinal = match parse_ordinal(args) {
        Ok(n) => n,
        Err(e) => return Outcome::Failure(e.into()),
    };
    match store.remove_task(user, ordinal) {
        Ok(task) => Outcome::Success(Payload::Removed { task }),
        Err(e) => Outcome::Failure(store_failure(e)),
    }
}

fn clear(store: &mut TaskStore, user: &UserId) -> Outcome {
    match store.clear_all(user) {
        Ok(removed) => Outcome::Success(Payload::Cleared { removed }),
        Err(e) => Outcome::Failure(store_failure(e)),
    }
}

fn clear_completed(store: &mut TaskStore, user: &UserId) -> Outcome {
    match store.clear_completed(user) {
        Ok(Change::Applied(removed)) => Outcome::Success(Payload::CompletedCleared { removed }),
        Ok(Change::Unchanged(_)) => Outcome::Unchanged(Notice::NoCompletedTasks),
        Err(e) => Outcome::Failure(store_failure(e)),
    }
}

fn stats(store: &mut TaskStore, user: &UserId) -> Outcome {
    match store.stats(user) {
        Ok(stats) => Outcome::Success(Payload::Stats(stats)),
        Err(e) => Outcome::Failure(store_failure(e)),
    }
}

/// Parses a 1-based task number from raw argument text. Ordinals are
/// unsigned, so negative input is a malformed argument rather than an
/// out-of-range one.
fn parse_ordinal(args: &str) -> Result<usize, ArgumentError> {
    let raw = args.trim();
    if raw.is_empty() {
        return Err(ArgumentError::MissingNumber);
    }
    raw.parse().map_err(|_| ArgumentError::InvalidNumber {
        given: raw.to_string(),
    })
}

fn store_failure(err: StoreError) -> Failure {
    match err {
        StoreError::EmptyText => ArgumentError::MissingText.into(),
        StoreError::EmptyList => Failure::EmptyList,
        StoreError::OutOfRange { given, len } => Failure::OutOfRange { given, len },
        StoreError::Persist(e) => Failure::NotSaved {
            detail: e.to_string(),
        },
    }
}
