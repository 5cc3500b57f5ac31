//! Typed outcomes the command processor hands to the presentation
//! layer.
//!
//! The processor never formats user-facing text: it reports one of
//! three outcome classes and the renderer decides how each looks.
//! [`Outcome::Unchanged`] is deliberately distinct from both success
//! and failure — "already in the requested state" is a valid state of
//! a task list, not an exceptional condition, and callers should be
//! able to render it as informational without conflating it with a
//! genuine error.

use thiserror::Error;

use crate::task::{ListStats, Task};

/// The discriminated result of running one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The command did what was asked.
    Success(Payload),
    /// The list was already in the requested state.
    Unchanged(Notice),
    /// The command could not be carried out.
    Failure(Failure),
}

/// Success payloads, shaped per command.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `add`: the stored (trimmed) text and its new ordinal, equal to
    /// the new list length.
    Added {
        /// The text as stored.
        text: String,
        /// 1-based position of the new task.
        ordinal: usize,
    },
    /// `list`: the tasks in ordinal order. May be empty — an empty
    /// listing is a success, not a failure.
    Listing {
        /// Snapshot of the user's tasks.
        tasks: Vec<Task>,
    },
    /// `check`: the task after being marked complete.
    Checked {
        /// 1-based position of the task.
        ordinal: usize,
        /// The task as it now stands.
        task: Task,
    },
    /// `uncheck`: the task after being marked incomplete.
    Unchecked {
        /// 1-based position of the task.
        ordinal: usize,
        /// The task as it now stands.
        task: Task,
    },
    /// `remove`: the task that was deleted.
    Removed {
        /// The removed task.
        task: Task,
    },
    /// `clear`: how many tasks were deleted.
    Cleared {
        /// Number of tasks removed.
        removed: usize,
    },
    /// `clearCompleted`: how many completed tasks were deleted.
    CompletedCleared {
        /// Number of tasks removed.
        removed: usize,
    },
    /// `stats`: aggregate counts and completion rate.
    Stats(ListStats),
    /// `help`: static command reference; produced without touching the
    /// store.
    Help,
}

/// Informational no-op outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// `check` on a task that is already completed.
    AlreadyCompleted {
        /// 1-based position of the task.
        ordinal: usize,
    },
    /// `uncheck` on a task that is already incomplete.
    AlreadyIncomplete {
        /// 1-based position of the task.
        ordinal: usize,
    },
    /// `clearCompleted` when no task was completed.
    NoCompletedTasks,
}

/// Command failures. Each variant maps to exactly one user-facing
/// message class; none is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    /// The argument text was missing or malformed; the store was never
    /// consulted.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The user's task list is empty.
    #[error("the task list is empty")]
    EmptyList,

    /// The task number falls outside the current list.
    #[error("no task #{given}: valid task numbers are 1 to {len}")]
    OutOfRange {
        /// The ordinal the user asked for.
        given: usize,
        /// Current list length.
        len: usize,
    },

    /// The change was applied in memory but the snapshot write failed;
    /// it may not survive a restart.
    #[error("change applied but not saved: {detail}")]
    NotSaved {
        /// Description of the underlying write failure.
        detail: String,
    },
}

/// A malformed or missing command argument, carrying which argument
/// was expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The command requires task text and none was given.
    #[error("expected task text")]
    MissingText,
    /// The command requires a task number and none was given.
    #[error("expected a task number")]
    MissingNumber,
    /// The argument was present but is not a positive integer.
    #[error("`{given}` is not a valid task number")]
    InvalidNumber {
        /// The raw argument text.
        given: String,
    },
}
