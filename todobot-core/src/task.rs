//! Task data model and list statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single to-do item.
///
/// Tasks carry no identifier of their own: a task is addressed by its
/// 1-based position (ordinal) in the owning list, always derived from
/// the current order and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// The task description. Non-empty; stored under the `task` key in
    /// the snapshot document.
    #[serde(rename = "task")]
    pub text: String,
    /// Whether the task has been marked done.
    pub completed: bool,
    /// When the task was created (ISO-8601 on disk). Set once, immutable
    /// thereafter.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new incomplete task stamped with the current time.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Aggregate statistics over one user's task list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListStats {
    /// Number of tasks in the list.
    pub total: usize,
    /// Number of tasks marked completed.
    pub completed: usize,
    /// Number of tasks not yet completed.
    pub incomplete: usize,
    /// `completed / total × 100`; `0.0` for an empty list.
    pub completion_rate: f64,
}

impl ListStats {
    /// Computes statistics for a task slice.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        // Safe: list lengths are far below f64's exact integer range.
        let completion_rate = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        Self {
            total,
            completed,
            incomplete: total - completed,
            completion_rate,
        }
    }
}
