//! The task store: per-user ordered task lists with a
//! load/mutate/persist cycle.
//!
//! [`TaskStore`] owns the mapping from [`UserId`] to an ordered task
//! sequence. The mapping is loaded once from a [`SnapshotStorage`] at
//! startup; every mutating operation updates it in memory and then
//! synchronously rewrites the full snapshot before returning. There is
//! no teardown logic: the snapshot is the only durability mechanism.
//!
//! Ordinals are 1-based positions derived from current order. Removing
//! a task immediately renumbers everything after it. An absent user and
//! a user with an empty list are treated identically on every read
//! path.

use thiserror::Error;

use crate::snapshot::{self, SnapshotDocument, SnapshotError, SnapshotStorage};
use crate::task::{ListStats, Task};
use crate::user::UserId;

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Task text was empty after trimming.
    #[error("task text cannot be empty")]
    EmptyText,

    /// The user's task list is empty (or the user has no list, which is
    /// the same thing).
    #[error("the task list is empty")]
    EmptyList,

    /// The ordinal falls outside `1..=len`.
    #[error("no task #{given}: valid task numbers are 1 to {len}")]
    OutOfRange {
        /// The ordinal the caller asked for.
        given: usize,
        /// Current list length.
        len: usize,
    },

    /// The in-memory mutation was applied but the snapshot write
    /// failed. There is no rollback; the change may not survive a
    /// restart.
    #[error(transparent)]
    Persist(#[from] SnapshotError),
}

/// Outcome of a mutation that may find the list already in the
/// requested state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    /// The mutation was applied and the snapshot rewritten.
    Applied(T),
    /// The list was already in the requested state; nothing changed and
    /// nothing was written. Informational, not an error.
    Unchanged(T),
}

/// Per-user task lists with synchronous snapshot persistence.
pub struct TaskStore {
    lists: SnapshotDocument,
    storage: Box<dyn SnapshotStorage>,
}

impl core::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskStore")
            .field("lists", &self.lists)
            .finish_non_exhaustive()
    }
}

impl TaskStore {
    /// Loads the store from storage, starting empty when no document
    /// has been written yet.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Read`] if the medium cannot be read, or
    /// [`SnapshotError::Corrupt`] if a document exists but does not
    /// parse. Corruption is fatal: callers must not proceed with a
    /// partially-trusted mapping.
    pub fn open(storage: Box<dyn SnapshotStorage>) -> Result<Self, SnapshotError> {
        let lists = match storage.read()? {
            Some(raw) => snapshot::decode(&raw)?,
            None => SnapshotDocument::new(),
        };
        tracing::info!(users = lists.len(), "task store loaded");
        Ok(Self { lists, storage })
    }

    /// The user's tasks in ordinal order.
    ///
    /// Reads never create a mapping entry: an unknown user simply has
    /// an empty list, and looking at it is not a mutation.
    #[must_use]
    pub fn tasks(&self, user: &UserId) -> &[Task] {
        self.lists.get(user).map_or(&[], Vec::as_slice)
    }

    /// Appends a new incomplete task and returns its ordinal (equal to
    /// the new list length).
    ///
    /// The stored text is the trimmed text.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyText`] if `text` is empty after trimming;
    /// [`StoreError::Persist`] if the snapshot write fails (the task is
    /// still in the list).
    pub fn add_task(&mut self, user: &UserId, text: &str) -> Result<usize, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        let list = self.lists.entry(user.clone()).or_default();
        list.push(Task::new(text));
        let ordinal = list.len();
        tracing::debug!(user = %user, ordinal, "task added");
        self.persist()?;
        Ok(ordinal)
    }

    /// Sets the completion flag of the task at `ordinal`, returning the
    /// task afterwards.
    ///
    /// Returns [`Change::Unchanged`] when the task already has the
    /// requested flag; nothing is written in that case.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyList`], [`StoreError::OutOfRange`], or
    /// [`StoreError::Persist`].
    pub fn set_completed(
        &mut self,
        user: &UserId,
        ordinal: usize,
        completed: bool,
    ) -> Result<Change<Task>, StoreError> {
        let list = self.list_mut(user, ordinal)?;
        let task = &mut list[ordinal - 1];
        if task.completed == completed {
            return Ok(Change::Unchanged(task.clone()));
        }
        task.completed = completed;
        let task = task.clone();
        tracing::debug!(user = %user, ordinal, completed, "task completion updated");
        self.persist()?;
        Ok(Change::Applied(task))
    }

    /// Removes the task at `ordinal`, shifting every later task down by
    /// one ordinal. Returns the removed task.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyList`], [`StoreError::OutOfRange`], or
    /// [`StoreError::Persist`].
    pub fn remove_task(&mut self, user: &UserId, ordinal: usize) -> Result<Task, StoreError> {
        let list = self.list_mut(user, ordinal)?;
        let task = list.remove(ordinal - 1);
        tracing::debug!(user = %user, ordinal, "task removed");
        self.persist()?;
        Ok(task)
    }

    /// Empties the user's list, returning how many tasks were removed.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyList`] if the list is already empty;
    /// [`StoreError::Persist`] if the snapshot write fails.
    pub fn clear_all(&mut self, user: &UserId) -> Result<usize, StoreError> {
        let Some(list) = self.lists.get_mut(user).filter(|l| !l.is_empty()) else {
            return Err(StoreError::EmptyList);
        };
        let removed = list.len();
        list.clear();
        tracing::debug!(user = %user, removed, "list cleared");
        self.persist()?;
        Ok(removed)
    }

    /// Removes every completed task, preserving the relative order of
    /// the rest. Returns how many were removed, or
    /// [`Change::Unchanged`] when none were completed.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyList`] if the list is empty;
    /// [`StoreError::Persist`] if the snapshot write fails.
    pub fn clear_completed(&mut self, user: &UserId) -> Result<Change<usize>, StoreError> {
        let Some(list) = self.lists.get_mut(user).filter(|l| !l.is_empty()) else {
            return Err(StoreError::EmptyList);
        };
        let before = list.len();
        list.retain(|t| !t.completed);
        let removed = before - list.len();
        if removed == 0 {
            return Ok(Change::Unchanged(0));
        }
        tracing::debug!(user = %user, removed, "completed tasks cleared");
        self.persist()?;
        Ok(Change::Applied(removed))
    }

    /// Statistics over the user's list.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyList`] if the list is empty.
    pub fn stats(&self, user: &UserId) -> Result<ListStats, StoreError> {
        let tasks = self.tasks(user);
        if tasks.is_empty() {
            return Err(StoreError::EmptyList);
        }
        Ok(ListStats::of(tasks))
    }

    /// Validates an ordinal against the user's list and returns the
    /// list. Emptiness is checked before range, so `check 1` on an
    /// empty list reports `EmptyList`, not `OutOfRange`.
    fn list_mut(&mut self, user: &UserId, ordinal: usize) -> Result<&mut Vec<Task>, StoreError> {
        let Some(list) = self.lists.get_mut(user).filter(|l| !l.is_empty()) else {
            return Err(StoreError::EmptyList);
        };
        if ordinal < 1 || ordinal > list.len() {
            return Err(StoreError::OutOfRange {
                given: ordinal,
                len: list.len(),
            });
        }
        Ok(list)
    }

    /// Rewrites the full snapshot (all users, all tasks). Called after
    /// every successful mutation; on failure the in-memory change is
    /// retained and the error propagates to the caller.
    fn persist(&self) -> Result<(), SnapshotError> {
        let document = snapshot::encode(&self.lists)?;
        if let Err(e) = self.storage.write(&document) {
            tracing::error!(error = %e, "snapshot write failed; in-memory state retained");
            return Err(e);
        }
        Ok(())
    }
}
