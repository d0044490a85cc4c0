//! Versioned, read-only view of a board's collections.
//!
//! The engine reads nothing but what is passed in here. Every sequence carries
//! the version it was read at; intents echo that version back so the store can
//! detect that another event got there first.

use crate::error::{ReorderError, Result};
use crate::types::{BoardId, ColumnId, ScopeKey, Task, TaskId, User, UserList};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Monotonic change counter for one scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// An ordered collection together with its version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub version: Version,
}

impl<T> Sequence<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            version: Version::default(),
        }
    }

    pub fn at_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Snapshot of the collections a drag may touch on one board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub board: BoardId,
    #[serde(default)]
    pub columns: HashMap<ColumnId, Sequence<Task>>,
    #[serde(default)]
    pub task_users: HashMap<TaskId, Sequence<User>>,
    #[serde(default)]
    pub pool: Sequence<User>,
}

impl CollectionSnapshot {
    /// Create an empty snapshot for a board
    pub fn new(board: impl Into<BoardId>) -> Self {
        Self {
            board: board.into(),
            columns: HashMap::new(),
            task_users: HashMap::new(),
            pool: Sequence::default(),
        }
    }

    /// Add a column's task list at version 0
    pub fn with_column(mut self, column: impl Into<ColumnId>, tasks: Vec<Task>) -> Self {
        self.columns.insert(column.into(), Sequence::new(tasks));
        self
    }

    /// Add a task's user list at version 0
    pub fn with_task_users(mut self, task: impl Into<TaskId>, users: Vec<User>) -> Self {
        self.task_users.insert(task.into(), Sequence::new(users));
        self
    }

    /// Set the unassigned pool
    pub fn with_pool(mut self, users: Vec<User>) -> Self {
        self.pool = Sequence::new(users);
        self
    }

    /// Insert an already-versioned column sequence
    pub fn insert_column(&mut self, column: ColumnId, tasks: Sequence<Task>) {
        self.columns.insert(column, tasks);
    }

    /// Insert an already-versioned task user sequence
    pub fn insert_task_users(&mut self, task: TaskId, users: Sequence<User>) {
        self.task_users.insert(task, users);
    }

    /// Task list of a column
    pub fn column(&self, column: &ColumnId) -> Result<&Sequence<Task>> {
        self.columns.get(column).ok_or_else(|| {
            ReorderError::stale(ScopeKey::Column(column.clone()), "column not in snapshot")
        })
    }

    /// User list of a task
    pub fn task_users(&self, task: &TaskId) -> Result<&Sequence<User>> {
        self.task_users.get(task).ok_or_else(|| {
            ReorderError::stale(ScopeKey::TaskUsers(task.clone()), "task not in snapshot")
        })
    }

    /// User list behind a drop target
    pub fn user_list(&self, list: &UserList) -> Result<&Sequence<User>> {
        match list {
            UserList::Pool => Ok(&self.pool),
            UserList::Task(task) => self.task_users(task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_is_stale() {
        let snapshot = CollectionSnapshot::new("b1");
        let err = snapshot.column(&ColumnId::from_string("a")).unwrap_err();
        assert!(matches!(err, ReorderError::StaleSnapshot { .. }));
    }

    #[test]
    fn test_user_list_lookup() {
        let snapshot = CollectionSnapshot::new("b1")
            .with_pool(vec![User::new("u1", "Sam")])
            .with_task_users("x", vec![]);

        assert_eq!(snapshot.user_list(&UserList::Pool).unwrap().len(), 1);
        assert!(snapshot
            .user_list(&UserList::Task("x".into()))
            .unwrap()
            .is_empty());
        assert!(snapshot.user_list(&UserList::Task("y".into())).is_err());
    }

    #[test]
    fn test_version_next() {
        assert_eq!(Version(4).next(), Version(5));
        assert_eq!(Version(4).to_string(), "v4");
    }
}
