//! Scope keys and drop slots.
//!
//! A scope key names one positioned collection on a board. Task drags and user
//! drags address different slot types, so a task can never be dropped into a
//! user list (or the reverse) at the type level.

use super::ids::{ColumnId, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a positioned collection within one board
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "snake_case")]
pub enum ScopeKey {
    /// A column's task list
    Column(ColumnId),
    /// A task's assigned users
    TaskUsers(TaskId),
    /// The board's unassigned user pool
    Pool,
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(id) => write!(f, "column:{}", id),
            Self::TaskUsers(id) => write!(f, "task-users:{}", id),
            Self::Pool => f.write_str("pool"),
        }
    }
}

/// A list that user magnets can be dragged between
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserList {
    Pool,
    Task(TaskId),
}

impl UserList {
    pub fn is_pool(&self) -> bool {
        matches!(self, Self::Pool)
    }

    /// The scope key this list occupies
    pub fn scope(&self) -> ScopeKey {
        match self {
            Self::Pool => ScopeKey::Pool,
            Self::Task(id) => ScopeKey::TaskUsers(id.clone()),
        }
    }
}

impl From<TaskId> for UserList {
    fn from(id: TaskId) -> Self {
        Self::Task(id)
    }
}

/// A position inside a list: which list, and the index within it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot<L> {
    pub list: L,
    pub index: usize,
}

impl<L> Slot<L> {
    pub fn new(list: impl Into<L>, index: usize) -> Self {
        Self {
            list: list.into(),
            index,
        }
    }
}

impl<L: PartialEq> Slot<L> {
    /// Whether both slots address the same list, ignoring the index
    pub fn same_list(&self, other: &Self) -> bool {
        self.list == other.list
    }
}

/// Slot within a column's task list
pub type ColumnSlot = Slot<ColumnId>;

/// Slot within a user list (pool or task)
pub type UserSlot = Slot<UserList>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        assert_eq!(ScopeKey::Column("todo".into()).to_string(), "column:todo");
        assert_eq!(ScopeKey::TaskUsers("t1".into()).to_string(), "task-users:t1");
        assert_eq!(ScopeKey::Pool.to_string(), "pool");
    }

    #[test]
    fn test_user_list_scope() {
        assert_eq!(UserList::Pool.scope(), ScopeKey::Pool);
        assert_eq!(
            UserList::Task("t1".into()).scope(),
            ScopeKey::TaskUsers("t1".into())
        );
    }

    #[test]
    fn test_same_list_ignores_index() {
        let a = ColumnSlot::new("todo", 0);
        let b = ColumnSlot::new("todo", 3);
        let c = ColumnSlot::new("done", 0);
        assert!(a.same_list(&b));
        assert!(!a.same_list(&c));
    }
}
