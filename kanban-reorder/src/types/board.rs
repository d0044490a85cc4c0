//! Board-level types: Board, Column, Task, User

use super::ids::{BoardId, ColumnId, TaskId, UserId};
use serde::{Deserialize, Serialize};

/// The board - metadata plus the display order of its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    /// Column ids in display order
    #[serde(default)]
    pub columns: Vec<ColumnId>,
}

impl Board {
    /// Create a new board with the given title and no columns
    pub fn new(id: impl Into<BoardId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            columns: Vec::new(),
        }
    }
}

/// A column defines a workflow stage and holds an ordered list of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A task/card on the board.
///
/// The assigned users are not stored on the task itself; they live in the
/// task's own user sequence so that column and user scopes stay separate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A user magnet: either in the board's unassigned pool or attached to one task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "userid")]
    pub id: UserId,
    /// Display name; at most one user per task may carry a given name
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_accepts_backend_field_name() {
        let user: User = serde_json::from_str(r#"{"userid": "u7", "name": "Sam"}"#).unwrap();
        assert_eq!(user.id.as_str(), "u7");
        assert_eq!(user.name, "Sam");
    }

    #[test]
    fn test_board_columns_default_empty() {
        let board: Board = serde_json::from_str(r#"{"id": "b1", "title": "Sprint"}"#).unwrap();
        assert!(board.columns.is_empty());
    }
}
