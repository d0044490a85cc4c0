//! Synchronization intents produced by the engine.
//!
//! Each intent maps to exactly one remote call. The order of a list of intents
//! is significant and must be preserved by whoever applies them.

use crate::snapshot::Version;
use crate::types::{BoardId, ColumnId, ScopeKey, Task, TaskId, User};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single declarative write toward the store and the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SyncIntent {
    /// Replace a column's ordered task list
    ReplaceColumnTasks {
        board: BoardId,
        column: ColumnId,
        tasks: Vec<Task>,
        expected: Version,
    },
    /// Replace a task's ordered user list
    ReplaceTaskUsers {
        task: TaskId,
        users: Vec<User>,
        expected: Version,
    },
    /// Create an assignment of a pool user to a task
    Attach {
        task: TaskId,
        user: User,
        expected: Version,
    },
    /// Remove a user's assignment from a task
    Detach {
        task: TaskId,
        user: User,
        expected: Version,
    },
}

impl SyncIntent {
    /// The scope this intent writes
    pub fn scope(&self) -> ScopeKey {
        match self {
            Self::ReplaceColumnTasks { column, .. } => ScopeKey::Column(column.clone()),
            Self::ReplaceTaskUsers { task, .. }
            | Self::Attach { task, .. }
            | Self::Detach { task, .. } => ScopeKey::TaskUsers(task.clone()),
        }
    }

    /// Version of the scope the intent was computed against
    pub fn expected(&self) -> Version {
        match self {
            Self::ReplaceColumnTasks { expected, .. }
            | Self::ReplaceTaskUsers { expected, .. }
            | Self::Attach { expected, .. }
            | Self::Detach { expected, .. } => *expected,
        }
    }

    /// Short operation name used in logs and remote error reports
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::ReplaceColumnTasks { .. } => "replace column tasks",
            Self::ReplaceTaskUsers { .. } => "replace task users",
            Self::Attach { .. } => "attach user",
            Self::Detach { .. } => "detach user",
        }
    }
}

impl fmt::Display for SyncIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReplaceColumnTasks { column, tasks, .. } => {
                let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
                write!(f, "replace({}, [{}])", column, ids.join(","))
            }
            Self::ReplaceTaskUsers { task, users, .. } => {
                let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
                write!(f, "replace({}, [{}])", task, ids.join(","))
            }
            Self::Attach { task, user, .. } => write!(f, "attach({}, {})", user.id, task),
            Self::Detach { user, .. } => write!(f, "detach({})", user.id),
        }
    }
}
