//! Drag-end events

use super::ids::{TaskId, UserId};
use super::scope::{ColumnSlot, UserSlot};
use serde::{Deserialize, Serialize};

/// A completed drag gesture, discriminated by the kind of entity dragged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragEvent {
    Task(TaskDrag),
    User(UserDrag),
}

impl DragEvent {
    /// A task drag between (or within) columns
    pub fn task(
        task: impl Into<TaskId>,
        source: ColumnSlot,
        destination: Option<ColumnSlot>,
    ) -> Self {
        Self::Task(TaskDrag {
            task: task.into(),
            source,
            destination,
        })
    }

    /// A user magnet drag between (or within) user lists
    pub fn user(user: impl Into<UserId>, source: UserSlot, destination: Option<UserSlot>) -> Self {
        Self::User(UserDrag {
            user: user.into(),
            source,
            destination,
        })
    }

    /// Whether the drag ended outside any droppable list
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Task(drag) => drag.destination.is_none(),
            Self::User(drag) => drag.destination.is_none(),
        }
    }

    /// The dragged entity's id as a plain string
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Task(drag) => drag.task.as_str(),
            Self::User(drag) => drag.user.as_str(),
        }
    }
}

/// A task dragged from one column slot to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDrag {
    pub task: TaskId,
    pub source: ColumnSlot,
    /// `None` when the drag was cancelled
    pub destination: Option<ColumnSlot>,
}

/// A user magnet dragged between the pool and task user lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDrag {
    pub user: UserId,
    pub source: UserSlot,
    /// `None` when the drag was cancelled
    pub destination: Option<UserSlot>,
}
