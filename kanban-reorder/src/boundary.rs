//! Adapter for the drag-and-drop library's drop result.
//!
//! The UI hands over droppable ids as plain strings. Which id stands for the
//! unassigned pool is configuration; everything else is a column (task drags)
//! or a task (user drags).

use crate::error::{ReorderError, Result};
use crate::types::{ColumnSlot, DragEvent, TaskId, UserList, UserSlot};
use serde::{Deserialize, Serialize};

/// One end of a drop: which droppable, and where in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraggableLocation {
    pub droppable_id: String,
    pub index: usize,
}

/// The drop result as emitted by the drag library on drag end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropResult {
    pub draggable_id: String,
    /// `"task"` or `"user"`
    #[serde(rename = "type")]
    pub kind: String,
    pub source: DraggableLocation,
    #[serde(default)]
    pub destination: Option<DraggableLocation>,
}

impl DropResult {
    /// Convert into a typed drag event.
    ///
    /// `pool_id` is the droppable id of the unassigned pool.
    pub fn into_event(self, pool_id: &str) -> Result<DragEvent> {
        match self.kind.as_str() {
            "task" => {
                let source = ColumnSlot::new(self.source.droppable_id.as_str(), self.source.index);
                let destination = self
                    .destination
                    .map(|d| ColumnSlot::new(d.droppable_id.as_str(), d.index));
                Ok(DragEvent::task(self.draggable_id, source, destination))
            }
            "user" => {
                let to_list = |id: String| {
                    if id == pool_id {
                        UserList::Pool
                    } else {
                        UserList::Task(TaskId::from_string(id))
                    }
                };
                let source = UserSlot::new(to_list(self.source.droppable_id), self.source.index);
                let destination = self
                    .destination
                    .map(|d| UserSlot::new(to_list(d.droppable_id), d.index));
                Ok(DragEvent::user(self.draggable_id, source, destination))
            }
            other => Err(ReorderError::invalid_value(
                "type",
                format!("unknown draggable type '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnId;

    fn parse(json: &str) -> DropResult {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_task_drop() {
        let drop = parse(
            r#"{
                "draggableId": "T1",
                "type": "task",
                "source": {"droppableId": "A", "index": 0},
                "destination": {"droppableId": "B", "index": 1}
            }"#,
        );
        match drop.into_event("user-list").unwrap() {
            DragEvent::Task(drag) => {
                assert_eq!(drag.task.as_str(), "T1");
                assert_eq!(drag.source.list, ColumnId::from_string("A"));
                assert_eq!(drag.destination.unwrap().index, 1);
            }
            other => panic!("expected task drag, got {:?}", other),
        }
    }

    #[test]
    fn test_user_drop_maps_pool_id() {
        let drop = parse(
            r#"{
                "draggableId": "U1",
                "type": "user",
                "source": {"droppableId": "user-list", "index": 2},
                "destination": {"droppableId": "X", "index": 0}
            }"#,
        );
        match drop.into_event("user-list").unwrap() {
            DragEvent::User(drag) => {
                assert_eq!(drag.source.list, UserList::Pool);
                assert_eq!(drag.destination.unwrap().list, UserList::Task("X".into()));
            }
            other => panic!("expected user drag, got {:?}", other),
        }
    }

    #[test]
    fn test_null_destination_is_cancelled() {
        let drop = parse(
            r#"{
                "draggableId": "U1",
                "type": "user",
                "source": {"droppableId": "X", "index": 0},
                "destination": null
            }"#,
        );
        assert!(drop.into_event("user-list").unwrap().is_cancelled());
    }

    #[test]
    fn test_unknown_type() {
        let drop = DropResult {
            draggable_id: "C1".into(),
            kind: "column".into(),
            source: DraggableLocation {
                droppable_id: "board".into(),
                index: 0,
            },
            destination: None,
        };
        assert!(matches!(
            drop.into_event("user-list"),
            Err(ReorderError::InvalidValue { .. })
        ));
    }
}
