//! Task drags: reorder within a column or transfer between columns.
//!
//! Columns have no capacity, so task moves only need the snapshot to agree
//! with the event.

use super::{locate, splice, MoveKind};
use crate::error::{ReorderError, Result};
use crate::intent::SyncIntent;
use crate::snapshot::CollectionSnapshot;
use crate::types::{ScopeKey, TaskDrag};

pub(super) fn reconcile(
    drag: &TaskDrag,
    kind: MoveKind,
    snapshot: &CollectionSnapshot,
) -> Result<Vec<SyncIntent>> {
    let Some(dest) = &drag.destination else {
        return Ok(Vec::new());
    };
    let source_scope = ScopeKey::Column(drag.source.list.clone());
    let source = snapshot.column(&drag.source.list)?;
    locate(source, drag.source.index, &source_scope, |t| t.id == drag.task)?;

    match kind {
        MoveKind::TaskWithinColumn => {
            let tasks = splice::move_within(source.as_slice(), drag.source.index, dest.index)
                .ok_or_else(|| {
                    ReorderError::stale(
                        &source_scope,
                        format!(
                            "destination index {} out of range for length {}",
                            dest.index,
                            source.len()
                        ),
                    )
                })?;

            Ok(vec![SyncIntent::ReplaceColumnTasks {
                board: snapshot.board.clone(),
                column: drag.source.list.clone(),
                tasks,
                expected: source.version,
            }])
        }
        MoveKind::TaskAcrossColumns => {
            let dest_scope = ScopeKey::Column(dest.list.clone());
            let destination = snapshot.column(&dest.list)?;
            if destination.items.iter().any(|t| t.id == drag.task) {
                return Err(ReorderError::stale(
                    &dest_scope,
                    format!("task {} already present", drag.task),
                ));
            }

            let (remaining, moved) = splice::remove_at(source.as_slice(), drag.source.index)
                .ok_or_else(|| ReorderError::stale(&source_scope, "task vanished"))?;
            let inserted = splice::insert_at(destination.as_slice(), dest.index, moved)
                .ok_or_else(|| {
                    ReorderError::stale(
                        &dest_scope,
                        format!(
                            "destination index {} out of range for length {}",
                            dest.index,
                            destination.len()
                        ),
                    )
                })?;

            // Source first: an interrupted sync loses the task from view
            // rather than showing it in two columns.
            Ok(vec![
                SyncIntent::ReplaceColumnTasks {
                    board: snapshot.board.clone(),
                    column: drag.source.list.clone(),
                    tasks: remaining,
                    expected: source.version,
                },
                SyncIntent::ReplaceColumnTasks {
                    board: snapshot.board.clone(),
                    column: dest.list.clone(),
                    tasks: inserted,
                    expected: destination.version,
                },
            ])
        }
        other => Err(ReorderError::invalid_value(
            "kind",
            format!("{} is not a task move", other),
        )),
    }
}
