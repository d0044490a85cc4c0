//! The reorder engine.
//!
//! Turns one drag-end event plus a snapshot of the affected collections into an
//! ordered list of [`SyncIntent`]s. Work happens in two phases: the new
//! collections are computed and validated first, and intents are only built
//! once every check has passed. A failed event therefore never yields a partial
//! intent list.
//!
//! Task drags and user drags are reconciled by separate functions; the
//! capacity and duplicate-name rules only exist on the user side.

mod splice;
mod task;
mod user;

use crate::error::{ReorderError, Result};
use crate::intent::SyncIntent;
use crate::snapshot::{CollectionSnapshot, Sequence};
use crate::types::DragEvent;
use crate::validate::AssignmentPolicy;
use serde::Serialize;
use std::fmt;
use tracing::debug;

pub use splice::{insert_at, move_within, remove_at};

/// What a drag event amounts to, before looking at any data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    /// Dropped outside any list
    Cancelled,
    /// Dropped back where it started
    Unchanged,
    TaskWithinColumn,
    TaskAcrossColumns,
    /// Reordered inside one user list; user lists are not positionally persisted
    UserWithinList,
    UserPoolToTask,
    UserTaskToPool,
    UserTaskToTask,
}

impl MoveKind {
    /// Whether this kind of move never produces intents
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Unchanged | Self::UserWithinList)
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cancelled => "cancelled",
            Self::Unchanged => "unchanged",
            Self::TaskWithinColumn => "task within column",
            Self::TaskAcrossColumns => "task across columns",
            Self::UserWithinList => "user within list",
            Self::UserPoolToTask => "user pool to task",
            Self::UserTaskToPool => "user task to pool",
            Self::UserTaskToTask => "user task to task",
        };
        f.write_str(name)
    }
}

/// Classify a drag purely from its source and destination
pub fn classify(event: &DragEvent) -> MoveKind {
    match event {
        DragEvent::Task(drag) => match &drag.destination {
            None => MoveKind::Cancelled,
            Some(dest) if *dest == drag.source => MoveKind::Unchanged,
            Some(dest) if dest.same_list(&drag.source) => MoveKind::TaskWithinColumn,
            Some(_) => MoveKind::TaskAcrossColumns,
        },
        DragEvent::User(drag) => match &drag.destination {
            None => MoveKind::Cancelled,
            Some(dest) if *dest == drag.source => MoveKind::Unchanged,
            Some(dest) if dest.same_list(&drag.source) => MoveKind::UserWithinList,
            Some(dest) => match (drag.source.list.is_pool(), dest.list.is_pool()) {
                (true, _) => MoveKind::UserPoolToTask,
                (false, true) => MoveKind::UserTaskToPool,
                (false, false) => MoveKind::UserTaskToTask,
            },
        },
    }
}

/// Reconciles drag events against snapshots under an assignment policy
#[derive(Debug, Clone, Default)]
pub struct ReorderEngine {
    policy: AssignmentPolicy,
}

impl ReorderEngine {
    /// Create an engine with the default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a specific assignment policy
    pub fn with_policy(policy: AssignmentPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AssignmentPolicy {
        &self.policy
    }

    /// Compute the intents for one drag-end event.
    ///
    /// Cancelled and unchanged drags return an empty list. Rejections
    /// (`CapacityExceeded`, `DuplicateAssignee`) and `StaleSnapshot` return an
    /// error and no intents at all.
    pub fn reconcile(
        &self,
        event: &DragEvent,
        snapshot: &CollectionSnapshot,
    ) -> Result<Vec<SyncIntent>> {
        let kind = classify(event);
        debug!(%kind, entity = event.entity_id(), "reconciling drag");

        if kind.is_noop() {
            return Ok(Vec::new());
        }

        let intents = match event {
            DragEvent::Task(drag) => task::reconcile(drag, kind, snapshot)?,
            DragEvent::User(drag) => user::reconcile(drag, kind, snapshot, &self.policy)?,
        };

        debug!(%kind, count = intents.len(), "drag reconciled");
        Ok(intents)
    }
}

/// Reconcile with the default assignment policy
pub fn reconcile(event: &DragEvent, snapshot: &CollectionSnapshot) -> Result<Vec<SyncIntent>> {
    ReorderEngine::new().reconcile(event, snapshot)
}

/// Fetch the entity at `index` and make sure it is the one the event names
fn locate<'a, T>(
    sequence: &'a Sequence<T>,
    index: usize,
    scope: impl fmt::Display,
    matches: impl Fn(&T) -> bool,
) -> Result<&'a T> {
    match sequence.items.get(index) {
        Some(item) if matches(item) => Ok(item),
        Some(_) => Err(ReorderError::stale(
            scope,
            format!("dragged entity is not at index {}", index),
        )),
        None => Err(ReorderError::stale(
            scope,
            format!("index {} out of range for length {}", index, sequence.len()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnSlot, UserList, UserSlot};
    use rstest::rstest;

    fn task_event(src: (&str, usize), dest: Option<(&str, usize)>) -> DragEvent {
        DragEvent::task(
            "t",
            ColumnSlot::new(src.0, src.1),
            dest.map(|(c, i)| ColumnSlot::new(c, i)),
        )
    }

    fn list(name: &str) -> UserList {
        if name == "pool" {
            UserList::Pool
        } else {
            UserList::Task(name.into())
        }
    }

    fn user_event(src: (&str, usize), dest: Option<(&str, usize)>) -> DragEvent {
        DragEvent::user(
            "u",
            UserSlot::new(list(src.0), src.1),
            dest.map(|(l, i)| UserSlot::new(list(l), i)),
        )
    }

    #[rstest]
    #[case(task_event(("a", 0), None), MoveKind::Cancelled)]
    #[case(task_event(("a", 1), Some(("a", 1))), MoveKind::Unchanged)]
    #[case(task_event(("a", 0), Some(("a", 2))), MoveKind::TaskWithinColumn)]
    #[case(task_event(("a", 0), Some(("b", 0))), MoveKind::TaskAcrossColumns)]
    #[case(user_event(("pool", 0), None), MoveKind::Cancelled)]
    #[case(user_event(("pool", 0), Some(("pool", 0))), MoveKind::Unchanged)]
    #[case(user_event(("pool", 0), Some(("pool", 2))), MoveKind::UserWithinList)]
    #[case(user_event(("x", 0), Some(("x", 1))), MoveKind::UserWithinList)]
    #[case(user_event(("pool", 1), Some(("x", 0))), MoveKind::UserPoolToTask)]
    #[case(user_event(("x", 0), Some(("pool", 0))), MoveKind::UserTaskToPool)]
    #[case(user_event(("x", 0), Some(("y", 0))), MoveKind::UserTaskToTask)]
    fn test_classify(#[case] event: DragEvent, #[case] expected: MoveKind) {
        assert_eq!(classify(&event), expected);
    }

    #[test]
    fn test_noop_kinds_skip_snapshot_lookup() {
        // An empty snapshot would be stale for any real move
        let snapshot = CollectionSnapshot::new("b");
        let event = user_event(("x", 0), Some(("x", 2)));
        assert!(reconcile(&event, &snapshot).unwrap().is_empty());
        let event = task_event(("a", 0), None);
        assert!(reconcile(&event, &snapshot).unwrap().is_empty());
    }
}
