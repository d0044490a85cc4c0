//! User magnet drags between the unassigned pool and task user lists.
//!
//! The pool is a superset, not a positioned list: dropping a pool user on a
//! task creates an assignment, and dropping a task user on the pool removes
//! one. Neither rewrites the pool itself.

use super::{locate, splice, MoveKind};
use crate::error::{ReorderError, Result};
use crate::intent::SyncIntent;
use crate::snapshot::{CollectionSnapshot, Sequence};
use crate::types::{ScopeKey, TaskId, User, UserDrag, UserList};
use crate::validate::{validate_assignment, AssignmentPolicy};
use tracing::debug;

pub(super) fn reconcile(
    drag: &UserDrag,
    kind: MoveKind,
    snapshot: &CollectionSnapshot,
    policy: &AssignmentPolicy,
) -> Result<Vec<SyncIntent>> {
    let Some(dest) = &drag.destination else {
        return Ok(Vec::new());
    };
    let source_scope = drag.source.list.scope();
    let source = snapshot.user_list(&drag.source.list)?;
    let moving = locate(source, drag.source.index, &source_scope, |u| u.id == drag.user)?;

    match (kind, &drag.source.list, &dest.list) {
        (MoveKind::UserPoolToTask, UserList::Pool, UserList::Task(task)) => {
            let destination = checked_destination(task, dest.index, moving, snapshot, policy)?;
            Ok(vec![SyncIntent::Attach {
                task: task.clone(),
                user: moving.clone(),
                expected: destination.version,
            }])
        }
        (MoveKind::UserTaskToPool, UserList::Task(task), UserList::Pool) => {
            let (remaining, removed) = splice::remove_at(source.as_slice(), drag.source.index)
                .ok_or_else(|| ReorderError::stale(&source_scope, "user vanished"))?;

            Ok(vec![
                SyncIntent::Detach {
                    task: task.clone(),
                    user: removed,
                    expected: source.version,
                },
                SyncIntent::ReplaceTaskUsers {
                    task: task.clone(),
                    users: remaining,
                    expected: source.version,
                },
            ])
        }
        (MoveKind::UserTaskToTask, UserList::Task(from), UserList::Task(to)) => {
            let destination = checked_destination(to, dest.index, moving, snapshot, policy)?;
            let (remaining, removed) = splice::remove_at(source.as_slice(), drag.source.index)
                .ok_or_else(|| ReorderError::stale(&source_scope, "user vanished"))?;
            let inserted = splice::insert_at(destination.as_slice(), dest.index, removed)
                .ok_or_else(|| ReorderError::stale(dest.list.scope(), "insert out of range"))?;

            // Destination first, then source
            Ok(vec![
                SyncIntent::ReplaceTaskUsers {
                    task: to.clone(),
                    users: inserted,
                    expected: destination.version,
                },
                SyncIntent::ReplaceTaskUsers {
                    task: from.clone(),
                    users: remaining,
                    expected: source.version,
                },
            ])
        }
        (other, _, _) => Err(ReorderError::invalid_value(
            "kind",
            format!("{} does not match the drag's lists", other),
        )),
    }
}

/// Look up a destination task's users and run the assignment checks against
/// it, then make sure the drop index fits.
fn checked_destination<'a>(
    task: &TaskId,
    index: usize,
    moving: &User,
    snapshot: &'a CollectionSnapshot,
    policy: &AssignmentPolicy,
) -> Result<&'a Sequence<User>> {
    let destination = snapshot.task_users(task)?;

    if let Err(violation) = validate_assignment(destination.as_slice(), moving, policy) {
        debug!(task = %task, reason = violation.code(), "user move rejected");
        return Err(ReorderError::from_violation(task.clone(), violation));
    }

    if index > destination.len() {
        return Err(ReorderError::stale(
            ScopeKey::TaskUsers(task.clone()),
            format!(
                "destination index {} out of range for length {}",
                index,
                destination.len()
            ),
        ));
    }

    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{reconcile as run, ReorderEngine};
    use crate::snapshot::Version;
    use crate::types::{DragEvent, UserSlot};

    fn pool_slot(index: usize) -> UserSlot {
        UserSlot::new(UserList::Pool, index)
    }

    fn task_slot(task: &str, index: usize) -> UserSlot {
        UserSlot::new(UserList::Task(task.into()), index)
    }

    fn user_ids(intent: &SyncIntent) -> Vec<String> {
        match intent {
            SyncIntent::ReplaceTaskUsers { users, .. } => {
                users.iter().map(|u| u.id.to_string()).collect()
            }
            other => panic!("expected user replacement, got {:?}", other),
        }
    }

    #[test]
    fn test_pool_to_task_attaches() {
        let snapshot = CollectionSnapshot::new("b")
            .with_pool(vec![User::new("U1", "Sam"), User::new("U2", "Alex")])
            .with_task_users("X", vec![]);
        let event = DragEvent::user("U2", pool_slot(1), Some(task_slot("X", 0)));

        let intents = run(&event, &snapshot).unwrap();
        assert_eq!(
            intents,
            vec![SyncIntent::Attach {
                task: "X".into(),
                user: User::new("U2", "Alex"),
                expected: Version(0),
            }]
        );
    }

    #[test]
    fn test_pool_to_full_task_is_rejected() {
        let snapshot = CollectionSnapshot::new("b")
            .with_pool(vec![User::new("U4", "Dana")])
            .with_task_users(
                "X",
                vec![
                    User::new("U1", "Sam"),
                    User::new("U2", "Alex"),
                    User::new("U3", "Kim"),
                ],
            );
        let event = DragEvent::user("U4", pool_slot(0), Some(task_slot("X", 3)));

        let err = run(&event, &snapshot).unwrap_err();
        assert!(matches!(err, ReorderError::CapacityExceeded { limit: 3, .. }));
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let snapshot = CollectionSnapshot::new("b")
            .with_pool(vec![User::new("U2", "Sam")])
            .with_task_users("X", vec![User::new("U1", "Sam")]);
        let event = DragEvent::user("U2", pool_slot(0), Some(task_slot("X", 1)));

        let err = run(&event, &snapshot).unwrap_err();
        assert!(matches!(err, ReorderError::DuplicateAssignee { ref name, .. } if name == "Sam"));
    }

    #[test]
    fn test_task_to_pool_detaches_then_replaces() {
        let snapshot = CollectionSnapshot::new("b")
            .with_pool(vec![])
            .with_task_users("X", vec![User::new("U1", "Sam"), User::new("U2", "Alex")]);
        let event = DragEvent::user("U1", task_slot("X", 0), Some(pool_slot(0)));

        let intents = run(&event, &snapshot).unwrap();
        assert_eq!(intents.len(), 2);
        assert!(matches!(&intents[0], SyncIntent::Detach { user, .. } if user.id.as_str() == "U1"));
        assert_eq!(user_ids(&intents[1]), vec!["U2"]);
        assert_eq!(intents[1].scope(), ScopeKey::TaskUsers("X".into()));
    }

    #[test]
    fn test_task_to_pool_ignores_pool_limits() {
        let crowd: Vec<User> = (0..10)
            .map(|i| User::new(format!("P{}", i), "Sam"))
            .collect();
        let snapshot = CollectionSnapshot::new("b")
            .with_pool(crowd)
            .with_task_users("X", vec![User::new("U1", "Sam")]);
        let event = DragEvent::user("U1", task_slot("X", 0), Some(pool_slot(4)));

        assert_eq!(run(&event, &snapshot).unwrap().len(), 2);
    }

    #[test]
    fn test_task_to_task_destination_first() {
        let snapshot = CollectionSnapshot::new("b")
            .with_task_users("X", vec![User::new("U1", "Sam"), User::new("U2", "Alex")])
            .with_task_users("Y", vec![User::new("U3", "Kim")]);
        let event = DragEvent::user("U2", task_slot("X", 1), Some(task_slot("Y", 0)));

        let intents = run(&event, &snapshot).unwrap();
        assert_eq!(intents[0].scope(), ScopeKey::TaskUsers("Y".into()));
        assert_eq!(user_ids(&intents[0]), vec!["U2", "U3"]);
        assert_eq!(intents[1].scope(), ScopeKey::TaskUsers("X".into()));
        assert_eq!(user_ids(&intents[1]), vec!["U1"]);
    }

    #[test]
    fn test_task_to_task_respects_policy() {
        let snapshot = CollectionSnapshot::new("b")
            .with_task_users("X", vec![User::new("U1", "Sam")])
            .with_task_users("Y", vec![User::new("U3", "Kim")]);
        let event = DragEvent::user("U1", task_slot("X", 0), Some(task_slot("Y", 0)));

        let engine = ReorderEngine::with_policy(AssignmentPolicy { max_assignees: 1 });
        let err = engine.reconcile(&event, &snapshot).unwrap_err();
        assert!(matches!(err, ReorderError::CapacityExceeded { limit: 1, .. }));
    }

    #[test]
    fn test_task_to_task_index_past_end_is_stale() {
        let snapshot = CollectionSnapshot::new("b")
            .with_task_users("X", vec![User::new("U1", "Sam")])
            .with_task_users("Y", vec![User::new("U3", "Kim")]);
        let event = DragEvent::user("U1", task_slot("X", 0), Some(task_slot("Y", 2)));

        let err = run(&event, &snapshot).unwrap_err();
        assert!(
            matches!(err, ReorderError::StaleSnapshot { ref scope, .. } if scope == "task-users:Y")
        );
    }

    #[test]
    fn test_versions_follow_their_scopes() {
        let mut snapshot = CollectionSnapshot::new("b");
        snapshot.insert_task_users(
            "X".into(),
            Sequence::new(vec![User::new("U1", "Sam")]).at_version(Version(2)),
        );
        snapshot.insert_task_users("Y".into(), Sequence::new(vec![]).at_version(Version(7)));
        let event = DragEvent::user("U1", task_slot("X", 0), Some(task_slot("Y", 0)));

        let intents = run(&event, &snapshot).unwrap();
        assert_eq!(intents[0].expected(), Version(7));
        assert_eq!(intents[1].expected(), Version(2));
    }

    #[test]
    fn test_unknown_user_is_stale() {
        let snapshot = CollectionSnapshot::new("b")
            .with_pool(vec![User::new("U1", "Sam")])
            .with_task_users("X", vec![]);
        let event = DragEvent::user("U9", pool_slot(0), Some(task_slot("X", 0)));

        assert!(matches!(
            run(&event, &snapshot),
            Err(ReorderError::StaleSnapshot { .. })
        ));
    }

    #[test]
    fn test_missing_destination_task_is_stale() {
        let snapshot = CollectionSnapshot::new("b").with_pool(vec![User::new("U1", "Sam")]);
        let event = DragEvent::user("U1", pool_slot(0), Some(task_slot("X", 0)));

        assert!(matches!(
            run(&event, &snapshot),
            Err(ReorderError::StaleSnapshot { .. })
        ));
    }
}
