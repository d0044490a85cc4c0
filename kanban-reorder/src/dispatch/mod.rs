//! Sync dispatcher: applies intents to the local store and the backend.
//!
//! Intents of one event are applied strictly in the order the engine produced
//! them: all of them to the local store first (optimistic), then one by one to
//! the backend. Attach responses carry the backend's own user record, which
//! replaces the optimistic one. If a remote call still fails after its retries,
//! the local store is rolled back to how it looked before the event, except for
//! scopes a later event has written since. Remote writes that already
//! succeeded are not compensated. Errors that are not retryable fail at once.

mod memory;

pub use memory::{InMemoryRemote, RemoteCall};

use crate::config::{DispatchConfig, ReorderConfig};
use crate::engine::ReorderEngine;
use crate::error::{ReorderError, Result};
use crate::intent::SyncIntent;
use crate::logging::Pretty;
use crate::store::{Checkpoint, CollectionStore};
use crate::types::{BoardId, ColumnId, DragEvent, ScopeKey, Task, TaskId, User, UserId};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// The backend the dispatcher writes to
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Set the ordered task list of a column
    async fn set_column_tasks(&self, board: &BoardId, column: &ColumnId, tasks: &[Task])
        -> Result<()>;

    /// Set the ordered user list of a task
    async fn set_task_users(&self, task: &TaskId, users: &[User]) -> Result<()>;

    /// Assign a copy of `user` to `task`, returning the record the backend created
    async fn create_assignment(&self, task: &TaskId, user: &User) -> Result<User>;

    /// Remove an assignment
    async fn remove_assignment(&self, user: &UserId) -> Result<()>;
}

#[async_trait]
impl<R: RemoteStore + ?Sized> RemoteStore for Arc<R> {
    async fn set_column_tasks(
        &self,
        board: &BoardId,
        column: &ColumnId,
        tasks: &[Task],
    ) -> Result<()> {
        (**self).set_column_tasks(board, column, tasks).await
    }

    async fn set_task_users(&self, task: &TaskId, users: &[User]) -> Result<()> {
        (**self).set_task_users(task, users).await
    }

    async fn create_assignment(&self, task: &TaskId, user: &User) -> Result<User> {
        (**self).create_assignment(task, user).await
    }

    async fn remove_assignment(&self, user: &UserId) -> Result<()> {
        (**self).remove_assignment(user).await
    }
}

/// Outcome of dispatching one event's intents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Intents applied locally and confirmed remotely
    pub applied: usize,
    /// Remote attempts beyond the first, summed over all intents
    pub retries: u32,
    /// Backend records that replaced optimistic attachments
    pub confirmed_assignees: Vec<User>,
}

/// Drives intents into the store and the backend
pub struct SyncDispatcher<R> {
    store: Arc<RwLock<CollectionStore>>,
    remote: R,
    engine: ReorderEngine,
    config: DispatchConfig,
}

impl<R: RemoteStore> SyncDispatcher<R> {
    /// Create a dispatcher with default configuration
    pub fn new(store: CollectionStore, remote: R) -> Self {
        Self::with_config(store, remote, &ReorderConfig::default())
    }

    /// Create a dispatcher using the policy and retry settings from `config`
    pub fn with_config(store: CollectionStore, remote: R, config: &ReorderConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            remote,
            engine: ReorderEngine::with_policy(config.policy()),
            config: config.dispatch.clone(),
        }
    }

    /// Shared handle to the local store
    pub fn store(&self) -> Arc<RwLock<CollectionStore>> {
        Arc::clone(&self.store)
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn engine(&self) -> &ReorderEngine {
        &self.engine
    }

    /// Reconcile a drag against the current store and dispatch the result
    pub async fn handle_drop(&self, event: &DragEvent) -> Result<DispatchReport> {
        let snapshot = self.store.read().await.snapshot_for(event);
        let intents = self.engine.reconcile(event, &snapshot)?;
        self.apply_intents(&intents).await
    }

    /// Apply one event's intents in order.
    ///
    /// Nothing is written if any scope moved on since the intents were
    /// computed (`VersionConflict`). Remote errors that are not retryable fail
    /// on the first attempt. If rollback has to leave a scope alone because a
    /// later event wrote it, the result is `RollbackConflict`.
    pub async fn apply_intents(&self, intents: &[SyncIntent]) -> Result<DispatchReport> {
        let mut report = DispatchReport::default();
        if intents.is_empty() {
            return Ok(report);
        }
        debug!("dispatching intents: {}", Pretty(intents));

        // Check, checkpoint and apply locally under one write lock so a second
        // event computed from the same snapshot sees bumped versions.
        let mut checkpoint = {
            let mut store = self.store.write().await;
            store.check_preconditions(intents)?;
            let mut checkpoint = store.checkpoint(intents);
            for intent in intents {
                if let Err(error) = store.apply(intent) {
                    store.restore(&checkpoint);
                    return Err(error);
                }
            }
            store.seal(&mut checkpoint);
            checkpoint
        };

        for intent in intents {
            match self.send_with_retry(intent, &mut report).await {
                Ok(Some(confirmed)) => {
                    if let SyncIntent::Attach { task, user, .. } = intent {
                        self.confirm_assignee(task, &user.id, confirmed.clone(), &mut checkpoint)
                            .await?;
                    }
                    report.confirmed_assignees.push(confirmed);
                }
                Ok(None) => {}
                Err(error) => return Err(self.roll_back(&checkpoint, error).await),
            }
            report.applied += 1;
        }

        info!(
            applied = report.applied,
            retries = report.retries,
            "intents dispatched"
        );
        Ok(report)
    }

    /// Swap the optimistic assignee for the backend's record, keeping the
    /// checkpoint's view of the event's own writes current
    async fn confirm_assignee(
        &self,
        task: &TaskId,
        provisional: &UserId,
        confirmed: User,
        checkpoint: &mut Checkpoint,
    ) -> Result<()> {
        let scope = ScopeKey::TaskUsers(task.clone());
        let mut store = self.store.write().await;
        let owned = store.version(&scope) == checkpoint.written_version(&scope);
        if store.reconcile_assignee(task, provisional, confirmed)? && owned {
            if let Some(version) = store.version(&scope) {
                checkpoint.record_write(scope, version);
            }
        }
        Ok(())
    }

    /// Restore the local store after a failed remote write
    async fn roll_back(&self, checkpoint: &Checkpoint, error: ReorderError) -> ReorderError {
        warn!(%error, "remote write failed, rolling back local store");
        let skipped = self.store.write().await.restore(checkpoint);
        if skipped.is_empty() {
            return error;
        }

        warn!(?skipped, "scopes written by a later event were not rolled back");
        match error {
            ReorderError::Remote {
                operation, message, ..
            } => ReorderError::RollbackConflict {
                operation,
                message,
                scopes: skipped,
            },
            other => ReorderError::RollbackConflict {
                operation: "dispatch".to_string(),
                message: other.to_string(),
                scopes: skipped,
            },
        }
    }

    async fn send_with_retry(
        &self,
        intent: &SyncIntent,
        report: &mut DispatchReport,
    ) -> Result<Option<User>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send(intent).await {
                Ok(outcome) => return Ok(outcome),
                Err(error) if error.is_retryable() && attempt < self.config.max_attempts => {
                    warn!(%intent, attempt, %error, "remote write failed, retrying");
                    report.retries += 1;
                    tokio::time::sleep(self.config.backoff(attempt)).await;
                }
                Err(error) => {
                    return Err(ReorderError::Remote {
                        operation: intent.op_name().to_string(),
                        attempts: attempt,
                        message: error.to_string(),
                    })
                }
            }
        }
    }

    async fn send(&self, intent: &SyncIntent) -> Result<Option<User>> {
        match intent {
            SyncIntent::ReplaceColumnTasks {
                board,
                column,
                tasks,
                ..
            } => {
                self.remote.set_column_tasks(board, column, tasks).await?;
                Ok(None)
            }
            SyncIntent::ReplaceTaskUsers { task, users, .. } => {
                self.remote.set_task_users(task, users).await?;
                Ok(None)
            }
            SyncIntent::Attach { task, user, .. } => {
                Ok(Some(self.remote.create_assignment(task, user).await?))
            }
            SyncIntent::Detach { user, .. } => {
                self.remote.remove_assignment(&user.id).await?;
                Ok(None)
            }
        }
    }
}
