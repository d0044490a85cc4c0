//! In-memory backend used by tests and the CLI's `apply` command.
//!
//! Mirrors how the board server treats each write:
//! - setting a column's tasks re-homes every listed task to that column and
//!   sets its order to its index
//! - attaching creates a new user record with the same name and a fresh id
//! - removing an assignment deletes that user record everywhere

use super::RemoteStore;
use crate::error::{ReorderError, Result};
use crate::store::CollectionStore;
use crate::types::{BoardId, ColumnId, Task, TaskId, User, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

/// A successful call received by [`InMemoryRemote`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    SetColumnTasks { column: ColumnId, tasks: Vec<TaskId> },
    SetTaskUsers { task: TaskId, users: Vec<UserId> },
    CreateAssignment { task: TaskId, name: String },
    RemoveAssignment { user: UserId },
}

#[derive(Debug, Default)]
struct State {
    /// Task id -> (column, order)
    task_homes: HashMap<TaskId, (ColumnId, usize)>,
    task_users: HashMap<TaskId, Vec<UserId>>,
    users: HashMap<UserId, User>,
    calls: Vec<RemoteCall>,
    failures_remaining: u32,
    /// Columns whose writes always fail
    unavailable_columns: HashSet<ColumnId>,
}

impl State {
    fn take_failure(&mut self) -> Result<()> {
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            return Err(unavailable());
        }
        Ok(())
    }
}

fn unavailable() -> ReorderError {
    ReorderError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "backend unavailable",
    ))
}

/// Backend that keeps everything in memory
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    state: Mutex<State>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with the contents of a local store
    pub fn from_store(store: &CollectionStore) -> Self {
        let mut state = State::default();
        for column in &store.board().columns {
            for (order, task) in store.column_tasks(column).unwrap_or_default().iter().enumerate() {
                state
                    .task_homes
                    .insert(task.id.clone(), (column.clone(), order));
                let users = store.task_users(&task.id).unwrap_or_default();
                state
                    .task_users
                    .insert(task.id.clone(), users.iter().map(|u| u.id.clone()).collect());
                for user in users {
                    state.users.insert(user.id.clone(), user.clone());
                }
            }
        }
        for user in store.board_users() {
            state.users.insert(user.id.clone(), user.clone());
        }
        Self {
            state: Mutex::new(state),
        }
    }

    /// Make the next `count` calls fail
    pub async fn fail_next(&self, count: u32) {
        self.state.lock().await.failures_remaining = count;
    }

    /// Make every write to `column` fail until the remote is dropped
    pub async fn fail_column(&self, column: impl Into<ColumnId>) {
        self.state
            .lock()
            .await
            .unavailable_columns
            .insert(column.into());
    }

    /// Calls that succeeded, in arrival order
    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().await.calls.clone()
    }

    /// Column and order the backend has recorded for a task
    pub async fn task_home(&self, task: &TaskId) -> Option<(ColumnId, usize)> {
        self.state.lock().await.task_homes.get(task).cloned()
    }

    /// User ids the backend has on a task, in order
    pub async fn task_user_ids(&self, task: &TaskId) -> Vec<UserId> {
        self.state
            .lock()
            .await
            .task_users
            .get(task)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn user_exists(&self, user: &UserId) -> bool {
        self.state.lock().await.users.contains_key(user)
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn set_column_tasks(
        &self,
        _board: &BoardId,
        column: &ColumnId,
        tasks: &[Task],
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        if state.unavailable_columns.contains(column) {
            return Err(unavailable());
        }
        for (order, task) in tasks.iter().enumerate() {
            state
                .task_homes
                .insert(task.id.clone(), (column.clone(), order));
            state.task_users.entry(task.id.clone()).or_default();
        }
        state.calls.push(RemoteCall::SetColumnTasks {
            column: column.clone(),
            tasks: tasks.iter().map(|t| t.id.clone()).collect(),
        });
        Ok(())
    }

    async fn set_task_users(&self, task: &TaskId, users: &[User]) -> Result<()> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        if !state.task_homes.contains_key(task) {
            return Err(ReorderError::not_found("task", task.as_str()));
        }
        for user in users {
            state.users.insert(user.id.clone(), user.clone());
        }
        let ids: Vec<UserId> = users.iter().map(|u| u.id.clone()).collect();
        state.task_users.insert(task.clone(), ids.clone());
        state.calls.push(RemoteCall::SetTaskUsers {
            task: task.clone(),
            users: ids,
        });
        Ok(())
    }

    async fn create_assignment(&self, task: &TaskId, user: &User) -> Result<User> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        if !state.task_homes.contains_key(task) {
            return Err(ReorderError::not_found("task", task.as_str()));
        }
        let created = User::new(UserId::new(), user.name.clone());
        state.users.insert(created.id.clone(), created.clone());
        state
            .task_users
            .entry(task.clone())
            .or_default()
            .push(created.id.clone());
        state.calls.push(RemoteCall::CreateAssignment {
            task: task.clone(),
            name: user.name.clone(),
        });
        Ok(created)
    }

    async fn remove_assignment(&self, user: &UserId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        if state.users.remove(user).is_none() {
            return Err(ReorderError::not_found("user", user.as_str()));
        }
        for ids in state.task_users.values_mut() {
            ids.retain(|id| id != user);
        }
        state.calls.push(RemoteCall::RemoveAssignment { user: user.clone() });
        Ok(())
    }
}
