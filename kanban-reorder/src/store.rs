//! CollectionStore - the local, optimistically updated copy of one board.
//!
//! The store only holds data and applies intents; it makes no decisions about
//! what a drag means. Each scope carries a version that is bumped on every
//! write, which is how a second, overlapping drag is caught: its intents were
//! computed from a snapshot whose versions no longer match.

use crate::error::{ReorderError, Result};
use crate::intent::SyncIntent;
use crate::snapshot::{CollectionSnapshot, Sequence, Version};
use crate::types::{
    Board, BoardId, Column, ColumnId, DragEvent, ScopeKey, Task, TaskId, User, UserId, UserList,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::trace;

/// Serialized form of a board, as read from and written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDocument {
    pub board: BoardMeta,
    /// Unassigned users
    #[serde(default)]
    pub pool: Vec<User>,
    #[serde(default)]
    pub columns: Vec<ColumnDocument>,
}

/// Board identity inside a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardMeta {
    pub id: BoardId,
    pub title: String,
}

/// A column and its tasks in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDocument {
    pub id: ColumnId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<TaskDocument>,
}

/// A task and its assigned users in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDocument {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Clone)]
struct ColumnEntry {
    column: Column,
    tasks: Sequence<Task>,
}

/// Saved sequences for the scopes an event is about to touch.
///
/// Also remembers the version each scope reached through the event's own
/// writes; a scope that has moved past that version belongs to a later event
/// and is left alone on restore.
#[derive(Debug, Clone, Default)]
pub struct Checkpoint {
    columns: Vec<(ColumnId, Sequence<Task>)>,
    task_users: Vec<(TaskId, Sequence<User>)>,
    written: HashMap<ScopeKey, Version>,
}

impl Checkpoint {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.task_users.is_empty()
    }

    /// Version the event's last write left `scope` at
    pub fn written_version(&self, scope: &ScopeKey) -> Option<Version> {
        self.written.get(scope).copied()
    }

    /// Record that the event itself moved `scope` to `version`
    pub fn record_write(&mut self, scope: ScopeKey, version: Version) {
        self.written.insert(scope, version);
    }

    fn owns(&self, scope: &ScopeKey, current: Version) -> bool {
        self.written
            .get(scope)
            .map_or(true, |written| *written == current)
    }
}

/// Local collection store for one board
#[derive(Debug, Clone)]
pub struct CollectionStore {
    board: Board,
    columns: IndexMap<ColumnId, ColumnEntry>,
    task_users: HashMap<TaskId, Sequence<User>>,
    pool: Sequence<User>,
}

impl CollectionStore {
    /// Create an empty store for a board
    pub fn new(board: Board) -> Self {
        Self {
            board,
            columns: IndexMap::new(),
            task_users: HashMap::new(),
            pool: Sequence::default(),
        }
    }

    /// Build a store from a document, rejecting tasks listed in more than one column
    pub fn from_document(doc: BoardDocument) -> Result<Self> {
        let mut store = Self::new(Board::new(doc.board.id, doc.board.title));
        store.set_pool(doc.pool);

        let mut seen = HashSet::new();
        for column in doc.columns {
            let mut tasks = Vec::with_capacity(column.tasks.len());
            for task in column.tasks {
                if !seen.insert(task.id.clone()) {
                    return Err(ReorderError::invalid_value(
                        "columns",
                        format!("task {} appears in more than one column", task.id),
                    ));
                }
                store.set_task_users(task.id.clone(), task.users);
                tasks.push(Task::new(task.id, task.title));
            }
            store.add_column(Column::new(column.id, column.title), tasks);
        }

        Ok(store)
    }

    /// Export the current state as a document
    pub fn to_document(&self) -> BoardDocument {
        BoardDocument {
            board: BoardMeta {
                id: self.board.id.clone(),
                title: self.board.title.clone(),
            },
            pool: self.pool.items.clone(),
            columns: self
                .columns
                .values()
                .map(|entry| ColumnDocument {
                    id: entry.column.id.clone(),
                    title: entry.column.title.clone(),
                    tasks: entry
                        .tasks
                        .items
                        .iter()
                        .map(|task| TaskDocument {
                            id: task.id.clone(),
                            title: task.title.clone(),
                            users: self
                                .task_users
                                .get(&task.id)
                                .map(|users| users.items.clone())
                                .unwrap_or_default(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Load a document from a YAML or JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let doc: BoardDocument = if is_json(path) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml_ng::from_str(&content)?
        };
        Self::from_document(doc)
    }

    /// Save the current state as YAML or JSON, chosen by extension
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let doc = self.to_document();
        let content = if is_json(path) {
            serde_json::to_string_pretty(&doc)?
        } else {
            serde_yaml_ng::to_string(&doc)?
        };
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    // =========================================================================
    // Provisioning
    // =========================================================================

    /// Append a column with its tasks
    pub fn add_column(&mut self, column: Column, tasks: Vec<Task>) {
        for task in &tasks {
            self.task_users.entry(task.id.clone()).or_default();
        }
        self.board.columns.push(column.id.clone());
        self.columns.insert(
            column.id.clone(),
            ColumnEntry {
                column,
                tasks: Sequence::new(tasks),
            },
        );
    }

    /// Set a task's assigned users
    pub fn set_task_users(&mut self, task: TaskId, users: Vec<User>) {
        self.task_users.insert(task, Sequence::new(users));
    }

    /// Set the unassigned pool
    pub fn set_pool(&mut self, users: Vec<User>) {
        self.pool = Sequence::new(users);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board.id
    }

    /// Ordered tasks of a column
    pub fn column_tasks(&self, column: &ColumnId) -> Option<&[Task]> {
        self.columns.get(column).map(|entry| entry.tasks.as_slice())
    }

    /// Ordered users assigned to a task
    pub fn task_users(&self, task: &TaskId) -> Option<&[User]> {
        self.task_users.get(task).map(|users| users.as_slice())
    }

    /// The unassigned pool
    pub fn board_users(&self) -> &[User] {
        self.pool.as_slice()
    }

    /// Current version of a scope
    pub fn version(&self, scope: &ScopeKey) -> Option<Version> {
        match scope {
            ScopeKey::Column(id) => self.columns.get(id).map(|entry| entry.tasks.version),
            ScopeKey::TaskUsers(id) => self.task_users.get(id).map(|users| users.version),
            ScopeKey::Pool => Some(self.pool.version),
        }
    }

    /// Columns whose task list contains `task`
    pub fn columns_containing(&self, task: &TaskId) -> Vec<ColumnId> {
        self.columns
            .iter()
            .filter(|(_, entry)| entry.tasks.items.iter().any(|t| &t.id == task))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Snapshot of every collection on the board
    pub fn snapshot(&self) -> CollectionSnapshot {
        let mut snapshot = CollectionSnapshot::new(self.board.id.clone());
        for (id, entry) in &self.columns {
            snapshot.insert_column(id.clone(), entry.tasks.clone());
        }
        for (id, users) in &self.task_users {
            snapshot.insert_task_users(id.clone(), users.clone());
        }
        snapshot.pool = self.pool.clone();
        snapshot
    }

    /// Snapshot of just the collections `event` can touch
    pub fn snapshot_for(&self, event: &DragEvent) -> CollectionSnapshot {
        let mut snapshot = CollectionSnapshot::new(self.board.id.clone());
        match event {
            DragEvent::Task(drag) => {
                let lists = std::iter::once(&drag.source.list)
                    .chain(drag.destination.as_ref().map(|d| &d.list));
                for column in lists {
                    if let Some(entry) = self.columns.get(column) {
                        snapshot.insert_column(column.clone(), entry.tasks.clone());
                    }
                }
            }
            DragEvent::User(drag) => {
                let lists = std::iter::once(&drag.source.list)
                    .chain(drag.destination.as_ref().map(|d| &d.list));
                for list in lists {
                    match list {
                        UserList::Pool => snapshot.pool = self.pool.clone(),
                        UserList::Task(task) => {
                            if let Some(users) = self.task_users.get(task) {
                                snapshot.insert_task_users(task.clone(), users.clone());
                            }
                        }
                    }
                }
            }
        }
        snapshot
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Check that every scope is still at the version its first intent expects.
    ///
    /// Later intents on the same scope expect the same base version; they run
    /// after the first one has bumped it, so only the first is compared.
    pub fn check_preconditions(&self, intents: &[SyncIntent]) -> Result<()> {
        let mut checked = HashSet::new();
        for intent in intents {
            let scope = intent.scope();
            if !checked.insert(scope.clone()) {
                continue;
            }
            let actual = self
                .version(&scope)
                .ok_or_else(|| ReorderError::stale(&scope, "scope no longer exists"))?;
            if actual != intent.expected() {
                return Err(ReorderError::VersionConflict {
                    scope,
                    expected: intent.expected().0,
                    actual: actual.0,
                });
            }
        }
        Ok(())
    }

    /// Apply one intent and bump its scope's version
    pub fn apply(&mut self, intent: &SyncIntent) -> Result<()> {
        trace!(%intent, "applying intent to local store");
        match intent {
            SyncIntent::ReplaceColumnTasks { column, tasks, .. } => {
                let entry = self.columns.get_mut(column).ok_or_else(|| {
                    ReorderError::stale(ScopeKey::Column(column.clone()), "column missing")
                })?;
                for task in tasks {
                    self.task_users.entry(task.id.clone()).or_default();
                }
                entry.tasks.items = tasks.clone();
                entry.tasks.version = entry.tasks.version.next();
            }
            SyncIntent::ReplaceTaskUsers { task, users, .. } => {
                let sequence = self.task_users_mut(task)?;
                sequence.items = users.clone();
                sequence.version = sequence.version.next();
            }
            SyncIntent::Attach { task, user, .. } => {
                let sequence = self.task_users_mut(task)?;
                sequence.items.push(user.clone());
                sequence.version = sequence.version.next();
            }
            SyncIntent::Detach { task, user, .. } => {
                let sequence = self.task_users_mut(task)?;
                sequence.items.retain(|u| u.id != user.id);
                sequence.version = sequence.version.next();
            }
        }
        Ok(())
    }

    /// Swap an optimistically attached user for the record the backend created.
    ///
    /// Returns false when the provisional user is no longer on the task.
    pub fn reconcile_assignee(
        &mut self,
        task: &TaskId,
        provisional: &UserId,
        confirmed: User,
    ) -> Result<bool> {
        let sequence = self.task_users_mut(task)?;
        match sequence.items.iter_mut().find(|u| &u.id == provisional) {
            Some(slot) => {
                *slot = confirmed;
                sequence.version = sequence.version.next();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Save the sequences the intents will write
    pub fn checkpoint(&self, intents: &[SyncIntent]) -> Checkpoint {
        let mut checkpoint = Checkpoint::default();
        let mut seen = HashSet::new();
        for intent in intents {
            let scope = intent.scope();
            if !seen.insert(scope.clone()) {
                continue;
            }
            match scope {
                ScopeKey::Column(id) => {
                    if let Some(entry) = self.columns.get(&id) {
                        checkpoint.columns.push((id, entry.tasks.clone()));
                    }
                }
                ScopeKey::TaskUsers(id) => {
                    if let Some(users) = self.task_users.get(&id) {
                        checkpoint.task_users.push((id, users.clone()));
                    }
                }
                ScopeKey::Pool => {}
            }
        }
        checkpoint
    }

    /// Record the current version of every checkpointed scope as written by
    /// the event that took the checkpoint
    pub fn seal(&self, checkpoint: &mut Checkpoint) {
        let scopes: Vec<ScopeKey> = checkpoint
            .columns
            .iter()
            .map(|(id, _)| ScopeKey::Column(id.clone()))
            .chain(
                checkpoint
                    .task_users
                    .iter()
                    .map(|(id, _)| ScopeKey::TaskUsers(id.clone())),
            )
            .collect();
        for scope in scopes {
            if let Some(version) = self.version(&scope) {
                checkpoint.record_write(scope, version);
            }
        }
    }

    /// Put checkpointed items back, returning the scopes that were skipped.
    ///
    /// A scope is only restored while it is still at the version the event
    /// left it at; otherwise a later event has written it and its items stay.
    /// Restored versions still move forward so that snapshots taken while the
    /// failed event was in flight are treated as stale.
    pub fn restore(&mut self, checkpoint: &Checkpoint) -> Vec<ScopeKey> {
        let mut skipped = Vec::new();
        for (id, saved) in &checkpoint.columns {
            if let Some(entry) = self.columns.get_mut(id) {
                let scope = ScopeKey::Column(id.clone());
                if !checkpoint.owns(&scope, entry.tasks.version) {
                    skipped.push(scope);
                    continue;
                }
                entry.tasks.items = saved.items.clone();
                entry.tasks.version = entry.tasks.version.next();
            }
        }
        for (id, saved) in &checkpoint.task_users {
            if let Some(users) = self.task_users.get_mut(id) {
                let scope = ScopeKey::TaskUsers(id.clone());
                if !checkpoint.owns(&scope, users.version) {
                    skipped.push(scope);
                    continue;
                }
                users.items = saved.items.clone();
                users.version = users.version.next();
            }
        }
        skipped
    }

    fn task_users_mut(&mut self, task: &TaskId) -> Result<&mut Sequence<User>> {
        self.task_users.get_mut(task).ok_or_else(|| {
            ReorderError::stale(ScopeKey::TaskUsers(task.clone()), "task missing")
        })
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}
