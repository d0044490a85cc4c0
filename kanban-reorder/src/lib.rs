//! Drag-and-drop reconciliation for kanban boards
//!
//! Turns a finished drag (a task between columns, or a user magnet between
//! tasks and the unassigned pool) into an ordered list of sync intents, after
//! checking the move against the assignment rules.
//!
//! ## Overview
//!
//! - **Pure engine** - [`ReorderEngine::reconcile`] reads a [`CollectionSnapshot`]
//!   and returns [`SyncIntent`]s; it never mutates anything
//! - **Validate first** - a rejected move produces no intents at all
//! - **Versioned scopes** - every intent carries the version it was computed
//!   against, so overlapping drags are detected instead of silently merged
//! - **Dispatcher** - [`SyncDispatcher`] applies intents optimistically to a
//!   [`CollectionStore`] and then to a [`RemoteStore`], rolling back on failure
//!
//! ## Basic Usage
//!
//! ```rust
//! use kanban_reorder::{reconcile, CollectionSnapshot, ColumnSlot, DragEvent, SyncIntent, Task};
//!
//! let snapshot = CollectionSnapshot::new("board")
//!     .with_column("A", vec![Task::new("T1", "one"), Task::new("T2", "two")]);
//!
//! let event = DragEvent::task(
//!     "T1",
//!     ColumnSlot::new("A", 0),
//!     Some(ColumnSlot::new("A", 1)),
//! );
//!
//! let intents = reconcile(&event, &snapshot).unwrap();
//! assert!(matches!(&intents[..], [SyncIntent::ReplaceColumnTasks { .. }]));
//! ```

pub mod boundary;
pub mod config;
pub mod dispatch;
pub mod engine;
mod error;
pub mod intent;
pub mod logging;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod validate;

pub use boundary::{DraggableLocation, DropResult};
pub use config::{ConfigError, DispatchConfig, ReorderConfig};
pub use dispatch::{DispatchReport, InMemoryRemote, RemoteCall, RemoteStore, SyncDispatcher};
pub use engine::{classify, reconcile, MoveKind, ReorderEngine};
pub use error::{ReorderError, Result};
pub use intent::SyncIntent;
pub use logging::Pretty;
pub use snapshot::{CollectionSnapshot, Sequence, Version};
pub use store::{BoardDocument, Checkpoint, CollectionStore};
pub use validate::{AssignmentPolicy, Violation, DEFAULT_MAX_ASSIGNEES};

// Re-export commonly used types
pub use types::{
    Board, BoardId, Column, ColumnId, ColumnSlot, DragEvent, ScopeKey, Slot, Task, TaskDrag,
    TaskId, User, UserDrag, UserId, UserList, UserSlot,
};
