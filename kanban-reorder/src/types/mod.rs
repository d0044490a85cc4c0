//! Core types for the reorder engine

mod board;
mod event;
mod ids;
mod scope;

// Re-export all types
pub use board::{Board, Column, Task, User};
pub use event::{DragEvent, TaskDrag, UserDrag};
pub use ids::{BoardId, ColumnId, TaskId, UserId};
pub use scope::{ColumnSlot, ScopeKey, Slot, UserList, UserSlot};
