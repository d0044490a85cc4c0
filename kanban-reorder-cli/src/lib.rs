//! kanban-reorder command-line interface.
//!
//! Runs drag-end reconciliation against board documents on disk, either
//! printing the resulting intents or applying them through the dispatcher.

pub mod cli;
pub mod commands;

pub use cli::{ApplyArgs, Cli, Commands, OutputFormat, ReconcileArgs};
