//! Error types for the reorder engine

use crate::types::{ScopeKey, TaskId};
use crate::validate::Violation;
use thiserror::Error;

/// Result type for reorder operations
pub type Result<T> = std::result::Result<T, ReorderError>;

/// Errors that can occur while reconciling or dispatching a drag
#[derive(Debug, Error)]
pub enum ReorderError {
    /// The snapshot does not contain what the event refers to
    #[error("stale snapshot for {scope}: {detail}")]
    StaleSnapshot { scope: String, detail: String },

    /// Destination task already holds the maximum number of users
    #[error("task '{task}' already has {limit} or more assignees")]
    CapacityExceeded { task: TaskId, limit: usize },

    /// Destination task already has a user with the same display name
    #[error("task '{task}' already has an assignee named '{name}'")]
    DuplicateAssignee { task: TaskId, name: String },

    /// The store moved on since the snapshot the intents were computed from
    #[error("version conflict on {scope}: expected {expected}, found {actual}")]
    VersionConflict {
        scope: ScopeKey,
        expected: u64,
        actual: u64,
    },

    /// A remote write failed after all retry attempts
    #[error("remote {operation} failed after {attempts} attempt(s): {message}")]
    Remote {
        operation: String,
        attempts: u32,
        message: String,
    },

    /// A remote write failed and some scopes could not be rolled back because
    /// a later event had already written them
    #[error("remote {operation} failed ({message}); rollback skipped {}", format_scopes(.scopes))]
    RollbackConflict {
        operation: String,
        message: String,
        scopes: Vec<ScopeKey>,
    },

    /// Generic resource not found (remote backend lookups)
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ReorderError {
    /// Create a stale snapshot error
    pub fn stale(scope: impl ToString, detail: impl Into<String>) -> Self {
        Self::StaleSnapshot {
            scope: scope.to_string(),
            detail: detail.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Lift a validator violation into an error about `task`
    pub fn from_violation(task: TaskId, violation: Violation) -> Self {
        match violation {
            Violation::CapacityExceeded { limit, .. } => Self::CapacityExceeded { task, limit },
            Violation::DuplicateAssignee { name } => Self::DuplicateAssignee { task, name },
        }
    }

    /// Rejections the end user should be told about. No data was mutated and
    /// the dragged item must snap back.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. } | Self::DuplicateAssignee { .. }
        )
    }

    /// Warning text for user-visible rejections
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::CapacityExceeded { limit, .. } => Some(format!(
                "Destination task already has {} or more user magnets. Move not allowed.",
                limit
            )),
            Self::DuplicateAssignee { .. } => {
                Some("This member is already working on the task. Move not allowed.".to_string())
            }
            _ => None,
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. } | Self::Io(_))
    }
}

fn format_scopes(scopes: &[ScopeKey]) -> String {
    let names: Vec<String> = scopes.iter().map(ToString::to_string).collect();
    names.join(", ")
}
