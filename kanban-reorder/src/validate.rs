//! Assignment invariants checked before a user move is accepted.
//!
//! All checks are pure: they look only at the proposed destination sequence
//! handed in, never at shared state. The unassigned pool has no limits, so the
//! engine skips these checks when the pool is the destination.

use crate::types::User;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of users a single task can hold
pub const DEFAULT_MAX_ASSIGNEES: usize = 3;

/// Why a destination rejected a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Destination already holds `current >= limit` users
    CapacityExceeded { limit: usize, current: usize },
    /// A user with the same display name is already present
    DuplicateAssignee { name: String },
}

impl Violation {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            Self::CapacityExceeded { .. } => "CapacityExceeded",
            Self::DuplicateAssignee { .. } => "DuplicateAssignee",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { limit, current } => {
                write!(f, "{} users present, limit is {}", current, limit)
            }
            Self::DuplicateAssignee { name } => write!(f, "'{}' is already assigned", name),
        }
    }
}

/// Limits applied to task user lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPolicy {
    pub max_assignees: usize,
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self {
            max_assignees: DEFAULT_MAX_ASSIGNEES,
        }
    }
}

/// Reject when the destination is already at (or over) capacity
pub fn check_capacity(destination: &[User], limit: usize) -> Result<(), Violation> {
    if destination.len() >= limit {
        return Err(Violation::CapacityExceeded {
            limit,
            current: destination.len(),
        });
    }
    Ok(())
}

/// Reject when a user with `name` is already in the destination
pub fn check_unique_name(destination: &[User], name: &str) -> Result<(), Violation> {
    if destination.iter().any(|u| u.name == name) {
        return Err(Violation::DuplicateAssignee {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Run every assignment check, capacity first
pub fn validate_assignment(
    destination: &[User],
    candidate: &User,
    policy: &AssignmentPolicy,
) -> Result<(), Violation> {
    check_capacity(destination, policy.max_assignees)?;
    check_unique_name(destination, &candidate.name)
}
