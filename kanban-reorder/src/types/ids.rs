//! Identifier newtypes for board entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declare a string-backed identifier type.
///
/// New ids are ULIDs; ids coming from the backend are wrapped as-is.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Mint a fresh id
            pub fn new() -> Self {
                Self(ulid::Ulid::new().to_string())
            }

            /// Wrap an existing id
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifies a board
    BoardId
);
define_id!(
    /// Identifies a column within a board
    ColumnId
);
define_id!(
    /// Identifies a task (card)
    TaskId
);
define_id!(
    /// Identifies a user record, either in the pool or attached to a task
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(TaskId::new(), TaskId::new());
    }

    #[test]
    fn test_from_string_round_trips_display() {
        let id = ColumnId::from_string("doing");
        assert_eq!(id.to_string(), "doing");
        assert_eq!(id.as_str(), "doing");
        assert_eq!(id, ColumnId::from("doing"));
    }

    #[test]
    fn test_serde_transparent() {
        let id = UserId::from_string("u1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u1\"");
        let back: UserId = serde_json::from_str("\"u1\"").unwrap();
        assert_eq!(back, id);
    }
}
