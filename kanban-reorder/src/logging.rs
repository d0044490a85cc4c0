//! Logging helpers
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the binary embedding it.

use serde::Serialize;
use std::fmt::Debug;

/// Wrapper for pretty-printing types in logs as YAML
///
/// ```ignore
/// use kanban_reorder::Pretty;
/// use tracing::debug;
///
/// debug!("intents: {}", Pretty(&intents));
/// ```
///
/// Outputs YAML with a leading newline. Debug is used as a fallback if YAML
/// serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
