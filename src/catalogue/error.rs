use thiserror::Error;

use crate::Key;

/// Errors raised while cleaning a raw task catalogue.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("task {data_source} takes {hrs}h, more than the max allowed hours of {max_allowed_hours}")]
    TaskExceedsMaxHours {
        data_source: String,
        hrs: u32,
        max_allowed_hours: u32,
    },

    #[error("task with key {key} has a zero-week recurrence period")]
    InvalidRecurrence { key: Key },
}
