//! Task catalogue: the cleaned input the scheduling strategies consume.
//!
//! A catalogue row describes one recurring task (recurrence period in weeks,
//! estimated hours, trade tag, base date). Rows arrive raw from tabular
//! sources, pass through [`clean_catalogue`], and are read-only afterwards.

mod clean;
mod error;
mod task;

pub use clean::{clean_catalogue, split_by_trade, RawTaskRecord, DEFAULT_MAX_ALLOWED_HOURS};
pub use error::CatalogueError;
pub use task::TaskDefinition;
