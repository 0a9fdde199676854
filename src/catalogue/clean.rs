//! Raw-row cleaning: derive the catalogue columns the scheduler relies on
//! and reject rows that violate its preconditions.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::{CatalogueError, TaskDefinition};
use crate::Key;

/// Default ceiling on per-task hours; a single task must fit inside one
/// fully-available week.
pub const DEFAULT_MAX_ALLOWED_HOURS: u32 = 80;

/// A task row as it arrives from the source table, before cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawTaskRecord {
    pub index: Key,
    pub data_source: String,
    pub task_description: String,
    pub task_sequence: String,
    pub task_sequence_weeks: u32,
    pub trade: String,
    pub hrs: u32,
    /// The consolidated first-service date.
    pub consolidated_date: NaiveDate,
}

/// Cleans a raw catalogue into scheduler input.
///
/// Derives the ISO year/week and estimated-last-service columns, renames
/// `index` to `key`, and sorts by key. Fails on the first row whose hours
/// exceed `max_allowed_hours` or whose recurrence period is zero.
pub fn clean_catalogue(
    records: impl IntoIterator<Item = RawTaskRecord>,
    max_allowed_hours: u32,
) -> Result<Vec<TaskDefinition>, CatalogueError> {
    let mut tasks = Vec::new();
    for record in records {
        if record.task_sequence_weeks == 0 {
            return Err(CatalogueError::InvalidRecurrence { key: record.index });
        }
        if record.hrs > max_allowed_hours {
            return Err(CatalogueError::TaskExceedsMaxHours {
                data_source: record.data_source,
                hrs: record.hrs,
                max_allowed_hours,
            });
        }
        tasks.push(TaskDefinition::new(
            record.index,
            record.data_source,
            record.task_description,
            record.task_sequence,
            record.task_sequence_weeks,
            record.trade,
            record.hrs,
            record.consolidated_date,
        ));
    }
    tasks.sort_by_key(|task| task.key);
    Ok(tasks)
}

/// Partitions a cleaned catalogue by trade tag, preserving key order within
/// each partition.
pub fn split_by_trade(tasks: &[TaskDefinition]) -> BTreeMap<String, Vec<TaskDefinition>> {
    let mut by_trade: BTreeMap<String, Vec<TaskDefinition>> = BTreeMap::new();
    for task in tasks {
        by_trade
            .entry(task.trade.clone())
            .or_default()
            .push(task.clone());
    }
    by_trade
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;

    fn raw(index: Key, trade: &str, hrs: u32, weeks: u32) -> RawTaskRecord {
        RawTaskRecord {
            index,
            data_source: format!("PM-{index:04}"),
            task_description: "Service".to_string(),
            task_sequence: "Monthly".to_string(),
            task_sequence_weeks: weeks,
            trade: trade.to_string(),
            hrs,
            consolidated_date: date(2024, 1, 1),
        }
    }

    #[test]
    fn cleans_and_sorts_by_key() {
        let tasks =
            clean_catalogue(vec![raw(5, "Mechanical", 8, 4), raw(2, "Electrical", 4, 12)], 80)
                .unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].key, 2);
        assert_eq!(tasks[1].key, 5);
        assert_eq!(tasks[0].estimated_last_service_date, date(2023, 10, 9));
    }

    #[test]
    fn over_length_task_is_rejected() {
        let err = clean_catalogue(vec![raw(1, "Mechanical", 90, 4)], 80).unwrap_err();
        assert!(matches!(
            err,
            CatalogueError::TaskExceedsMaxHours { hrs: 90, max_allowed_hours: 80, .. }
        ));
    }

    #[test]
    fn zero_period_is_rejected() {
        let err = clean_catalogue(vec![raw(1, "Mechanical", 8, 0)], 80).unwrap_err();
        assert_eq!(err, CatalogueError::InvalidRecurrence { key: 1 });
    }

    #[test]
    fn split_by_trade_preserves_key_order() {
        let tasks = clean_catalogue(
            vec![
                raw(3, "Electrical", 4, 4),
                raw(1, "Mechanical", 8, 4),
                raw(2, "Electrical", 2, 4),
            ],
            80,
        )
        .unwrap();
        let by_trade = split_by_trade(&tasks);
        assert_eq!(by_trade.len(), 2);
        let electrical: Vec<Key> = by_trade["Electrical"].iter().map(|t| t.key).collect();
        assert_eq!(electrical, vec![2, 3]);
        assert_eq!(by_trade["Mechanical"].len(), 1);
    }
}
