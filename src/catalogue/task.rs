use chrono::{Datelike, Duration, NaiveDate};

use crate::Key;

/// One cleaned catalogue row: a recurring trade task.
///
/// # Invariants
///
/// - `task_sequence_weeks` is positive (enforced by the cleaner).
/// - `hrs` is positive and at most the cleaner's `max_allowed_hours`.
/// - `year` and `week` are the ISO calendar of `base_date`.
///
/// Tasks are immutable once cleaned; the scheduler only ever copies identity
/// fields out of them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskDefinition {
    /// Stable identifier, unique within a catalogue.
    pub key: Key,
    /// Source system label, preserved through the pipeline.
    pub data_source: String,
    pub task_description: String,
    /// Human-readable recurrence label (e.g. "3 Monthly").
    pub task_sequence: String,
    /// Recurrence period in whole weeks.
    pub task_sequence_weeks: u32,
    pub trade: String,
    /// Estimated duration in hours.
    pub hrs: u32,
    /// ISO year of the base date.
    pub year: i32,
    /// ISO week of the base date.
    pub week: u32,
    /// Date of the first occurrence.
    pub base_date: NaiveDate,
    /// `base_date` minus one recurrence period, informational.
    pub estimated_last_service_date: NaiveDate,
}

impl TaskDefinition {
    /// Builds a task, deriving the ISO calendar columns and the estimated
    /// last service date from the base date and period.
    pub fn new(
        key: Key,
        data_source: impl Into<String>,
        task_description: impl Into<String>,
        task_sequence: impl Into<String>,
        task_sequence_weeks: u32,
        trade: impl Into<String>,
        hrs: u32,
        base_date: NaiveDate,
    ) -> Self {
        let iso = base_date.iso_week();
        Self {
            key,
            data_source: data_source.into(),
            task_description: task_description.into(),
            task_sequence: task_sequence.into(),
            task_sequence_weeks,
            trade: trade.into(),
            hrs,
            year: iso.year(),
            week: iso.week(),
            base_date,
            estimated_last_service_date: base_date
                - Duration::weeks(task_sequence_weeks as i64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;

    #[test]
    fn derives_iso_calendar_and_last_service() {
        let task = TaskDefinition::new(
            7,
            "PM-0007",
            "Inspect fire dampers",
            "Monthly",
            4,
            "Mechanical",
            8,
            date(2024, 1, 3),
        );
        assert_eq!(task.year, 2024);
        assert_eq!(task.week, 1);
        assert_eq!(task.estimated_last_service_date, date(2023, 12, 6));
    }

    #[test]
    fn iso_year_differs_from_calendar_year_at_boundary() {
        // 2023-12-31 falls in ISO week 52 of 2023.
        let task = TaskDefinition::new(1, "a", "b", "Weekly", 1, "t", 1, date(2023, 12, 31));
        assert_eq!(task.year, 2023);
        assert_eq!(task.week, 52);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let task = TaskDefinition::new(3, "PM-3", "Test", "Weekly", 1, "Electrical", 2, date(2024, 3, 4));
        let json = serde_json::to_string(&task).unwrap();
        let back: TaskDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(task, back);
    }
}
