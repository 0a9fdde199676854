use chrono::{Datelike, Duration, NaiveDate};

use crate::calendar::{iso_week_monday, wrap_week_number};
use crate::catalogue::TaskDefinition;
use crate::Key;

/// One instance of a recurring task placed on the calendar.
///
/// Occurrences are created by the base generator or the heap driver, mutated
/// only by shift operations during packing, and frozen at emission.
///
/// `scheduled_date` keeps the exact weekday of the base date; all capacity
/// bookkeeping happens on `scheduled_week`, its ISO Monday.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Occurrence {
    pub key: Key,
    pub data_source: String,
    pub task_description: String,
    pub task_sequence: String,
    pub task_sequence_weeks: u32,
    pub trade: String,
    pub hrs: u32,
    pub year: i32,
    pub week: u32,
    pub estimated_last_service_date: NaiveDate,
    /// Exact date of this occurrence.
    pub scheduled_date: NaiveDate,
    /// Monday of the week this occurrence is currently assigned to.
    pub scheduled_week: NaiveDate,
    /// Signed net displacement from the natural cadence position, in weeks.
    pub delta_weeks: i32,
    /// 1-based index within the parent task's occurrence series.
    pub total_count: u32,
    /// `(52 * forecast_years) / task_sequence_weeks`, informational.
    pub ten_year_total: u32,
    /// Set once displacement reaches the per-frequency cap; pinned
    /// occurrences are never shifted again.
    pub hard_capped: bool,
    /// Eviction score used by the top-down packers.
    pub week_priority_score: f64,
}

impl Occurrence {
    /// Creates the occurrence of `task` falling on `scheduled_date`, with no
    /// displacement yet.
    pub fn for_date(
        task: &TaskDefinition,
        scheduled_date: NaiveDate,
        total_count: u32,
        ten_year_total: u32,
    ) -> Self {
        let iso = scheduled_date.iso_week();
        Self {
            key: task.key,
            data_source: task.data_source.clone(),
            task_description: task.task_description.clone(),
            task_sequence: task.task_sequence.clone(),
            task_sequence_weeks: task.task_sequence_weeks,
            trade: task.trade.clone(),
            hrs: task.hrs,
            year: scheduled_date.year(),
            week: iso.week(),
            estimated_last_service_date: task.estimated_last_service_date,
            scheduled_date,
            scheduled_week: iso_week_monday(scheduled_date),
            delta_weeks: 0,
            total_count,
            ten_year_total,
            hard_capped: false,
            week_priority_score: 0.0,
        }
    }

    /// Net displacement in days.
    pub fn delta_days(&self) -> i32 {
        self.delta_weeks * 7
    }

    /// Shifts this occurrence by a signed number of weeks, keeping its
    /// weekday and updating the derived calendar columns.
    pub fn shift_weeks(&mut self, weeks: i32) {
        self.scheduled_date += Duration::weeks(weeks as i64);
        self.scheduled_week += Duration::weeks(weeks as i64);
        self.week = wrap_week_number(self.week, weeks);
        self.delta_weeks += weeks;
        self.year = self.scheduled_week.year();
    }

    /// Pins the occurrence once its absolute displacement reaches `cap`.
    pub fn pin_if_reached(&mut self, cap: Option<u32>) {
        if let Some(cap) = cap {
            if self.delta_weeks.unsigned_abs() >= cap {
                self.hard_capped = true;
            }
        }
    }

    /// Re-anchors the occurrence to a specific week (the bottom-up driver
    /// moves occurrences between candidate weeks before placing them).
    pub fn reanchor(&mut self, week: NaiveDate) {
        let iso = week.iso_week();
        self.scheduled_date = week;
        self.scheduled_week = week;
        self.year = week.year();
        self.week = iso.week();
    }
}
