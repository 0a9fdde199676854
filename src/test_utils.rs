//! Shared fixtures for unit tests.

use chrono::{Duration, NaiveDate};

use crate::algorithms::ScheduleContext;
use crate::catalogue::TaskDefinition;
use crate::week_master::{WeekCapacity, WeekMaster};
use crate::Key;

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub(crate) fn task(
    key: Key,
    data_source: &str,
    task_sequence_weeks: u32,
    hrs: u32,
    base_date: NaiveDate,
) -> TaskDefinition {
    TaskDefinition::new(
        key,
        data_source,
        format!("Task {key}"),
        format!("{task_sequence_weeks} Weekly"),
        task_sequence_weeks,
        "Mechanical",
        hrs,
        base_date,
    )
}

/// A week master of `weeks` consecutive weeks starting at `start` (a
/// Monday), each with the same capacity.
pub(crate) fn uniform_week_master(
    start: NaiveDate,
    weeks: i64,
    allowed_hours: u32,
    allowed_tasks: u32,
) -> WeekMaster {
    WeekMaster::from_rows((0..weeks).map(|offset| {
        (
            start + Duration::weeks(offset),
            WeekCapacity::new(allowed_hours, allowed_tasks),
        )
    }))
}

pub(crate) fn ctx(today: NaiveDate, forecast_years: u32) -> ScheduleContext {
    ScheduleContext::new(today, forecast_years)
}
