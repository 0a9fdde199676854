//! Calendar helpers shared across the scheduling engine.
//!
//! Every week-level comparison in this crate goes through [`iso_week_monday`]:
//! the Monday of the ISO week containing a date is the canonical key for
//! capacity lookups and schedule grouping.

use chrono::{Datelike, Duration, NaiveDate};

/// Maps a date to the Monday of its ISO 8601 week.
pub fn iso_week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Shifts a 1-52 week number, wrapping at the year boundary.
///
/// The wrap is coarse (any overshoot lands on week 1, any undershoot on
/// week 52); the week number is a display column, the authoritative position
/// is always `scheduled_week`.
pub fn wrap_week_number(week: u32, shift: i32) -> u32 {
    let shifted = week as i32 + shift;
    if shifted > 52 {
        1
    } else if shifted < 1 {
        52
    } else {
        shifted as u32
    }
}

/// Returns the first Monday on or after `date`.
pub fn first_monday_on_or_after(date: NaiveDate) -> NaiveDate {
    let monday = iso_week_monday(date);
    if monday < date {
        monday + Duration::weeks(1)
    } else {
        monday
    }
}
