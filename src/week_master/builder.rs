//! Week-master construction: expand a year range into Monday rows, then
//! apply reduced-hours spans and blackout dates.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use super::{WeekCapacity, WeekMaster};
use crate::calendar::{first_monday_on_or_after, iso_week_monday};

/// Whether a calendar rule applies once or repeats every year until the end
/// of the build range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    Once,
    Yearly,
}

/// A span of weeks whose allowed hours are overridden (e.g. a summer
/// shutdown running on a skeleton crew).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedHoursRule {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub hours: u32,
    pub repetition: Repetition,
    pub note: String,
}

/// A span of non-working days; each day removes one working day's hours from
/// its ISO week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlackoutRule {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub repetition: Repetition,
    pub note: String,
}

/// Builder for a [`WeekMaster`] over `[start_year, end_year)`.
///
/// Emits one row per Monday, so the Monday invariant holds by construction.
#[derive(Debug, Clone)]
pub struct WeekMasterBuilder {
    start_year: i32,
    end_year: i32,
    allowed_hours: u32,
    allowed_tasks: u32,
    reduced_hours: Vec<ReducedHoursRule>,
    blackouts: Vec<BlackoutRule>,
}

const WORKING_DAYS_PER_WEEK: u32 = 5;

impl WeekMasterBuilder {
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
            allowed_hours: 80,
            allowed_tasks: 12,
            reduced_hours: Vec::new(),
            blackouts: Vec::new(),
        }
    }

    pub fn allowed_hours(mut self, hours: u32) -> Self {
        self.allowed_hours = hours;
        self
    }

    pub fn allowed_tasks(mut self, tasks: u32) -> Self {
        self.allowed_tasks = tasks;
        self
    }

    pub fn reduced_hours(mut self, rule: ReducedHoursRule) -> Self {
        self.reduced_hours.push(rule);
        self
    }

    pub fn blackout(mut self, rule: BlackoutRule) -> Self {
        self.blackouts.push(rule);
        self
    }

    pub fn build(self) -> WeekMaster {
        let mut weeks: BTreeMap<NaiveDate, WeekCapacity> = BTreeMap::new();
        let (Some(range_start), Some(range_end)) = (
            NaiveDate::from_ymd_opt(self.start_year, 1, 1),
            NaiveDate::from_ymd_opt(self.end_year, 1, 1),
        ) else {
            return WeekMaster::new();
        };

        let mut week = first_monday_on_or_after(range_start);
        while week < range_end {
            weeks.insert(week, WeekCapacity::new(self.allowed_hours, self.allowed_tasks));
            week += Duration::weeks(1);
        }

        for rule in &self.reduced_hours {
            for (start, end) in rule_spans(rule.start, rule.end, rule.repetition, self.end_year) {
                for (_, capacity) in weeks.range_mut(start..=end) {
                    capacity.allowed_hours = rule.hours;
                    capacity.note = Some(rule.note.clone());
                }
            }
        }

        // Blackout subtraction divides the pre-blackout allowance into
        // working days, so snapshot the hours before any day is removed.
        let pre_blackout: BTreeMap<NaiveDate, u32> = weeks
            .iter()
            .map(|(week, cap)| (*week, cap.allowed_hours))
            .collect();
        for (day, note) in self.expand_blackout_days() {
            let anchor = iso_week_monday(day);
            if let Some(capacity) = weeks.get_mut(&anchor) {
                if capacity.allowed_hours > 0 {
                    let daily = pre_blackout.get(&anchor).copied().unwrap_or(0)
                        / WORKING_DAYS_PER_WEEK;
                    capacity.allowed_hours = capacity.allowed_hours.saturating_sub(daily);
                    capacity.note = Some(note);
                }
            }
        }

        WeekMaster::from_rows(weeks)
    }

    fn expand_blackout_days(&self) -> Vec<(NaiveDate, String)> {
        let mut days = Vec::new();
        for rule in &self.blackouts {
            for (start, end) in rule_spans(rule.start, rule.end, rule.repetition, self.end_year) {
                let mut day = start;
                while day <= end {
                    days.push((day, rule.note.clone()));
                    day += Duration::days(1);
                }
            }
        }
        days
    }
}

/// Expands a rule's date span into its yearly repetitions. A once-off rule
/// yields its span as given; a yearly rule yields one span per year while
/// the span's start year is before `end_year`.
fn rule_spans(
    start: NaiveDate,
    end: NaiveDate,
    repetition: Repetition,
    end_year: i32,
) -> Vec<(NaiveDate, NaiveDate)> {
    match repetition {
        Repetition::Once => vec![(start, end)],
        Repetition::Yearly => {
            let mut spans = Vec::new();
            let (mut start, mut end) = (start, end);
            while start.year() < end_year {
                spans.push((start, end));
                start = next_year(start);
                end = next_year(end);
            }
            spans
        }
    }
}

/// Same month and day one year later; Feb 29 rolls to Mar 1.
fn next_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() + 1, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(date.year() + 1, 3, 1))
        .unwrap_or(date)
}
