//! Emitted schedules and the occurrence records they contain.

mod errors;
mod occurrence;

pub use errors::ScheduleError;
pub use occurrence::Occurrence;

use std::collections::BTreeMap;

use chrono::NaiveDate;

/// A finished schedule: one row per placed occurrence, in the emitting
/// strategy's output order.
///
/// The table is frozen once a strategy returns it; validators only read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleTable {
    rows: Vec<Occurrence>,
}

impl ScheduleTable {
    pub fn from_rows(rows: Vec<Occurrence>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Occurrence] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Occurrence> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Occurrence> + '_ {
        self.rows.iter()
    }

    /// Groups rows by their assigned week, in week order.
    pub fn by_week(&self) -> BTreeMap<NaiveDate, Vec<&Occurrence>> {
        let mut by_week: BTreeMap<NaiveDate, Vec<&Occurrence>> = BTreeMap::new();
        for row in &self.rows {
            by_week.entry(row.scheduled_week).or_default().push(row);
        }
        by_week
    }

    /// Total assigned hours in a week.
    pub fn hours_in_week(&self, week: NaiveDate) -> u32 {
        self.rows
            .iter()
            .filter(|row| row.scheduled_week == week)
            .map(|row| row.hrs)
            .sum()
    }

    /// Number of occurrences assigned to a week.
    pub fn tasks_in_week(&self, week: NaiveDate) -> usize {
        self.rows
            .iter()
            .filter(|row| row.scheduled_week == week)
            .count()
    }
}
