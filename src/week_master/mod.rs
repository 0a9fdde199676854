//! Week master: the table of candidate weeks and their capacity.
//!
//! Keys are Mondays (the ISO week anchor); values carry the allowed hours
//! and allowed task count for that week, plus an informational note when a
//! blackout or reduced-hours rule touched the row.

mod builder;

pub use builder::{BlackoutRule, ReducedHoursRule, Repetition, WeekMasterBuilder};

use std::collections::BTreeMap;

use chrono::NaiveDate;

/// Capacity of a single week.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeekCapacity {
    pub allowed_hours: u32,
    pub allowed_tasks: u32,
    /// Blackout / reduced-hours annotation, informational.
    pub note: Option<String>,
}

impl WeekCapacity {
    pub fn new(allowed_hours: u32, allowed_tasks: u32) -> Self {
        Self {
            allowed_hours,
            allowed_tasks,
            note: None,
        }
    }
}

/// Table of candidate weeks sorted by date.
///
/// # Internal structure
///
/// A `BTreeMap` from Monday to [`WeekCapacity`]: ordered iteration drives the
/// top-down packing passes, and range bounds give the windowed strategy its
/// search limits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekMaster {
    weeks: BTreeMap<NaiveDate, WeekCapacity>,
}

impl WeekMaster {
    pub fn new() -> Self {
        Self {
            weeks: BTreeMap::new(),
        }
    }

    /// Builds a table from `(week, capacity)` rows. Later duplicates of a
    /// week overwrite earlier ones.
    pub fn from_rows(rows: impl IntoIterator<Item = (NaiveDate, WeekCapacity)>) -> Self {
        Self {
            weeks: rows.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, week: NaiveDate, capacity: WeekCapacity) {
        self.weeks.insert(week, capacity);
    }

    pub fn contains(&self, week: NaiveDate) -> bool {
        self.weeks.contains_key(&week)
    }

    pub fn capacity(&self, week: NaiveDate) -> Option<&WeekCapacity> {
        self.weeks.get(&week)
    }

    /// Earliest week in the table.
    pub fn first_week(&self) -> Option<NaiveDate> {
        self.weeks.keys().next().copied()
    }

    /// Latest week in the table.
    pub fn last_week(&self) -> Option<NaiveDate> {
        self.weeks.keys().next_back().copied()
    }

    /// Iterates weeks in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &WeekCapacity)> + '_ {
        self.weeks.iter().map(|(week, cap)| (*week, cap))
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;

    #[test]
    fn ordered_iteration_and_bounds() {
        let mut master = WeekMaster::new();
        master.insert(date(2024, 1, 15), WeekCapacity::new(80, 12));
        master.insert(date(2024, 1, 1), WeekCapacity::new(80, 12));
        master.insert(date(2024, 1, 8), WeekCapacity::new(40, 6));

        assert_eq!(master.first_week(), Some(date(2024, 1, 1)));
        assert_eq!(master.last_week(), Some(date(2024, 1, 15)));
        let weeks: Vec<NaiveDate> = master.iter().map(|(w, _)| w).collect();
        assert_eq!(weeks, vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15)]);
    }

    #[test]
    fn capacity_lookup() {
        let master = WeekMaster::from_rows(vec![(date(2024, 1, 8), WeekCapacity::new(40, 6))]);
        assert!(master.contains(date(2024, 1, 8)));
        assert!(!master.contains(date(2024, 1, 9)));
        assert_eq!(master.capacity(date(2024, 1, 8)).unwrap().allowed_hours, 40);
    }
}
