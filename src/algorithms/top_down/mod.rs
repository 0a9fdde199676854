//! Expand-then-pack strategies: materialize every occurrence up front, then
//! resolve overbooked weeks by shifting occurrences between weeks.

mod backward;
mod windowed;

pub use backward::TopDownBack;
pub use windowed::TopDownWindowed;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::schedule::Occurrence;

/// Row indexes grouped by assigned week, kept in step with the occurrence
/// vector as the packers move rows around.
///
/// Within a bucket, indexes stay in arrival order; tie-breaks between equal
/// scores always fall back to the smallest row index, which is base-schedule
/// order.
#[derive(Debug, Default)]
pub(crate) struct WeekIndex {
    buckets: BTreeMap<NaiveDate, Vec<usize>>,
}

impl WeekIndex {
    pub(crate) fn build(rows: &[Occurrence]) -> Self {
        let mut buckets: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (idx, row) in rows.iter().enumerate() {
            buckets.entry(row.scheduled_week).or_default().push(idx);
        }
        Self { buckets }
    }

    pub(crate) fn occupants(&self, week: NaiveDate) -> &[usize] {
        self.buckets.get(&week).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Removes and returns every occupant of a week.
    pub(crate) fn drain_week(&mut self, week: NaiveDate) -> Vec<usize> {
        self.buckets.remove(&week).unwrap_or_default()
    }

    pub(crate) fn reassign(&mut self, idx: usize, from: NaiveDate, to: NaiveDate) {
        if let Some(bucket) = self.buckets.get_mut(&from) {
            bucket.retain(|&occupant| occupant != idx);
            if bucket.is_empty() {
                self.buckets.remove(&from);
            }
        }
        self.buckets.entry(to).or_default().push(idx);
    }

    pub(crate) fn insert(&mut self, idx: usize, week: NaiveDate) {
        self.buckets.entry(week).or_default().push(idx);
    }
}
