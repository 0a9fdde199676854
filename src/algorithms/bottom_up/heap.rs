use chrono::NaiveDate;

use crate::Key;

/// A total-order key for `f64` scores using IEEE-754 total order
/// (`total_cmp`), so placement scores can participate in heap ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScoreKey(pub(crate) f64);

impl Eq for ScoreKey {}

impl Ord for ScoreKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for ScoreKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Heap entry for the bottom-up drivers.
///
/// The derived ordering is `(week, score, key)`: earliest candidate week
/// first, ties broken by placement urgency, then by the unique task key so
/// the order is total and the pop sequence fully determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct HeapEntry {
    pub(crate) week: NaiveDate,
    pub(crate) score: ScoreKey,
    pub(crate) key: Key,
}
