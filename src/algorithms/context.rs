//! Per-invocation scheduling parameters.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};

/// Per-frequency displacement ceilings: `task_sequence_weeks` to the maximum
/// absolute `delta_weeks` an occurrence of that frequency may accumulate.
///
/// An empty table means no frequency is capped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardCapTable {
    caps: BTreeMap<u32, u32>,
}

impl HardCapTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task_sequence_weeks: u32, max_delta_weeks: u32) {
        self.caps.insert(task_sequence_weeks, max_delta_weeks);
    }

    /// The cap for a frequency, if one is configured.
    pub fn cap_for(&self, task_sequence_weeks: u32) -> Option<u32> {
        self.caps.get(&task_sequence_weeks).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }
}

impl FromIterator<(u32, u32)> for HardCapTable {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self {
            caps: iter.into_iter().collect(),
        }
    }
}

/// Parameters shared by every strategy in one `create_schedule` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleContext {
    /// Anchor for the forecast horizon. Injected rather than read from the
    /// system clock so runs are reproducible.
    pub today: NaiveDate,
    pub forecast_years: u32,
    pub hardcap: HardCapTable,
}

impl ScheduleContext {
    pub fn new(today: NaiveDate, forecast_years: u32) -> Self {
        Self {
            today,
            forecast_years,
            hardcap: HardCapTable::new(),
        }
    }

    pub fn with_hardcap(mut self, hardcap: HardCapTable) -> Self {
        self.hardcap = hardcap;
        self
    }

    /// End of the forecast horizon; occurrence generation stops strictly
    /// before this date.
    pub fn horizon_end(&self) -> NaiveDate {
        self.today
            .checked_add_months(Months::new(12 * self.forecast_years))
            .unwrap_or(NaiveDate::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;

    #[test]
    fn horizon_end_adds_whole_years() {
        let ctx = ScheduleContext::new(date(2024, 1, 1), 10);
        assert_eq!(ctx.horizon_end(), date(2034, 1, 1));
    }

    #[test]
    fn hardcap_lookup() {
        let caps: HardCapTable = [(4, 2), (12, 6)].into_iter().collect();
        assert_eq!(caps.cap_for(4), Some(2));
        assert_eq!(caps.cap_for(52), None);
        assert!(!caps.is_empty());
        assert!(HardCapTable::new().is_empty());
    }
}
