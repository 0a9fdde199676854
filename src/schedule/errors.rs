use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the scheduling engine. All of them are fatal to the
/// current invocation; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A placement targeted a week absent from the week master. Indicates
    /// the forecast horizon and the week master are misaligned.
    #[error("week {week} is not covered by the week master")]
    WeekNotCovered { week: NaiveDate },

    /// No feasible placement exists within the displacement cap configured
    /// for this recurrence frequency.
    #[error("hard cap too strict for task sequence frequency {task_freq} at week {week}")]
    HardCapExceeded { week: NaiveDate, task_freq: u32 },

    /// The strategy selector was given a name it does not know.
    #[error("unknown strategy name: {0}")]
    UnknownStrategy(String),

    /// A post-run invariant check failed; this is an engine bug, not an
    /// input problem.
    #[error("{strategy} validation failed: {detail}")]
    ValidationFailed { strategy: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;

    #[test]
    fn week_not_covered_display() {
        let e = ScheduleError::WeekNotCovered { week: date(2024, 1, 1) };
        assert_eq!(e.to_string(), "week 2024-01-01 is not covered by the week master");
    }

    #[test]
    fn hard_cap_display_names_frequency() {
        let e = ScheduleError::HardCapExceeded { week: date(2024, 1, 1), task_freq: 4 };
        assert!(e.to_string().contains("frequency 4"));
    }

    #[test]
    fn unknown_strategy_display() {
        let e = ScheduleError::UnknownStrategy("top-down-x".to_string());
        assert_eq!(e.to_string(), "unknown strategy name: top-down-x");
    }
}
