//! Post-run safety nets: every strategy re-checks its own output before
//! returning it. A failure here is an engine bug, not an input problem.

use std::collections::BTreeSet;

use tracing::info;

use super::primitives::constraints_satisfied;
use crate::catalogue::TaskDefinition;
use crate::schedule::{ScheduleError, ScheduleTable};
use crate::week_master::WeekMaster;

/// Re-runs the constraint predicate over every week of the final schedule.
///
/// Also fails any occurrence assigned to a week the master does not cover:
/// such a row would otherwise escape the per-week check entirely.
pub fn check_week_capacity(
    schedule: &ScheduleTable,
    week_master: &WeekMaster,
    strategy: &str,
) -> Result<(), ScheduleError> {
    let by_week = schedule.by_week();

    for (week, _) in by_week.iter() {
        if !week_master.contains(*week) {
            return Err(ScheduleError::ValidationFailed {
                strategy: strategy.to_string(),
                detail: format!("occurrences scheduled in week {week} not covered by the week master"),
            });
        }
    }

    let no_rows = Vec::new();
    for (week, _) in week_master.iter() {
        let occupants = by_week.get(&week).unwrap_or(&no_rows);
        if !constraints_satisfied(week_master, week, occupants, 0, false, 0, 0)? {
            let hours: u32 = occupants.iter().map(|occ| occ.hrs).sum();
            return Err(ScheduleError::ValidationFailed {
                strategy: strategy.to_string(),
                detail: format!(
                    "constraint failed for {week} with task hours {hours} and {} tasks",
                    occupants.len()
                ),
            });
        }
    }

    info!(strategy, "schedule passes weekly capacity constraints");
    Ok(())
}

/// Verifies no input task disappeared from the output.
pub fn check_complete_task_list(
    tasks: &[TaskDefinition],
    schedule: &ScheduleTable,
    strategy: &str,
) -> Result<(), ScheduleError> {
    let expected: BTreeSet<&str> = tasks.iter().map(|task| task.data_source.as_str()).collect();
    let emitted: BTreeSet<&str> = schedule
        .iter()
        .map(|row| row.data_source.as_str())
        .collect();
    let missing: Vec<&str> = expected.difference(&emitted).copied().collect();

    if !missing.is_empty() {
        return Err(ScheduleError::ValidationFailed {
            strategy: strategy.to_string(),
            detail: format!("schedule is missing tasks {}", missing.join(", ")),
        });
    }

    info!(strategy, "schedule has no missing tasks");
    Ok(())
}
