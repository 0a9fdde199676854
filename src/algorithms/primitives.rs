//! Shared scheduling primitives: the constraint predicate, the two priority
//! scores, and the base occurrence generator.

use chrono::{Duration, NaiveDate};

use super::context::{HardCapTable, ScheduleContext};
use crate::catalogue::TaskDefinition;
use crate::schedule::{Occurrence, ScheduleError};
use crate::week_master::WeekMaster;

/// Placement score of an occurrence whose displacement has reached its
/// frequency's hard cap: it must be placed before anything else.
pub const FORCED_PLACEMENT: f64 = -1.0;

/// Weight of task hours in the eviction score.
pub const DEFAULT_SHIFT_SCALE: f64 = 0.25;

/// Tests whether placing a task in `week` still satisfies that week's
/// capacity.
///
/// Fails with [`ScheduleError::WeekNotCovered`] when `week` is not a
/// week-master key, and with [`ScheduleError::HardCapExceeded`] when the
/// caller passes `hard_capped = true`: a pinned occurrence reaching the
/// predicate again means no feasible placement exists within its cap.
///
/// `add_task` is 1 for a real placement; the validator re-checks
/// already-filled weeks with `add_task = 0` and `new_task_hrs = 0`.
pub fn constraints_satisfied<O: std::borrow::Borrow<Occurrence>>(
    week_master: &WeekMaster,
    week: NaiveDate,
    scheduled: &[O],
    new_task_hrs: u32,
    hard_capped: bool,
    task_freq: u32,
    add_task: usize,
) -> Result<bool, ScheduleError> {
    let Some(capacity) = week_master.capacity(week) else {
        return Err(ScheduleError::WeekNotCovered { week });
    };
    if hard_capped {
        return Err(ScheduleError::HardCapExceeded { week, task_freq });
    }

    let total_scheduled_hrs: u32 = scheduled.iter().map(|occ| occ.borrow().hrs).sum();
    Ok(total_scheduled_hrs + new_task_hrs <= capacity.allowed_hours
        && scheduled.len() + add_task <= capacity.allowed_tasks as usize)
}

/// Placement priority for the bottom-up drivers; lower is more urgent.
///
/// Infrequent, short tasks are the least displaceable (a delay is a larger
/// fraction of their period), and accumulated displacement raises urgency.
/// An occurrence at its frequency's cap scores [`FORCED_PLACEMENT`].
pub fn placement_priority(occurrence: &Occurrence, hardcap: &HardCapTable) -> f64 {
    if let Some(cap) = hardcap.cap_for(occurrence.task_sequence_weeks) {
        if occurrence.delta_weeks >= cap as i32 {
            return FORCED_PLACEMENT;
        }
    }
    (occurrence.task_sequence_weeks as f64 + 1.0 / occurrence.hrs as f64)
        / (1.0 + occurrence.delta_weeks as f64)
}

/// Eviction priority for the top-down packers; higher means more eligible to
/// be shifted out of an overbooked week.
///
/// Distinct from [`placement_priority`] on purpose: this score picks the
/// shift victim (infrequent tasks move first, and heavier tasks are slightly
/// preferred since one move frees more capacity), not the next placement.
pub fn shift_priority(occurrence: &Occurrence, scale: f64) -> f64 {
    (occurrence.task_sequence_weeks / (occurrence.delta_weeks.unsigned_abs() + 1)) as f64
        + scale * occurrence.hrs as f64
}

/// Materializes every occurrence of every task from its base date up to the
/// forecast horizon, sorted by scheduled date.
pub fn expand_base_schedule(
    tasks: &[TaskDefinition],
    context: &ScheduleContext,
) -> Vec<Occurrence> {
    let horizon_end = context.horizon_end();
    let mut rows = Vec::new();
    for task in tasks {
        debug_assert!(task.task_sequence_weeks > 0);
        let ten_year_total = (52 * context.forecast_years) / task.task_sequence_weeks;
        let mut scheduled_date = task.base_date;
        let mut total_count = 0;
        while scheduled_date < horizon_end {
            total_count += 1;
            rows.push(Occurrence::for_date(
                task,
                scheduled_date,
                total_count,
                ten_year_total,
            ));
            scheduled_date += Duration::weeks(task.task_sequence_weeks as i64);
        }
    }
    rows.sort_by_key(|row| row.scheduled_date);
    rows
}
