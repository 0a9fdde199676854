//! Backward-only packing: overbooked weeks push their least urgent
//! occupants one week later until the week fits.

use chrono::Duration;
use tracing::debug;

use super::WeekIndex;
use crate::algorithms::context::ScheduleContext;
use crate::algorithms::primitives::{
    expand_base_schedule, shift_priority, DEFAULT_SHIFT_SCALE,
};
use crate::algorithms::validate::{check_complete_task_list, check_week_capacity};
use crate::algorithms::ScheduleStrategy;
use crate::catalogue::TaskDefinition;
use crate::schedule::{Occurrence, ScheduleError, ScheduleTable};
use crate::week_master::WeekMaster;

/// The `top-down-b` strategy.
///
/// Walks the week master chronologically; while a week exceeds its allowed
/// hours or task count, the occupant with the highest eviction score that is
/// not yet hard-capped moves one week forward. A week with zero allowed
/// hours is evacuated wholesale.
#[derive(Debug, Clone)]
pub struct TopDownBack {
    scale: f64,
}

impl TopDownBack {
    pub fn new() -> Self {
        Self {
            scale: DEFAULT_SHIFT_SCALE,
        }
    }

    pub fn with_scale(scale: f64) -> Self {
        Self { scale }
    }

    fn pack(
        &self,
        rows: &mut [Occurrence],
        week_master: &WeekMaster,
        context: &ScheduleContext,
    ) -> Result<(), ScheduleError> {
        let mut index = WeekIndex::build(rows);

        for (week, capacity) in week_master.iter() {
            let next_week = week + Duration::weeks(1);

            if capacity.allowed_hours == 0 {
                // Nothing can stay here; evacuate every occupant forward.
                for idx in index.drain_week(week) {
                    rows[idx].shift_weeks(1);
                    rows[idx].week_priority_score = shift_priority(&rows[idx], self.scale);
                    index.insert(idx, next_week);
                }
                continue;
            }

            loop {
                let occupants = index.occupants(week);
                let hours: u32 = occupants.iter().map(|&idx| rows[idx].hrs).sum();
                if hours <= capacity.allowed_hours
                    && occupants.len() <= capacity.allowed_tasks as usize
                {
                    break;
                }

                let Some(victim) = pick_victim(rows, occupants) else {
                    // Every occupant is pinned and the week is still over.
                    let task_freq = occupants
                        .first()
                        .map(|&idx| rows[idx].task_sequence_weeks)
                        .unwrap_or(0);
                    return Err(ScheduleError::HardCapExceeded { week, task_freq });
                };

                rows[victim].shift_weeks(1);
                rows[victim].pin_if_reached(
                    context.hardcap.cap_for(rows[victim].task_sequence_weeks),
                );
                rows[victim].week_priority_score = shift_priority(&rows[victim], self.scale);
                index.reassign(victim, week, next_week);
                debug!(
                    key = rows[victim].key,
                    from = %week,
                    to = %next_week,
                    delta_weeks = rows[victim].delta_weeks,
                    "shifted occurrence out of overbooked week"
                );
            }
        }

        Ok(())
    }
}

impl Default for TopDownBack {
    fn default() -> Self {
        Self::new()
    }
}

/// The occupant with the maximum eviction score among those not hard-capped;
/// ties resolve to the smallest row index.
fn pick_victim(rows: &[Occurrence], occupants: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &idx in occupants {
        if rows[idx].hard_capped {
            continue;
        }
        match best {
            None => best = Some(idx),
            Some(current)
                if rows[idx].week_priority_score > rows[current].week_priority_score
                    || (rows[idx].week_priority_score == rows[current].week_priority_score
                        && idx < current) =>
            {
                best = Some(idx)
            }
            _ => {}
        }
    }
    best
}

impl ScheduleStrategy for TopDownBack {
    fn name(&self) -> &'static str {
        "top-down-b"
    }

    fn create_schedule(
        &mut self,
        tasks: &[TaskDefinition],
        week_master: &WeekMaster,
        context: &ScheduleContext,
    ) -> Result<ScheduleTable, ScheduleError> {
        let mut rows = expand_base_schedule(tasks, context);
        for row in &mut rows {
            row.week_priority_score = shift_priority(row, self.scale);
        }

        self.pack(&mut rows, week_master, context)?;
        rows.sort_by_key(|row| row.scheduled_date);

        let schedule = ScheduleTable::from_rows(rows);
        check_week_capacity(&schedule, week_master, self.name())?;
        check_complete_task_list(tasks, &schedule, self.name())?;
        Ok(schedule)
    }
}
