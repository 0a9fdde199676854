//! Windowed forward/backward packing: overbooked weeks hand their least
//! urgent occupants to the nearest week with room, searching outward in
//! both directions.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use super::WeekIndex;
use crate::algorithms::context::{HardCapTable, ScheduleContext};
use crate::algorithms::primitives::{
    expand_base_schedule, shift_priority, DEFAULT_SHIFT_SCALE,
};
use crate::algorithms::validate::{check_complete_task_list, check_week_capacity};
use crate::algorithms::ScheduleStrategy;
use crate::catalogue::TaskDefinition;
use crate::schedule::{Occurrence, ScheduleError, ScheduleTable};
use crate::week_master::WeekMaster;

/// Allowed-versus-assigned bookkeeping for one week.
#[derive(Debug, Clone, Copy, Default)]
struct WeekLoad {
    allowed_hours: i64,
    allowed_tasks: i64,
    assigned_hours: i64,
    assigned_tasks: i64,
}

impl WeekLoad {
    fn available_hours(&self) -> i64 {
        self.allowed_hours - self.assigned_hours
    }

    fn available_tasks(&self) -> i64 {
        self.allowed_tasks - self.assigned_tasks
    }

    fn is_overbooked(&self) -> bool {
        self.available_hours() < 0 || self.available_tasks() < 0
    }
}

/// The union of week-master weeks and occurrence weeks, with incremental
/// updates as occurrences move. Weeks outside the master carry zero
/// allowance, so anything left in them keeps reading as overbooked.
#[derive(Debug)]
struct LoadTable {
    weeks: BTreeMap<NaiveDate, WeekLoad>,
}

impl LoadTable {
    fn build(rows: &[Occurrence], week_master: &WeekMaster) -> Self {
        let mut weeks: BTreeMap<NaiveDate, WeekLoad> = BTreeMap::new();
        for (week, capacity) in week_master.iter() {
            weeks.insert(
                week,
                WeekLoad {
                    allowed_hours: capacity.allowed_hours as i64,
                    allowed_tasks: capacity.allowed_tasks as i64,
                    ..WeekLoad::default()
                },
            );
        }
        for row in rows {
            let load = weeks.entry(row.scheduled_week).or_default();
            load.assigned_hours += row.hrs as i64;
            load.assigned_tasks += 1;
        }
        Self { weeks }
    }

    fn earliest_overbooked(&self) -> Option<NaiveDate> {
        self.weeks
            .iter()
            .find(|(_, load)| load.is_overbooked())
            .map(|(week, _)| *week)
    }

    fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.weeks.keys().next()?;
        let last = self.weeks.keys().next_back()?;
        Some((*first, *last))
    }

    fn available_hours(&self, week: NaiveDate) -> Option<i64> {
        self.weeks.get(&week).map(WeekLoad::available_hours)
    }

    fn available_tasks(&self, week: NaiveDate) -> Option<i64> {
        self.weeks.get(&week).map(WeekLoad::available_tasks)
    }

    /// True when the week exists and can absorb one more task of `hrs`.
    fn fits(&self, week: NaiveDate, hrs: u32) -> bool {
        self.weeks
            .get(&week)
            .map(|load| load.available_hours() >= hrs as i64 && load.available_tasks() >= 1)
            .unwrap_or(false)
    }

    fn reassign(&mut self, from: NaiveDate, to: NaiveDate, hrs: u32, week_master: &WeekMaster) {
        if let Some(load) = self.weeks.get_mut(&from) {
            load.assigned_hours -= hrs as i64;
            load.assigned_tasks -= 1;
            // A week that only existed because occurrences sat in it leaves
            // the table with its last occupant, keeping the search bounds
            // aligned with the live schedule.
            if load.assigned_tasks == 0 && !week_master.contains(from) {
                self.weeks.remove(&from);
            }
        }
        let target = self.weeks.entry(to).or_insert_with(|| {
            let capacity = week_master.capacity(to);
            WeekLoad {
                allowed_hours: capacity.map(|cap| cap.allowed_hours as i64).unwrap_or(0),
                allowed_tasks: capacity.map(|cap| cap.allowed_tasks as i64).unwrap_or(0),
                ..WeekLoad::default()
            }
        });
        target.assigned_hours += hrs as i64;
        target.assigned_tasks += 1;
    }
}

/// The `top-down-fb` strategy.
///
/// Repeatedly takes the earliest overbooked week, selects the smallest
/// descending-priority set of occupants covering the deficit, and relocates
/// each to the nearest week with room, scanning a growing window in both
/// directions. When both adjacent candidates fit with exactly equal spare
/// hours the choice is drawn from the owned seeded RNG; this is the only
/// stochastic element in the engine.
#[derive(Debug)]
pub struct TopDownWindowed {
    scale: f64,
    rng: StdRng,
}

impl TopDownWindowed {
    /// A packer seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            scale: DEFAULT_SHIFT_SCALE,
            rng: StdRng::from_entropy(),
        }
    }

    /// A packer with a fixed seed; identical inputs and seed produce
    /// identical schedules.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            scale: DEFAULT_SHIFT_SCALE,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pack(
        &mut self,
        rows: &mut [Occurrence],
        week_master: &WeekMaster,
        context: &ScheduleContext,
    ) -> Result<(), ScheduleError> {
        let mut load = LoadTable::build(rows, week_master);
        let mut index = WeekIndex::build(rows);

        while let Some(week) = load.earliest_overbooked() {
            let hours_deficit = load.available_hours(week).unwrap_or(0);
            let tasks_deficit = load.available_tasks(week).unwrap_or(0);

            let mut occupants: Vec<usize> = index.occupants(week).to_vec();
            occupants.sort_by(|&a, &b| {
                rows[b]
                    .week_priority_score
                    .total_cmp(&rows[a].week_priority_score)
                    .then(a.cmp(&b))
            });

            // Smallest descending-priority prefix covering the deficit.
            let mut tts_len = occupants.len();
            let mut tts_hours = 0i64;
            for (i, &idx) in occupants.iter().enumerate() {
                tts_hours += rows[idx].hrs as i64;
                if tts_hours >= hours_deficit.abs() || (i + 1) as i64 >= tasks_deficit.abs() {
                    tts_len = i + 1;
                    break;
                }
            }

            let mut shifted = 0usize;
            for &idx in &occupants[..tts_len] {
                let freq = rows[idx].task_sequence_weeks;
                if let Some(cap) = context.hardcap.cap_for(freq) {
                    if rows[idx].delta_weeks >= cap as i32 {
                        rows[idx].hard_capped = true;
                        continue;
                    }
                }
                if rows[idx].hard_capped {
                    continue;
                }

                let origin = rows[idx].scheduled_week;
                let (target, signed) =
                    self.find_relief_week(&load, origin, rows[idx].hrs, freq, &context.hardcap)?;

                rows[idx].shift_weeks(signed);
                rows[idx].pin_if_reached(context.hardcap.cap_for(freq));
                rows[idx].week_priority_score = shift_priority(&rows[idx], self.scale);
                load.reassign(origin, target, rows[idx].hrs, week_master);
                index.reassign(idx, origin, target);
                shifted += 1;
                debug!(
                    key = rows[idx].key,
                    from = %origin,
                    to = %target,
                    delta_weeks = rows[idx].delta_weeks,
                    "relocated occurrence from overbooked week"
                );
            }

            if shifted == 0 {
                // Every shift candidate is pinned: the week cannot be
                // relieved within the configured caps.
                let task_freq = occupants
                    .first()
                    .map(|&idx| rows[idx].task_sequence_weeks)
                    .unwrap_or(0);
                return Err(ScheduleError::HardCapExceeded { week, task_freq });
            }
        }

        Ok(())
    }

    /// Searches outward from `origin` for the nearest week that can absorb
    /// the occurrence, returning the chosen week and the signed shift.
    fn find_relief_week(
        &mut self,
        load: &LoadTable,
        origin: NaiveDate,
        hrs: u32,
        task_freq: u32,
        hardcap: &HardCapTable,
    ) -> Result<(NaiveDate, i32), ScheduleError> {
        let Some((first, last)) = load.bounds() else {
            return Err(ScheduleError::WeekNotCovered { week: origin });
        };

        let mut window: u32 = 1;
        loop {
            let later = origin + Duration::weeks(window as i64);
            let earlier = origin - Duration::weeks(window as i64);

            if origin == first {
                // The range start can only push work later.
                if load.fits(later, hrs) {
                    return Ok((later, window as i32));
                }
            } else if origin == last {
                if load.fits(earlier, hrs) {
                    return Ok((earlier, -(window as i32)));
                }
            } else {
                let later_fits = load.fits(later, hrs);
                let earlier_fits = load.fits(earlier, hrs);
                if later_fits && earlier_fits {
                    let later_spare = load.available_hours(later).unwrap_or(i64::MIN);
                    let earlier_spare = load.available_hours(earlier).unwrap_or(i64::MIN);
                    if later_spare == earlier_spare {
                        // Equally acceptable; let the seeded RNG decide.
                        let candidates = [(later, window as i32), (earlier, -(window as i32))];
                        if let Some(choice) = candidates.choose(&mut self.rng) {
                            return Ok(*choice);
                        }
                    } else if later_spare > earlier_spare {
                        return Ok((later, window as i32));
                    } else {
                        return Ok((earlier, -(window as i32)));
                    }
                } else if later_fits {
                    return Ok((later, window as i32));
                } else if earlier_fits {
                    return Ok((earlier, -(window as i32)));
                }
            }

            window += 1;
            if let Some(cap) = hardcap.cap_for(task_freq) {
                if window > cap {
                    return Err(ScheduleError::HardCapExceeded { week: origin, task_freq });
                }
            }
            if later > last && earlier < first {
                // Both probes have left the table and no cap bounds the
                // search: the horizon and week master are misaligned.
                return Err(ScheduleError::WeekNotCovered { week: later });
            }
        }
    }
}

impl Default for TopDownWindowed {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleStrategy for TopDownWindowed {
    fn name(&self) -> &'static str {
        "top-down-fb"
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
