//! Greedy insertion strategies: a min-heap proposes one occurrence at a
//! time, and conflicts are resolved by nudging the occurrence to a nearby
//! week before re-queueing it.

mod heap;

use std::cmp::Reverse;
use std::collections::{BinaryHeap, BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use tracing::debug;

use heap::{HeapEntry, ScoreKey};

use crate::algorithms::context::ScheduleContext;
use crate::algorithms::primitives::{constraints_satisfied, placement_priority, FORCED_PLACEMENT};
use crate::algorithms::validate::{check_complete_task_list, check_week_capacity};
use crate::algorithms::ScheduleStrategy;
use crate::calendar::iso_week_monday;
use crate::catalogue::TaskDefinition;
use crate::schedule::{Occurrence, ScheduleError, ScheduleTable};
use crate::week_master::WeekMaster;
use crate::Key;

/// The `bottom-up-b` strategy: conflicts only ever push an occurrence to a
/// later week.
#[derive(Debug, Clone, Copy, Default)]
pub struct BottomUpBack;

/// The `bottom-up-fb` strategy: a conflicted occurrence first looks for room
/// in the mirrored earlier week, then falls back to moving forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct BottomUpBidirectional;

impl ScheduleStrategy for BottomUpBack {
    fn name(&self) -> &'static str {
        "bottom-up-b"
    }

    fn create_schedule(
        &mut self,
        tasks: &[TaskDefinition],
        week_master: &WeekMaster,
        context: &ScheduleContext,
    ) -> Result<ScheduleTable, ScheduleError> {
        let schedule = drive_heap(tasks, week_master, context, false)?;
        check_week_capacity(&schedule, week_master, self.name())?;
        check_complete_task_list(tasks, &schedule, self.name())?;
        Ok(schedule)
    }
}

impl ScheduleStrategy for BottomUpBidirectional {
    fn name(&self) -> &'static str {
        "bottom-up-fb"
    }

    fn create_schedule(
        &mut self,
        tasks: &[TaskDefinition],
        week_master: &WeekMaster,
        context: &ScheduleContext,
    ) -> Result<ScheduleTable, ScheduleError> {
        let schedule = drive_heap(tasks, week_master, context, true)?;
        check_week_capacity(&schedule, week_master, self.name())?;
        check_complete_task_list(tasks, &schedule, self.name())?;
        Ok(schedule)
    }
}

/// Shared heap loop for both bottom-up strategies.
fn drive_heap(
    tasks: &[TaskDefinition],
    week_master: &WeekMaster,
    context: &ScheduleContext,
    look_behind: bool,
) -> Result<ScheduleTable, ScheduleError> {
    let horizon_end = context.horizon_end();
    let mut heap: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::new();
    let mut pool: HashMap<Key, Occurrence> = HashMap::new();
    let mut placed: BTreeMap<NaiveDate, Vec<Occurrence>> = BTreeMap::new();

    for task in tasks {
        debug_assert!(task.task_sequence_weeks > 0);
        let ten_year_total = (52 * context.forecast_years) / task.task_sequence_weeks;
        let first_week = iso_week_monday(task.base_date);
        let occurrence = Occurrence::for_date(task, first_week, 0, ten_year_total);
        let score = placement_priority(&occurrence, &context.hardcap);
        heap.push(Reverse(HeapEntry {
            week: first_week,
            score: ScoreKey(score),
            key: task.key,
        }));
        pool.insert(task.key, occurrence);
    }

    while let Some(Reverse(entry)) = heap.pop() {
        let Some(occurrence) = pool.get_mut(&entry.key) else {
            continue;
        };
        let forced = entry.score.0 == FORCED_PLACEMENT;
        let task_freq = occurrence.task_sequence_weeks;

        let occupants = placed.get(&entry.week).map(Vec::as_slice).unwrap_or(&[]);
        if constraints_satisfied(
            week_master,
            entry.week,
            occupants,
            occurrence.hrs,
            forced,
            task_freq,
            1,
        )? {
            accept(occurrence, entry.week, &mut placed, &mut heap, horizon_end, context);
            continue;
        }

        if look_behind {
            // Mirror the accumulated forward drift around the natural week:
            // 2*delta + 1 weeks back from the popped position.
            let past_week = iso_week_monday(
                entry.week - Duration::weeks((2 * occurrence.delta_weeks + 1) as i64),
            );
            // An uncovered past week is simply not a candidate.
            if week_master.contains(past_week) {
                let occupants = placed.get(&past_week).map(Vec::as_slice).unwrap_or(&[]);
                if constraints_satisfied(
                    week_master,
                    past_week,
                    occupants,
                    occurrence.hrs,
                    forced,
                    task_freq,
                    1,
                )? {
                    occurrence.delta_weeks = -(occurrence.delta_weeks + 1);
                    debug!(
                        key = occurrence.key,
                        from = %entry.week,
                        to = %past_week,
                        delta_weeks = occurrence.delta_weeks,
                        "placed occurrence in earlier week"
                    );
                    accept(occurrence, past_week, &mut placed, &mut heap, horizon_end, context);
                    continue;
                }
            }
        }

        // No room: advance one week and requeue with a refreshed score.
        let next_week = entry.week + Duration::weeks(1);
        occurrence.reanchor(next_week);
        occurrence.delta_weeks += 1;
        let score = placement_priority(occurrence, &context.hardcap);
        heap.push(Reverse(HeapEntry {
            week: next_week,
            score: ScoreKey(score),
            key: entry.key,
        }));
    }

    let rows: Vec<Occurrence> = placed.into_values().flatten().collect();
    Ok(ScheduleTable::from_rows(rows))
}

/// Places the occurrence in `week` and queues its next cycle.
///
/// The next date subtracts the displacement accumulated this cycle
/// (`week + period - delta`), so a slipped occurrence compensates on the
/// following one and the long-run cadence never drifts.
fn accept(
    occurrence: &mut Occurrence,
    week: NaiveDate,
    placed: &mut BTreeMap<NaiveDate, Vec<Occurrence>>,
    heap: &mut BinaryHeap<Reverse<HeapEntry>>,
    horizon_end: NaiveDate,
    context: &ScheduleContext,
) {
    let delta_weeks = occurrence.delta_weeks;
    occurrence.total_count += 1;
    occurrence.reanchor(week);
    placed.entry(week).or_default().push(occurrence.clone());

    let next_week = week + Duration::weeks(occurrence.task_sequence_weeks as i64)
        - Duration::weeks(delta_weeks as i64);
    if next_week < horizon_end {
        occurrence.reanchor(next_week);
        occurrence.delta_weeks = 0;
        let score = placement_priority(occurrence, &context.hardcap);
        heap.push(Reverse(HeapEntry {
            week: next_week,
            score: ScoreKey(score),
            key: occurrence.key,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::context::HardCapTable;
    use crate::test_utils::{ctx, date, task, uniform_week_master};
    use crate::week_master::WeekCapacity;

    // ── cadence ───────────────────────────────────────────────────────

    #[test]
    fn unconstrained_task_keeps_its_cadence() {
        let tasks = vec![task(1, "PM-1", 4, 8, date(2024, 1, 1))];
        let master = uniform_week_master(date(2024, 1, 1), 53, 80, 12);
        let context = ctx(date(2023, 12, 25), 1);

        let schedule = BottomUpBidirectional
            .create_schedule(&tasks, &master, &context)
            .unwrap();

        assert_eq!(schedule.len(), 13);
        assert!(schedule.iter().all(|row| row.delta_weeks == 0));
        let weeks: Vec<_> = schedule.iter().map(|row| row.scheduled_week).collect();
        assert_eq!(weeks[0], date(2024, 1, 1));
        assert_eq!(weeks[1], date(2024, 1, 29));
        let counts: Vec<_> = schedule.iter().map(|row| row.total_count).collect();
        assert_eq!(counts, (1..=13).collect::<Vec<_>>());
    }

    #[test]
    fn displaced_occurrence_compensates_next_cycle() {
        // A fortnightly task meets two blocked weeks at its second
        // occurrence; the slip is recovered on the third.
        let tasks = vec![task(1, "PM-1", 2, 8, date(2024, 1, 1))];
        let mut master = uniform_week_master(date(2024, 1, 1), 53, 80, 12);
        master.insert(date(2024, 1, 8), WeekCapacity::new(0, 12));
        master.insert(date(2024, 1, 15), WeekCapacity::new(0, 12));
        let context = ctx(date(2024, 1, 1), 1);

        let schedule = BottomUpBidirectional
            .create_schedule(&tasks, &master, &context)
            .unwrap();

        let weeks: Vec<_> = schedule
            .iter()
            .map(|row| (row.scheduled_week, row.delta_weeks))
            .collect();
        // Second occurrence slips 2024-01-15 -> 2024-01-22 (delta 1); the
        // third lands back on the natural 2024-01-29, not 2024-02-05.
        assert_eq!(weeks[0], (date(2024, 1, 1), 0));
        assert_eq!(weeks[1], (date(2024, 1, 22), 1));
        assert_eq!(weeks[2], (date(2024, 1, 29), 0));
    }

    #[test]
    fn delta_sums_to_zero_at_each_accept() {
        let tasks = vec![task(1, "PM-1", 2, 40, date(2024, 1, 1)), task(2, "PM-2", 2, 50, date(2024, 1, 1))];
        let master = uniform_week_master(date(2024, 1, 1), 106, 80, 12);
        let context = ctx(date(2024, 1, 1), 1);

        let schedule = BottomUpBidirectional
            .create_schedule(&tasks, &master, &context)
            .unwrap();

        // Each task's occurrences alternate around the natural cadence: the
        // k-th occurrence never drifts more than its own delta from
        // base + k * period.
        for key in [1u64, 2] {
            let mut rows: Vec<_> = schedule.iter().filter(|row| row.key == key).collect();
            rows.sort_by_key(|row| row.total_count);
            for row in rows {
                let natural = date(2024, 1, 1)
                    + Duration::weeks(2 * (row.total_count as i64 - 1));
                assert_eq!(
                    row.scheduled_week,
                    natural + Duration::weeks(row.delta_weeks as i64),
                    "occurrence {} of task {key} drifted off cadence",
                    row.total_count
                );
            }
        }
    }

    // ── look-behind ───────────────────────────────────────────────────

    #[test]
    fn bidirectional_places_in_earlier_week() {
        // Week two is saturated by a 70h task; the 20h task's second
        // occurrence looks one week behind and fits there.
        let tasks = vec![
            task(1, "PM-1", 2, 70, date(2024, 1, 1)),
            task(2, "PM-2", 4, 20, date(2024, 1, 15)),
        ];
        let master = uniform_week_master(date(2024, 1, 1), 53, 80, 12);
        let context = ctx(date(2024, 1, 1), 1);

        let schedule = BottomUpBidirectional
            .create_schedule(&tasks, &master, &context)
            .unwrap();

        let moved = schedule
            .iter()
            .find(|row| row.key == 2 && row.total_count == 1)
            .unwrap();
        assert_eq!(moved.scheduled_week, date(2024, 1, 8));
        assert_eq!(moved.delta_weeks, -1);
    }

    #[test]
    fn backward_only_never_goes_earlier() {
        let tasks = vec![
            task(1, "PM-1", 2, 70, date(2024, 1, 1)),
            task(2, "PM-2", 4, 20, date(2024, 1, 15)),
        ];
        let master = uniform_week_master(date(2024, 1, 1), 53, 80, 12);
        let context = ctx(date(2024, 1, 1), 1);

        let schedule = BottomUpBack
            .create_schedule(&tasks, &master, &context)
            .unwrap();
        assert!(schedule.iter().all(|row| row.delta_weeks >= 0));

        let moved = schedule
            .iter()
            .find(|row| row.key == 2 && row.total_count == 1)
            .unwrap();
        assert_eq!(moved.scheduled_week, date(2024, 1, 22));
        assert_eq!(moved.delta_weeks, 1);
    }

    // ── hard caps ─────────────────────────────────────────────────────

    #[test]
    fn cap_reached_aborts_with_hard_cap_exceeded() {
        // Nothing ever fits, so displacement climbs to the cap and the
        // forced placement trips the predicate.
        let tasks = vec![task(1, "PM-1", 4, 8, date(2024, 1, 1))];
        let master = WeekMaster::from_rows(
            (0..53).map(|i| (date(2024, 1, 1) + Duration::weeks(i), WeekCapacity::new(80, 0))),
        );
        let hardcap: HardCapTable = [(4, 2)].into_iter().collect();
        let context = ctx(date(2024, 1, 1), 1).with_hardcap(hardcap);

        let err = BottomUpBack
            .create_schedule(&tasks, &master, &context)
            .unwrap_err();
        assert_eq!(
            err,
            ScheduleError::HardCapExceeded { week: date(2024, 1, 15), task_freq: 4 }
        );
    }

    #[test]
    fn heap_pop_beyond_master_fails_week_not_covered() {
        let tasks = vec![task(1, "PM-1", 4, 8, date(2024, 1, 1))];
        // Master saturated and only two weeks long: the forward walk leaves it.
        let master = WeekMaster::from_rows(vec![
            (date(2024, 1, 1), WeekCapacity::new(0, 12)),
            (date(2024, 1, 8), WeekCapacity::new(0, 12)),
        ]);
        let context = ctx(date(2024, 1, 1), 1);

        let err = BottomUpBack
            .create_schedule(&tasks, &master, &context)
            .unwrap_err();
        assert_eq!(err, ScheduleError::WeekNotCovered { week: date(2024, 1, 15) });
    }

    // ── capacity packing ──────────────────────────────────────────────

    #[test]
    fn output_respects_weekly_capacity() {
        let tasks: Vec<_> = (1..=5)
            .map(|key| task(key, &format!("PM-{key}"), 2, 30, date(2024, 1, 1)))
            .collect();
        let master = uniform_week_master(date(2024, 1, 1), 106, 80, 12);
        let context = ctx(date(2024, 1, 1), 1);

        let schedule = BottomUpBidirectional
            .create_schedule(&tasks, &master, &context)
            .unwrap();
        for (week, rows) in schedule.by_week() {
            let hours: u32 = rows.iter().map(|row| row.hrs).sum();
            assert!(hours <= 80, "week {week} holds {hours}h");
        }
    }

    #[test]
    fn rows_emitted_in_week_order() {
        let tasks: Vec<_> = (1..=3)
            .map(|key| task(key, &format!("PM-{key}"), 3, 20, date(2024, 1, 1)))
            .collect();
        let master = uniform_week_master(date(2024, 1, 1), 106, 80, 12);
        let context = ctx(date(2024, 1, 1), 1);

        let schedule = BottomUpBidirectional
            .create_schedule(&tasks, &master, &context)
            .unwrap();
        assert!(schedule
            .rows()
            .windows(2)
            .all(|pair| pair[0].scheduled_week <= pair[1].scheduled_week));
    }
}
