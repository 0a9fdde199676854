//! Front door tying the pieces together: configuration, strategy selection,
//! and horizon derivation.

use chrono::{Local, NaiveDate};

use crate::algorithms::{strategy_with_seed, HardCapTable, ScheduleContext};
use crate::catalogue::TaskDefinition;
use crate::schedule::{ScheduleError, ScheduleTable};
use crate::week_master::WeekMaster;

/// Scheduler configuration.
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    /// First year covered by the week master.
    pub start_year: i32,
    /// Year after the last covered year.
    pub end_year: i32,
    /// Per-frequency displacement caps.
    pub hardcap: HardCapTable,
    /// Seed for the windowed strategy's tie-breaks; `None` uses OS entropy.
    pub seed: Option<u64>,
}

impl SchedulerConfig {
    /// Forecast horizon in years: the configured range minus a two-year
    /// margin, so forward shifts near the horizon stay inside the week
    /// master.
    pub fn forecast_years(&self) -> u32 {
        (self.end_year - self.start_year - 2).max(0) as u32
    }
}

/// Runs a named strategy over a catalogue and week master.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Schedules with the horizon anchored at the local calendar date.
    pub fn schedule(
        &self,
        tasks: &[TaskDefinition],
        week_master: &WeekMaster,
        strategy_name: &str,
    ) -> Result<ScheduleTable, ScheduleError> {
        self.schedule_as_of(tasks, week_master, strategy_name, Local::now().date_naive())
    }

    /// Schedules with an explicit horizon anchor; reproducible runs and
    /// tests go through this.
    pub fn schedule_as_of(
        &self,
        tasks: &[TaskDefinition],
        week_master: &WeekMaster,
        strategy_name: &str,
        today: NaiveDate,
    ) -> Result<ScheduleTable, ScheduleError> {
        let mut strategy = strategy_with_seed(strategy_name, self.config.seed)?;
        let context = ScheduleContext::new(today, self.config.forecast_years())
            .with_hardcap(self.config.hardcap.clone());
        strategy.create_schedule(tasks, week_master, &context)
    }
}
