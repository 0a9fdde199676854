//! Scheduling strategies and the primitives they share.
//!
//! Four strategies implement the same contract: take a cleaned catalogue, a
//! week master, and a context, and return a validated schedule.
//!
//! | name | shape | movement |
//! |---|---|---|
//! | `top-down-b`   | expand then pack | forward-only shifts |
//! | `top-down-fb`  | expand then pack | windowed, both directions |
//! | `bottom-up-b`  | priority heap    | forward-only shifts |
//! | `bottom-up-fb` | priority heap    | look-behind, then forward |

pub mod bottom_up;
pub mod context;
pub mod primitives;
pub mod top_down;
pub mod validate;

pub use bottom_up::{BottomUpBack, BottomUpBidirectional};
pub use context::{HardCapTable, ScheduleContext};
pub use top_down::{TopDownBack, TopDownWindowed};

use crate::catalogue::TaskDefinition;
use crate::schedule::{ScheduleError, ScheduleTable};
use crate::week_master::WeekMaster;

/// A scheduling strategy: places every occurrence of every catalogue task
/// into a capacity-constrained week.
///
/// Implementations validate their own output (weekly capacity and task
/// completeness) before returning it.
pub trait ScheduleStrategy: std::fmt::Debug {
    /// The selector name this strategy answers to.
    fn name(&self) -> &'static str;

    /// Builds the full schedule for `tasks` over the context's forecast
    /// horizon.
    fn create_schedule(
        &mut self,
        tasks: &[TaskDefinition],
        week_master: &WeekMaster,
        context: &ScheduleContext,
    ) -> Result<ScheduleTable, ScheduleError>;
}

/// Resolves a strategy by selector name.
///
/// The windowed strategy comes seeded from OS entropy; use
/// [`strategy_with_seed`] when reproducibility matters.
pub fn strategy_by_name(name: &str) -> Result<Box<dyn ScheduleStrategy>, ScheduleError> {
    strategy_with_seed(name, None)
}

/// Resolves a strategy by selector name, seeding the stochastic one when a
/// seed is given.
pub fn strategy_with_seed(
    name: &str,
    seed: Option<u64>,
) -> Result<Box<dyn ScheduleStrategy>, ScheduleError> {
    match name {
        "top-down-b" => Ok(Box::new(TopDownBack::new())),
        "top-down-fb" => Ok(Box::new(match seed {
            Some(seed) => TopDownWindowed::with_seed(seed),
            None => TopDownWindowed::new(),
        })),
        "bottom-up-b" => Ok(Box::new(BottomUpBack)),
        "bottom-up-fb" => Ok(Box::new(BottomUpBidirectional)),
        other => Err(ScheduleError::UnknownStrategy(other.to_string())),
    }
}
