//! Monthly simulation systems, run in phase order by `HistorySimulation`

mod crisis;
mod planning;
mod population;
mod resolution;
mod upkeep;
mod warfare;

pub use crisis::update_crises;
pub use planning::plan_countries;
pub use population::update_populations;
pub use resolution::{drain_queue, execute, Rejection};
pub use upkeep::{recalculate_legitimacy, run_upkeep};
pub use warfare::{run_warfare, WarfareSummary};
