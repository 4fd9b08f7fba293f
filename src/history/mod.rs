//! History simulation: countries, armies, diplomacy and crises evolving
//! month by month on a generated province graph

pub mod army;
pub mod country;
pub mod crisis;
pub mod diplomacy;
pub mod instruction;
pub mod setup;
pub mod simulation;
pub mod systems;
pub mod world;

pub use army::Army;
pub use country::{Country, CountryStats, GovernmentType};
pub use crisis::{CrisisKind, CrisisState, HistoryCrisis};
pub use diplomacy::{transition, DiplomaticAction, Relation, TransitionRejected};
pub use instruction::{Instruction, InstructionQueue};
pub use setup::seed_countries;
pub use simulation::{HistorySimulation, MonthOutcome, SimulationStats};
pub use world::HistoryWorld;
