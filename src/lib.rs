//! Province Chronicle - procedural province maps and their monthly history

pub mod core;
pub mod history;
pub mod pathfinding;
pub mod persistence;
pub mod province;
pub mod snapshot;

pub use crate::core::{ChronicleConfig, ChronicleError, GenerationParams, MonthDate, Result, SimulationConfig};
pub use crate::history::{HistorySimulation, Instruction, SimulationStats};
pub use crate::pathfinding::RouteFinder;
pub use crate::persistence::{HistorySaveScheduler, HistoryStore, HistoryWriter};
pub use crate::province::{generate_world, ProvinceGraph};
pub use crate::snapshot::{diff, render, HistorySnapshot, SnapshotArchive};
