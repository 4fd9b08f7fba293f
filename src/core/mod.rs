pub mod calendar;
pub mod config;
pub mod error;
pub mod seeds;
pub mod types;

pub use calendar::{Calendar, MonthDate};
pub use config::{ChronicleConfig, GenerationParams, SimulationConfig};
pub use error::{ChronicleError, Result};
pub use seeds::{SeedStream, WorldSeeds};
