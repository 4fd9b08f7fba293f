use thiserror::Error;

use crate::core::calendar::MonthDate;
use crate::core::types::ProvinceId;

#[derive(Error, Debug)]
pub enum ChronicleError {
    #[error("Invalid generation parameters: {0}")]
    InvalidParameters(String),

    #[error("Degenerate partition: province {province:?} has only {edges} real edges")]
    DegeneratePartition { province: ProvinceId, edges: usize },

    #[error("Unknown {kind} id {id} referenced by snapshot {date}")]
    UnknownEntity {
        kind: &'static str,
        id: u32,
        date: MonthDate,
    },

    #[error("No snapshot recorded for {0}")]
    MissingSnapshot(MonthDate),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Snapshot codec error: {0}")]
    CodecError(#[from] bincode::Error),

    #[error("Config parse error: {0}")]
    ConfigError(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWriteError(#[from] toml::ser::Error),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl ChronicleError {
    /// Whether the error marks a broken internal invariant rather than an
    /// environmental failure. Invariant violations are never retried.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ChronicleError::UnknownEntity { .. } | ChronicleError::DegeneratePartition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ChronicleError>;
