//! Persisted chronicle artifacts and the background save scheduler

pub mod scheduler;
pub mod store;

pub use scheduler::HistorySaveScheduler;
pub use store::{HistoryStore, HistoryWriter};
