//! Append-only archive of monthly snapshots

use std::sync::Arc;

use crate::core::calendar::MonthDate;
use crate::core::error::{ChronicleError, Result};
use crate::snapshot::capture::HistorySnapshot;

/// The baseline snapshot followed by one snapshot per simulated month.
/// Snapshots are shared read-only with the save workers.
#[derive(Clone, Debug)]
pub struct SnapshotArchive {
    baseline: Arc<HistorySnapshot>,
    months: Vec<Arc<HistorySnapshot>>,
}

impl SnapshotArchive {
    pub fn new(baseline: HistorySnapshot) -> Self {
        Self {
            baseline: Arc::new(baseline),
            months: Vec::new(),
        }
    }

    /// Append the snapshot of the month that follows the latest one
    pub fn push(&mut self, snapshot: HistorySnapshot) -> Arc<HistorySnapshot> {
        debug_assert_eq!(snapshot.date, self.latest().date.next());
        let snapshot = Arc::new(snapshot);
        self.months.push(Arc::clone(&snapshot));
        snapshot
    }

    pub fn baseline(&self) -> &Arc<HistorySnapshot> {
        &self.baseline
    }

    /// Number of simulated months (the baseline is not counted)
    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn month(&self, index: usize) -> Option<&Arc<HistorySnapshot>> {
        self.months.get(index)
    }

    /// Snapshot the month at `index` is diffed against
    pub fn predecessor(&self, index: usize) -> &Arc<HistorySnapshot> {
        match index {
            0 => &self.baseline,
            i => self.months.get(i - 1).unwrap_or(&self.baseline),
        }
    }

    pub fn latest(&self) -> &Arc<HistorySnapshot> {
        self.months.last().unwrap_or(&self.baseline)
    }

    pub fn get(&self, date: MonthDate) -> Result<&Arc<HistorySnapshot>> {
        if date == self.baseline.date {
            return Ok(&self.baseline);
        }
        let index = date.months_since(self.baseline.date) - 1;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.months.get(i))
            .ok_or(ChronicleError::MissingSnapshot(date))
    }
}
