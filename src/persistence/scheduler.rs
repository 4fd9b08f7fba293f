//! Asynchronous monthly history saving
//!
//! Every month not yet written gets one job on a rayon pool. A job diffs
//! its snapshot against the predecessor, renders the report and hands both
//! to the writer. Jobs only read `Arc`-shared snapshots; the one piece of
//! shared mutable state is the completion bitmap behind a mutex. Results
//! travel back over a channel and are reclaimed by `update` or `finish`.

use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{info, warn};

use crate::core::calendar::MonthDate;
use crate::core::error::Result;
use crate::persistence::store::HistoryWriter;
use crate::snapshot::{diff, render, HistorySnapshot, SnapshotArchive};

struct JobResult {
    index: usize,
    date: MonthDate,
    outcome: Result<()>,
}

pub struct HistorySaveScheduler {
    pool: ThreadPool,
    writer: Arc<dyn HistoryWriter>,
    completed: Arc<Mutex<Vec<bool>>>,
    in_flight: BTreeSet<usize>,
    sender: Sender<JobResult>,
    receiver: Receiver<JobResult>,
}

impl HistorySaveScheduler {
    /// `workers == 0` lets rayon choose the thread count
    pub fn new(writer: Arc<dyn HistoryWriter>, workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("history-save-{}", i))
            .build()?;
        let (sender, receiver) = mpsc::channel();
        Ok(Self {
            pool,
            writer,
            completed: Arc::new(Mutex::new(Vec::new())),
            in_flight: BTreeSet::new(),
            sender,
            receiver,
        })
    }

    fn completed(&self) -> MutexGuard<'_, Vec<bool>> {
        self.completed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Submit a job for every archived month that is neither written nor
    /// already in flight. Returns the number of jobs submitted.
    pub fn start_save(&mut self, archive: &SnapshotArchive) -> usize {
        let pending: Vec<usize> = {
            let mut completed = self.completed();
            if completed.len() < archive.len() {
                completed.resize(archive.len(), false);
            }
            (0..archive.len())
                .filter(|&i| !completed[i] && !self.in_flight.contains(&i))
                .collect()
        };

        for &index in &pending {
            let Some(snapshot) = archive.month(index).map(Arc::clone) else {
                continue;
            };
            let previous = Arc::clone(archive.predecessor(index));
            let writer = Arc::clone(&self.writer);
            let completed = Arc::clone(&self.completed);
            let sender = self.sender.clone();

            self.in_flight.insert(index);
            self.pool.spawn(move || {
                let outcome = save_month(writer.as_ref(), &previous, &snapshot);
                if outcome.is_ok() {
                    let mut bits = completed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    if let Some(bit) = bits.get_mut(index) {
                        *bit = true;
                    }
                }
                // The receiver lives as long as the scheduler
                let _ = sender.send(JobResult {
                    index,
                    date: snapshot.date,
                    outcome,
                });
            });
        }

        if !pending.is_empty() {
            info!(jobs = pending.len(), "History save started");
        }
        pending.len()
    }

    /// (completed, total) months
    pub fn progress(&self) -> (usize, usize) {
        let completed = self.completed();
        (completed.iter().filter(|&&done| done).count(), completed.len())
    }

    /// Reclaim finished jobs without blocking. Write failures are logged
    /// and left for the next `start_save`; invariant violations are
    /// returned as errors.
    pub fn update(&mut self) -> Result<usize> {
        let mut reclaimed = 0;
        while let Ok(result) = self.receiver.try_recv() {
            reclaimed += 1;
            self.reclaim(result)?;
        }
        Ok(reclaimed)
    }

    pub fn is_saving(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Block until every submitted job has been reclaimed. The first
    /// invariant violation, if any, is returned after the batch drains.
    pub fn finish(&mut self) -> Result<()> {
        let mut first_error = None;
        while self.is_saving() {
            let Ok(result) = self.receiver.recv() else {
                break;
            };
            if let Err(e) = self.reclaim(result) {
                first_error.get_or_insert(e);
            }
        }
        let (done, total) = self.progress();
        info!(done, total, "History save finished");
        first_error.map_or(Ok(()), Err)
    }

    fn reclaim(&mut self, result: JobResult) -> Result<()> {
        self.in_flight.remove(&result.index);
        match result.outcome {
            Ok(()) => Ok(()),
            Err(e) if e.is_invariant_violation() => Err(e),
            Err(e) => {
                warn!(date = %result.date, error = %e, "Failed to save month; will retry");
                Ok(())
            }
        }
    }
}

fn save_month(writer: &dyn HistoryWriter, previous: &HistorySnapshot, snapshot: &HistorySnapshot) -> Result<()> {
    let records = diff(previous, snapshot)?;
    let report = render(snapshot.date, &records);
    writer.write_month(snapshot, &report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ChronicleError;
    use crate::core::types::CountryId;
    use crate::history::world::HistoryWorld;
    use crate::province::graph::test_support::square_grid;

    #[derive(Default)]
    struct MemoryWriter {
        written: Mutex<Vec<MonthDate>>,
    }

    impl HistoryWriter for MemoryWriter {
        fn write_month(&self, snapshot: &HistorySnapshot, _report: &str) -> Result<()> {
            self.written.lock().unwrap().push(snapshot.date);
            Ok(())
        }
    }

    fn archive_of(months: usize) -> SnapshotArchive {
        let mut world = HistoryWorld::new(square_grid(2, 2, 100));
        world.add_country("A".into());
        let mut archive = SnapshotArchive::new(HistorySnapshot::capture_baseline(&world));
        for _ in 0..months {
            archive.push(HistorySnapshot::capture(&world));
            world.calendar.advance();
        }
        archive
    }

    #[test]
    fn test_every_month_is_written_once() {
        let writer = Arc::new(MemoryWriter::default());
        let mut scheduler = HistorySaveScheduler::new(writer.clone(), 2).unwrap();
        let archive = archive_of(5);

        assert_eq!(scheduler.start_save(&archive), 5);
        scheduler.finish().unwrap();
        assert!(!scheduler.is_saving());
        assert_eq!(scheduler.progress(), (5, 5));
        assert_eq!(scheduler.start_save(&archive), 0);
        assert_eq!(writer.written.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_invariant_violation_surfaces() {
        let writer = Arc::new(MemoryWriter::default());
        let mut scheduler = HistorySaveScheduler::new(writer, 1).unwrap();
        let mut world = HistoryWorld::new(square_grid(2, 2, 100));
        let mut archive = SnapshotArchive::new(HistorySnapshot::capture_baseline(&world));
        let mut broken = HistorySnapshot::capture(&world);
        broken.provinces[0].owner = Some(CountryId(3));
        archive.push(broken);
        world.calendar.advance();

        scheduler.start_save(&archive);
        let err = scheduler.finish().unwrap_err();
        assert!(matches!(err, ChronicleError::UnknownEntity { .. }));
        assert_eq!(scheduler.progress(), (0, 1));
    }
}
