//! On-disk layout of a chronicle
//!
//! ```text
//! <root>/<seed>/settings.toml
//! <root>/<seed>/world_state.json
//! <root>/<seed>/snapshots/<year>-<month>.bin
//! <root>/<seed>/reports/<year>-<month>.txt
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::calendar::MonthDate;
use crate::core::config::GenerationParams;
use crate::core::error::Result;
use crate::snapshot::{read_snapshot_file, write_snapshot_file, HistorySnapshot};

/// Destination for one month's snapshot cache and report. Called from save
/// worker threads.
pub trait HistoryWriter: Send + Sync {
    fn write_month(&self, snapshot: &HistorySnapshot, report: &str) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    /// Open (creating if needed) the directory for one seed under `base`
    pub fn open(base: &Path, seed: u64) -> Result<Self> {
        let root = base.join(seed.to_string());
        fs::create_dir_all(root.join("snapshots"))?;
        fs::create_dir_all(root.join("reports"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join("settings.toml")
    }

    pub fn world_state_path(&self) -> PathBuf {
        self.root.join("world_state.json")
    }

    pub fn snapshot_path(&self, date: MonthDate) -> PathBuf {
        self.root.join("snapshots").join(format!("{}.bin", date.file_key()))
    }

    pub fn report_path(&self, date: MonthDate) -> PathBuf {
        self.root.join("reports").join(format!("{}.txt", date.file_key()))
    }

    pub fn write_settings(&self, params: &GenerationParams) -> Result<()> {
        fs::write(self.settings_path(), params.to_toml_string()?)?;
        Ok(())
    }

    pub fn load_settings(&self) -> Result<GenerationParams> {
        GenerationParams::load(&self.settings_path())
    }

    pub fn write_world_state(&self, json: &str) -> Result<()> {
        fs::write(self.world_state_path(), json)?;
        Ok(())
    }

    pub fn read_snapshot(&self, date: MonthDate) -> Result<HistorySnapshot> {
        read_snapshot_file(&self.snapshot_path(date))
    }

    pub fn read_report(&self, date: MonthDate) -> Result<String> {
        Ok(fs::read_to_string(self.report_path(date))?)
    }
}

impl HistoryWriter for HistoryStore {
    fn write_month(&self, snapshot: &HistorySnapshot, report: &str) -> Result<()> {
        write_snapshot_file(&self.snapshot_path(snapshot.date), snapshot)?;
        fs::write(self.report_path(snapshot.date), report)?;
        Ok(())
    }
}
