//! Binary snapshot cache
//!
//! Snapshots are encoded with bincode's default layout: fields in
//! declaration order, sequences and strings prefixed by their length. The
//! cache carries no version tag; a cache written by a different build is
//! simply regenerated.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::error::Result;
use crate::snapshot::capture::HistorySnapshot;

pub fn serialize_binary(snapshot: &HistorySnapshot) -> Result<Vec<u8>> {
    Ok(bincode::serialize(snapshot)?)
}

pub fn deserialize_binary(bytes: &[u8]) -> Result<HistorySnapshot> {
    Ok(bincode::deserialize(bytes)?)
}

/// Write a snapshot cache file, creating parent directories as needed
pub fn write_snapshot_file(path: &Path, snapshot: &HistorySnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    bincode::serialize_into(&mut writer, snapshot)?;
    writer.flush()?;
    Ok(())
}

pub fn read_snapshot_file(path: &Path) -> Result<HistorySnapshot> {
    let reader = BufReader::new(fs::File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}
