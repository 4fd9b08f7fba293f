//! Monthly snapshots: capture, binary cache, diff and report text

pub mod archive;
pub mod capture;
pub mod codec;
pub mod diff;
pub mod report;

pub use archive::SnapshotArchive;
pub use capture::{ArmyRecord, CountryRecord, CrisisRecord, HistorySnapshot, ProvinceRecord, SettlementRecord};
pub use codec::{deserialize_binary, read_snapshot_file, serialize_binary, write_snapshot_file};
pub use diff::{diff, merge_sorted_ids, Change, ChangeRecord, EntityRef};
pub use report::{is_noteworthy, render};
