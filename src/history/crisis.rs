//! Internal crises building up inside countries

use serde::{Deserialize, Serialize};

use crate::core::types::{CountryId, CrisisId, CultureId, ReligionId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CrisisKind {
    /// A culture other than the state culture pushes for independence
    CultureConflict(CultureId),
    /// A religion other than the state religion pushes for conversion
    ReligionConflict(ReligionId),
    CivilWar,
}

impl CrisisKind {
    pub fn label(&self) -> &'static str {
        match self {
            CrisisKind::CultureConflict(_) => "culture conflict",
            CrisisKind::ReligionConflict(_) => "religion conflict",
            CrisisKind::CivilWar => "civil war",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrisisState {
    Building,
    Triggered,
    Resolved,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryCrisis {
    pub id: CrisisId,
    pub kind: CrisisKind,
    pub country: CountryId,
    /// In [0, 1]; triggers at 1, resolves at 0
    pub progress: f32,
}

impl HistoryCrisis {
    pub fn new(id: CrisisId, kind: CrisisKind, country: CountryId, progress: f32) -> Self {
        Self {
            id,
            kind,
            country,
            progress: progress.clamp(0.0, 1.0),
        }
    }

    /// Move progress by `delta` and report the resulting state
    pub fn advance(&mut self, delta: f32) -> CrisisState {
        self.progress = (self.progress + delta).clamp(0.0, 1.0);
        crisis_state(self.progress)
    }
}

pub fn crisis_state(progress: f32) -> CrisisState {
    if progress >= 1.0 {
        CrisisState::Triggered
    } else if progress <= 0.0 {
        CrisisState::Resolved
    } else {
        CrisisState::Building
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crisis_states() {
        let mut crisis = HistoryCrisis::new(CrisisId(0), CrisisKind::CivilWar, CountryId(0), 0.5);
        assert_eq!(crisis.advance(0.1), CrisisState::Building);
        assert_eq!(crisis.advance(0.6), CrisisState::Triggered);
        assert_eq!(crisis.progress, 1.0);
        assert_eq!(crisis.advance(-2.0), CrisisState::Resolved);
    }

    #[test]
    fn test_kinds_order_by_group() {
        let a = CrisisKind::CultureConflict(CultureId(1));
        let b = CrisisKind::CultureConflict(CultureId(2));
        assert!(a < b);
        assert!(b < CrisisKind::CivilWar);
    }
}
