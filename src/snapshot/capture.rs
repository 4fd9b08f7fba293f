//! HistorySnapshot - flat value copy of the world after one month

use serde::{Deserialize, Serialize};

use crate::core::calendar::MonthDate;
use crate::core::types::{ArmyId, CountryId, CrisisId, CultureId, ProvinceId, ReligionId, SettlementId};
use crate::history::country::GovernmentType;
use crate::history::crisis::CrisisKind;
use crate::history::diplomacy::Relation;
use crate::history::world::HistoryWorld;
use crate::province::SettlementKind;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProvinceRecord {
    pub id: ProvinceId,
    pub name: String,
    pub owner: Option<CountryId>,
    pub population: u32,
    pub culture: Option<CultureId>,
    pub religion: Option<ReligionId>,
    pub claimants: Vec<CountryId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: SettlementId,
    pub name: String,
    pub kind: SettlementKind,
    pub province: ProvinceId,
    pub population: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub id: CountryId,
    pub name: String,
    pub exists: bool,
    pub government: GovernmentType,
    pub culture: Option<CultureId>,
    pub religion: Option<ReligionId>,
    pub capital: Option<ProvinceId>,
    pub province_count: u32,
    pub population: u64,
    pub funds: f32,
    pub stability: f32,
    /// Non-neutral relations sorted by partner id
    pub relations: Vec<(CountryId, Relation)>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArmyRecord {
    pub id: ArmyId,
    pub owner: CountryId,
    pub size: u32,
    pub province: ProvinceId,
    pub target: Option<ProvinceId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrisisRecord {
    pub id: CrisisId,
    pub kind: CrisisKind,
    pub country: CountryId,
    pub progress: f32,
}

/// Immutable capture of one simulated month. Every record list is sorted
/// by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub date: MonthDate,
    pub provinces: Vec<ProvinceRecord>,
    pub settlements: Vec<SettlementRecord>,
    pub countries: Vec<CountryRecord>,
    pub armies: Vec<ArmyRecord>,
    pub crises: Vec<CrisisRecord>,
}

impl HistorySnapshot {
    /// Capture the world as it stands, dated with the current month
    pub fn capture(world: &HistoryWorld) -> Self {
        Self::capture_at(world, world.date())
    }

    /// Capture the seeded world before the first simulated month. It is
    /// dated one month before the start so month keys stay consecutive.
    pub fn capture_baseline(world: &HistoryWorld) -> Self {
        Self::capture_at(world, world.calendar.start().previous())
    }

    fn capture_at(world: &HistoryWorld, date: MonthDate) -> Self {
        let provinces = world
            .graph
            .provinces
            .iter()
            .map(|p| ProvinceRecord {
                id: p.id,
                name: p.name.clone(),
                owner: p.owner,
                population: p.population,
                culture: p.dominant_culture(),
                religion: p.dominant_religion(),
                claimants: p.legitimate_claimants.clone(),
            })
            .collect();

        let settlements = world
            .graph
            .settlements
            .iter()
            .map(|s| SettlementRecord {
                id: s.id,
                name: s.name.clone(),
                kind: s.kind,
                province: s.province,
                population: s.population,
            })
            .collect();

        let countries = world
            .countries
            .iter()
            .map(|c| CountryRecord {
                id: c.id,
                name: c.name.clone(),
                exists: c.exists,
                government: c.government,
                culture: c.culture,
                religion: c.religion,
                capital: c.capital,
                province_count: c.provinces.len() as u32,
                population: c.stats.population,
                funds: c.funds,
                stability: c.stats.stability,
                relations: c.relations.iter().map(|(&id, &r)| (id, r)).collect(),
            })
            .collect();

        let armies = world
            .armies
            .values()
            .map(|a| ArmyRecord {
                id: a.id,
                owner: a.owner,
                size: a.size,
                province: a.province,
                target: a.target,
            })
            .collect();

        let crises = world
            .crises
            .values()
            .map(|c| CrisisRecord {
                id: c.id,
                kind: c.kind,
                country: c.country,
                progress: c.progress,
            })
            .collect();

        Self {
            date,
            provinces,
            settlements,
            countries,
            armies,
            crises,
        }
    }

    /// Country record by id. Country ids index the record list directly.
    pub fn country(&self, id: CountryId) -> Option<&CountryRecord> {
        self.countries.get(id.index()).filter(|c| c.id == id)
    }

    pub fn province(&self, id: ProvinceId) -> Option<&ProvinceRecord> {
        self.provinces.get(id.index()).filter(|p| p.id == id)
    }

    pub fn existing_countries(&self) -> impl Iterator<Item = &CountryRecord> {
        self.countries.iter().filter(|c| c.exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::army::Army;
    use crate::province::graph::test_support::square_grid;

    #[test]
    fn test_capture_copies_world_state() {
        let mut world = HistoryWorld::new(square_grid(3, 1, 500));
        let a = world.add_country("A".into());
        let b = world.add_country("B".into());
        world.transfer_province(ProvinceId(1), Some(a));
        world.set_relation(b, a, Relation::Friendly);
        let army = world.next_army_id();
        world.add_army(Army::new(army, a, ProvinceId(1), 800, 1.0));

        let snapshot = HistorySnapshot::capture(&world);
        assert_eq!(snapshot.date, world.date());
        assert_eq!(snapshot.provinces.len(), 3);
        assert_eq!(snapshot.province(ProvinceId(1)).and_then(|p| p.owner), Some(a));
        assert_eq!(snapshot.country(a).map(|c| c.province_count), Some(1));
        assert_eq!(snapshot.country(a).map(|c| c.relations.clone()), Some(vec![(b, Relation::Friendly)]));
        assert_eq!(snapshot.armies.len(), 1);
        assert!(snapshot.country(CountryId(7)).is_none());
    }

    #[test]
    fn test_baseline_precedes_start() {
        let world = HistoryWorld::new(square_grid(2, 1, 500));
        let baseline = HistorySnapshot::capture_baseline(&world);
        assert_eq!(baseline.date.next(), world.date());
    }
}
