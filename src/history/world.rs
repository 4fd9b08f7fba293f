//! HistoryWorld - the arena owning provinces, countries, armies and crises

use std::collections::{BTreeMap, BTreeSet};

use rand_chacha::ChaCha8Rng;

use crate::core::calendar::{Calendar, MonthDate};
use crate::core::seeds::SeedStream;
use crate::core::types::{ArmyId, CountryId, CrisisId, ProvinceId};
use crate::history::army::Army;
use crate::history::country::Country;
use crate::history::crisis::{CrisisKind, HistoryCrisis};
use crate::history::diplomacy::Relation;
use crate::province::ProvinceGraph;

/// World state for the history simulation
///
/// Countries are never removed: a country that loses its last province is
/// kept with `exists == false` so ids stay valid in older snapshots.
pub struct HistoryWorld {
    pub graph: ProvinceGraph,
    pub countries: Vec<Country>,
    pub armies: BTreeMap<ArmyId, Army>,
    pub crises: BTreeMap<CrisisId, HistoryCrisis>,
    /// Crisis progress per (country, kind), including pressure too low to
    /// be observable yet
    pub latent_crises: BTreeMap<(CountryId, CrisisKind), f32>,
    pub calendar: Calendar,
    /// Random number generator for the simulation stream (deterministic)
    pub rng: ChaCha8Rng,
    next_army_id: u32,
    next_crisis_id: u32,
}

impl HistoryWorld {
    pub fn new(graph: ProvinceGraph) -> Self {
        let calendar = Calendar::new(graph.params.start_date());
        let rng = graph.seeds.rng(SeedStream::Simulation);
        Self {
            graph,
            countries: Vec::new(),
            armies: BTreeMap::new(),
            crises: BTreeMap::new(),
            latent_crises: BTreeMap::new(),
            calendar,
            rng,
            next_army_id: 0,
            next_crisis_id: 0,
        }
    }

    pub fn date(&self) -> MonthDate {
        self.calendar.current()
    }

    pub fn country(&self, id: CountryId) -> Option<&Country> {
        self.countries.get(id.index())
    }

    pub fn country_mut(&mut self, id: CountryId) -> Option<&mut Country> {
        self.countries.get_mut(id.index())
    }

    /// A country that still exists
    pub fn living(&self, id: CountryId) -> Option<&Country> {
        self.country(id).filter(|c| c.exists)
    }

    pub fn existing_ids(&self) -> Vec<CountryId> {
        self.countries.iter().filter(|c| c.exists).map(|c| c.id).collect()
    }

    pub fn add_country(&mut self, name: String) -> CountryId {
        let id = CountryId(self.countries.len() as u32);
        self.countries.push(Country::new(id, name, self.date()));
        id
    }

    pub fn next_army_id(&mut self) -> ArmyId {
        let id = ArmyId(self.next_army_id);
        self.next_army_id += 1;
        id
    }

    pub fn next_crisis_id(&mut self) -> CrisisId {
        let id = CrisisId(self.next_crisis_id);
        self.next_crisis_id += 1;
        id
    }

    /// Move a province to a new owner, keeping both sides of the
    /// ownership link in sync
    pub fn transfer_province(&mut self, province: ProvinceId, new_owner: Option<CountryId>) {
        let Some(p) = self.graph.province_mut(province) else {
            return;
        };
        let old_owner = std::mem::replace(&mut p.owner, new_owner);
        if old_owner == new_owner {
            return;
        }
        if let Some(old) = old_owner.and_then(|id| self.countries.get_mut(id.index())) {
            old.provinces.remove(&province);
            if old.capital == Some(province) {
                old.capital = None;
                old.capital_city = None;
            }
        }
        if let Some(new) = new_owner.and_then(|id| self.countries.get_mut(id.index())) {
            new.provinces.insert(province);
        }
    }

    pub fn relation(&self, a: CountryId, b: CountryId) -> Relation {
        self.country(a).map(|c| c.relation(b)).unwrap_or_default()
    }

    /// Set a relation on both sides, mirrored. Neutral relations are not stored.
    pub fn set_relation(&mut self, a: CountryId, b: CountryId, relation: Relation) {
        if a == b {
            return;
        }
        for (holder, partner, r) in [(a, b, relation), (b, a, relation.mirror())] {
            if let Some(country) = self.countries.get_mut(holder.index()) {
                if r == Relation::Neutral {
                    country.relations.remove(&partner);
                } else {
                    country.relations.insert(partner, r);
                }
            }
        }
    }

    pub fn at_war(&self, a: CountryId, b: CountryId) -> bool {
        self.relation(a, b).is_war()
    }

    /// Countries owning a province adjacent to one of `id`'s provinces
    pub fn neighbor_countries(&self, id: CountryId) -> BTreeSet<CountryId> {
        let Some(country) = self.country(id) else {
            return BTreeSet::new();
        };
        country
            .provinces
            .iter()
            .flat_map(|&p| self.graph.neighbors(p).iter())
            .filter_map(|&n| self.graph.province(n).and_then(|p| p.owner))
            .filter(|&owner| owner != id)
            .collect()
    }

    pub fn add_army(&mut self, army: Army) {
        if let Some(country) = self.countries.get_mut(army.owner.index()) {
            country.armies.push(army.id);
        }
        self.armies.insert(army.id, army);
    }

    pub fn remove_army(&mut self, id: ArmyId) -> Option<Army> {
        let army = self.armies.remove(&id)?;
        if let Some(country) = self.countries.get_mut(army.owner.index()) {
            country.armies.retain(|&a| a != id);
        }
        Some(army)
    }

    /// Mark a country as gone: drop its armies, relations and crises.
    /// Remaining provinces become unowned.
    pub fn dissolve_country(&mut self, id: CountryId) {
        let Some(country) = self.country(id) else {
            return;
        };
        let provinces: Vec<ProvinceId> = country.provinces.iter().copied().collect();
        let armies = country.armies.clone();
        let partners: Vec<CountryId> = country.relations.keys().copied().collect();

        for province in provinces {
            self.transfer_province(province, None);
        }
        for army in armies {
            self.remove_army(army);
        }
        for partner in partners {
            self.set_relation(id, partner, Relation::Neutral);
        }
        self.crises.retain(|_, c| c.country != id);
        self.latent_crises.retain(|(country, _), _| *country != id);

        if let Some(country) = self.country_mut(id) {
            country.exists = false;
            country.capital = None;
            country.capital_city = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::province::graph::test_support::square_grid;

    #[test]
    fn test_transfer_keeps_both_sides_in_sync() {
        let mut world = HistoryWorld::new(square_grid(3, 3, 100));
        let a = world.add_country("A".into());
        let b = world.add_country("B".into());
        world.transfer_province(ProvinceId(4), Some(a));
        world.transfer_province(ProvinceId(4), Some(b));

        assert_eq!(world.graph.provinces[4].owner, Some(b));
        assert!(world.countries[a.index()].provinces.is_empty());
        assert!(world.countries[b.index()].provinces.contains(&ProvinceId(4)));
    }

    #[test]
    fn test_relations_are_mirrored() {
        let mut world = HistoryWorld::new(square_grid(2, 2, 100));
        let a = world.add_country("A".into());
        let b = world.add_country("B".into());
        world.set_relation(a, b, Relation::Suzerain);
        assert_eq!(world.relation(b, a), Relation::Vassal);
        world.set_relation(b, a, Relation::Neutral);
        assert!(world.countries[a.index()].relations.is_empty());
        assert!(world.countries[b.index()].relations.is_empty());
    }

    #[test]
    fn test_dissolved_country_releases_everything() {
        let mut world = HistoryWorld::new(square_grid(2, 2, 100));
        let a = world.add_country("A".into());
        let b = world.add_country("B".into());
        world.transfer_province(ProvinceId(0), Some(a));
        world.set_relation(a, b, Relation::War { since: world.date() });
        let army_id = world.next_army_id();
        world.add_army(Army::new(army_id, a, ProvinceId(0), 500, 1.0));

        world.dissolve_country(a);
        assert!(!world.countries[a.index()].exists);
        assert!(world.armies.is_empty());
        assert_eq!(world.graph.provinces[0].owner, None);
        assert!(!world.at_war(b, a));
    }

    #[test]
    fn test_neighbor_countries() {
        let mut world = HistoryWorld::new(square_grid(3, 1, 100));
        let a = world.add_country("A".into());
        let b = world.add_country("B".into());
        let c = world.add_country("C".into());
        world.transfer_province(ProvinceId(0), Some(a));
        world.transfer_province(ProvinceId(1), Some(b));
        world.transfer_province(ProvinceId(2), Some(c));
        assert_eq!(world.neighbor_countries(a).into_iter().collect::<Vec<_>>(), vec![b]);
        assert_eq!(world.neighbor_countries(b).len(), 2);
    }
}
