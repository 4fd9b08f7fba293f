//! Country - a polity owning provinces in the history simulation

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::calendar::MonthDate;
use crate::core::types::{ArmyId, CountryId, CultureId, ProvinceId, ReligionId, SettlementId};
use crate::history::diplomacy::Relation;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernmentType {
    #[default]
    Monarchy,
    Republic,
    Theocracy,
    Tribe,
}

impl GovernmentType {
    pub const ALL: [GovernmentType; 4] = [
        GovernmentType::Monarchy,
        GovernmentType::Republic,
        GovernmentType::Theocracy,
        GovernmentType::Tribe,
    ];

    pub fn tax_modifier(&self) -> f32 {
        match self {
            GovernmentType::Monarchy => 1.0,
            GovernmentType::Republic => 1.2,
            GovernmentType::Theocracy => 0.9,
            GovernmentType::Tribe => 0.6,
        }
    }

    pub fn combat_modifier(&self) -> f32 {
        match self {
            GovernmentType::Monarchy => 1.0,
            GovernmentType::Republic => 0.9,
            GovernmentType::Theocracy => 1.0,
            GovernmentType::Tribe => 1.2,
        }
    }

    /// Stability in peacetime with a homogeneous population
    pub fn base_stability(&self) -> f32 {
        match self {
            GovernmentType::Monarchy => 0.8,
            GovernmentType::Republic => 0.75,
            GovernmentType::Theocracy => 0.85,
            GovernmentType::Tribe => 0.7,
        }
    }
}

/// Values recalculated every month during upkeep
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryStats {
    pub population: u64,
    pub income: f32,
    pub military_strength: f32,
    pub stability: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    pub funds: f32,
    pub government: GovernmentType,
    pub culture: Option<CultureId>,
    pub religion: Option<ReligionId>,
    pub provinces: BTreeSet<ProvinceId>,
    /// Non-neutral relations only
    pub relations: BTreeMap<CountryId, Relation>,
    pub capital: Option<ProvinceId>,
    pub capital_city: Option<SettlementId>,
    pub armies: Vec<ArmyId>,
    pub exists: bool,
    pub founded: MonthDate,
    /// Controlled from outside; the AI never plans for it
    pub player: bool,
    pub color: [u8; 3],
    pub stats: CountryStats,
}

impl Country {
    pub fn new(id: CountryId, name: String, founded: MonthDate) -> Self {
        Self {
            id,
            name,
            funds: 0.0,
            government: GovernmentType::default(),
            culture: None,
            religion: None,
            provinces: BTreeSet::new(),
            relations: BTreeMap::new(),
            capital: None,
            capital_city: None,
            armies: Vec::new(),
            exists: true,
            founded,
            player: false,
            color: [128, 128, 128],
            stats: CountryStats {
                stability: 1.0,
                ..CountryStats::default()
            },
        }
    }

    pub fn relation(&self, other: CountryId) -> Relation {
        self.relations.get(&other).copied().unwrap_or_default()
    }

    pub fn is_at_war_with(&self, other: CountryId) -> bool {
        self.relation(other).is_war()
    }

    pub fn is_at_war(&self) -> bool {
        self.relations.values().any(|r| r.is_war())
    }

    pub fn enemies(&self) -> impl Iterator<Item = CountryId> + '_ {
        self.relations
            .iter()
            .filter(|(_, r)| r.is_war())
            .map(|(&id, _)| id)
    }

    pub fn overlord(&self) -> Option<CountryId> {
        self.relations
            .iter()
            .find(|(_, r)| **r == Relation::Vassal)
            .map(|(&id, _)| id)
    }

    pub fn vassals(&self) -> impl Iterator<Item = CountryId> + '_ {
        self.relations
            .iter()
            .filter(|(_, r)| **r == Relation::Suzerain)
            .map(|(&id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_relation_is_neutral() {
        let country = Country::new(CountryId(0), "Test".into(), MonthDate::new(1000, 1));
        assert_eq!(country.relation(CountryId(5)), Relation::Neutral);
        assert!(!country.is_at_war());
    }

    #[test]
    fn test_enemies_and_vassals() {
        let mut country = Country::new(CountryId(0), "Test".into(), MonthDate::new(1000, 1));
        country
            .relations
            .insert(CountryId(1), Relation::War { since: MonthDate::new(1000, 1) });
        country.relations.insert(CountryId(2), Relation::Suzerain);
        country.relations.insert(CountryId(3), Relation::Vassal);
        assert_eq!(country.enemies().collect::<Vec<_>>(), vec![CountryId(1)]);
        assert_eq!(country.vassals().collect::<Vec<_>>(), vec![CountryId(2)]);
        assert_eq!(country.overlord(), Some(CountryId(3)));
    }
}
