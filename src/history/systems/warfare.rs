//! Army movement, battles and occupation

use std::collections::BTreeMap;

use ahash::AHashSet;
use rand::Rng;

use crate::core::config::SimulationConfig;
use crate::core::types::{ArmyId, CountryId, ProvinceId};
use crate::history::world::HistoryWorld;

/// Share of its own size a defeated army loses
const LOSER_CASUALTIES: f32 = 0.5;

/// Share of its own size the victor loses when the fight was even
const VICTOR_CASUALTIES: f32 = 0.3;

/// What happened during one warfare phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WarfareSummary {
    pub battles: u32,
    pub destroyed_armies: u32,
    pub occupied_provinces: u32,
    pub dissolved_countries: u32,
}

/// Advance armies, fight battles, occupy undefended enemy provinces and
/// dissolve countries left without land
pub fn run_warfare(world: &mut HistoryWorld, config: &SimulationConfig) -> WarfareSummary {
    let mut summary = WarfareSummary::default();

    for army in world.armies.values_mut() {
        army.advance();
    }

    let mut stationed: BTreeMap<ProvinceId, Vec<ArmyId>> = BTreeMap::new();
    for army in world.armies.values() {
        stationed.entry(army.province).or_default().push(army.id);
    }
    for (province, armies) in stationed {
        if armies.len() > 1 {
            fight_in_province(world, config, province, armies, &mut summary);
        }
    }

    occupy_undefended(world, &mut summary);

    for id in world.existing_ids() {
        if world.country(id).is_some_and(|c| c.provinces.is_empty()) {
            world.dissolve_country(id);
            summary.dissolved_countries += 1;
        }
    }

    if summary.battles > 0 || summary.occupied_provinces > 0 {
        tracing::debug!(
            battles = summary.battles,
            occupied = summary.occupied_provinces,
            dissolved = summary.dissolved_countries,
            "Warfare resolved"
        );
    }
    summary
}

/// Pair off hostile armies in one province until no two enemies remain
fn fight_in_province(
    world: &mut HistoryWorld,
    config: &SimulationConfig,
    province: ProvinceId,
    mut armies: Vec<ArmyId>,
    summary: &mut WarfareSummary,
) {
    while let Some((a, b)) = hostile_pair(world, &armies) {
        let loser = battle(world, province, a, b);
        summary.battles += 1;

        for id in [a, b] {
            let destroyed = world
                .armies
                .get(&id)
                .is_some_and(|army| army.size < config.army_destroyed_below);
            if destroyed {
                world.remove_army(id);
                armies.retain(|&x| x != id);
                summary.destroyed_armies += 1;
            }
        }
        // A beaten army that survives falls back and leaves the field
        if world.armies.contains_key(&loser) {
            if let Some(army) = world.armies.get_mut(&loser) {
                army.halt();
            }
            armies.retain(|&x| x != loser);
        }
    }
}

fn hostile_pair(world: &HistoryWorld, armies: &[ArmyId]) -> Option<(ArmyId, ArmyId)> {
    for (i, a) in armies.iter().enumerate() {
        for b in &armies[i + 1..] {
            let (Some(x), Some(y)) = (world.armies.get(a), world.armies.get(b)) else {
                continue;
            };
            if world.at_war(x.owner, y.owner) {
                return Some((*a, *b));
            }
        }
    }
    None
}

/// Fight one battle, applying casualties; returns the loser
fn battle(world: &mut HistoryWorld, province: ProvinceId, a: ArmyId, b: ArmyId) -> ArmyId {
    let (owner, defense) = world
        .graph
        .province(province)
        .map(|p| (p.owner, p.landform.defense_bonus()))
        .unwrap_or((None, 0.0));

    let mut power = |id: ArmyId| -> f32 {
        let Some(army) = world.armies.get(&id) else {
            return 0.0;
        };
        let terrain = if Some(army.owner) == owner { 1.0 + defense } else { 1.0 };
        army.strength() * terrain * world.rng.gen_range(0.8..1.2)
    };
    let power_a = power(a);
    let power_b = power(b);

    let (winner, loser, ratio) = if power_a >= power_b {
        (a, b, if power_a > 0.0 { power_b / power_a } else { 1.0 })
    } else {
        (b, a, power_a / power_b)
    };

    if let Some(army) = world.armies.get_mut(&loser) {
        army.size = (army.size as f32 * (1.0 - LOSER_CASUALTIES)) as u32;
    }
    if let Some(army) = world.armies.get_mut(&winner) {
        army.size = (army.size as f32 * (1.0 - VICTOR_CASUALTIES * ratio)) as u32;
    }
    loser
}

/// Armies standing in an enemy province with no defending army take it
fn occupy_undefended(world: &mut HistoryWorld, summary: &mut WarfareSummary) {
    let garrisons: AHashSet<(ProvinceId, CountryId)> =
        world.armies.values().map(|army| (army.province, army.owner)).collect();
    let mut taken: AHashSet<ProvinceId> = AHashSet::new();
    let mut occupations: Vec<(ProvinceId, CountryId)> = Vec::new();
    for army in world.armies.values() {
        let Some(owner) = world.graph.province(army.province).and_then(|p| p.owner) else {
            continue;
        };
        if !world.at_war(army.owner, owner) || garrisons.contains(&(army.province, owner)) {
            continue;
        }
        if taken.insert(army.province) {
            occupations.push((army.province, army.owner));
        }
    }

    for (province, occupier) in occupations {
        world.transfer_province(province, Some(occupier));
        summary.occupied_provinces += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::army::Army;
    use crate::history::diplomacy::Relation;
    use crate::province::graph::test_support::square_grid;

    fn world_at_war() -> (HistoryWorld, CountryId, CountryId) {
        let mut world = HistoryWorld::new(square_grid(4, 1, 1000));
        let a = world.add_country("A".into());
        let b = world.add_country("B".into());
        world.transfer_province(ProvinceId(0), Some(a));
        world.transfer_province(ProvinceId(1), Some(a));
        world.transfer_province(ProvinceId(2), Some(b));
        world.transfer_province(ProvinceId(3), Some(b));
        world.set_relation(a, b, Relation::War { since: world.date() });
        (world, a, b)
    }

    #[test]
    fn test_undefended_province_is_occupied() {
        let (mut world, a, _) = world_at_war();
        let id = world.next_army_id();
        let mut army = Army::new(id, a, ProvinceId(1), 1000, 1.0);
        army.order_move(ProvinceId(2), vec![ProvinceId(2)]);
        world.add_army(army);

        let summary = run_warfare(&mut world, &SimulationConfig::default());
        assert_eq!(summary.occupied_provinces, 1);
        assert_eq!(world.graph.provinces[2].owner, Some(a));
        assert_eq!(world.armies[&id].province, ProvinceId(2));
    }

    #[test]
    fn test_overwhelming_army_wins_battle() {
        let (mut world, a, b) = world_at_war();
        let strong = world.next_army_id();
        world.add_army(Army::new(strong, a, ProvinceId(2), 5000, 1.0));
        let weak = world.next_army_id();
        world.add_army(Army::new(weak, b, ProvinceId(2), 150, 1.0));

        let summary = run_warfare(&mut world, &SimulationConfig::default());
        assert_eq!(summary.battles, 1);
        assert!(!world.armies.contains_key(&weak));
        assert!(world.armies[&strong].size > 4500);
        // With the defender gone the province falls
        assert_eq!(world.graph.provinces[2].owner, Some(a));
    }

    #[test]
    fn test_landless_country_stops_existing() {
        let (mut world, a, b) = world_at_war();
        world.transfer_province(ProvinceId(2), Some(a));
        let id = world.next_army_id();
        world.add_army(Army::new(id, a, ProvinceId(3), 1000, 1.0));

        let summary = run_warfare(&mut world, &SimulationConfig::default());
        assert_eq!(summary.dissolved_countries, 1);
        assert!(!world.countries[b.index()].exists);
        assert!(!world.at_war(a, b));
    }

    #[test]
    fn test_armies_at_peace_do_not_fight() {
        let (mut world, a, b) = world_at_war();
        world.set_relation(a, b, Relation::Neutral);
        let x = world.next_army_id();
        world.add_army(Army::new(x, a, ProvinceId(1), 1000, 1.0));
        let y = world.next_army_id();
        world.add_army(Army::new(y, b, ProvinceId(1), 1000, 1.0));

        let summary = run_warfare(&mut world, &SimulationConfig::default());
        assert_eq!(summary.battles, 0);
        assert_eq!(world.armies.len(), 2);
    }
}
