//! AI planning: every existing non-player country queues its intentions
//!
//! Planning only reads the world (plus the simulation random stream) and
//! pushes instructions; nothing changes until the queue is drained.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::core::types::{CountryId, ProvinceId};
use crate::history::country::Country;
use crate::history::diplomacy::{DiplomaticAction, Relation};
use crate::history::instruction::{Instruction, InstructionQueue};
use crate::history::world::HistoryWorld;

/// Strength ratio over a neighbor that makes the AI consider war
const WAR_STRENGTH_RATIO: f32 = 1.5;

/// Strength ratio over a neighbor that lets the AI demand tribute
const TRIBUTE_STRENGTH_RATIO: f32 = 2.0;

/// Monthly chance of settling an adjacent unowned province when affordable
const COLONIZE_CHANCE: f32 = 0.1;

/// Countries at least this large may split off their outer provinces
const FOUND_COUNTRY_MIN_PROVINCES: usize = 8;

/// Stability below which a large country may split
const FOUND_COUNTRY_STABILITY: f32 = 0.5;

/// Plan one month for every existing AI country, in id order
pub fn plan_countries(world: &mut HistoryWorld, config: &SimulationConfig, queue: &mut InstructionQueue) {
    let mut rng = world.rng.clone();
    let before = queue.len();

    for id in world.existing_ids() {
        let Some(country) = world.living(id) else {
            continue;
        };
        if country.player {
            continue;
        }
        plan_diplomacy(world, country, config, &mut rng, queue);
        plan_armies(world, country, config, &mut rng, queue);
        plan_territory(world, country, config, &mut rng, queue);
    }

    world.rng = rng;
    tracing::debug!(planned = queue.len() - before, "AI planning finished");
}

fn plan_diplomacy(
    world: &HistoryWorld,
    country: &Country,
    config: &SimulationConfig,
    rng: &mut ChaCha8Rng,
    queue: &mut InstructionQueue,
) {
    let now = world.date();
    let own_strength = country.stats.military_strength;

    let mut partners = world.neighbor_countries(country.id);
    partners.extend(country.relations.keys().copied());

    for partner in partners {
        let Some(other) = world.living(partner) else {
            continue;
        };
        let ratio = strength_ratio(own_strength, other.stats.military_strength);
        let diplomacy = |action| Instruction::Diplomacy {
            actor: country.id,
            target: partner,
            action,
        };

        match country.relation(partner) {
            Relation::War { since } => {
                if now.months_since(since) < config.min_war_months as i64 {
                    continue;
                }
                if rng.gen::<f32>() < config.peace_chance {
                    let action = if ratio > TRIBUTE_STRENGTH_RATIO {
                        DiplomaticAction::Vassalize
                    } else {
                        DiplomaticAction::MakePeace
                    };
                    queue.push(diplomacy(action));
                }
            }
            Relation::Neutral => {
                let roll = rng.gen::<f32>();
                if roll < config.befriend_chance {
                    queue.push(diplomacy(DiplomaticAction::Befriend));
                } else if roll < config.befriend_chance + config.denounce_chance {
                    queue.push(diplomacy(DiplomaticAction::Denounce));
                } else if ratio > TRIBUTE_STRENGTH_RATIO && rng.gen::<f32>() < config.tribute_chance {
                    queue.push(diplomacy(DiplomaticAction::DemandTribute));
                }
            }
            Relation::Friendly => {
                if rng.gen::<f32>() < config.alliance_chance {
                    queue.push(diplomacy(DiplomaticAction::FormAlliance));
                }
            }
            Relation::Hostile => {
                let roll = rng.gen::<f32>();
                if ratio > WAR_STRENGTH_RATIO && roll < config.war_chance {
                    queue.push(diplomacy(DiplomaticAction::DeclareWar));
                } else if roll > 1.0 - config.befriend_chance {
                    queue.push(diplomacy(DiplomaticAction::Befriend));
                }
            }
            Relation::Suzerain => {
                let roll = rng.gen::<f32>();
                if roll < config.annex_chance {
                    queue.push(Instruction::Annex {
                        actor: country.id,
                        target: partner,
                    });
                } else if roll > 1.0 - config.release_chance {
                    queue.push(diplomacy(DiplomaticAction::Release));
                }
            }
            Relation::Tributary => {
                if ratio > 1.0 && rng.gen::<f32>() < config.release_chance {
                    queue.push(diplomacy(DiplomaticAction::EndTribute));
                }
            }
            Relation::Alliance | Relation::Vassal | Relation::Celestial => {}
        }
    }
}

fn plan_armies(
    world: &HistoryWorld,
    country: &Country,
    config: &SimulationConfig,
    rng: &mut ChaCha8Rng,
    queue: &mut InstructionQueue,
) {
    let at_war = country.is_at_war();
    let limit = ((country.provinces.len() as u32 * config.armies_per_ten_provinces) / 10).max(1) as usize;
    let recruit_cost = config.army_recruit_size as f32 * config.recruit_cost_per_soldier;

    if at_war && country.armies.len() < limit && country.funds >= recruit_cost {
        if let Some(capital) = country.capital {
            queue.push(Instruction::BuildArmy {
                country: country.id,
                province: capital,
            });
        }
    }

    if !at_war && country.funds < 0.0 {
        if let Some(&army) = country.armies.first() {
            queue.push(Instruction::DisbandArmy { army });
        }
        return;
    }

    if !at_war {
        return;
    }

    let enemy_provinces: Vec<ProvinceId> = country
        .enemies()
        .filter_map(|e| world.living(e))
        .flat_map(|e| e.provinces.iter().copied())
        .collect();
    if enemy_provinces.is_empty() {
        return;
    }

    for army_id in &country.armies {
        let Some(army) = world.armies.get(army_id) else {
            continue;
        };
        if !army.is_idle() {
            continue;
        }
        let nearest = enemy_provinces.iter().copied().min_by(|&a, &b| {
            let da = world.graph.center_distance(army.province, a);
            let db = world.graph.center_distance(army.province, b);
            da.total_cmp(&db).then(a.cmp(&b))
        });
        // Roll keeps some armies home as garrisons
        if let Some(target) = nearest {
            if rng.gen::<f32>() < 0.8 {
                queue.push(Instruction::MoveArmy { army: army.id, target });
            }
        }
    }
}

fn plan_territory(
    world: &HistoryWorld,
    country: &Country,
    config: &SimulationConfig,
    rng: &mut ChaCha8Rng,
    queue: &mut InstructionQueue,
) {
    if country.funds >= config.colonize_cost * 2.0 && rng.gen::<f32>() < COLONIZE_CHANCE {
        let free = country
            .provinces
            .iter()
            .flat_map(|&p| world.graph.neighbors(p).iter().copied())
            .filter(|&n| {
                world
                    .graph
                    .province(n)
                    .is_some_and(|p| p.is_land() && p.owner.is_none())
            })
            .max_by_key(|&n| (world.graph.provinces[n.index()].carrying_capacity, std::cmp::Reverse(n)));
        if let Some(province) = free {
            queue.push(Instruction::Colonize {
                country: country.id,
                province,
            });
        }
    }

    if country.provinces.len() >= FOUND_COUNTRY_MIN_PROVINCES
        && country.stats.stability < FOUND_COUNTRY_STABILITY
        && rng.gen::<f32>() < config.release_chance
    {
        let provinces = outer_provinces(world, country, country.provinces.len() / 4);
        if !provinces.is_empty() {
            queue.push(Instruction::FoundCountry {
                parent: country.id,
                provinces,
            });
        }
    }
}

/// The `count` provinces farthest from the capital
pub(crate) fn outer_provinces(world: &HistoryWorld, country: &Country, count: usize) -> Vec<ProvinceId> {
    let Some(capital) = country.capital else {
        return Vec::new();
    };
    let mut by_distance: Vec<(f32, ProvinceId)> = country
        .provinces
        .iter()
        .filter(|&&p| p != capital)
        .map(|&p| (world.graph.center_distance(capital, p), p))
        .collect();
    by_distance.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    let mut chosen: Vec<ProvinceId> = by_distance.into_iter().take(count).map(|(_, p)| p).collect();
    chosen.sort();
    chosen
}

fn strength_ratio(own: f32, other: f32) -> f32 {
    if other <= 0.0 {
        if own > 0.0 {
            f32::INFINITY
        } else {
            1.0
        }
    } else {
        own / other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::army::Army;
    use crate::province::graph::test_support::square_grid;

    fn world_with_two_countries() -> (HistoryWorld, CountryId, CountryId) {
        let mut world = HistoryWorld::new(square_grid(4, 1, 1000));
        let a = world.add_country("A".into());
        let b = world.add_country("B".into());
        world.transfer_province(ProvinceId(0), Some(a));
        world.transfer_province(ProvinceId(1), Some(a));
        world.transfer_province(ProvinceId(2), Some(b));
        world.transfer_province(ProvinceId(3), Some(b));
        world.countries[a.index()].capital = Some(ProvinceId(0));
        world.countries[b.index()].capital = Some(ProvinceId(3));
        (world, a, b)
    }

    #[test]
    fn test_player_countries_are_skipped() {
        let (mut world, a, b) = world_with_two_countries();
        world.countries[a.index()].player = true;
        world.countries[b.index()].player = true;
        let config = SimulationConfig {
            befriend_chance: 1.0,
            ..SimulationConfig::default()
        };
        let mut queue = InstructionQueue::new();
        plan_countries(&mut world, &config, &mut queue);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_certain_friendship_is_planned() {
        let (mut world, a, b) = world_with_two_countries();
        let config = SimulationConfig {
            befriend_chance: 1.0,
            colonize_cost: 1e9,
            ..SimulationConfig::default()
        };
        let mut queue = InstructionQueue::new();
        plan_countries(&mut world, &config, &mut queue);
        assert_eq!(
            queue.pop(),
            Some(Instruction::Diplomacy {
                actor: a,
                target: b,
                action: DiplomaticAction::Befriend
            })
        );
    }

    #[test]
    fn test_strong_neighbor_demands_tribute() {
        let (mut world, a, b) = world_with_two_countries();
        world.countries[a.index()].stats.military_strength = 100.0;
        world.countries[b.index()].stats.military_strength = 10.0;
        let config = SimulationConfig {
            befriend_chance: 0.0,
            denounce_chance: 0.0,
            tribute_chance: 1.0,
            colonize_cost: 1e9,
            ..SimulationConfig::default()
        };
        let mut queue = InstructionQueue::new();
        plan_countries(&mut world, &config, &mut queue);
        assert_eq!(
            queue.pop(),
            Some(Instruction::Diplomacy {
                actor: a,
                target: b,
                action: DiplomaticAction::DemandTribute
            })
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_idle_armies_march_on_enemies() {
        let (mut world, a, b) = world_with_two_countries();
        world.set_relation(a, b, Relation::War { since: world.date() });
        let army = world.next_army_id();
        world.add_army(Army::new(army, a, ProvinceId(0), 1000, 1.0));
        world.countries[b.index()].player = true;

        let mut found_move = false;
        for _ in 0..20 {
            let mut queue = InstructionQueue::new();
            plan_countries(&mut world, &SimulationConfig::default(), &mut queue);
            while let Some(instruction) = queue.pop() {
                if let Instruction::MoveArmy { army: moved, target } = instruction {
                    assert_eq!(moved, army);
                    assert_eq!(target, ProvinceId(2));
                    found_move = true;
                }
            }
        }
        assert!(found_move);
    }

    #[test]
    fn test_outer_provinces_are_farthest_from_capital() {
        let mut world = HistoryWorld::new(square_grid(8, 1, 1000));
        let a = world.add_country("A".into());
        for p in 0..8 {
            world.transfer_province(ProvinceId(p), Some(a));
        }
        world.countries[a.index()].capital = Some(ProvinceId(0));
        let outer = outer_provinces(&world, &world.countries[a.index()], 2);
        assert_eq!(outer, vec![ProvinceId(6), ProvinceId(7)]);
    }
}
