//! Instruction resolution
//!
//! The queue is drained in FIFO order. An instruction whose references no
//! longer hold (a country that stopped existing, a province that changed
//! hands, a war that is too young to end) is dropped with a debug log.

use thiserror::Error;
use tracing::debug;

use crate::core::config::SimulationConfig;
use crate::core::types::{ArmyId, CountryId, ProvinceId};
use crate::history::army::Army;
use crate::history::diplomacy::{transition, DiplomaticAction, Relation, TransitionRejected};
use crate::history::instruction::{Instruction, InstructionQueue};
use crate::history::world::HistoryWorld;
use crate::pathfinding::RouteFinder;
use crate::province::naming;
use crate::province::settlement::city_in;

/// Why an instruction was dropped
#[derive(Debug, Error, PartialEq)]
pub enum Rejection {
    #[error("country {0:?} does not exist")]
    MissingCountry(CountryId),

    #[error("army {0:?} does not exist")]
    MissingArmy(ArmyId),

    #[error("province {0:?} is not a valid target")]
    InvalidProvince(ProvinceId),

    #[error("a country cannot act on itself")]
    SelfTarget,

    #[error("{action:?} does not apply to the current relation")]
    NotApplicable { action: DiplomaticAction },

    #[error("war has run {months} months, {required} required")]
    WarTooRecent { months: i64, required: u32 },

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: f32, available: f32 },

    #[error("no land route to {0:?}")]
    NoRoute(ProvinceId),
}

/// Drain the queue, returning how many instructions took effect
pub fn drain_queue(
    world: &mut HistoryWorld,
    config: &SimulationConfig,
    queue: &mut InstructionQueue,
    finder: &mut RouteFinder,
) -> usize {
    let mut executed = 0;
    while let Some(instruction) = queue.pop() {
        match execute(world, config, finder, &instruction) {
            Ok(()) => executed += 1,
            Err(reason) => debug!(
                instruction = instruction.label(),
                %reason,
                "Dropped instruction"
            ),
        }
    }
    executed
}

/// Apply one instruction to the world
pub fn execute(
    world: &mut HistoryWorld,
    config: &SimulationConfig,
    finder: &mut RouteFinder,
    instruction: &Instruction,
) -> Result<(), Rejection> {
    match instruction {
        Instruction::Diplomacy { actor, target, action } => {
            apply_diplomacy(world, config, *actor, *target, *action)
        }
        Instruction::Annex { actor, target } => annex(world, *actor, *target),
        Instruction::FoundCountry { parent, provinces } => {
            found_country(world, *parent, provinces, Relation::Neutral).map(|_| ())
        }
        Instruction::BuildArmy { country, province } => build_army(world, config, *country, *province),
        Instruction::MoveArmy { army, target } => move_army(world, finder, *army, *target),
        Instruction::DisbandArmy { army } => world
            .remove_army(*army)
            .map(|_| ())
            .ok_or(Rejection::MissingArmy(*army)),
        Instruction::Colonize { country, province } => colonize(world, config, *country, *province),
    }
}

fn require_living(world: &HistoryWorld, id: CountryId) -> Result<(), Rejection> {
    world.living(id).map(|_| ()).ok_or(Rejection::MissingCountry(id))
}

fn apply_diplomacy(
    world: &mut HistoryWorld,
    config: &SimulationConfig,
    actor: CountryId,
    target: CountryId,
    action: DiplomaticAction,
) -> Result<(), Rejection> {
    require_living(world, actor)?;
    require_living(world, target)?;
    if actor == target {
        return Err(Rejection::SelfTarget);
    }

    let current = world.relation(actor, target);
    let next = transition(current, action, world.date(), config.min_war_months).map_err(|e| match e {
        TransitionRejected::NotApplicable => Rejection::NotApplicable { action },
        TransitionRejected::WarTooRecent { months, required } => Rejection::WarTooRecent { months, required },
    })?;
    world.set_relation(actor, target, next);

    if next.is_war() {
        for army in world.armies.values_mut() {
            if army.owner == actor || army.owner == target {
                army.halt();
            }
        }
    }
    Ok(())
}

fn annex(world: &mut HistoryWorld, actor: CountryId, target: CountryId) -> Result<(), Rejection> {
    require_living(world, actor)?;
    require_living(world, target)?;
    if world.relation(actor, target) != Relation::Suzerain {
        return Err(Rejection::NotApplicable {
            action: DiplomaticAction::Vassalize,
        });
    }

    let provinces: Vec<ProvinceId> = world
        .living(target)
        .map(|c| c.provinces.iter().copied().collect())
        .unwrap_or_default();
    let funds = world.living(target).map(|c| c.funds.max(0.0)).unwrap_or(0.0);
    for province in provinces {
        world.transfer_province(province, Some(actor));
    }
    world.dissolve_country(target);
    if let Some(country) = world.country_mut(actor) {
        country.funds += funds;
    }
    Ok(())
}

/// Split `provinces` off `parent` into a new country holding `relation`
/// toward its parent. Funds move in proportion to the population that
/// leaves; the parent must keep at least one province. Repeated province
/// ids count once.
pub(crate) fn found_country(
    world: &mut HistoryWorld,
    parent: CountryId,
    provinces: &[ProvinceId],
    relation: Relation,
) -> Result<CountryId, Rejection> {
    let mut provinces = provinces.to_vec();
    provinces.sort_unstable();
    provinces.dedup();

    let Some(parent_country) = world.living(parent) else {
        return Err(Rejection::MissingCountry(parent));
    };
    if provinces.is_empty() || provinces.len() >= parent_country.provinces.len() {
        return Err(Rejection::NotApplicable {
            action: DiplomaticAction::Release,
        });
    }
    if let Some(&p) = provinces.iter().find(|p| !parent_country.provinces.contains(p)) {
        return Err(Rejection::InvalidProvince(p));
    }

    let parent_population = population_of(world, parent_country.provinces.iter().copied());
    let leaving_population = population_of(world, provinces.iter().copied());
    let share = if parent_population > 0 {
        leaving_population as f32 / parent_population as f32
    } else {
        provinces.len() as f32 / parent_country.provinces.len() as f32
    }
    .clamp(0.0, 1.0);
    let moved_funds = parent_country.funds.max(0.0) * share;
    let government = parent_country.government;
    let parent_color = parent_country.color;

    let Some(capital) = provinces.iter().copied().max_by(|a, b| {
        world.graph.provinces[a.index()]
            .population
            .cmp(&world.graph.provinces[b.index()].population)
            .then(b.cmp(a))
    }) else {
        return Err(Rejection::NotApplicable {
            action: DiplomaticAction::Release,
        });
    };
    let capital_name = world.graph.provinces[capital.index()].name.clone();
    let culture = world.graph.provinces[capital.index()].dominant_culture();
    let religion = world.graph.provinces[capital.index()].dominant_religion();
    let name = naming::country_name(&mut world.rng, &capital_name);

    let id = world.add_country(name);
    for &province in &provinces {
        world.transfer_province(province, Some(id));
    }
    let capital_city = city_in(&world.graph, capital);
    if let Some(country) = world.country_mut(id) {
        country.funds = moved_funds;
        country.government = government;
        country.culture = culture;
        country.religion = religion;
        country.capital = Some(capital);
        country.capital_city = capital_city;
        country.color = [
            parent_color[1],
            parent_color[2],
            parent_color[0],
        ];
    }
    if let Some(country) = world.country_mut(parent) {
        country.funds -= moved_funds;
    }
    world.set_relation(id, parent, relation);
    Ok(id)
}

fn population_of(world: &HistoryWorld, provinces: impl Iterator<Item = ProvinceId>) -> u64 {
    provinces
        .filter_map(|p| world.graph.province(p))
        .map(|p| p.population as u64)
        .sum()
}

fn build_army(
    world: &mut HistoryWorld,
    config: &SimulationConfig,
    country: CountryId,
    province: ProvinceId,
) -> Result<(), Rejection> {
    let Some(owner) = world.living(country) else {
        return Err(Rejection::MissingCountry(country));
    };
    if !owner.provinces.contains(&province) {
        return Err(Rejection::InvalidProvince(province));
    }
    let cost = config.army_recruit_size as f32 * config.recruit_cost_per_soldier;
    if owner.funds < cost {
        return Err(Rejection::InsufficientFunds {
            needed: cost,
            available: owner.funds,
        });
    }
    let combat_value = config.base_combat_value * owner.government.combat_modifier();

    let id = world.next_army_id();
    world.add_army(Army::new(id, country, province, config.army_recruit_size, combat_value));
    if let Some(owner) = world.country_mut(country) {
        owner.funds -= cost;
    }
    Ok(())
}

fn move_army(
    world: &mut HistoryWorld,
    finder: &mut RouteFinder,
    army: ArmyId,
    target: ProvinceId,
) -> Result<(), Rejection> {
    let Some(current) = world.armies.get(&army) else {
        return Err(Rejection::MissingArmy(army));
    };
    require_living(world, current.owner)?;
    if !world.graph.province(target).is_some_and(|p| p.is_land()) {
        return Err(Rejection::InvalidProvince(target));
    }
    let route = finder
        .calculate_route_water_blocked_and_height_weighted(&world.graph, current.province, target)
        .ok_or(Rejection::NoRoute(target))?;
    if let Some(army) = world.armies.get_mut(&army) {
        army.order_move(target, route);
    }
    Ok(())
}

fn colonize(
    world: &mut HistoryWorld,
    config: &SimulationConfig,
    country: CountryId,
    province: ProvinceId,
) -> Result<(), Rejection> {
    let Some(owner) = world.living(country) else {
        return Err(Rejection::MissingCountry(country));
    };
    let valid = world
        .graph
        .province(province)
        .is_some_and(|p| p.is_land() && p.owner.is_none())
        && world
            .graph
            .neighbors(province)
            .iter()
            .any(|n| owner.provinces.contains(n));
    if !valid {
        return Err(Rejection::InvalidProvince(province));
    }
    if owner.funds < config.colonize_cost {
        return Err(Rejection::InsufficientFunds {
            needed: config.colonize_cost,
            available: owner.funds,
        });
    }

    world.transfer_province(province, Some(country));
    if let Some(owner) = world.country_mut(country) {
        owner.funds -= config.colonize_cost;
    }
    Ok(())
}
