//! Monthly population growth, migration and influence diffusion

use crate::core::config::SimulationConfig;
use crate::core::types::{CultureId, ReligionId};
use crate::history::world::HistoryWorld;
use crate::province::diffusion::{diffuse_all, CultureLayer, ReligionLayer};
use crate::province::InfluenceShares;

/// Logistic growth toward carrying capacity, then migration, settlement
/// refresh and one culture and one religion diffusion step
pub fn update_populations(world: &mut HistoryWorld, config: &SimulationConfig) {
    grow(world, config);
    migrate(world, config);
    world.graph.refresh_all_settlements();
    diffuse_all::<CultureLayer>(&mut world.graph, config.diffusion_epsilon);
    diffuse_all::<ReligionLayer>(&mut world.graph, config.diffusion_epsilon);
}

fn grow(world: &mut HistoryWorld, config: &SimulationConfig) {
    let at_war: Vec<bool> = world.countries.iter().map(|c| c.exists && c.is_at_war()).collect();

    for province in &mut world.graph.provinces {
        if province.is_water() || province.population == 0 || province.carrying_capacity == 0 {
            continue;
        }
        let mut rate = config.growth_rate;
        if province.owner.is_some_and(|o| at_war.get(o.index()).copied().unwrap_or(false)) {
            rate *= config.war_growth_modifier;
        }
        let p = province.population as f32;
        let k = province.carrying_capacity as f32;
        let next = p + rate * p * (1.0 - p / k);
        province.population = next.round().max(0.0) as u32;
    }
}

/// A pending move of people between two provinces
struct Migration {
    from: usize,
    to: usize,
    people: u32,
}

/// People leave provinces above `migration_pressure` of capacity for land
/// neighbors with room, carrying their culture and religion shares. All
/// flows are computed from the populations before the step.
fn migrate(world: &mut HistoryWorld, config: &SimulationConfig) {
    let graph = &world.graph;
    let threshold = |k: u32| k as f32 * config.migration_pressure;

    let mut moves = Vec::new();
    for (from, province) in graph.provinces.iter().enumerate() {
        if province.is_water() {
            continue;
        }
        let excess = province.population as f32 - threshold(province.carrying_capacity);
        if excess <= 0.0 {
            continue;
        }
        let movers = (excess * config.migration_rate).floor();
        if movers < 1.0 {
            continue;
        }

        let rooms: Vec<(usize, f32)> = province
            .neighbors
            .iter()
            .map(|n| n.index())
            .filter_map(|to| {
                let n = &graph.provinces[to];
                let room = threshold(n.carrying_capacity) - n.population as f32;
                (n.is_land() && room > 0.0).then_some((to, room))
            })
            .collect();
        let total_room: f32 = rooms.iter().map(|(_, r)| r).sum();
        if total_room <= 0.0 {
            continue;
        }

        let movers = movers.min(total_room);
        for (to, room) in rooms {
            let people = (movers * room / total_room).floor() as u32;
            if people > 0 {
                moves.push(Migration { from, to, people });
            }
        }
    }
    if moves.is_empty() {
        return;
    }

    let cultures: Vec<InfluenceShares<CultureId>> = graph.provinces.iter().map(|p| p.cultures.clone()).collect();
    let religions: Vec<InfluenceShares<ReligionId>> = graph.provinces.iter().map(|p| p.religions.clone()).collect();

    let provinces = &mut world.graph.provinces;
    for m in &moves {
        provinces[m.from].population = provinces[m.from].population.saturating_sub(m.people);
    }
    for m in &moves {
        let target = &mut provinces[m.to];
        let own = target.population as f32;
        target.cultures.blend(own, &cultures[m.from], m.people as f32);
        target.religions.blend(own, &religions[m.from], m.people as f32);
        target.population += m.people;
    }
    tracing::debug!(flows = moves.len(), "Migration applied");
}
