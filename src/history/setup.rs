//! Initial countries seeded around populous capitals

use std::collections::VecDeque;

use rand::Rng;
use tracing::info;

use crate::core::types::{CountryId, ProvinceId};
use crate::history::country::GovernmentType;
use crate::history::world::HistoryWorld;
use crate::province::naming;
use crate::province::settlement::city_in;

/// Starting funds for every seeded country
const STARTING_FUNDS: f32 = 100.0;

/// Capitals keep at least this many provinces between each other
const CAPITAL_SPACING: usize = 3;

/// Share of land provinces claimed by the seeded countries
const CLAIMED_LAND_FRACTION: f32 = 0.6;

/// Create up to `count` countries. Capitals are the most populous land
/// provinces at least `CAPITAL_SPACING` steps apart; territory then grows
/// outward from every capital in turn.
pub fn seed_countries(world: &mut HistoryWorld, count: usize) -> Vec<CountryId> {
    let mut candidates: Vec<ProvinceId> = world
        .graph
        .land_provinces()
        .filter(|p| p.population > 0 && p.owner.is_none())
        .map(|p| p.id)
        .collect();
    candidates.sort_by(|a, b| {
        world.graph.provinces[b.index()]
            .population
            .cmp(&world.graph.provinces[a.index()].population)
            .then(a.cmp(b))
    });

    let mut capitals: Vec<ProvinceId> = Vec::new();
    for candidate in candidates {
        if capitals.len() >= count {
            break;
        }
        if capitals
            .iter()
            .all(|&c| hop_distance(world, c, candidate, CAPITAL_SPACING).is_none())
        {
            capitals.push(candidate);
        }
    }

    let mut countries = Vec::with_capacity(capitals.len());
    for &capital in &capitals {
        let capital_name = world.graph.provinces[capital.index()].name.clone();
        let name = naming::country_name(&mut world.rng, &capital_name);
        let government = GovernmentType::ALL[world.rng.gen_range(0..GovernmentType::ALL.len())];
        let color = [
            world.rng.gen_range(40..230),
            world.rng.gen_range(40..230),
            world.rng.gen_range(40..230),
        ];

        let id = world.add_country(name);
        world.transfer_province(capital, Some(id));
        let capital_city = city_in(&world.graph, capital);
        if let Some(country) = world.country_mut(id) {
            country.funds = STARTING_FUNDS;
            country.government = government;
            country.capital = Some(capital);
            country.capital_city = capital_city;
            country.color = color;
        }
        countries.push(id);
    }

    grow_territories(world, &countries);
    info!(countries = countries.len(), "Seeded initial countries");
    countries
}

/// Round-robin breadth-first growth from every capital over unowned land
fn grow_territories(world: &mut HistoryWorld, countries: &[CountryId]) {
    if countries.is_empty() {
        return;
    }
    let land = world.graph.land_provinces().count();
    let target = ((land as f32 * CLAIMED_LAND_FRACTION) / countries.len() as f32).ceil() as usize;

    let mut frontiers: Vec<VecDeque<ProvinceId>> = countries
        .iter()
        .map(|&id| {
            world
                .country(id)
                .and_then(|c| c.capital)
                .into_iter()
                .collect()
        })
        .collect();

    let mut grew = true;
    while grew {
        grew = false;
        for (i, &country) in countries.iter().enumerate() {
            let owned = world.country(country).map(|c| c.provinces.len()).unwrap_or(0);
            if owned >= target {
                continue;
            }
            while let Some(current) = frontiers[i].pop_front() {
                let free: Vec<ProvinceId> = world
                    .graph
                    .neighbors(current)
                    .iter()
                    .copied()
                    .filter(|&n| {
                        world
                            .graph
                            .province(n)
                            .is_some_and(|p| p.is_land() && p.owner.is_none())
                    })
                    .collect();
                let Some(&next) = free.first() else {
                    continue;
                };
                world.transfer_province(next, Some(country));
                // Revisit `current` until all its free neighbors are claimed
                frontiers[i].push_front(current);
                frontiers[i].push_back(next);
                grew = true;
                break;
            }
        }
    }
}

/// Steps between two provinces if within `limit`, by breadth-first search
fn hop_distance(world: &HistoryWorld, from: ProvinceId, to: ProvinceId, limit: usize) -> Option<usize> {
    let mut seen = vec![false; world.graph.len()];
    let mut queue = VecDeque::from([(from, 0usize)]);
    seen[from.index()] = true;
    while let Some((current, depth)) = queue.pop_front() {
        if current == to {
            return Some(depth);
        }
        if depth >= limit {
            continue;
        }
        for &n in world.graph.neighbors(current) {
            if !seen[n.index()] {
                seen[n.index()] = true;
                queue.push_back((n, depth + 1));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::province::graph::test_support::square_grid;

    #[test]
    fn test_capitals_are_spaced_and_territory_grows() {
        let mut graph = square_grid(10, 10, 1000);
        graph.provinces[0].population = 5000;
        graph.provinces[99].population = 4000;
        let mut world = HistoryWorld::new(graph);
        let countries = seed_countries(&mut world, 2);

        assert_eq!(countries.len(), 2);
        assert_eq!(world.countries[0].capital, Some(ProvinceId(0)));
        assert_eq!(world.countries[1].capital, Some(ProvinceId(99)));
        // 60% of 100 provinces split between two countries
        assert_eq!(world.countries[0].provinces.len(), 30);
        assert_eq!(world.countries[1].provinces.len(), 30);
        for country in &world.countries {
            for &p in &country.provinces {
                assert_eq!(world.graph.provinces[p.index()].owner, Some(country.id));
            }
        }
    }

    #[test]
    fn test_hop_distance() {
        let world = HistoryWorld::new(square_grid(5, 1, 0));
        assert_eq!(hop_distance(&world, ProvinceId(0), ProvinceId(3), 5), Some(3));
        assert_eq!(hop_distance(&world, ProvinceId(0), ProvinceId(4), 2), None);
    }
}
