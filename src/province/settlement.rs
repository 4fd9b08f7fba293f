//! Cities and towns
//!
//! A settlement holds a fixed share of its province's population; the
//! absolute figure is refreshed whenever the province population changes.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::seeds::SeedStream;
use crate::core::types::{ProvinceId, SettlementId};
use crate::province::graph::ProvinceGraph;
use crate::province::naming;

/// Land provinces per city at richness 1.0
const LAND_PER_CITY: f32 = 12.0;

/// Land provinces per town at richness 1.0
const LAND_PER_TOWN: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SettlementKind {
    City,
    Town,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
    pub kind: SettlementKind,
    pub province: ProvinceId,
    /// Fraction of the province population living here
    pub share: f32,
    pub population: u32,
}

impl Settlement {
    pub fn refresh(&mut self, province_population: u32) {
        self.population = (province_population as f32 * self.share).round() as u32;
    }

    pub fn is_city(&self) -> bool {
        self.kind == SettlementKind::City
    }
}

/// Place cities on the most populous land provinces (never two adjacent)
/// and towns on population-weighted random picks
pub fn place_settlements(graph: &mut ProvinceGraph) {
    let mut rng = graph.seeds.rng(SeedStream::City);

    let mut by_population: Vec<ProvinceId> = graph
        .land_provinces()
        .filter(|p| p.population > 0)
        .map(|p| p.id)
        .collect();
    by_population.sort_by(|a, b| {
        graph.provinces[b.index()]
            .population
            .cmp(&graph.provinces[a.index()].population)
            .then(a.cmp(b))
    });

    let land = graph.land_provinces().count() as f32;
    let city_target = (land / LAND_PER_CITY * graph.params.city_richness).round() as usize;
    let town_target = (land / LAND_PER_TOWN * graph.params.town_richness).round() as usize;

    let mut city_provinces: Vec<ProvinceId> = Vec::new();
    for &candidate in &by_population {
        if city_provinces.len() >= city_target {
            break;
        }
        if city_provinces.iter().any(|&c| c == candidate || graph.are_adjacent(c, candidate)) {
            continue;
        }
        city_provinces.push(candidate);
    }

    let mut placed: Vec<(ProvinceId, SettlementKind, f32)> = city_provinces
        .iter()
        .map(|&p| (p, SettlementKind::City, rng.gen_range(0.15..0.25)))
        .collect();

    let total_weight: f64 = by_population
        .iter()
        .map(|p| graph.provinces[p.index()].population as f64)
        .sum();
    if total_weight > 0.0 {
        for _ in 0..town_target {
            let mut roll = rng.gen::<f64>() * total_weight;
            let mut chosen = by_population[by_population.len() - 1];
            for &p in &by_population {
                roll -= graph.provinces[p.index()].population as f64;
                if roll <= 0.0 {
                    chosen = p;
                    break;
                }
            }
            placed.push((chosen, SettlementKind::Town, rng.gen_range(0.04..0.08)));
        }
    }

    graph.settlements.clear();
    for province in &mut graph.provinces {
        province.settlements.clear();
    }

    for (i, (province_id, kind, share)) in placed.into_iter().enumerate() {
        let id = SettlementId(i as u32);
        let province = &mut graph.provinces[province_id.index()];
        let mut settlement = Settlement {
            id,
            name: naming::place_name(&mut rng),
            kind,
            province: province_id,
            share,
            population: 0,
        };
        settlement.refresh(province.population);
        province.settlements.push(id);
        graph.settlements.push(settlement);
    }

    debug!(
        cities = city_provinces.len(),
        towns = graph.settlements.len() - city_provinces.len(),
        "Placed settlements"
    );
}

/// The first city in a province, if any
pub fn city_in(graph: &ProvinceGraph, province: ProvinceId) -> Option<SettlementId> {
    graph
        .province(province)?
        .settlements
        .iter()
        .copied()
        .find(|&s| graph.settlement(s).is_some_and(|s| s.is_city()))
}
