//! Cultures and religions, and their initial placement on the map

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::seeds::SeedStream;
use crate::core::types::{CultureId, ProvinceId, ReligionId};
use crate::province::diffusion::{diffuse_all, CultureLayer, ReligionLayer};
use crate::province::graph::ProvinceGraph;
use crate::province::influence::InfluenceShares;
use crate::province::naming;

/// Diffusion rounds used to soften the hard borders between hearth regions
const SEEDING_BLUR_STEPS: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Culture {
    pub id: CultureId,
    pub name: String,
    /// How strongly this culture pulls on neighboring populations (≈1.0)
    pub influence_strength: f32,
    pub hearth: ProvinceId,
    pub color: [u8; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Religion {
    pub id: ReligionId,
    pub name: String,
    pub influence_strength: f32,
    pub hearth: ProvinceId,
    pub color: [u8; 3],
}

/// Place `culture_count` cultures and assign every province to its nearest
/// hearth, then blur the borders
pub fn seed_cultures(graph: &mut ProvinceGraph) {
    let mut rng = graph.seeds.rng(SeedStream::Culture);
    let hearths = pick_hearths(graph, graph.params.culture_count as usize, &mut rng);

    graph.cultures = hearths
        .iter()
        .enumerate()
        .map(|(i, &hearth)| Culture {
            id: CultureId(i as u16),
            name: naming::culture_name(&mut rng),
            influence_strength: rng.gen_range(0.8..1.2),
            hearth,
            color: random_color(&mut rng),
        })
        .collect();

    let nearest = nearest_hearth(graph, &hearths);
    for (province, hearth_index) in graph.provinces.iter_mut().zip(nearest) {
        province.cultures = InfluenceShares::single(CultureId(hearth_index as u16));
    }

    let epsilon = 0.01;
    for _ in 0..SEEDING_BLUR_STEPS {
        diffuse_all::<CultureLayer>(graph, epsilon);
    }
    debug!(cultures = graph.cultures.len(), "Seeded cultures");
}

/// Same as `seed_cultures`, on the religion stream
pub fn seed_religions(graph: &mut ProvinceGraph) {
    let mut rng = graph.seeds.rng(SeedStream::Religion);
    let hearths = pick_hearths(graph, graph.params.religion_count as usize, &mut rng);

    graph.religions = hearths
        .iter()
        .enumerate()
        .map(|(i, &hearth)| Religion {
            id: ReligionId(i as u16),
            name: naming::religion_name(&mut rng),
            influence_strength: rng.gen_range(0.8..1.2),
            hearth,
            color: random_color(&mut rng),
        })
        .collect();

    let nearest = nearest_hearth(graph, &hearths);
    for (province, hearth_index) in graph.provinces.iter_mut().zip(nearest) {
        province.religions = InfluenceShares::single(ReligionId(hearth_index as u16));
    }

    let epsilon = 0.01;
    for _ in 0..SEEDING_BLUR_STEPS {
        diffuse_all::<ReligionLayer>(graph, epsilon);
    }
    debug!(religions = graph.religions.len(), "Seeded religions");
}

/// Farthest-point sampling over land provinces: the first hearth is random,
/// each next one maximizes its distance to the hearths already chosen
fn pick_hearths(graph: &ProvinceGraph, count: usize, rng: &mut ChaCha8Rng) -> Vec<ProvinceId> {
    let candidates: Vec<ProvinceId> = match graph.land_provinces().map(|p| p.id).collect::<Vec<_>>() {
        land if !land.is_empty() => land,
        _ => graph.ids().collect(),
    };
    if candidates.is_empty() || count == 0 {
        return Vec::new();
    }

    let mut hearths = vec![candidates[rng.gen_range(0..candidates.len())]];
    let mut nearest: Vec<f32> = candidates
        .iter()
        .map(|&c| graph.center_distance(c, hearths[0]))
        .collect();

    while hearths.len() < count.min(candidates.len()) {
        let Some((best, _)) = nearest
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
        else {
            break;
        };
        let hearth = candidates[best];
        hearths.push(hearth);
        for (d, &c) in nearest.iter_mut().zip(&candidates) {
            *d = d.min(graph.center_distance(c, hearth));
        }
    }

    hearths
}

fn nearest_hearth(graph: &ProvinceGraph, hearths: &[ProvinceId]) -> Vec<usize> {
    graph
        .provinces
        .iter()
        .map(|p| {
            hearths
                .iter()
                .enumerate()
                .min_by(|a, b| {
                    graph
                        .center_distance(p.id, *a.1)
                        .total_cmp(&graph.center_distance(p.id, *b.1))
                })
                .map(|(i, _)| i)
                .unwrap_or(0)
        })
        .collect()
}

fn random_color(rng: &mut ChaCha8Rng) -> [u8; 3] {
    [rng.gen_range(40..230), rng.gen_range(40..230), rng.gen_range(40..230)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::province::graph::test_support::square_grid;

    #[test]
    fn test_hearths_are_spread_out() {
        let mut graph = square_grid(8, 8, 1000);
        graph.params.culture_count = 2;
        let mut rng = graph.seeds.rng(SeedStream::Culture);
        let hearths = pick_hearths(&graph, 2, &mut rng);
        assert_eq!(hearths.len(), 2);
        // Wherever the first lands, some corner cell is at least 3.5 cells
        // away on both axes
        assert!(graph.center_distance(hearths[0], hearths[1]) >= 3.5 * 2f32.sqrt() - 1e-4);
    }

    #[test]
    fn test_every_province_gets_normalized_cultures() {
        let mut graph = square_grid(6, 6, 1000);
        graph.params.culture_count = 3;
        seed_cultures(&mut graph);
        assert_eq!(graph.cultures.len(), 3);
        for province in &graph.provinces {
            assert!(!province.cultures.is_empty());
            assert!(province.cultures.is_normalized());
        }
    }

    #[test]
    fn test_hearth_is_held_by_its_culture() {
        let mut graph = square_grid(6, 6, 1000);
        graph.params.religion_count = 2;
        seed_religions(&mut graph);
        for religion in &graph.religions {
            let hearth = &graph.provinces[religion.hearth.index()];
            assert_eq!(hearth.dominant_religion(), Some(religion.id));
        }
    }
}
