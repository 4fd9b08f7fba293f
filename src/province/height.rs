//! Terrain height and water classification

use std::collections::VecDeque;

use tracing::debug;

use crate::core::seeds::SeedStream;
use crate::province::graph::ProvinceGraph;
use crate::province::noise_field::NoiseField;
use crate::province::province::Landform;

/// Continents per map width at fragmentation 1.0
const BASE_HEIGHT_FREQUENCY: f64 = 3.0;
const HEIGHT_OCTAVES: u32 = 5;

/// Distance from the border (fraction of the half-extent) over which the
/// falloff fades out
const FALLOFF_WIDTH: f32 = 0.35;

/// Assign heights from fBm noise minus a border falloff, then classify
/// water below sea level as ocean (reaches the border) or lake
pub fn initialize_height(graph: &mut ProvinceGraph) {
    let params = &graph.params;
    let field = NoiseField::new(
        graph.seeds.noise_seed(SeedStream::Height),
        BASE_HEIGHT_FREQUENCY * params.fragmentation as f64,
        HEIGHT_OCTAVES,
        params.width,
        params.height,
    );
    let span = params.max_height - params.min_height;

    for province in &mut graph.provinces {
        let p = province.center;
        let raw = params.min_height + field.sample_unit(p) * span;

        let nx = p.x / params.width;
        let ny = p.y / params.height;
        let edge = (nx.min(1.0 - nx).min(ny).min(1.0 - ny) * 2.0).clamp(0.0, 1.0);
        let falloff = (1.0 - smoothstep(0.0, FALLOFF_WIDTH, edge)) * params.ocean_factor * span;

        province.height = (raw - falloff).clamp(params.min_height, params.max_height);
        province.landform = if province.height <= params.sea_level {
            Landform::Lake
        } else {
            Landform::Plains
        };
    }

    classify_water(graph);
}

/// Water connected to a map-border water province is ocean; the rest is lake
fn classify_water(graph: &mut ProvinceGraph) {
    let mut queue: VecDeque<usize> = graph
        .provinces
        .iter()
        .filter(|p| p.is_water() && p.touches_border())
        .map(|p| p.id.index())
        .collect();

    for &i in &queue {
        graph.provinces[i].landform = Landform::Ocean;
    }

    while let Some(i) = queue.pop_front() {
        for n in graph.provinces[i].neighbors.clone() {
            let neighbor = &mut graph.provinces[n.index()];
            if neighbor.landform == Landform::Lake {
                neighbor.landform = Landform::Ocean;
                queue.push_back(n.index());
            }
        }
    }

    let oceans = graph.provinces.iter().filter(|p| p.landform == Landform::Ocean).count();
    let lakes = graph.provinces.iter().filter(|p| p.landform == Landform::Lake).count();
    debug!(oceans, lakes, "Classified water");
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::province::graph::test_support::square_grid;

    #[test]
    fn test_enclosed_water_is_lake() {
        let mut graph = square_grid(5, 5, 0);
        for province in &mut graph.provinces {
            province.landform = Landform::Plains;
        }
        // Border water at 0 and 1, enclosed water at the center
        graph.provinces[0].landform = Landform::Lake;
        graph.provinces[1].landform = Landform::Lake;
        graph.provinces[12].landform = Landform::Lake;
        classify_water(&mut graph);

        assert_eq!(graph.provinces[0].landform, Landform::Ocean);
        assert_eq!(graph.provinces[1].landform, Landform::Ocean);
        assert_eq!(graph.provinces[12].landform, Landform::Lake);
    }

    #[test]
    fn test_ocean_spreads_inward() {
        let mut graph = square_grid(5, 5, 0);
        graph.provinces[10].landform = Landform::Lake;
        graph.provinces[11].landform = Landform::Lake;
        graph.provinces[12].landform = Landform::Lake;
        classify_water(&mut graph);
        assert_eq!(graph.provinces[12].landform, Landform::Ocean);
    }

    #[test]
    fn test_heights_stay_in_range() {
        let mut graph = square_grid(10, 10, 0);
        initialize_height(&mut graph);
        let params = graph.params.clone();
        for province in &graph.provinces {
            assert!(province.height >= params.min_height && province.height <= params.max_height);
            assert_eq!(province.is_water(), province.height <= params.sea_level);
        }
    }

    #[test]
    fn test_strong_falloff_drowns_the_border() {
        let mut graph = square_grid(10, 10, 0);
        graph.params.width = 10.0;
        graph.params.height = 10.0;
        graph.params.ocean_factor = 2.0;
        initialize_height(&mut graph);
        for province in graph.provinces.iter().filter(|p| p.touches_border()) {
            assert_eq!(province.landform, Landform::Ocean);
        }
    }
}
