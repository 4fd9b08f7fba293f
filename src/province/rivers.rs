//! Rivers traced downhill from wet highlands

use rand::seq::SliceRandom;
use tracing::debug;

use crate::core::seeds::SeedStream;
use crate::core::types::ProvinceId;
use crate::province::graph::ProvinceGraph;

/// Fraction of max height a source must reach
const SOURCE_HEIGHT_FRACTION: f32 = 0.25;

/// Minimum mean monthly precipitation (mm) for a source
const SOURCE_PRECIPITATION: f32 = 50.0;

/// One river per this many land provinces
const LAND_PER_RIVER: usize = 25;

/// Mark the provinces crossed by rivers. Each river starts at a wet
/// highland province and follows the steepest descent until it reaches
/// water, joins an earlier river or gets stuck in a basin.
pub fn trace_rivers(graph: &mut ProvinceGraph) {
    let mut rng = graph.seeds.rng(SeedStream::Rivers);
    let min_height = graph.params.max_height * SOURCE_HEIGHT_FRACTION;

    let land = graph.land_provinces().count();
    let mut sources: Vec<ProvinceId> = graph
        .land_provinces()
        .filter(|p| p.height >= min_height && p.mean_precipitation() >= SOURCE_PRECIPITATION)
        .map(|p| p.id)
        .collect();
    sources.shuffle(&mut rng);
    sources.truncate((land / LAND_PER_RIVER).max(1));

    let mut rivers = 0;
    for source in sources {
        if graph.provinces[source.index()].has_river {
            continue;
        }
        let path = downhill_path(graph, source);
        if path.len() < 2 {
            continue;
        }
        for id in path {
            graph.provinces[id.index()].has_river = true;
        }
        rivers += 1;
    }
    debug!(rivers, "Traced rivers");
}

/// Land provinces from `source` down to (not including) the mouth
fn downhill_path(graph: &ProvinceGraph, source: ProvinceId) -> Vec<ProvinceId> {
    let mut path = vec![source];
    let mut current = source;

    for _ in 0..graph.len() {
        let here = &graph.provinces[current.index()];
        let lowest = here
            .neighbors
            .iter()
            .map(|&n| &graph.provinces[n.index()])
            .min_by(|a, b| a.height.total_cmp(&b.height).then(a.id.cmp(&b.id)));

        let Some(next) = lowest else {
            break;
        };
        if next.height >= here.height || next.is_water() {
            break;
        }
        path.push(next.id);
        if next.has_river {
            break;
        }
        current = next.id;
    }

    path
}
