//! Integration tests for province routing

use province_chronicle::core::types::ProvinceId;
use province_chronicle::pathfinding::{route_cost, CostModel};
use province_chronicle::province::Landform;
use province_chronicle::{generate_world, GenerationParams, RouteFinder};

fn world() -> province_chronicle::ProvinceGraph {
    let params = GenerationParams {
        seed: 21,
        polygon_count: 64,
        ..GenerationParams::default()
    };
    generate_world(&params).unwrap()
}

#[test]
fn test_distance_routes_are_symmetric() {
    let graph = world();
    let mut finder = RouteFinder::new();
    let (a, b) = (ProvinceId(0), ProvinceId(graph.len() as u32 - 1));

    let there = finder.calculate_route(&graph, a, b);
    let back = finder.calculate_route(&graph, b, a);
    assert_eq!(there.first(), Some(&a));
    assert_eq!(there.last(), Some(&b));
    assert_eq!(back.first(), Some(&b));
    for pair in there.windows(2) {
        assert!(graph.are_adjacent(pair[0], pair[1]));
    }

    let cost_there = route_cost(&graph, &there, CostModel::Distance);
    let cost_back = route_cost(&graph, &back, CostModel::Distance);
    assert!((cost_there - cost_back).abs() < 1e-3);
}

#[test]
fn test_water_target_blocks_land_route() {
    let mut graph = world();
    let target = ProvinceId(graph.len() as u32 / 2);
    graph.provinces[target.index()].landform = Landform::Ocean;
    let start = graph
        .land_provinces()
        .map(|p| p.id)
        .find(|&id| id != target)
        .unwrap();

    let mut finder = RouteFinder::new();
    assert!(finder
        .calculate_route_water_blocked_and_height_weighted(&graph, start, target)
        .is_none());

    let route = finder.route_with_fallback(&graph, start, target).unwrap();
    assert_eq!(route.model, CostModel::Distance);
    assert_eq!(route.provinces.last(), Some(&target));
}

#[test]
fn test_route_to_self_is_single_province() {
    let graph = world();
    let mut finder = RouteFinder::new();
    let id = graph.land_provinces().next().unwrap().id;
    assert_eq!(finder.calculate_route(&graph, id, id), vec![id]);
}
