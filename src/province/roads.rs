//! Road network linking cities over land

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{ProvinceId, SettlementId};
use crate::pathfinding::RouteFinder;
use crate::province::graph::ProvinceGraph;

/// Each city is linked to this many of its nearest cities
const LINKS_PER_CITY: usize = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadLink {
    pub from: SettlementId,
    pub to: SettlementId,
    pub path: Vec<ProvinceId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadNetwork {
    /// Provinces carrying a road, indexed by `Province::road_node`
    pub nodes: Vec<ProvinceId>,
    pub links: Vec<RoadLink>,
}

impl RoadNetwork {
    pub fn connects(&self, a: SettlementId, b: SettlementId) -> bool {
        self.links
            .iter()
            .any(|l| (l.from == a && l.to == b) || (l.from == b && l.to == a))
    }
}

/// Link every city to its nearest cities along water-blocked routes
pub fn build_roads(graph: &mut ProvinceGraph) {
    let cities: Vec<(SettlementId, ProvinceId)> = graph
        .settlements
        .iter()
        .filter(|s| s.is_city())
        .map(|s| (s.id, s.province))
        .collect();

    let mut finder = RouteFinder::new();
    let mut links: Vec<RoadLink> = Vec::new();

    for &(city, province) in &cities {
        let mut others: Vec<&(SettlementId, ProvinceId)> =
            cities.iter().filter(|(other, _)| *other != city).collect();
        others.sort_by(|a, b| {
            graph
                .center_distance(province, a.1)
                .total_cmp(&graph.center_distance(province, b.1))
                .then(a.0.cmp(&b.0))
        });

        for &&(other, other_province) in others.iter().take(LINKS_PER_CITY) {
            if links
                .iter()
                .any(|l| (l.from == city && l.to == other) || (l.from == other && l.to == city))
            {
                continue;
            }
            let Some(path) =
                finder.calculate_route_water_blocked_and_height_weighted(graph, province, other_province)
            else {
                continue;
            };
            links.push(RoadLink {
                from: city,
                to: other,
                path,
            });
        }
    }

    let mut network = RoadNetwork {
        nodes: Vec::new(),
        links,
    };
    for province in &mut graph.provinces {
        province.road_node = None;
    }
    for link in &network.links {
        for &id in &link.path {
            let province = &mut graph.provinces[id.index()];
            if province.road_node.is_none() {
                province.road_node = Some(network.nodes.len());
                network.nodes.push(id);
            }
        }
    }

    debug!(links = network.links.len(), nodes = network.nodes.len(), "Built roads");
    graph.roads = network;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::province::graph::test_support::square_grid;
    use crate::province::settlement::{Settlement, SettlementKind};
    use crate::province::Landform;

    fn city(graph: &mut ProvinceGraph, province: u32) -> SettlementId {
        let id = SettlementId(graph.settlements.len() as u32);
        graph.settlements.push(Settlement {
            id,
            name: format!("City {}", province),
            kind: SettlementKind::City,
            province: ProvinceId(province),
            share: 0.2,
            population: 0,
        });
        graph.provinces[province as usize].settlements.push(id);
        id
    }

    #[test]
    fn test_cities_are_linked_over_land() {
        let mut graph = square_grid(5, 1, 100);
        let a = city(&mut graph, 0);
        let b = city(&mut graph, 4);
        build_roads(&mut graph);

        assert!(graph.roads.connects(a, b));
        assert_eq!(graph.roads.nodes.len(), 5);
        assert!(graph.provinces.iter().all(|p| p.road_node.is_some()));
    }

    #[test]
    fn test_no_road_across_the_sea() {
        let mut graph = square_grid(3, 1, 100);
        graph.provinces[1].landform = Landform::Ocean;
        let a = city(&mut graph, 0);
        let b = city(&mut graph, 2);
        build_roads(&mut graph);
        assert!(!graph.roads.connects(a, b));
        assert!(graph.provinces[1].road_node.is_none());
    }
}
