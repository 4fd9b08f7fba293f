//! A* routing over province adjacency
//!
//! Two cost models share one search: plain center-to-center distance, and a
//! land-only model that forbids water and penalizes height changes.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::types::ProvinceId;
use crate::province::ProvinceGraph;

/// Height difference (meters) that doubles the cost of a step
const HEIGHT_PENALTY_SCALE: f64 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostModel {
    /// Accumulated center distance, any province may be crossed
    Distance,
    /// Land only; each step costs `d * (1 + |Δh| / 1000)`
    LandHeightWeighted,
}

/// A route and the model that produced it
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub model: CostModel,
    pub provinces: Vec<ProvinceId>,
}

/// Reusable A* state. Every query resets it, so one finder can serve any
/// number of sequential queries on graphs of any size.
#[derive(Default)]
pub struct RouteFinder {
    best_cost: Vec<f64>,
    parent: Vec<Option<ProvinceId>>,
    closed: Vec<bool>,
}

impl RouteFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortest route by center distance. Assumes a connected graph; on a
    /// disconnected one an empty route is returned and a warning logged.
    pub fn calculate_route(
        &mut self,
        graph: &ProvinceGraph,
        start: ProvinceId,
        end: ProvinceId,
    ) -> Vec<ProvinceId> {
        match self.search(graph, start, end, CostModel::Distance) {
            Some(path) => path,
            None => {
                warn!(?start, ?end, "No route between provinces; graph is disconnected");
                Vec::new()
            }
        }
    }

    /// Land-only route penalizing height differences; `None` when no viable
    /// land route exists
    pub fn calculate_route_water_blocked_and_height_weighted(
        &mut self,
        graph: &ProvinceGraph,
        start: ProvinceId,
        end: ProvinceId,
    ) -> Option<Vec<ProvinceId>> {
        self.search(graph, start, end, CostModel::LandHeightWeighted)
    }

    /// Try the land model first, then fall back to plain distance
    pub fn route_with_fallback(
        &mut self,
        graph: &ProvinceGraph,
        start: ProvinceId,
        end: ProvinceId,
    ) -> Option<Route> {
        if let Some(provinces) = self.calculate_route_water_blocked_and_height_weighted(graph, start, end) {
            return Some(Route {
                model: CostModel::LandHeightWeighted,
                provinces,
            });
        }
        self.search(graph, start, end, CostModel::Distance).map(|provinces| Route {
            model: CostModel::Distance,
            provinces,
        })
    }

    fn reset(&mut self, len: usize) {
        self.best_cost.clear();
        self.best_cost.resize(len, f64::INFINITY);
        self.parent.clear();
        self.parent.resize(len, None);
        self.closed.clear();
        self.closed.resize(len, false);
    }

    fn search(
        &mut self,
        graph: &ProvinceGraph,
        start: ProvinceId,
        end: ProvinceId,
        model: CostModel,
    ) -> Option<Vec<ProvinceId>> {
        let (Some(start_province), Some(goal)) = (graph.province(start), graph.province(end)) else {
            return None;
        };
        if model == CostModel::LandHeightWeighted && (start_province.is_water() || goal.is_water()) {
            return None;
        }
        if start == end {
            return Some(vec![start]);
        }

        self.reset(graph.len());
        let goal_center = goal.center;
        let heuristic = |id: ProvinceId| -> f64 {
            graph.provinces[id.index()].center.distance(&goal_center) as f64
        };

        let mut open = BinaryHeap::new();
        self.best_cost[start.index()] = 0.0;
        open.push((Reverse(OrderedFloat(heuristic(start))), Reverse(start)));

        while let Some((_, Reverse(current))) = open.pop() {
            if current == end {
                return Some(self.reconstruct(start, end));
            }
            if self.closed[current.index()] {
                continue;
            }
            self.closed[current.index()] = true;

            let here = &graph.provinces[current.index()];
            for &next in &here.neighbors {
                if self.closed[next.index()] {
                    continue;
                }
                let there = &graph.provinces[next.index()];
                let distance = here.center.distance(&there.center) as f64;
                let step = match model {
                    CostModel::Distance => distance,
                    CostModel::LandHeightWeighted => {
                        if there.is_water() {
                            continue;
                        }
                        let climb = (there.height - here.height).abs() as f64;
                        distance * (1.0 + climb / HEIGHT_PENALTY_SCALE)
                    }
                };

                let tentative = self.best_cost[current.index()] + step;
                if tentative < self.best_cost[next.index()] {
                    self.best_cost[next.index()] = tentative;
                    self.parent[next.index()] = Some(current);
                    open.push((Reverse(OrderedFloat(tentative + heuristic(next))), Reverse(next)));
                }
            }
        }

        None
    }

    /// Walk parents back from the goal, then reverse
    fn reconstruct(&self, start: ProvinceId, end: ProvinceId) -> Vec<ProvinceId> {
        let mut path = vec![end];
        let mut current = end;
        while current != start {
            match self.parent[current.index()] {
                Some(previous) => {
                    path.push(previous);
                    current = previous;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// Total cost of a route under a model
pub fn route_cost(graph: &ProvinceGraph, route: &[ProvinceId], model: CostModel) -> f32 {
    route
        .windows(2)
        .map(|pair| {
            let (a, b) = (&graph.provinces[pair[0].index()], &graph.provinces[pair[1].index()]);
            let d = a.center.distance(&b.center);
            match model {
                CostModel::Distance => d,
                CostModel::LandHeightWeighted => {
                    d * (1.0 + (b.height - a.height).abs() / HEIGHT_PENALTY_SCALE as f32)
                }
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::province::graph::test_support::square_grid;
    use crate::province::Landform;

    #[test]
    fn test_straight_route_on_grid() {
        let graph = square_grid(5, 1, 0);
        let mut finder = RouteFinder::new();
        let route = finder.calculate_route(&graph, ProvinceId(0), ProvinceId(4));
        assert_eq!(route, (0..5).map(ProvinceId).collect::<Vec<_>>());
        assert!((route_cost(&graph, &route, CostModel::Distance) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_same_start_and_end() {
        let graph = square_grid(3, 3, 0);
        let mut finder = RouteFinder::new();
        assert_eq!(finder.calculate_route(&graph, ProvinceId(4), ProvinceId(4)), vec![ProvinceId(4)]);
    }

    #[test]
    fn test_land_route_detours_around_water() {
        // 3x3 with a lake in the middle
        let mut graph = square_grid(3, 3, 0);
        graph.provinces[4].landform = Landform::Lake;
        let mut finder = RouteFinder::new();
        let route = finder
            .calculate_route_water_blocked_and_height_weighted(&graph, ProvinceId(1), ProvinceId(7))
            .unwrap();
        assert!(!route.contains(&ProvinceId(4)));
        assert_eq!(route.len(), 5);

        let direct = finder.calculate_route(&graph, ProvinceId(1), ProvinceId(7));
        assert_eq!(direct, vec![ProvinceId(1), ProvinceId(4), ProvinceId(7)]);
    }

    #[test]
    fn test_height_penalty_prefers_flat_detour() {
        let mut graph = square_grid(3, 2, 0);
        // Top row: 0 1 2, bottom row: 3 4 5. A peak at 1 forces the bottom path.
        graph.provinces[1].height = 5000.0;
        let mut finder = RouteFinder::new();
        let route = finder
            .calculate_route_water_blocked_and_height_weighted(&graph, ProvinceId(0), ProvinceId(2))
            .unwrap();
        assert_eq!(route, vec![ProvinceId(0), ProvinceId(3), ProvinceId(4), ProvinceId(5), ProvinceId(2)]);
    }

    #[test]
    fn test_water_only_connection_has_no_land_route() {
        let mut graph = square_grid(3, 1, 0);
        graph.provinces[1].landform = Landform::Ocean;
        let mut finder = RouteFinder::new();
        assert!(finder
            .calculate_route_water_blocked_and_height_weighted(&graph, ProvinceId(0), ProvinceId(2))
            .is_none());

        let fallback = finder.route_with_fallback(&graph, ProvinceId(0), ProvinceId(2)).unwrap();
        assert_eq!(fallback.model, CostModel::Distance);
        assert_eq!(fallback.provinces.len(), 3);
    }

    #[test]
    fn test_state_is_reset_between_queries() {
        let graph = square_grid(4, 4, 0);
        let mut finder = RouteFinder::new();
        let first = finder.calculate_route(&graph, ProvinceId(0), ProvinceId(15));
        let _ = finder.calculate_route(&graph, ProvinceId(3), ProvinceId(12));
        let again = finder.calculate_route(&graph, ProvinceId(0), ProvinceId(15));
        assert_eq!(first, again);
    }
}
