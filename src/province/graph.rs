//! ProvinceGraph - the world context owning every province and the tables
//! generated alongside them

use geo::{Centroid, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::core::config::GenerationParams;
use crate::core::error::{ChronicleError, Result};
use crate::core::seeds::WorldSeeds;
use crate::core::types::{CultureId, ProvinceId, ReligionId, SettlementId, Vec2};
use crate::province::culture::{Culture, Religion};
use crate::province::influence::InfluenceShares;
use crate::province::partition::{GridLayout, PartitionCell};
use crate::province::province::Province;
use crate::province::roads::RoadNetwork;
use crate::province::settlement::Settlement;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProvinceGraph {
    pub params: GenerationParams,
    pub seeds: WorldSeeds,
    pub layout: GridLayout,
    pub provinces: Vec<Province>,
    pub cultures: Vec<Culture>,
    pub religions: Vec<Religion>,
    pub settlements: Vec<Settlement>,
    pub roads: RoadNetwork,
}

impl ProvinceGraph {
    /// Wrap raw partition cells into provinces. Geometry is not derived yet;
    /// call `initialize_geometry` next.
    pub fn from_partition(
        params: GenerationParams,
        seeds: WorldSeeds,
        layout: GridLayout,
        cells: Vec<PartitionCell>,
    ) -> Self {
        let provinces = cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| Province::new(ProvinceId(i as u32), cell.site, cell.edges))
            .collect();

        Self {
            params,
            seeds,
            layout,
            provinces,
            cultures: Vec::new(),
            religions: Vec::new(),
            settlements: Vec::new(),
            roads: RoadNetwork::default(),
        }
    }

    /// Build symmetric adjacency, geometric centers and radii
    pub fn initialize_geometry(&mut self) -> Result<()> {
        for province in &self.provinces {
            if province.edges.len() < 3 {
                return Err(ChronicleError::DegeneratePartition {
                    province: province.id,
                    edges: province.edges.len(),
                });
            }
        }

        let mut adjacency: Vec<Vec<ProvinceId>> = vec![Vec::new(); self.provinces.len()];
        for province in &self.provinces {
            for neighbor in province.edges.iter().filter_map(|e| e.neighbor) {
                if neighbor == province.id || neighbor.index() >= self.provinces.len() {
                    continue;
                }
                adjacency[province.id.index()].push(neighbor);
                adjacency[neighbor.index()].push(province.id);
            }
        }

        for (province, mut neighbors) in self.provinces.iter_mut().zip(adjacency) {
            neighbors.sort();
            neighbors.dedup();
            province.neighbors = neighbors;

            let ring: Vec<(f64, f64)> = province
                .vertices()
                .map(|v| (v.x as f64, v.y as f64))
                .collect();
            let polygon = Polygon::new(LineString::from(ring), vec![]);
            if let Some(centroid) = polygon.centroid() {
                province.geometric_center = Vec2::new(centroid.x() as f32, centroid.y() as f32);
            }

            let center = province.geometric_center;
            province.radius = province
                .vertices()
                .map(|v| v.distance(&center))
                .fold(0.0, f32::max);
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }

    pub fn province(&self, id: ProvinceId) -> Option<&Province> {
        self.provinces.get(id.index())
    }

    pub fn province_mut(&mut self, id: ProvinceId) -> Option<&mut Province> {
        self.provinces.get_mut(id.index())
    }

    pub fn ids(&self) -> impl Iterator<Item = ProvinceId> + '_ {
        self.provinces.iter().map(|p| p.id)
    }

    pub fn land_provinces(&self) -> impl Iterator<Item = &Province> {
        self.provinces.iter().filter(|p| p.is_land())
    }

    pub fn neighbors(&self, id: ProvinceId) -> &[ProvinceId] {
        self.province(id).map(|p| p.neighbors.as_slice()).unwrap_or(&[])
    }

    pub fn are_adjacent(&self, a: ProvinceId, b: ProvinceId) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Distance between two province sites
    pub fn center_distance(&self, a: ProvinceId, b: ProvinceId) -> f32 {
        match (self.province(a), self.province(b)) {
            (Some(pa), Some(pb)) => pa.center.distance(&pb.center),
            _ => f32::INFINITY,
        }
    }

    /// Province whose site is nearest to `point`, or `None` outside the map
    pub fn province_at(&self, point: Vec2) -> Option<ProvinceId> {
        if !self.layout.contains(point) || self.provinces.is_empty() {
            return None;
        }

        let (column, row) = self.layout.cell_of(point);
        let home = self.layout.index(column, row);
        std::iter::once(home)
            .chain(self.layout.nearby(column, row))
            .filter_map(|i| self.provinces.get(i))
            .min_by(|a, b| {
                a.center
                    .distance(&point)
                    .total_cmp(&b.center.distance(&point))
                    .then(a.id.cmp(&b.id))
            })
            .map(|p| p.id)
    }

    pub fn culture(&self, id: CultureId) -> Option<&Culture> {
        self.cultures.get(id.0 as usize)
    }

    pub fn religion(&self, id: ReligionId) -> Option<&Religion> {
        self.religions.get(id.0 as usize)
    }

    pub fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlements.get(id.0 as usize)
    }

    pub fn total_population(&self) -> u64 {
        self.provinces.iter().map(|p| p.population as u64).sum()
    }

    /// Overwrite a province's population. Water provinces stay empty.
    /// Call `refresh_settlements` afterwards.
    pub fn set_population(&mut self, id: ProvinceId, population: u32) -> bool {
        match self.province_mut(id) {
            Some(province) if province.is_land() => {
                province.population = population;
                true
            }
            _ => false,
        }
    }

    /// Overwrite a province's culture shares (normalized on the way in)
    pub fn set_cultures(&mut self, id: ProvinceId, mut shares: InfluenceShares<CultureId>) -> bool {
        let Some(province) = self.province_mut(id) else {
            return false;
        };
        shares.normalize();
        province.cultures = shares;
        true
    }

    /// Overwrite a province's religion shares (normalized on the way in)
    pub fn set_religions(&mut self, id: ProvinceId, mut shares: InfluenceShares<ReligionId>) -> bool {
        let Some(province) = self.province_mut(id) else {
            return false;
        };
        shares.normalize();
        province.religions = shares;
        true
    }

    /// Recompute settlement populations in one province from its population
    pub fn refresh_settlements(&mut self, id: ProvinceId) {
        let Some(province) = self.provinces.get(id.index()) else {
            return;
        };
        let population = province.population;
        for settlement_id in province.settlements.clone() {
            if let Some(settlement) = self.settlements.get_mut(settlement_id.0 as usize) {
                settlement.refresh(population);
            }
        }
    }

    pub fn refresh_all_settlements(&mut self) {
        let populations: Vec<u32> = self.provinces.iter().map(|p| p.population).collect();
        for settlement in &mut self.settlements {
            if let Some(&population) = populations.get(settlement.province.index()) {
                settlement.refresh(population);
            }
        }
    }
}
