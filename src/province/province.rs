//! Province - one cell of the polygon partition

use serde::{Deserialize, Serialize};

use crate::core::types::{CountryId, CultureId, ProvinceId, ReligionId, SettlementId, Vec2};
use crate::province::influence::InfluenceShares;

/// One boundary edge of a province polygon
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonEdge {
    pub start: Vec2,
    pub end: Vec2,
    /// Province on the other side, `None` along the map border
    pub neighbor: Option<ProvinceId>,
}

impl PolygonEdge {
    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Climate {
    Polar,
    Subarctic,
    #[default]
    Oceanic,
    Continental,
    Mediterranean,
    Subtropical,
    Steppe,
    Desert,
    Tropical,
    Alpine,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Landform {
    Ocean,
    Lake,
    #[default]
    Plains,
    Hills,
    Mountains,
    Forest,
    Jungle,
    Marsh,
    Desert,
    Tundra,
    Glacier,
}

impl Landform {
    pub fn is_water(&self) -> bool {
        matches!(self, Landform::Ocean | Landform::Lake)
    }

    /// Baseline inhabitants a province of this landform supports
    pub fn capacity(&self) -> f32 {
        match self {
            Landform::Plains => 12000.0,
            Landform::Forest => 6000.0,
            Landform::Hills => 5500.0,
            Landform::Jungle => 4000.0,
            Landform::Marsh => 2500.0,
            Landform::Mountains => 1500.0,
            Landform::Desert => 800.0,
            Landform::Tundra => 600.0,
            Landform::Glacier | Landform::Ocean | Landform::Lake => 0.0,
        }
    }

    /// Multiplier on cultural/religious diffusion into this terrain (1.0 = open)
    pub fn diffusion_resistance(&self) -> f32 {
        match self {
            Landform::Plains | Landform::Desert => 1.0,
            Landform::Hills | Landform::Forest | Landform::Tundra => 0.75,
            Landform::Jungle | Landform::Marsh => 0.6,
            Landform::Mountains | Landform::Glacier => 0.4,
            Landform::Ocean | Landform::Lake => 0.0,
        }
    }

    /// Combat bonus for armies defending their own province
    pub fn defense_bonus(&self) -> f32 {
        match self {
            Landform::Mountains => 0.3,
            Landform::Hills | Landform::Jungle => 0.15,
            Landform::Forest | Landform::Marsh => 0.1,
            _ => 0.0,
        }
    }

    pub fn base_color(&self) -> [u8; 3] {
        match self {
            Landform::Ocean => [38, 70, 130],
            Landform::Lake => [70, 120, 180],
            Landform::Plains => [150, 190, 100],
            Landform::Hills => [160, 150, 95],
            Landform::Mountains => [130, 120, 110],
            Landform::Forest => [60, 120, 60],
            Landform::Jungle => [40, 110, 50],
            Landform::Marsh => [95, 120, 90],
            Landform::Desert => [220, 200, 140],
            Landform::Tundra => [170, 180, 170],
            Landform::Glacier => [235, 240, 245],
        }
    }
}

/// Which side the nearest open ocean lies on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoastSide {
    East,
    West,
}

/// A province (one polygon of the world partition)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Province {
    pub id: ProvinceId,
    pub name: String,

    // Geometry
    pub edges: Vec<PolygonEdge>,
    /// Partition site the polygon grew around
    pub center: Vec2,
    /// Area centroid of the polygon
    pub geometric_center: Vec2,
    /// Largest distance from the geometric center to a vertex
    pub radius: f32,
    pub neighbors: Vec<ProvinceId>,

    // Physical attributes
    pub height: f32,
    pub coastal_distance: f32,
    pub coast_side: Option<CoastSide>,
    pub climate: Climate,
    pub landform: Landform,
    /// Mean monthly precipitation in summer (mm)
    pub summer_precipitation: f32,
    /// Mean monthly precipitation in winter (mm)
    pub winter_precipitation: f32,
    /// Mean summer temperature (°C)
    pub summer_temperature: f32,
    /// Mean winter temperature (°C)
    pub winter_temperature: f32,
    pub has_river: bool,

    // Human attributes
    pub carrying_capacity: u32,
    pub population: u32,
    pub cultures: InfluenceShares<CultureId>,
    pub religions: InfluenceShares<ReligionId>,
    pub owner: Option<CountryId>,
    pub legitimate_claimants: Vec<CountryId>,
    /// Index into the road network, when a road passes through
    pub road_node: Option<usize>,
    pub settlements: Vec<SettlementId>,
}

impl Province {
    pub fn new(id: ProvinceId, center: Vec2, edges: Vec<PolygonEdge>) -> Self {
        Self {
            id,
            name: format!("Province {}", id.0),
            edges,
            center,
            geometric_center: center,
            radius: 0.0,
            neighbors: Vec::new(),
            height: 0.0,
            coastal_distance: 0.0,
            coast_side: None,
            climate: Climate::default(),
            landform: Landform::default(),
            summer_precipitation: 0.0,
            winter_precipitation: 0.0,
            summer_temperature: 0.0,
            winter_temperature: 0.0,
            has_river: false,
            carrying_capacity: 0,
            population: 0,
            cultures: InfluenceShares::default(),
            religions: InfluenceShares::default(),
            owner: None,
            legitimate_claimants: Vec::new(),
            road_node: None,
            settlements: Vec::new(),
        }
    }

    pub fn is_water(&self) -> bool {
        self.landform.is_water()
    }

    pub fn is_land(&self) -> bool {
        !self.is_water()
    }

    pub fn touches_border(&self) -> bool {
        self.edges.iter().any(|e| e.neighbor.is_none())
    }

    pub fn vertices(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.edges.iter().map(|e| e.start)
    }

    pub fn mean_precipitation(&self) -> f32 {
        (self.summer_precipitation + self.winter_precipitation) * 0.5
    }

    pub fn mean_temperature(&self) -> f32 {
        (self.summer_temperature + self.winter_temperature) * 0.5
    }

    pub fn dominant_culture(&self) -> Option<CultureId> {
        self.cultures.dominant()
    }

    pub fn dominant_religion(&self) -> Option<ReligionId> {
        self.religions.dominant()
    }

    /// Terrain color shaded by height, for map collaborators
    pub fn display_color(&self) -> [u8; 3] {
        let [r, g, b] = self.landform.base_color();
        let shade = if self.is_water() {
            1.0 + (self.height / 8000.0).clamp(-0.4, 0.0)
        } else {
            1.0 - (self.height / 10000.0).clamp(0.0, 0.3)
        };
        let apply = |c: u8| (c as f32 * shade).round().clamp(0.0, 255.0) as u8;
        [apply(r), apply(g), apply(b)]
    }

    /// Where a UI collaborator should draw the province label
    pub fn label_anchor(&self) -> Vec2 {
        self.geometric_center
    }
}
