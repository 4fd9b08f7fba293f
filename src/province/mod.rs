//! Province graph: partition, physical and human attributes, generation

pub mod climate;
pub mod culture;
pub mod diffusion;
pub mod generate;
pub mod graph;
pub mod height;
pub mod influence;
pub mod naming;
pub mod noise_field;
pub mod partition;
pub mod population;
#[allow(clippy::module_inception)]
pub mod province;
pub mod rivers;
pub mod roads;
pub mod settlement;

pub use culture::{Culture, Religion};
pub use diffusion::{
    diffuse_all, diffuse_culture_influence, diffuse_religion_influence, CultureLayer,
    InfluenceLayer, ReligionLayer,
};
pub use generate::generate_world;
pub use graph::ProvinceGraph;
pub use influence::{InfluenceShares, SHARE_TOLERANCE};
pub use partition::{generate_partition, GridLayout};
pub use province::{Climate, CoastSide, Landform, PolygonEdge, Province};
pub use roads::{RoadLink, RoadNetwork};
pub use settlement::{Settlement, SettlementKind};
