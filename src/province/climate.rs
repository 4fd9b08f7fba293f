//! Coastal exposure, climate, precipitation, temperature and landform
//!
//! Climate is a lookup of latitude band against coastal exposure, with an
//! alpine override for high ground. Precipitation and temperature start from
//! per-climate base curves and are adjusted for latitude, lapse rate and a
//! small amount of noise. Landform branches on climate, height and noise.

use crate::core::seeds::SeedStream;
use crate::core::types::Vec2;
use crate::province::graph::ProvinceGraph;
use crate::province::noise_field::NoiseField;
use crate::province::province::{Climate, CoastSide, Landform, Province};

/// Provinces closer than this fraction of the map width to the ocean are coastal
const COASTAL_FRACTION: f32 = 0.12;

/// Fraction of max height above which the climate turns alpine
const ALPINE_FRACTION: f32 = 0.55;

/// Fractions of max height for mountain and hill landforms
const MOUNTAIN_FRACTION: f32 = 0.6;
const HILL_FRACTION: f32 = 0.3;

/// Temperature drop per meter of altitude (°C)
const LAPSE_RATE: f32 = 0.0065;

/// Relative precipitation noise amplitude
const PRECIPITATION_NOISE: f32 = 0.15;

/// Temperature noise amplitude (°C)
const TEMPERATURE_NOISE: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LatitudeBand {
    Polar,
    Subarctic,
    Temperate,
    Subtropical,
    Arid,
    Tropical,
}

impl LatitudeBand {
    fn of(latitude: f32) -> Self {
        match latitude.abs() {
            l if l >= 66.0 => LatitudeBand::Polar,
            l if l >= 55.0 => LatitudeBand::Subarctic,
            l if l >= 40.0 => LatitudeBand::Temperate,
            l if l >= 30.0 => LatitudeBand::Subtropical,
            l if l >= 15.0 => LatitudeBand::Arid,
            _ => LatitudeBand::Tropical,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Exposure {
    WestCoast,
    EastCoast,
    Inland,
}

/// Latitude (degrees) at a world position
pub fn latitude_at(graph: &ProvinceGraph, position: Vec2) -> f32 {
    let params = &graph.params;
    let t = (position.y / params.height).clamp(0.0, 1.0);
    params.north_latitude + (params.south_latitude - params.north_latitude) * t
}

/// Run the whole climate bundle: coast raycast, climate, precipitation,
/// temperature, landform
pub fn initialize_climate_bundle(graph: &mut ProvinceGraph) {
    initialize_coastal_distance(graph);

    let params = graph.params.clone();
    let precipitation_noise = NoiseField::new(
        graph.seeds.noise_seed(SeedStream::Precipitation),
        6.0,
        3,
        params.width,
        params.height,
    );
    let temperature_noise = NoiseField::new(
        graph.seeds.noise_seed(SeedStream::Temperature),
        6.0,
        3,
        params.width,
        params.height,
    );
    let landform_noise = NoiseField::new(
        graph.seeds.noise_seed(SeedStream::Landform),
        10.0,
        3,
        params.width,
        params.height,
    );
    let coastal_limit = params.width * COASTAL_FRACTION;

    for index in 0..graph.provinces.len() {
        let latitude = latitude_at(graph, graph.provinces[index].center);
        let province = &mut graph.provinces[index];
        if province.is_water() {
            province.climate = water_climate(latitude);
            continue;
        }

        let exposure = match province.coast_side {
            Some(side) if province.coastal_distance <= coastal_limit => match side {
                CoastSide::West => Exposure::WestCoast,
                CoastSide::East => Exposure::EastCoast,
            },
            _ => Exposure::Inland,
        };

        province.climate = if province.height >= params.max_height * ALPINE_FRACTION {
            Climate::Alpine
        } else {
            climate_for(LatitudeBand::of(latitude), exposure)
        };

        let p = province.center;
        apply_precipitation(province, exposure, precipitation_noise.sample(p));
        apply_temperature(province, latitude, params.sea_level, temperature_noise.sample(p));
        province.landform = landform_for(province, params.max_height, landform_noise.sample_unit(p));
    }
}

/// East/west raycast from every land province to the nearest ocean along
/// its row
fn initialize_coastal_distance(graph: &mut ProvinceGraph) {
    let step = graph.layout.cell_width() * 0.5;
    let width = graph.params.width;

    let results: Vec<(f32, Option<CoastSide>)> = graph
        .provinces
        .iter()
        .map(|province| {
            if province.is_water() {
                return (0.0, None);
            }
            let east = cast(graph, province.center, step);
            let west = cast(graph, province.center, -step);
            match (east, west) {
                (Some(e), Some(w)) if w <= e => (w, Some(CoastSide::West)),
                (Some(e), _) => (e, Some(CoastSide::East)),
                (None, Some(w)) => (w, Some(CoastSide::West)),
                (None, None) => (width, None),
            }
        })
        .collect();

    for (province, (distance, side)) in graph.provinces.iter_mut().zip(results) {
        province.coastal_distance = distance;
        province.coast_side = side;
    }
}

/// Distance to the first ocean province hit when stepping by `step` along x
fn cast(graph: &ProvinceGraph, origin: Vec2, step: f32) -> Option<f32> {
    if step == 0.0 {
        return None;
    }
    let mut point = origin;
    loop {
        point.x += step;
        let id = graph.province_at(point)?;
        if graph.provinces[id.index()].landform == Landform::Ocean {
            return Some((point.x - origin.x).abs());
        }
    }
}

fn water_climate(latitude: f32) -> Climate {
    match LatitudeBand::of(latitude) {
        LatitudeBand::Polar => Climate::Polar,
        LatitudeBand::Subarctic => Climate::Subarctic,
        LatitudeBand::Temperate => Climate::Oceanic,
        LatitudeBand::Subtropical | LatitudeBand::Arid => Climate::Subtropical,
        LatitudeBand::Tropical => Climate::Tropical,
    }
}

fn climate_for(band: LatitudeBand, exposure: Exposure) -> Climate {
    use Exposure::*;
    match (band, exposure) {
        (LatitudeBand::Polar, _) => Climate::Polar,
        (LatitudeBand::Subarctic, _) => Climate::Subarctic,
        (LatitudeBand::Temperate, WestCoast) => Climate::Oceanic,
        (LatitudeBand::Temperate, _) => Climate::Continental,
        (LatitudeBand::Subtropical, WestCoast) => Climate::Mediterranean,
        (LatitudeBand::Subtropical, EastCoast) => Climate::Subtropical,
        (LatitudeBand::Subtropical, Inland) => Climate::Steppe,
        (LatitudeBand::Arid, EastCoast) => Climate::Subtropical,
        (LatitudeBand::Arid, _) => Climate::Desert,
        (LatitudeBand::Tropical, _) => Climate::Tropical,
    }
}

/// Base (summer, winter) monthly precipitation in mm
fn base_precipitation(climate: Climate) -> (f32, f32) {
    match climate {
        Climate::Polar => (20.0, 10.0),
        Climate::Subarctic => (60.0, 30.0),
        Climate::Oceanic => (70.0, 100.0),
        Climate::Continental => (80.0, 40.0),
        Climate::Mediterranean => (15.0, 90.0),
        Climate::Subtropical => (150.0, 70.0),
        Climate::Steppe => (40.0, 20.0),
        Climate::Desert => (8.0, 5.0),
        Climate::Tropical => (220.0, 120.0),
        Climate::Alpine => (110.0, 90.0),
    }
}

/// Half the summer-to-winter temperature swing (°C)
fn seasonal_amplitude(climate: Climate) -> f32 {
    match climate {
        Climate::Oceanic | Climate::Tropical => 4.0,
        Climate::Mediterranean | Climate::Subtropical => 7.0,
        Climate::Alpine | Climate::Polar => 10.0,
        Climate::Steppe | Climate::Desert => 12.0,
        Climate::Continental | Climate::Subarctic => 15.0,
    }
}

fn apply_precipitation(province: &mut Province, exposure: Exposure, noise: f32) {
    let (summer, winter) = base_precipitation(province.climate);
    let coastal_boost = if exposure == Exposure::Inland { 1.0 } else { 1.15 };
    let factor = (1.0 + noise * PRECIPITATION_NOISE) * coastal_boost;
    province.summer_precipitation = (summer * factor).max(0.0);
    province.winter_precipitation = (winter * factor).max(0.0);
}

fn apply_temperature(province: &mut Province, latitude: f32, sea_level: f32, noise: f32) {
    let latitude_mean = 30.0 - 0.55 * latitude.abs();
    let altitude = (province.height - sea_level).max(0.0);
    let mean = latitude_mean - altitude * LAPSE_RATE + noise * TEMPERATURE_NOISE;
    let amplitude = seasonal_amplitude(province.climate);
    province.summer_temperature = mean + amplitude;
    province.winter_temperature = mean - amplitude;
}

fn landform_for(province: &Province, max_height: f32, noise: f32) -> Landform {
    let height = province.height;
    if height >= max_height * MOUNTAIN_FRACTION {
        return if province.mean_temperature() < -5.0 {
            Landform::Glacier
        } else {
            Landform::Mountains
        };
    }
    if height >= max_height * HILL_FRACTION {
        return if noise > 0.65 && province.climate != Climate::Desert {
            Landform::Forest
        } else {
            Landform::Hills
        };
    }

    match province.climate {
        Climate::Polar => {
            if noise > 0.7 {
                Landform::Glacier
            } else {
                Landform::Tundra
            }
        }
        Climate::Subarctic => {
            if noise > 0.4 {
                Landform::Forest
            } else {
                Landform::Tundra
            }
        }
        Climate::Oceanic | Climate::Continental => {
            if noise > 0.55 {
                Landform::Forest
            } else if noise < 0.08 {
                Landform::Marsh
            } else {
                Landform::Plains
            }
        }
        Climate::Mediterranean => {
            if noise > 0.7 {
                Landform::Hills
            } else {
                Landform::Plains
            }
        }
        Climate::Subtropical => {
            if noise > 0.6 {
                Landform::Forest
            } else if noise < 0.15 {
                Landform::Marsh
            } else {
                Landform::Plains
            }
        }
        Climate::Steppe => {
            if noise > 0.75 {
                Landform::Desert
            } else {
                Landform::Plains
            }
        }
        Climate::Desert => Landform::Desert,
        Climate::Tropical => {
            if noise > 0.4 {
                Landform::Jungle
            } else if noise < 0.12 {
                Landform::Marsh
            } else {
                Landform::Plains
            }
        }
        Climate::Alpine => Landform::Hills,
    }
}
