//! Carrying capacity and initial population

use crate::core::seeds::SeedStream;
use crate::province::graph::ProvinceGraph;
use crate::province::noise_field::NoiseField;
use crate::province::province::{Landform, Province};

/// Ideal mean monthly precipitation (mm) for farming
const IDEAL_PRECIPITATION: f32 = 90.0;

/// Width of the precipitation suitability bell (mm)
const PRECIPITATION_SPREAD: f32 = 60.0;

/// Suitability floor for very dry or very wet provinces
const MIN_PRECIPITATION_SUITABILITY: f32 = 0.1;

/// Capacity multiplier for provinces on a river
const RIVER_BONUS: f32 = 1.35;

/// Capacity noise amplitude (±)
const CAPACITY_NOISE: f32 = 0.15;

/// Initial population as a fraction of carrying capacity
const INITIAL_FILL: f32 = 0.6;

/// Compute carrying capacity and seed the initial population of every
/// province. Water provinces hold nobody.
pub fn calculate_population(graph: &mut ProvinceGraph) {
    let field = NoiseField::new(
        graph.seeds.noise_seed(SeedStream::Population),
        8.0,
        2,
        graph.params.width,
        graph.params.height,
    );
    let maximum = max_capacity();

    for province in &mut graph.provinces {
        if province.is_water() {
            province.carrying_capacity = 0;
            province.population = 0;
            continue;
        }
        let noise = 1.0 + field.sample(province.center) * CAPACITY_NOISE;
        let capacity = (raw_capacity(province) * noise).clamp(0.0, maximum);
        province.carrying_capacity = capacity.round() as u32;
        province.population = (capacity * INITIAL_FILL).round() as u32;
    }
}

/// Capacity before noise: landform table × precipitation bell × river
/// bonus × temperature bucket
pub fn raw_capacity(province: &Province) -> f32 {
    let base = province.landform.capacity();
    let deviation = (province.mean_precipitation() - IDEAL_PRECIPITATION) / PRECIPITATION_SPREAD;
    let precipitation = (-deviation * deviation).exp().max(MIN_PRECIPITATION_SUITABILITY);
    let river = if province.has_river { RIVER_BONUS } else { 1.0 };
    base * precipitation * river * temperature_factor(province.mean_temperature())
}

fn temperature_factor(mean_temperature: f32) -> f32 {
    match mean_temperature {
        t if t < -5.0 => 0.2,
        t if t < 5.0 => 0.6,
        t if t < 25.0 => 1.0,
        _ => 0.8,
    }
}

/// Highest capacity any province can reach
fn max_capacity() -> f32 {
    Landform::Plains.capacity() * RIVER_BONUS * (1.0 + CAPACITY_NOISE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ProvinceId, Vec2};

    fn farmland() -> Province {
        let mut p = Province::new(ProvinceId(0), Vec2::new(0.0, 0.0), Vec::new());
        p.landform = Landform::Plains;
        p.summer_precipitation = IDEAL_PRECIPITATION;
        p.winter_precipitation = IDEAL_PRECIPITATION;
        p.summer_temperature = 20.0;
        p.winter_temperature = 5.0;
        p
    }

    #[test]
    fn test_ideal_plains_reach_table_capacity() {
        let p = farmland();
        assert!((raw_capacity(&p) - Landform::Plains.capacity()).abs() < 1e-3);
    }

    #[test]
    fn test_river_bonus_applies() {
        let mut p = farmland();
        let dry = raw_capacity(&p);
        p.has_river = true;
        assert!((raw_capacity(&p) / dry - RIVER_BONUS).abs() < 1e-5);
    }

    #[test]
    fn test_desert_rain_and_cold_reduce_capacity() {
        let mut p = farmland();
        let ideal = raw_capacity(&p);
        p.summer_precipitation = 5.0;
        p.winter_precipitation = 5.0;
        assert!(raw_capacity(&p) < ideal * 0.2);
        p = farmland();
        p.summer_temperature = -10.0;
        p.winter_temperature = -20.0;
        assert!((raw_capacity(&p) - ideal * 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_water_has_no_population() {
        let mut graph = crate::province::graph::test_support::square_grid(3, 3, 500);
        graph.provinces[4].landform = Landform::Ocean;
        calculate_population(&mut graph);
        assert_eq!(graph.provinces[4].population, 0);
        assert_eq!(graph.provinces[4].carrying_capacity, 0);
        assert!(graph.provinces.iter().all(|p| p.population <= p.carrying_capacity));
    }
}
