//! Generation parameters and simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Both structs load from TOML and
//! are passed explicitly to every operation that needs them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::calendar::MonthDate;
use crate::core::error::{ChronicleError, Result};

/// Parameters for building a province graph
///
/// Missing keys in a TOML file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Master seed; every named seed stream derives from it
    pub seed: u64,

    /// Target number of polygons. Rounded to a full jittered grid, so the
    /// actual province count is `columns * rows` (see `GridLayout`).
    pub polygon_count: u32,

    /// World plane width (map units)
    pub width: f32,

    /// World plane height (map units)
    pub height: f32,

    /// Lowest possible terrain height (meters)
    pub min_height: f32,

    /// Highest possible terrain height (meters)
    pub max_height: f32,

    /// Provinces at or below this height are water
    pub sea_level: f32,

    /// Noise frequency multiplier.
    ///
    /// 1.0 produces a handful of continents; 2.0 or more breaks land into
    /// archipelagos.
    pub fragmentation: f32,

    /// Strength of the boundary falloff that pushes map edges under water.
    ///
    /// 0.0 disables the falloff, 1.0 makes the outer ring almost always ocean.
    pub ocean_factor: f32,

    /// Latitude (degrees) at the top edge of the map
    pub north_latitude: f32,

    /// Latitude (degrees) at the bottom edge of the map
    pub south_latitude: f32,

    pub culture_count: u16,
    pub religion_count: u16,

    /// Cities per land province, scaled (1.0 ≈ one city per 12 land provinces)
    pub city_richness: f32,

    /// Towns per land province, scaled (1.0 ≈ one town per 5 land provinces)
    pub town_richness: f32,

    /// Number of countries seeded before the first simulated month
    pub initial_countries: u16,

    /// First simulated year (January)
    pub start_year: i32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            polygon_count: 1200,
            width: 1600.0,
            height: 1000.0,
            min_height: -4000.0,
            max_height: 4500.0,
            sea_level: 0.0,
            fragmentation: 1.0,
            ocean_factor: 0.6,
            north_latitude: 68.0,
            south_latitude: 22.0,
            culture_count: 10,
            religion_count: 5,
            city_richness: 1.0,
            town_richness: 1.0,
            initial_countries: 16,
            start_year: 1000,
        }
    }
}

impl GenerationParams {
    /// Load parameters from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let params: GenerationParams = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn start_date(&self) -> MonthDate {
        MonthDate::new(self.start_year, 1)
    }

    /// Same parameters with the seed incremented (regenerate button)
    pub fn next_seed(&self) -> Self {
        Self {
            seed: self.seed.wrapping_add(1),
            ..self.clone()
        }
    }

    /// Validate parameters for internal consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ChronicleError::InvalidParameters(msg));

        if self.polygon_count < 16 {
            return invalid(format!("polygon_count ({}) must be at least 16", self.polygon_count));
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return invalid(format!(
                "world dimensions must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        if self.max_height <= self.min_height {
            return invalid(format!(
                "max_height ({}) must exceed min_height ({})",
                self.max_height, self.min_height
            ));
        }
        if self.sea_level < self.min_height || self.sea_level >= self.max_height {
            return invalid(format!(
                "sea_level ({}) must lie in [min_height, max_height)",
                self.sea_level
            ));
        }
        if self.fragmentation <= 0.0 {
            return invalid("fragmentation must be positive".into());
        }
        if !(0.0..=2.0).contains(&self.ocean_factor) {
            return invalid(format!("ocean_factor ({}) must be in [0, 2]", self.ocean_factor));
        }
        if self.culture_count == 0 || self.religion_count == 0 {
            return invalid("at least one culture and one religion are required".into());
        }
        if self.city_richness < 0.0 || self.town_richness < 0.0 {
            return invalid("settlement richness cannot be negative".into());
        }
        if !(-90.0..=90.0).contains(&self.north_latitude)
            || !(-90.0..=90.0).contains(&self.south_latitude)
        {
            return invalid("latitudes must be within [-90, 90]".into());
        }

        Ok(())
    }
}

/// Configuration for the monthly history simulation
///
/// These values have been tuned to produce a few wars per decade on a
/// default-size map. Changing them will affect pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === DIPLOMACY ===
    /// Minimum months a war must run before peace or vassalization
    ///
    /// Prevents declare/peace flapping when AI moods swing month to month.
    pub min_war_months: u32,

    // === ECONOMY ===
    /// Funds earned per inhabitant per month before government modifiers
    pub tax_per_capita: f32,

    /// Funds paid per soldier per month
    pub maintenance_per_soldier: f32,

    /// Funds paid per soldier when an army is raised
    pub recruit_cost_per_soldier: f32,

    /// Funds paid to settle an unowned province
    pub colonize_cost: f32,

    // === ARMIES ===
    /// Size of an army raised by the AI
    pub army_recruit_size: u32,

    /// Combat value per soldier before government modifiers
    pub base_combat_value: f32,

    /// Armies smaller than this after a battle are destroyed
    pub army_destroyed_below: u32,

    /// Maximum armies the AI keeps per 10 owned provinces
    pub armies_per_ten_provinces: u32,

    // === POPULATION ===
    /// Monthly logistic growth rate when population is far below capacity
    pub growth_rate: f32,

    /// Growth multiplier for provinces whose owner is at war
    pub war_growth_modifier: f32,

    /// Fraction of capacity above which people start to migrate
    pub migration_pressure: f32,

    /// Fraction of the excess population that moves per month
    pub migration_rate: f32,

    /// Influence shares below this fold into the dominant holder
    pub diffusion_epsilon: f32,

    // === CRISES ===
    /// Minority share (population weighted) above which conflict pressure builds
    pub crisis_minority_threshold: f32,

    /// Progress gained per month per point of share above threshold
    pub crisis_rate: f32,

    /// Progress lost per month when pressure is gone
    pub crisis_decay: f32,

    /// Latent progress at which a crisis becomes observable (is created)
    pub crisis_observable: f32,

    /// Stability below which civil war pressure builds
    pub civil_war_stability: f32,

    // === AI ===
    pub war_chance: f32,
    pub peace_chance: f32,
    pub befriend_chance: f32,
    pub denounce_chance: f32,
    /// Monthly chance that a neutral country much stronger than its
    /// neighbor demands tribute from it
    pub tribute_chance: f32,
    pub alliance_chance: f32,
    pub annex_chance: f32,
    pub release_chance: f32,

    // === PERSISTENCE ===
    /// Worker threads for the history save pool (0 = rayon default)
    pub save_workers: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_war_months: 12,

            tax_per_capita: 0.002,
            maintenance_per_soldier: 0.01,
            recruit_cost_per_soldier: 0.05,
            colonize_cost: 25.0,

            army_recruit_size: 1000,
            base_combat_value: 1.0,
            army_destroyed_below: 100,
            armies_per_ten_provinces: 2,

            growth_rate: 0.0015,
            war_growth_modifier: 0.5,
            migration_pressure: 0.9,
            migration_rate: 0.05,
            diffusion_epsilon: 0.01,

            crisis_minority_threshold: 0.3,
            crisis_rate: 0.08,
            crisis_decay: 0.02,
            crisis_observable: 0.05,
            civil_war_stability: 0.3,

            war_chance: 0.02,
            peace_chance: 0.15,
            befriend_chance: 0.03,
            denounce_chance: 0.02,
            tribute_chance: 0.01,
            alliance_chance: 0.02,
            annex_chance: 0.01,
            release_chance: 0.005,

            save_workers: 0,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SimulationConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.crisis_observable <= 0.0 || self.crisis_observable >= 1.0 {
            return Err(ChronicleError::InvalidParameters(format!(
                "crisis_observable ({}) must be in (0, 1)",
                self.crisis_observable
            )));
        }

        if !(0.0..1.0).contains(&self.diffusion_epsilon) {
            return Err(ChronicleError::InvalidParameters(format!(
                "diffusion_epsilon ({}) must be in [0, 1)",
                self.diffusion_epsilon
            )));
        }

        if self.migration_pressure <= 0.0 || self.migration_rate < 0.0 {
            return Err(ChronicleError::InvalidParameters(
                "migration settings must be positive".into(),
            ));
        }

        let chances = [
            ("war_chance", self.war_chance),
            ("peace_chance", self.peace_chance),
            ("befriend_chance", self.befriend_chance),
            ("denounce_chance", self.denounce_chance),
            ("tribute_chance", self.tribute_chance),
            ("alliance_chance", self.alliance_chance),
            ("annex_chance", self.annex_chance),
            ("release_chance", self.release_chance),
        ];
        if let Some((name, value)) = chances.iter().find(|(_, v)| !(0.0..=1.0).contains(v)) {
            return Err(ChronicleError::InvalidParameters(format!(
                "{} ({}) must be in [0, 1]",
                name, value
            )));
        }

        if self.army_recruit_size <= self.army_destroyed_below {
            return Err(ChronicleError::InvalidParameters(format!(
                "army_recruit_size ({}) must exceed army_destroyed_below ({})",
                self.army_recruit_size, self.army_destroyed_below
            )));
        }

        Ok(())
    }
}

/// Combined configuration file layout (`[generation]` and `[simulation]` tables)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronicleConfig {
    pub generation: GenerationParams,
    pub simulation: SimulationConfig,
}

impl ChronicleConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ChronicleConfig = toml::from_str(&content)?;
        config.generation.validate()?;
        config.simulation.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(GenerationParams::default().validate().is_ok());
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_heights() {
        let params = GenerationParams {
            min_height: 100.0,
            max_height: 50.0,
            ..GenerationParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ChronicleError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let params = GenerationParams::from_toml_str("seed = 7\npolygon_count = 64\n").unwrap();
        assert_eq!(params.seed, 7);
        assert_eq!(params.polygon_count, 64);
        assert_eq!(params.width, GenerationParams::default().width);
    }

    #[test]
    fn test_toml_round_trip() {
        let params = GenerationParams::default().next_seed();
        let text = params.to_toml_string().unwrap();
        let back = GenerationParams::from_toml_str(&text).unwrap();
        assert_eq!(back, params);
        assert_eq!(back.seed, GenerationParams::default().seed + 1);
    }

    #[test]
    fn test_tribute_chance_is_its_own_setting() {
        let config: SimulationConfig = toml::from_str("tribute_chance = 0.5\n").unwrap();
        assert_eq!(config.tribute_chance, 0.5);
        assert_eq!(config.denounce_chance, SimulationConfig::default().denounce_chance);

        let broken = SimulationConfig {
            tribute_chance: 1.5,
            ..SimulationConfig::default()
        };
        assert!(matches!(broken.validate(), Err(ChronicleError::InvalidParameters(_))));
    }

    #[test]
    fn test_combined_config_tables() {
        let config: ChronicleConfig =
            toml::from_str("[generation]\nseed = 3\n[simulation]\nmin_war_months = 6\n").unwrap();
        assert_eq!(config.generation.seed, 3);
        assert_eq!(config.simulation.min_war_months, 6);
    }
}
