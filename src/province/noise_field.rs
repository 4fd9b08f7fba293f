//! Seeded fractal noise sampled at world positions

use noise::{NoiseFn, Perlin};

use crate::core::types::Vec2;

/// Multi-octave Perlin noise (fBm) over the world rectangle
///
/// Positions are normalized by the larger world dimension, so the same
/// frequency gives the same feature size on wide and tall maps.
pub struct NoiseField {
    perlin: Perlin,
    frequency: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
    scale: f64,
}

impl NoiseField {
    pub fn new(seed: u32, frequency: f64, octaves: u32, world_width: f32, world_height: f32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            frequency,
            octaves: octaves.max(1),
            persistence: 0.5,
            lacunarity: 2.0,
            scale: world_width.max(world_height).max(1.0) as f64,
        }
    }

    /// Noise value at `position`, roughly in [-1, 1]
    pub fn sample(&self, position: Vec2) -> f32 {
        let nx = position.x as f64 / self.scale;
        let ny = position.y as f64 / self.scale;

        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.frequency;
        let mut max_amplitude = 0.0;

        for _ in 0..self.octaves {
            value += self.perlin.get([nx * frequency, ny * frequency]) * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        (value / max_amplitude).clamp(-1.0, 1.0) as f32
    }

    /// Noise value mapped to [0, 1]
    pub fn sample_unit(&self, position: Vec2) -> f32 {
        (self.sample(position) + 1.0) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_value() {
        let a = NoiseField::new(7, 4.0, 4, 100.0, 100.0);
        let b = NoiseField::new(7, 4.0, 4, 100.0, 100.0);
        let p = Vec2::new(13.5, 71.25);
        assert_eq!(a.sample(p), b.sample(p));
    }

    #[test]
    fn test_values_are_bounded() {
        let field = NoiseField::new(3, 6.0, 5, 200.0, 100.0);
        for i in 0..50 {
            let v = field.sample(Vec2::new(i as f32 * 3.7, i as f32 * 1.3));
            assert!((-1.0..=1.0).contains(&v));
            let u = field.sample_unit(Vec2::new(i as f32 * 3.7, i as f32 * 1.3));
            assert!((0.0..=1.0).contains(&u));
        }
    }
}
