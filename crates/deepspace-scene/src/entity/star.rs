//! Background stars: a realistic magnitude mix of many tiny points and a
//! handful of bright ones, each with its own twinkle rhythm.

use std::f32::consts::TAU;

use deepspace_config::{DensityConfig, SceneConfig, sanitize_multiplier};
use glam::Vec2;
use rand::Rng;

use super::{SizeBucket, random_origin, sample_size};
use crate::color::{Color, random_star_color};
use crate::random::{centered_unit, uniform};

/// Size distribution: 50% tiny, 30% small, 15% medium, 5% bright.
pub const STAR_SIZE_BUCKETS: [SizeBucket; 4] = [
    (0.50, 0.3, 0.7),
    (0.30, 0.7, 1.2),
    (0.15, 1.2, 1.8),
    (0.05, 1.8, 2.8),
];

/// Largest radius any generated star can have.
pub const MAX_STAR_SIZE: f32 = 2.8;

/// A single background star.
#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    /// Generated canvas position. Seeds the drift phase and direction.
    pub origin: Vec2,
    /// Radius in pixels.
    pub size: f32,
    /// Peak opacity in `[0, 1]`.
    pub brightness: f32,
    /// Twinkle angular speed in radians per second. Smaller stars twinkle faster.
    pub twinkle_speed: f32,
    /// Twinkle phase seed in radians.
    pub twinkle_offset: f32,
    pub color: Color,
    /// Apparent nearness in `[0, 1]`; grows with size.
    pub parallax_factor: f32,
}

impl Star {
    /// Twinkle multiplier at `time` seconds, in `[0.4, 1.0]`.
    ///
    /// The phase is wrapped in `f64` so the rhythm stays smooth after days
    /// of uptime.
    pub fn twinkle(&self, time: f64) -> f32 {
        let phase = time * f64::from(self.twinkle_speed) + f64::from(self.twinkle_offset);
        let phase = phase.rem_euclid(std::f64::consts::TAU) as f32;
        0.7 + 0.3 * phase.sin()
    }
}

/// Number of stars for a canvas: `floor(area / (pixels_per_star / multiplier))`.
pub fn star_count(width: f32, height: f32, density: &DensityConfig, scene: &SceneConfig) -> usize {
    let multiplier = sanitize_multiplier(density.star_density_multiplier);
    let pixels_per_star = scene.pixels_per_star.max(1.0) / multiplier;
    let area = width.max(0.0) * height.max(0.0);
    (area / pixels_per_star).floor() as usize
}

/// Generate the star field for a canvas.
pub fn generate_stars(
    width: f32,
    height: f32,
    density: &DensityConfig,
    scene: &SceneConfig,
    rng: &mut impl Rng,
) -> Vec<Star> {
    let count = star_count(width, height, density, scene);
    let mut stars = Vec::with_capacity(count);

    for _ in 0..count {
        let origin = random_origin(rng, width, height);
        let size = sample_size(rng, &STAR_SIZE_BUCKETS);
        let size_t = size / MAX_STAR_SIZE;

        let brightness = (0.25 + 0.6 * size_t + centered_unit(rng) * 0.15).clamp(0.0, 1.0);
        let twinkle_speed = (MAX_STAR_SIZE + 0.4 - size) * uniform(rng, 0.6, 1.2);
        let twinkle_offset = uniform(rng, 0.0, TAU);
        let color = random_star_color(rng);
        let parallax_factor = (size_t * 0.85 + rng.random::<f32>() * 0.15).clamp(0.0, 1.0);

        stars.push(Star {
            origin,
            size,
            brightness,
            twinkle_speed,
            twinkle_offset,
            color,
            parallax_factor,
        });
    }

    stars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_rng;

    fn generate(seed: u64) -> Vec<Star> {
        let mut rng = seeded_rng(seed);
        generate_stars(
            800.0,
            600.0,
            &DensityConfig::default(),
            &SceneConfig::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_star_count_matches_area_formula() {
        let stars = generate(42);
        // 800 * 600 / 2000 = 240
        assert_eq!(stars.len(), 240);
    }

    #[test]
    fn test_star_density_multiplier_scales_count() {
        let scene = SceneConfig::default();
        let base = star_count(800.0, 600.0, &DensityConfig::default(), &scene);
        let dense = DensityConfig {
            star_density_multiplier: 2.0,
            ..DensityConfig::default()
        };
        assert_eq!(star_count(800.0, 600.0, &dense, &scene), base * 2);
    }

    #[test]
    fn test_zero_multiplier_still_generates_stars() {
        let density = DensityConfig {
            star_density_multiplier: 0.0,
            ..DensityConfig::default()
        };
        let count = star_count(800.0, 600.0, &density, &SceneConfig::default());
        assert!(count > 0, "zero multiplier should clamp, not empty the field");
    }

    #[test]
    fn test_star_values_in_range() {
        for (i, star) in generate(42).iter().enumerate() {
            assert!(
                (0.0..=1.0).contains(&star.brightness),
                "Star {i} brightness {} outside [0, 1]",
                star.brightness
            );
            assert!(
                (0.0..=1.0).contains(&star.parallax_factor),
                "Star {i} parallax {} outside [0, 1]",
                star.parallax_factor
            );
            assert!(star.size > 0.0 && star.size <= MAX_STAR_SIZE);
            assert!(star.twinkle_speed > 0.0);
            assert!((0.0..800.0).contains(&star.origin.x));
            assert!((0.0..600.0).contains(&star.origin.y));
        }
    }

    #[test]
    fn test_same_seed_produces_same_stars() {
        assert_eq!(generate(123), generate(123));
    }

    #[test]
    fn test_different_seed_produces_different_stars() {
        let a = generate(1);
        let b = generate(9999);
        let differences = a
            .iter()
            .zip(b.iter())
            .filter(|(a, b)| (a.origin - b.origin).length() > 1.0)
            .count();
        assert!(differences > 200, "only {differences}/240 stars moved");
    }

    #[test]
    fn test_size_distribution_skews_tiny() {
        let mut rng = seeded_rng(3);
        let stars = generate_stars(
            2000.0,
            2000.0,
            &DensityConfig::default(),
            &SceneConfig::default(),
            &mut rng,
        );
        let tiny = stars.iter().filter(|s| s.size < 0.7).count();
        let bright = stars.iter().filter(|s| s.size >= 1.8).count();
        assert!(
            tiny > bright * 5,
            "expected many more tiny stars ({tiny}) than bright ones ({bright})"
        );
    }

    #[test]
    fn test_small_stars_twinkle_faster_on_average() {
        let stars = generate(77);
        let mean = |filter: &dyn Fn(&Star) -> bool| {
            let picked: Vec<f32> = stars
                .iter()
                .filter(|s| filter(s))
                .map(|s| s.twinkle_speed)
                .collect();
            picked.iter().sum::<f32>() / picked.len().max(1) as f32
        };
        let small = mean(&|s| s.size < 0.7);
        let large = mean(&|s| s.size >= 1.2);
        assert!(small > large, "small {small} should exceed large {large}");
    }

    #[test]
    fn test_twinkle_bounds() {
        let star = &generate(5)[0];
        for i in 0..200 {
            let t = star.twinkle(i as f64 * 0.1);
            assert!((0.39..=1.01).contains(&t), "twinkle {t} out of range");
        }
    }

    #[test]
    fn test_twinkle_keeps_moving_after_a_week() {
        let star = &generate(5)[0];
        let week = 7.0 * 24.0 * 3600.0;
        let step = 1.0 / 60.0;
        let changed = (0..60)
            .filter(|&i| {
                let t = week + i as f64 * step;
                (star.twinkle(t + step) - star.twinkle(t)).abs() > 0.0
            })
            .count();
        assert!(changed >= 55, "twinkle froze: only {changed}/60 frames changed");

        let early = star.twinkle(1.25);
        let shifted = star.twinkle(1.25 + std::f64::consts::TAU / f64::from(star.twinkle_speed));
        assert!((early - shifted).abs() < 1e-3, "phase wrap changed the value");
    }
}
