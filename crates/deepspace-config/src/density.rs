//! Generation-time density: the discrete hardware tier and the multipliers it selects.
//!
//! The tier decides how much content *exists* in a scene. It is chosen once at
//! startup and is unrelated to the runtime quality scalar, which decides how
//! much of that content is drawn on a given frame.

use serde::{Deserialize, Serialize};

/// Smallest multiplier a density knob may take. Zero, negative and
/// non-finite inputs are raised to this instead of producing empty scenes.
pub const MIN_DENSITY_MULTIPLIER: f32 = 0.05;

/// Discrete hardware-capability classification.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    /// Integrated or software GPUs, few cores, little memory.
    Low,
    /// The fallback whenever detection is inconclusive.
    #[default]
    Medium,
    /// Discrete GPUs with plenty of cores and memory.
    High,
}

/// Density and capacity knobs handed to the entity generators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    /// Scales the star count (more stars per pixel when larger).
    pub star_density_multiplier: f32,
    /// Scales the galaxy count range.
    pub galaxy_count_multiplier: f32,
    /// Scales the nebula count range.
    pub nebula_count_multiplier: f32,
    /// Scales the star cluster count range.
    pub cluster_count_multiplier: f32,
    /// Hard cap on simultaneously alive shooting stars.
    pub max_shooting_stars: usize,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self::for_tier(PerformanceTier::Medium)
    }
}

impl DensityConfig {
    /// Multipliers used for each hardware tier.
    pub fn for_tier(tier: PerformanceTier) -> Self {
        match tier {
            PerformanceTier::Low => Self {
                star_density_multiplier: 0.5,
                galaxy_count_multiplier: 0.5,
                nebula_count_multiplier: 0.5,
                cluster_count_multiplier: 0.5,
                max_shooting_stars: 1,
            },
            PerformanceTier::Medium => Self {
                star_density_multiplier: 1.0,
                galaxy_count_multiplier: 1.0,
                nebula_count_multiplier: 1.0,
                cluster_count_multiplier: 1.0,
                max_shooting_stars: 2,
            },
            PerformanceTier::High => Self {
                star_density_multiplier: 1.5,
                galaxy_count_multiplier: 1.5,
                nebula_count_multiplier: 1.3,
                cluster_count_multiplier: 1.5,
                max_shooting_stars: 3,
            },
        }
    }

    /// Copy with every multiplier raised to at least [`MIN_DENSITY_MULTIPLIER`].
    pub fn sanitized(self) -> Self {
        Self {
            star_density_multiplier: sanitize_multiplier(self.star_density_multiplier),
            galaxy_count_multiplier: sanitize_multiplier(self.galaxy_count_multiplier),
            nebula_count_multiplier: sanitize_multiplier(self.nebula_count_multiplier),
            cluster_count_multiplier: sanitize_multiplier(self.cluster_count_multiplier),
            max_shooting_stars: self.max_shooting_stars,
        }
    }
}

/// Clamp a single multiplier into the usable range. Non-finite values reset to 1.
pub fn sanitize_multiplier(multiplier: f32) -> f32 {
    if multiplier.is_finite() {
        multiplier.max(MIN_DENSITY_MULTIPLIER)
    } else {
        1.0
    }
}

/// Inclusive `[min, max]` count range for one object class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// The range after scaling by `multiplier`, as inclusive `(lo, hi)`.
    ///
    /// Never empty: `lo >= 1` and `hi >= lo`, so a degenerate multiplier still
    /// yields at least one object.
    pub fn scaled_bounds(&self, multiplier: f32) -> (usize, usize) {
        let multiplier = sanitize_multiplier(multiplier);
        let (min, max) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        let lo = ((min as f32 * multiplier).floor() as usize).max(1);
        let hi = ((max as f32 * multiplier).ceil() as usize).max(lo);
        (lo, hi)
    }
}
