//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::density::{CountRange, DensityConfig, PerformanceTier};
use crate::error::ConfigError;

/// Top-level configuration for the deep-space background.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Initial viewport.
    pub window: WindowConfig,
    /// What gets generated.
    pub scene: SceneConfig,
    /// Drift/warp motion policy.
    pub drift: DriftConfig,
    /// Adaptive quality controller tuning.
    pub quality: QualityConfig,
    /// Shooting-star spawn timing.
    pub shooting_stars: ShootingStarConfig,
    /// Render backend selection for the host binary.
    pub render: RenderConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Viewport configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Viewport width in logical pixels.
    pub width: u32,
    /// Viewport height in logical pixels.
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f32,
}

/// Scene generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Fixed generation seed. `None` seeds from the thread RNG for visual variety.
    pub seed: Option<u64>,
    /// Force a hardware tier instead of detecting one.
    pub tier: Option<PerformanceTier>,
    /// Explicit density record; overrides the tier's multipliers entirely.
    pub density: Option<DensityConfig>,
    /// Canvas area (px²) per star at a density multiplier of 1.
    pub pixels_per_star: f32,
    /// Galaxy count range before the tier multiplier.
    pub galaxy_count: CountRange,
    /// Nebula count range before the tier multiplier.
    pub nebula_count: CountRange,
    /// Star cluster count range before the tier multiplier.
    pub cluster_count: CountRange,
}

/// How drift phase maps onto travel distance from the viewport center.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PerspectiveCurve {
    /// `phase * max_radius`: constant apparent speed, a steady cruise.
    #[default]
    Linear,
    /// `phase² * max_radius`: slow near the center, accelerating outward.
    Quadratic,
}

/// How an entity's initial phase is derived from its static properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseSeed {
    /// Pseudo-random value hashed from the origin coordinates.
    #[default]
    Hashed,
    /// Inverse perspective curve of the normalized distance from the center,
    /// so phase at zero drift lands exactly on the origin.
    Radial,
}

/// Drift/warp motion policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub curve: PerspectiveCurve,
    pub phase_seed: PhaseSeed,
    /// Drift offset gained per second at full drift.
    pub drift_rate_per_second: f32,
    /// Phase speed of an entity with parallax factor 0.
    pub base_speed: f32,
    /// Extra phase speed per unit of parallax factor.
    pub speed_scale: f32,
    /// Travel radius as a multiple of the center-to-corner distance. Values
    /// above 1 let entities leave the screen fully before wrapping.
    pub travel_overshoot: f32,
    /// Size multiplier at phase 0 (center).
    pub center_scale: f32,
    /// Size multiplier at phase 1 (edge).
    pub edge_scale: f32,
    /// Phase at which the fade-in ramp reaches full opacity.
    pub fade_in_end: f32,
    /// Phase at which the fade-out ramp starts.
    pub fade_out_start: f32,
    /// Seconds without input before cruise starts to engage.
    pub idle_threshold_secs: f32,
    /// Seconds for drift to ramp from 0 to 1 once engaged.
    pub engage_secs: f32,
    /// Seconds for drift to fall from 1 to 0 on input.
    pub release_secs: f32,
    /// Pointer parallax displacement in pixels at parallax factor 1.
    pub parallax_strength: f32,
    /// Exponential smoothing rate (1/s) of the pointer parallax target.
    pub pointer_smoothing: f32,
    /// Extra margin in pixels around the viewport before culling.
    pub cull_margin: f32,
}

/// Adaptive quality controller tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Quality at startup.
    pub initial: f32,
    /// Length of one measurement window in seconds.
    pub window_secs: f32,
    /// Below this fps the quality steps down.
    pub low_fps: u32,
    /// Above this fps the quality steps up.
    pub high_fps: u32,
    /// Step applied when fps is low. Larger than `increase_step`.
    pub decrease_step: f32,
    /// Step applied when fps is high.
    pub increase_step: f32,
    /// Decreases never go below this.
    pub min_quality: f32,
    /// Nebulas are hidden below this quality.
    pub nebula_threshold: f32,
    /// Galaxies are hidden below this quality.
    pub galaxy_threshold: f32,
    /// Star clusters are hidden below this quality.
    pub cluster_threshold: f32,
    /// New shooting stars stop spawning below this quality.
    pub shooting_star_threshold: f32,
}

/// Shooting-star spawn timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingStarConfig {
    pub min_spawn_delay_secs: f32,
    pub max_spawn_delay_secs: f32,
    /// Distance outside the viewport edge at which new streaks appear.
    pub spawn_margin: f32,
}

/// Which render adapter the host should use.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackend {
    /// Pick from host capabilities.
    #[default]
    Auto,
    /// Point-sprite instance batching for a GPU pipeline.
    Sprites,
    /// Immediate-mode software canvas.
    Raster,
}

/// Host rendering configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub backend: RenderBackend,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tier: None,
            density: None,
            pixels_per_star: 2000.0,
            galaxy_count: CountRange::new(2, 5),
            nebula_count: CountRange::new(1, 3),
            cluster_count: CountRange::new(1, 4),
        }
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            curve: PerspectiveCurve::Linear,
            phase_seed: PhaseSeed::Hashed,
            drift_rate_per_second: 0.05,
            base_speed: 0.6,
            speed_scale: 1.4,
            travel_overshoot: 1.25,
            center_scale: 0.35,
            edge_scale: 1.8,
            fade_in_end: 0.25,
            fade_out_start: 0.9,
            idle_threshold_secs: 3.0,
            engage_secs: 4.0,
            release_secs: 0.35,
            parallax_strength: 24.0,
            pointer_smoothing: 6.0,
            cull_margin: 40.0,
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            initial: 1.0,
            window_secs: 1.0,
            low_fps: 30,
            high_fps: 55,
            decrease_step: 0.1,
            increase_step: 0.05,
            min_quality: 0.2,
            nebula_threshold: 0.5,
            galaxy_threshold: 0.8,
            cluster_threshold: 0.4,
            shooting_star_threshold: 0.6,
        }
    }
}

impl Default for ShootingStarConfig {
    fn default() -> Self {
        Self {
            min_spawn_delay_secs: 5.0,
            max_spawn_delay_secs: 15.0,
            spawn_margin: 50.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

impl Config {
    /// Reject values that would make the motion model or timers degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let drift = &self.drift;
        if !(0.0..1.0).contains(&drift.fade_in_end) {
            return Err(ConfigError::InvalidValue {
                field: "drift.fade_in_end",
                reason: format!("{} is outside [0, 1)", drift.fade_in_end),
            });
        }
        if drift.fade_out_start <= drift.fade_in_end || drift.fade_out_start > 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "drift.fade_out_start",
                reason: format!(
                    "{} must lie in ({}, 1]",
                    drift.fade_out_start, drift.fade_in_end
                ),
            });
        }
        if drift.travel_overshoot < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "drift.travel_overshoot",
                reason: format!("{} is below 1", drift.travel_overshoot),
            });
        }
        if self.quality.decrease_step <= self.quality.increase_step {
            return Err(ConfigError::InvalidValue {
                field: "quality.decrease_step",
                reason: "must be larger than quality.increase_step".to_string(),
            });
        }
        if self.quality.low_fps >= self.quality.high_fps {
            return Err(ConfigError::InvalidValue {
                field: "quality.low_fps",
                reason: "must be below quality.high_fps".to_string(),
            });
        }
        let stars = &self.shooting_stars;
        if stars.min_spawn_delay_secs > stars.max_spawn_delay_secs {
            return Err(ConfigError::InvalidValue {
                field: "shooting_stars.min_spawn_delay_secs",
                reason: "must not exceed max_spawn_delay_secs".to_string(),
            });
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
