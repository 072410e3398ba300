//! Configuration system for the deep-space background.
//!
//! Provides runtime-configurable settings that persist to disk as RON files:
//! generation density and hardware tiers, the drift/warp motion policy, the
//! adaptive quality controller, and shooting-star timing. Supports CLI
//! overrides via clap, hot-reload detection, and forward/backward compatible
//! serialization.

mod cli;
mod config;
mod density;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, DriftConfig, PerspectiveCurve, PhaseSeed, QualityConfig, RenderBackend,
    RenderConfig, SceneConfig, ShootingStarConfig, WindowConfig,
};
pub use density::{
    CountRange, DensityConfig, MIN_DENSITY_MULTIPLIER, PerformanceTier, sanitize_multiplier,
};
pub use error::ConfigError;
