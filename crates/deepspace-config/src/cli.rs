//! Command-line argument parsing for the deep-space background host.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;
use crate::config::{PerspectiveCurve, RenderBackend};
use crate::density::PerformanceTier;

/// Deep-space background command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "deepspace", about = "Procedural deep-space background")]
pub struct CliArgs {
    /// Viewport width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Fixed generation seed for a reproducible scene.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Force a hardware tier instead of detecting one.
    #[arg(long, value_enum)]
    pub tier: Option<PerformanceTier>,

    /// Perspective curve for the drift effect.
    #[arg(long, value_enum)]
    pub curve: Option<PerspectiveCurve>,

    /// Render adapter to drive.
    #[arg(long, value_enum)]
    pub backend: Option<RenderBackend>,

    /// Number of frames to simulate before exiting.
    #[arg(long, default_value_t = 600)]
    pub frames: u32,

    /// Write the final frame to this PNG file.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Pace frames against the wall clock instead of fixed 60 Hz steps.
    #[arg(long)]
    pub realtime: bool,

    /// Hold the drift effect at zero.
    #[arg(long)]
    pub reduced_motion: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(seed) = args.seed {
            self.scene.seed = Some(seed);
        }
        if let Some(tier) = args.tier {
            self.scene.tier = Some(tier);
        }
        if let Some(curve) = args.curve {
            self.drift.curve = curve;
        }
        if let Some(backend) = args.backend {
            self.render.backend = backend;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
