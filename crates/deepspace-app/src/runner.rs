//! The headless frame loop.
//!
//! Builds a [`SceneEngine`] from the loaded config, drives it for a number of
//! frames through the selected render adapter, and optionally rasterizes the
//! last frame to a PNG.

use std::path::{Path, PathBuf};

use deepspace_config::{Config, PerformanceTier};
use deepspace_scene::{
    EngineSettings, Frame, HostCapabilities, RasterAdapter, RenderAdapter, SceneEngine, Viewport,
    select_adapter,
};
use tracing::{debug, info};

use crate::error::AppError;
use crate::frame_clock::FrameClock;

/// Per-run switches from the command line.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub frames: u32,
    pub realtime: bool,
    pub reduced_motion: bool,
    /// Fully resolved output path.
    pub snapshot: Option<PathBuf>,
}

/// What a run ended with.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub backend: &'static str,
    pub quality: f32,
    /// Frame rate of the last completed quality window, in engine time.
    pub measured_fps: Option<f32>,
    pub drift_amount: f32,
    /// Primitive count of the final frame.
    pub primitives: usize,
    pub snapshot: Option<PathBuf>,
}

/// Framebuffer size in physical pixels for a config's window.
pub fn physical_size(config: &Config) -> (u32, u32) {
    let dpr = config.window.device_pixel_ratio;
    let scale = |logical: u32| ((logical as f32 * dpr).round() as u32).max(1);
    (scale(config.window.width), scale(config.window.height))
}

/// Headless hosts can always batch sprites; raster is used when asked for.
fn headless_capabilities(config: &Config) -> HostCapabilities {
    HostCapabilities {
        gpu: true,
        instancing: true,
        preferred: config.render.backend,
        surface_size: physical_size(config),
    }
}

/// Run the engine for `options.frames` frames.
///
/// # Errors
///
/// Returns [`AppError::Render`] if the snapshot cannot be written.
pub fn run(
    config: &Config,
    tier: PerformanceTier,
    options: &RunOptions,
) -> Result<RunSummary, AppError> {
    let settings = EngineSettings::from_config(config, tier);
    let viewport = Viewport::new(
        config.window.width as f32,
        config.window.height as f32,
        config.window.device_pixel_ratio,
    );
    let mut engine = SceneEngine::new(settings, viewport);
    if options.reduced_motion {
        engine.lock_drift(0.0);
    }

    let mut adapter = select_adapter(headless_capabilities(config));
    info!(
        "Running {} frames at {}x{} on the {} adapter (tier {:?})",
        options.frames,
        config.window.width,
        config.window.height,
        adapter.name(),
        tier
    );

    let mut clock = if options.realtime {
        FrameClock::realtime()
    } else {
        FrameClock::fixed()
    };
    let mut last_frame = engine.frame();
    for _ in 0..options.frames {
        let dt = clock.tick();
        engine.update(dt as f32, None);
        last_frame = engine.frame();
        adapter.consume(&last_frame.primitives, &last_frame.uniforms);
        clock.pace();
    }
    debug!(
        "Simulated {:.2}s over {} frames",
        clock.total_time(),
        clock.frame_count()
    );

    let snapshot = match &options.snapshot {
        Some(path) => {
            write_snapshot(path, adapter.as_raster(), &last_frame, config)?;
            Some(path.clone())
        }
        None => None,
    };

    let summary = RunSummary {
        frames: clock.frame_count(),
        backend: adapter.name(),
        quality: engine.quality(),
        measured_fps: engine.measured_fps(),
        drift_amount: engine.drift_amount(),
        primitives: last_frame.primitives.len(),
        snapshot,
    };

    adapter.release();
    engine.dispose();
    Ok(summary)
}

/// Write `frame` to `path`, reusing the live raster adapter when there is one.
fn write_snapshot(
    path: &Path,
    live: Option<&RasterAdapter>,
    frame: &Frame,
    config: &Config,
) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(deepspace_scene::RenderError::from)?;
    }
    match live {
        Some(raster) => raster.write_png(path)?,
        None => {
            let (width, height) = physical_size(config);
            let mut raster = RasterAdapter::new(width, height);
            raster.consume(&frame.primitives, &frame.uniforms);
            raster.write_png(path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use deepspace_config::RenderBackend;

    use super::*;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.window.width = 64;
        config.window.height = 48;
        config.scene.seed = Some(7);
        config
    }

    #[test]
    fn test_physical_size_applies_pixel_ratio() {
        let mut config = small_config();
        config.window.device_pixel_ratio = 2.0;
        assert_eq!(physical_size(&config), (128, 96));
        config.window.device_pixel_ratio = 1.5;
        assert_eq!(physical_size(&config), (96, 72));
    }

    #[test]
    fn test_run_without_snapshot() {
        let options = RunOptions {
            frames: 30,
            ..RunOptions::default()
        };
        let summary = run(&small_config(), PerformanceTier::Medium, &options).expect("run failed");
        assert_eq!(summary.frames, 30);
        assert_eq!(summary.backend, "sprites", "auto picks sprites on a headless host");
        assert!(summary.primitives > 0, "final frame has at least a background");
        assert!(summary.snapshot.is_none());
        assert_eq!(summary.measured_fps, None, "half a second never closes a window");
    }

    #[test]
    fn test_fixed_steps_measure_sixty_fps() {
        let options = RunOptions {
            frames: 120,
            ..RunOptions::default()
        };
        let summary = run(&small_config(), PerformanceTier::Medium, &options).expect("run failed");
        let fps = summary.measured_fps.expect("two seconds close a window");
        assert!((fps - 60.0).abs() < 1.0, "measured {fps} fps");
    }

    #[test]
    fn test_run_writes_png_snapshot() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = tmp.path().join("shots").join("final.png");
        let options = RunOptions {
            frames: 30,
            snapshot: Some(path.clone()),
            ..RunOptions::default()
        };
        let summary = run(&small_config(), PerformanceTier::Low, &options).expect("run failed");
        assert_eq!(summary.snapshot.as_deref(), Some(path.as_path()));

        let file = std::fs::File::open(&path).expect("snapshot exists");
        let decoder = png::Decoder::new(std::io::BufReader::new(file));
        let reader = decoder.read_info().expect("valid PNG header");
        assert_eq!(reader.info().width, 64);
        assert_eq!(reader.info().height, 48);
    }

    #[test]
    fn test_raster_backend_snapshot_reuses_adapter() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = tmp.path().join("raster.png");
        let mut config = small_config();
        config.render.backend = RenderBackend::Raster;
        let options = RunOptions {
            frames: 5,
            snapshot: Some(path.clone()),
            ..RunOptions::default()
        };
        let summary = run(&config, PerformanceTier::Low, &options).expect("run failed");
        assert_eq!(summary.backend, "raster");
        assert!(path.exists(), "raster snapshot was not written");
    }

    #[test]
    fn test_reduced_motion_holds_drift_at_zero() {
        let options = RunOptions {
            frames: 10,
            reduced_motion: true,
            ..RunOptions::default()
        };
        let summary = run(&small_config(), PerformanceTier::Medium, &options).expect("run failed");
        assert_eq!(summary.drift_amount, 0.0);
    }

    #[test]
    fn test_zero_frames_is_valid() {
        let summary =
            run(&small_config(), PerformanceTier::Medium, &RunOptions::default()).expect("run failed");
        assert_eq!(summary.frames, 0);
        assert!(summary.primitives > 0);
    }
}
