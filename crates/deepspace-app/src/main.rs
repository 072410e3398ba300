//! The `deepspace` binary.

use std::process::ExitCode;

use clap::Parser;
use deepspace_app::{AppError, PlatformDirs, RunOptions, run};
use deepspace_config::{CliArgs, Config};
use deepspace_scene::detect_tier;
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match start(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("deepspace: {e}");
            ExitCode::FAILURE
        }
    }
}

fn start(args: &CliArgs) -> Result<(), AppError> {
    let dirs = match &args.config {
        Some(root) => PlatformDirs::resolve_with_root(root),
        None => PlatformDirs::resolve()?,
    };
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);
    config.validate()?;

    deepspace_log::init_logging(
        Some(&dirs.log_dir),
        cfg!(debug_assertions),
        Some(&config),
    );
    info!("Config directory: {}", dirs.config_dir.display());

    let tier = config.scene.tier.unwrap_or_else(detect_tier);
    let options = RunOptions {
        frames: args.frames,
        realtime: args.realtime,
        reduced_motion: args.reduced_motion,
        snapshot: args.snapshot.as_deref().map(|p| dirs.snapshot_path(p)),
    };

    let summary = run(&config, tier, &options)?;
    info!(
        "Finished {} frames on {}: quality {:.2} at {}, drift {:.2}, {} primitives in the last frame",
        summary.frames,
        summary.backend,
        summary.quality,
        summary
            .measured_fps
            .map_or_else(|| "unmeasured fps".to_string(), |fps| format!("{fps:.1} fps")),
        summary.drift_amount,
        summary.primitives
    );
    if let Some(path) = &summary.snapshot {
        println!("{}", path.display());
    }
    Ok(())
}
