//! Structured logging for the deep-space background.
//!
//! Library crates log through the `log` facade; the host installs a `tracing`
//! subscriber here, which also captures those `log` records. Console output
//! carries an uptime timer and module paths. Debug builds can additionally
//! write JSON lines to a file for post-mortem analysis of quality swings.

use std::path::Path;

use deepspace_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,deepspace_scene=info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "deepspace.log";

/// Initialize the global tracing subscriber.
///
/// Filter precedence: `RUST_LOG`, then `config.debug.log_level`, then
/// [`DEFAULT_FILTER`]. When `debug_build` is set and `log_dir` can be created,
/// a JSON file layer is added next to the console layer.
///
/// # Examples
///
/// ```no_run
/// use deepspace_config::Config;
/// use deepspace_log::init_logging;
///
/// let config = Config::default();
/// init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_for(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(false)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Filter string derived from the config, falling back to [`DEFAULT_FILTER`].
pub fn filter_for(config: Option<&Config>) -> String {
    config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// An `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
