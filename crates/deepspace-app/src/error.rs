use deepspace_config::ConfigError;
use deepspace_scene::RenderError;

use crate::platform::PlatformError;

/// Anything that stops the host.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}
