//! Headless host for the deep-space background.
//!
//! Resolves platform directories, loads configuration, and drives the scene
//! engine through a render adapter for a fixed number of frames.

pub mod error;
pub mod frame_clock;
pub mod platform;
pub mod runner;

pub use error::AppError;
pub use platform::{PlatformDirs, PlatformError};
pub use runner::{RunOptions, RunSummary, run};
