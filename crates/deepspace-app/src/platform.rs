//! Platform directory resolution.
//!
//! Config and log locations follow OS conventions (XDG on Linux, Known
//! Folders on Windows, Library on macOS) and can be rooted elsewhere for tests
//! or a `--config` override.

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during platform operations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    /// Directory creation failed.
    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// OS-specific directories for the deep-space host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Debug-build JSON logs.
    pub log_dir: PathBuf,
    /// Default location for PNG snapshots.
    pub snapshot_dir: PathBuf,
}

const APP_NAME: &str = "deepspace";

impl PlatformDirs {
    /// Resolve platform-specific directories without creating them on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS does not expose a
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let app_config = dirs::config_dir()
            .ok_or(PlatformError::NoConfigDir)?
            .join(APP_NAME);
        let snapshot_dir = dirs::picture_dir()
            .or_else(dirs::data_dir)
            .unwrap_or_else(|| app_config.clone())
            .join(APP_NAME);

        Ok(Self {
            config_dir: app_config.clone(),
            log_dir: app_config.join("logs"),
            snapshot_dir,
        })
    }

    /// Lay the directories out under `root`, as used by `--config`.
    pub fn resolve_with_root(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            log_dir: root.join("logs"),
            snapshot_dir: root.join("snapshots"),
        }
    }

    /// Create the config and log directories. Snapshot directories are
    /// created only when a snapshot is written.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Io`] if a directory cannot be created.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }

    /// Resolve a snapshot path: relative paths land in `snapshot_dir`.
    pub fn snapshot_path(&self, requested: &Path) -> PathBuf {
        if requested.is_absolute() || requested.parent().is_some_and(|p| !p.as_os_str().is_empty()) {
            requested.to_path_buf()
        } else {
            self.snapshot_dir.join(requested)
        }
    }
}
