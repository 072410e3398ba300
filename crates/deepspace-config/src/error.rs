//! Errors raised while loading, validating, or persisting `config.ron`.

/// Errors that can occur when loading, saving, or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `config.ron` exists but could not be read.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// The config directory or file could not be written.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// The file is not valid RON for [`Config`](crate::Config).
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Serializing the in-memory config failed.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// A value parsed fine but makes no sense for the scene engine.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field, e.g. `drift.fade_in_end`.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}
