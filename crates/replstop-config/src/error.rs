use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("channel name '{name}' is longer than {max} characters")]
    ChannelTooLong { name: String, max: usize },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at least 1, got {value}")]
    NotPositive { field: &'static str, value: u64 },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
