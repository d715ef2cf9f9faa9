use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating runtime configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A variable needed by the requested command is unset or empty.
    #[error("Missing environment variable: {0}")]
    Missing(String),

    /// A variable is set but cannot be interpreted.
    #[error("Invalid value for {name} ({value:?}): {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },

    /// The env file could not be read.
    #[error("Failed to read env file {}: {source}", path.display())]
    EnvFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line of the env file is not `KEY=VALUE`.
    #[error("Invalid env file: {reason} at line {line}")]
    EnvFileFormat { line: usize, reason: String },
}
