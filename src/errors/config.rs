use std::env::VarError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Represents an error related to environment variables.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] VarError),

    /// Represents an error related to parsing configuration values.
    #[error("Parse error: {0}")]
    Parse(String),
}
