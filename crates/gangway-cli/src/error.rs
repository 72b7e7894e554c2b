//! Error types for the CLI.

use thiserror::Error;

/// CLI operation errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file did not parse
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
