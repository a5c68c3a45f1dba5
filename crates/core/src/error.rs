//! Core error types

use thiserror::Error;

/// Core error type for HikePal
#[derive(Debug, Error)]
pub enum CoreError {
    /// Coordinate outside the WGS84 latitude/longitude ranges
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Persisted track record that cannot be rebuilt into a track
    #[error("Invalid track record: {0}")]
    InvalidRecord(String),

    /// Configuration is structurally valid but semantically rejected
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
