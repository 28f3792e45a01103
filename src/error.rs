//! Error types for gati-odometry.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// gati-odometry error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid configuration parameter
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Message serialization failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Attitude alignment was requested with no buffered samples
    #[error("No inertial attitude data available")]
    NoAttitudeData,

    /// The pipeline has not completed its warm-up yet
    #[error("Odometry not initialized")]
    NotInitialized,
}
