//! Error types for the almanac host binary.
//!
//! [`EngineError`] wraps every failure mode during startup and shutdown so
//! that `main` can propagate with `?`.

/// Top-level error for the almanac host binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: almanac_core::config::ConfigError,
    },

    /// The final status snapshot could not be serialized.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
