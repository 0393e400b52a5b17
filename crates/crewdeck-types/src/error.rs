//! Error types shared across the Crewdeck client subsystem.

use thiserror::Error;

/// Result type alias using the Crewdeck error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the Crewdeck client subsystem.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
