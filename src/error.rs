//! Error types for the EduRise chat assistant

use thiserror::Error;

/// Result type alias for chat assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the chat assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Widget could not be bound to its rendering surface
    #[error("widget error: {0}")]
    Widget(String),

    /// Voice capture or synthesis error reported by the host
    #[error("speech error: {0}")]
    Speech(String),

    /// Answering service replied with something unusable
    #[error("transport error: {0}")]
    Transport(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
