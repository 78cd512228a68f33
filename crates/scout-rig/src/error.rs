//! Error types for scout-rig.

use std::fmt;

/// Result type alias for rig operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during rig operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Provider error (API call failed, rate limited, etc.)
    #[error("provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Retrieval error.
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while loading a corpus.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a provider error.
    pub fn provider(provider: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates an embedding error.
    pub fn embedding(message: impl fmt::Display) -> Self {
        Self::Embedding(message.to_string())
    }

    /// Creates a retrieval error.
    pub fn retrieval(message: impl fmt::Display) -> Self {
        Self::Retrieval(message.to_string())
    }

    /// Creates a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config(message.to_string())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::Io(_))
    }
}

impl From<Error> for scout_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Provider { provider, message } => scout_core::Error::external_error()
                .with_message(format!("{provider}: {message}")),
            Error::Embedding(message) => scout_core::Error::external_error().with_message(message),
            Error::Retrieval(message) => scout_core::Error::service_unavailable().with_message(message),
            Error::Config(message) => scout_core::Error::configuration().with_message(message),
            Error::Io(e) => scout_core::Error::not_found()
                .with_message(e.to_string())
                .with_source(e),
        }
    }
}
