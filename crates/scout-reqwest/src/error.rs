//! Internal error types for scout-reqwest.

use thiserror::Error;

/// Result type alias for scout-reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Internal error type for scout-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The search API answered with an error payload.
    #[error("search API error: {0}")]
    Api(String),
    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<Error> for scout_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    scout_core::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    scout_core::Error::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else if e.status().is_some_and(|s| s.as_u16() == 401 || s.as_u16() == 403) {
                    scout_core::Error::authentication()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.status().is_some_and(|s| s.as_u16() == 429) {
                    scout_core::Error::rate_limited()
                        .with_message(e.to_string())
                        .with_source(e)
                } else {
                    scout_core::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Serde(e) => scout_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Api(message) => scout_core::Error::external_error().with_message(message),
            Error::Config(message) => scout_core::Error::configuration().with_message(message),
        }
    }
}
