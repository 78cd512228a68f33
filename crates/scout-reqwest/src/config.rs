//! SerpAPI client configuration.

use std::time::Duration;

use derive_builder::Builder;
use url::Url;

use crate::error::{Error, Result};

/// Default SerpAPI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// Default timeout for search requests: 15 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for the SerpAPI client.
#[derive(Clone, Builder)]
#[builder(
    name = "SerpApiConfigBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate_config")
)]
pub struct SerpApiConfig {
    /// SerpAPI key.
    pub api_key: String,
    /// Base URL of the API.
    #[builder(default = "DEFAULT_BASE_URL.to_owned()")]
    pub base_url: String,
    /// Search engine to query.
    #[builder(default = "\"google\".to_owned()")]
    pub engine: String,
    /// Request timeout.
    #[builder(default = "DEFAULT_TIMEOUT")]
    pub timeout: Duration,
    /// Organic results included in the rendered text.
    #[builder(default = "5")]
    pub num_results: usize,
    /// User-Agent header to send with requests.
    #[builder(default = "SerpApiConfig::default_user_agent()")]
    pub user_agent: String,
}

impl std::fmt::Debug for SerpApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiConfig")
            .field("base_url", &self.base_url)
            .field("engine", &self.engine)
            .field("timeout", &self.timeout)
            .field("num_results", &self.num_results)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl SerpApiConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> SerpApiConfigBuilder {
        SerpApiConfigBuilder::default()
    }

    /// Returns the search endpoint.
    pub fn search_url(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .and_then(|base| base.join("search.json"))
            .map_err(|e| Error::Config(format!("invalid base URL '{}': {e}", self.base_url)))
    }

    fn default_user_agent() -> String {
        format!("scout/{}", env!("CARGO_PKG_VERSION"))
    }
}

impl SerpApiConfigBuilder {
    fn validate_config(&self) -> std::result::Result<(), String> {
        if let Some(api_key) = &self.api_key
            && api_key.trim().is_empty()
        {
            return Err("API key must not be empty".to_owned());
        }

        if let Some(base_url) = &self.base_url
            && let Err(e) = Url::parse(base_url)
        {
            return Err(format!("Invalid base URL '{base_url}': {e}"));
        }

        if let Some(timeout) = &self.timeout
            && timeout.is_zero()
        {
            return Err("Timeout must be greater than 0".to_owned());
        }

        if let Some(engine) = &self.engine
            && engine.trim().is_empty()
        {
            return Err("Engine must not be empty".to_owned());
        }

        if self.num_results == Some(0) {
            return Err("Result count must be greater than 0".to_owned());
        }

        Ok(())
    }
}
