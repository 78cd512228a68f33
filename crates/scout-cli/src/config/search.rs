//! Web search configuration.

use std::time::Duration;

use anyhow::Context;
use clap::Args;
use scout_reqwest::{DEFAULT_BASE_URL, SerpApiConfig};
use serde::{Deserialize, Serialize};

/// SerpAPI connection options.
#[derive(Clone, Serialize, Deserialize, Args)]
pub struct SearchConfig {
    /// SerpAPI key.
    #[arg(long, env = "SERPAPI_API_KEY", hide_env_values = true)]
    pub serpapi_api_key: String,

    /// SerpAPI base URL.
    #[arg(long, env = "SERPAPI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub serpapi_base_url: String,

    /// Search engine queried through SerpAPI.
    #[arg(long, env = "SERPAPI_ENGINE", default_value = "google")]
    pub serpapi_engine: String,

    /// Timeout for one search request in seconds.
    #[arg(long, env = "SERPAPI_TIMEOUT_SECS", default_value_t = 15)]
    pub serpapi_timeout_secs: u64,

    /// Organic results included in a web search answer.
    #[arg(long, env = "SERPAPI_NUM_RESULTS", default_value_t = 5)]
    pub serpapi_num_results: usize,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("serpapi_base_url", &self.serpapi_base_url)
            .field("serpapi_engine", &self.serpapi_engine)
            .field("serpapi_timeout_secs", &self.serpapi_timeout_secs)
            .field("serpapi_num_results", &self.serpapi_num_results)
            .finish_non_exhaustive()
    }
}

impl SearchConfig {
    /// Builds and validates the client configuration.
    pub fn to_client_config(&self) -> anyhow::Result<SerpApiConfig> {
        SerpApiConfig::builder()
            .with_api_key(self.serpapi_api_key.as_str())
            .with_base_url(self.serpapi_base_url.as_str())
            .with_engine(self.serpapi_engine.as_str())
            .with_timeout(Duration::from_secs(self.serpapi_timeout_secs))
            .with_num_results(self.serpapi_num_results)
            .build()
            .context("invalid web search configuration")
    }
}
