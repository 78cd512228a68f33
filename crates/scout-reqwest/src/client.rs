//! Reqwest-based SerpAPI client.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use scout_core::search::{SearchProvider, SearchService};

use crate::config::SerpApiConfig;
use crate::error::{Error, Result};
use crate::response::SearchResponse;

/// Tracing target for web search client operations.
pub const TRACING_TARGET: &str = "scout_reqwest::client";

struct SerpApiClientInner {
    http: Client,
    config: SerpApiConfig,
}

/// Web search client for the SerpAPI JSON endpoint.
///
/// Implements [`SearchProvider`] by rendering the response as plain text:
/// the answer box first, then one `title: snippet (link)` line per organic
/// result.
///
/// # Examples
///
/// ```rust,ignore
/// use scout_reqwest::{SerpApiClient, SerpApiConfig};
///
/// let config = SerpApiConfig::builder().with_api_key(key).build()?;
/// let search = SerpApiClient::new(config)?.into_service();
/// let text = search.search("average notice period in software companies").await?;
/// ```
#[derive(Clone)]
pub struct SerpApiClient {
    inner: Arc<SerpApiClientInner>,
}

impl std::fmt::Debug for SerpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl SerpApiClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: SerpApiConfig) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            engine = %config.engine,
            timeout_ms = config.timeout.as_millis(),
            "Creating web search client"
        );

        config.search_url()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let inner = SerpApiClientInner { http, config };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &SerpApiConfig {
        &self.inner.config
    }

    /// Converts this client into a [`SearchService`].
    pub fn into_service(self) -> SearchService {
        SearchService::new(self)
    }

    /// Runs a query and returns the decoded response.
    pub async fn query(&self, query: &str) -> Result<SearchResponse> {
        let config = &self.inner.config;
        let num = config.num_results.to_string();

        let response = self
            .inner
            .http
            .get(config.search_url()?)
            .query(&[
                ("engine", config.engine.as_str()),
                ("q", query),
                ("num", num.as_str()),
                ("api_key", config.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        match body.error {
            Some(error) if body.organic_results.is_empty() && body.answer_box.is_none() => {
                // SerpAPI reports "no results" as an error payload.
                if error.contains("hasn't returned any results") {
                    Ok(SearchResponse::default())
                } else {
                    Err(Error::Api(error))
                }
            }
            _ => Ok(body),
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(&self, query: &str) -> scout_core::Result<String> {
        let started_at = Instant::now();
        let response = self.query(query).await?;
        let text = response.render(self.inner.config.num_results);

        tracing::debug!(
            target: TRACING_TARGET,
            organic_results = response.organic_results.len(),
            answer_box = response.answer_box.is_some(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Web search completed"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use scout_core::ErrorKind;

    use super::*;

    fn config(base_url: &str) -> SerpApiConfig {
        SerpApiConfig::builder()
            .with_api_key("serp-key")
            .with_base_url(base_url)
            .build()
            .unwrap()
    }

    #[test]
    fn client_creation() {
        let client = SerpApiClient::new(config("https://serpapi.com")).unwrap();
        assert_eq!(client.config().engine, "google");
        assert!(!format!("{client:?}").contains("serp-key"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let client = SerpApiClient::new(config("http://127.0.0.1:9")).unwrap();
        let error = SearchProvider::search(&client, "salary trends").await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NetworkError);
    }
}
