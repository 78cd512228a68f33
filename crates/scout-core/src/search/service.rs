//! Web search service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::{Result, SearchProvider, TRACING_TARGET};

/// Web search service wrapper with observability.
#[derive(Clone)]
pub struct SearchService {
    inner: Arc<dyn SearchProvider>,
}

impl fmt::Debug for SearchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchService").finish_non_exhaustive()
    }
}

impl SearchService {
    /// Creates a new search service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: SearchProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Searches the web for `query`.
    pub async fn search(&self, query: &str) -> Result<String> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            query_len = query.len(),
            "Searching the web"
        );

        let result = self.inner.search(query).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(text) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    result_len = text.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Web search completed"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = error.kind_str(),
                    retryable = error.is_retryable(),
                    elapsed_ms = elapsed.as_millis(),
                    "Web search failed"
                );
            }
        }

        result
    }
}
