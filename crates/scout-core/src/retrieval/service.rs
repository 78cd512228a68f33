//! Retrieval service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::{Passage, Result, RetrievalProvider, TRACING_TARGET};

/// Retrieval service wrapper with observability.
#[derive(Clone)]
pub struct RetrievalService {
    inner: Arc<dyn RetrievalProvider>,
}

impl fmt::Debug for RetrievalService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievalService").finish_non_exhaustive()
    }
}

impl RetrievalService {
    /// Creates a new retrieval service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: RetrievalProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Returns at most `k` passages relevant to `query`.
    ///
    /// A `k` of zero short-circuits to an empty result.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let started_at = Instant::now();
        let result = self.inner.search(query, k).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(passages) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    k,
                    passages = passages.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Retrieved passages"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    k,
                    error = %error,
                    error_kind = error.kind_str(),
                    retryable = error.is_retryable(),
                    elapsed_ms = elapsed.as_millis(),
                    "Retrieval failed"
                );
            }
        }

        result.map(|mut passages| {
            passages.truncate(k);
            passages
        })
    }
}
