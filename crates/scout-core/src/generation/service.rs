//! Generation service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::{GenerationProvider, Result, TRACING_TARGET};

/// Generation service wrapper with observability.
///
/// Wraps any [`GenerationProvider`] and logs every call. The provider is held
/// in an `Arc`, so the service is cheap to clone and share across queries.
#[derive(Clone)]
pub struct GenerationService {
    inner: Arc<dyn GenerationProvider>,
}

impl fmt::Debug for GenerationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationService")
            .field("provider", &self.inner.label())
            .finish_non_exhaustive()
    }
}

impl GenerationService {
    /// Creates a new generation service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: GenerationProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Creates a generation service from an already shared provider.
    pub fn from_arc(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { inner: provider }
    }

    /// Returns the provider label.
    pub fn label(&self) -> &str {
        self.inner.label()
    }

    /// Generates a completion for the given prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            provider = self.inner.label(),
            prompt_len = prompt.len(),
            "Generating completion"
        );

        let result = self.inner.generate(prompt).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(text) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    provider = self.inner.label(),
                    response_len = text.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Completion generated"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    provider = self.inner.label(),
                    error = %error,
                    error_kind = error.kind_str(),
                    retryable = error.is_retryable(),
                    elapsed_ms = elapsed.as_millis(),
                    "Completion failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedGenerator;

    #[tokio::test]
    async fn delegates_to_provider() {
        let generator = ScriptedGenerator::new(["hello"]);
        let service = GenerationService::new(generator.clone());

        let text = service.generate("say hello").await.unwrap();

        assert_eq!(text, "hello");
        assert_eq!(generator.prompts(), vec!["say hello".to_string()]);
    }

    #[tokio::test]
    async fn propagates_provider_errors() {
        let service = GenerationService::new(ScriptedGenerator::failing());
        assert!(service.generate("anything").await.is_err());
    }
}
