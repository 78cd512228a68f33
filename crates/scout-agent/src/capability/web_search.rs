//! External web search capability.

use scout_core::search::SearchService;

use super::{Capability, CapabilityName, TRACING_TARGET};

/// Answer returned when the web search yields nothing usable.
pub const NO_WEB_RESULTS: &str = "No relevant information was found on the web for this question.";

/// Capability delegating to an external search provider.
#[derive(Debug, Clone)]
pub struct WebSearchCapability {
    search: SearchService,
}

impl WebSearchCapability {
    /// Creates a new web search capability.
    pub fn new(search: SearchService) -> Self {
        Self { search }
    }
}

#[async_trait::async_trait]
impl Capability for WebSearchCapability {
    fn name(&self) -> CapabilityName {
        CapabilityName::WebSearch
    }

    async fn invoke(&self, query: &str) -> String {
        match self.search.search(query).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
            Ok(_) => NO_WEB_RESULTS.to_owned(),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Web search failed, answering with sentinel"
                );
                NO_WEB_RESULTS.to_owned()
            }
        }
    }
}
