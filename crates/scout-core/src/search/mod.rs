//! External web search collaborator.
//!
//! Best effort: providers return whatever textual summary of the results
//! they can produce, possibly an empty string.

mod service;

pub use service::SearchService;

pub use crate::{Error, Result};

/// Tracing target for web search operations.
pub const TRACING_TARGET: &str = "scout_core::search";

/// Core trait for external search providers.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Searches the web and returns the results rendered as text.
    async fn search(&self, query: &str) -> Result<String>;
}
