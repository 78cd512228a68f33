//! Passage retrieval collaborator.
//!
//! Retrieval is treated as an opaque semantic search: given a query and a
//! result budget it returns passages ordered by relevance. An empty result
//! is a valid answer, not an error.

mod service;

use serde::{Deserialize, Serialize};
pub use service::RetrievalService;

pub use crate::{Error, Result};

/// Tracing target for retrieval operations.
pub const TRACING_TARGET: &str = "scout_core::retrieval";

/// A passage returned by a retrieval provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Passage text.
    pub text: String,
    /// Human readable source label (file name, document title, ...).
    pub source: String,
    /// Similarity score, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Passage {
    /// Creates a new passage without a score.
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            score: None,
        }
    }

    /// Sets the similarity score.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Core trait for top-k passage retrieval.
#[async_trait::async_trait]
pub trait RetrievalProvider: Send + Sync {
    /// Returns at most `k` passages relevant to `query`, most relevant first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>>;
}

/// Joins passage texts into a prompt context block.
pub fn join_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
