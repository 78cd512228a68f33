//! Configuration for model providers and corpus indexing.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::completion::{CompletionModel, CompletionProvider};
use crate::corpus::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, TextSplitter};
use crate::embedding::OpenAiEmbeddingModel;
use crate::{Error, Result};

/// Model providers, API keys and corpus locations.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
pub struct RigConfig {
    /// Completion model as `provider/model`.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SCOUT_COMPLETION_MODEL", default_value = "openai/gpt-4o-mini")
    )]
    pub completion_model: CompletionModel,

    /// API key of the completion provider.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SCOUT_COMPLETION_API_KEY", hide_env_values = true, default_value = "")
    )]
    pub completion_api_key: String,

    /// OpenAI embedding model used to index corpora.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SCOUT_EMBEDDING_MODEL", default_value = "text-embedding-3-small")
    )]
    pub embedding_model: OpenAiEmbeddingModel,

    /// OpenAI API key for embeddings. Defaults to the completion key.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SCOUT_EMBEDDING_API_KEY", hide_env_values = true)
    )]
    pub embedding_api_key: Option<String>,

    /// Maximum characters per chunk.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SCOUT_CHUNK_SIZE", default_value = "1000")
    )]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SCOUT_CHUNK_OVERLAP", default_value = "100")
    )]
    pub chunk_overlap: usize,

    /// File or directory with HR policy documents.
    #[cfg_attr(feature = "config", arg(long, env = "SCOUT_POLICY_CORPUS"))]
    pub policy_corpus: Option<PathBuf>,

    /// File or directory with general documents.
    #[cfg_attr(feature = "config", arg(long, env = "SCOUT_DOCUMENT_CORPUS"))]
    pub document_corpus: Option<PathBuf>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            completion_model: CompletionModel::default(),
            completion_api_key: String::new(),
            embedding_model: OpenAiEmbeddingModel::default(),
            embedding_api_key: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            policy_corpus: None,
            document_corpus: None,
        }
    }
}

impl std::fmt::Debug for RigConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigConfig")
            .field("completion_model", &self.completion_model.to_string())
            .field("embedding_model", &self.embedding_model)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("policy_corpus", &self.policy_corpus)
            .field("document_corpus", &self.document_corpus)
            .finish_non_exhaustive()
    }
}

impl RigConfig {
    /// Checks that the values describe a usable setup.
    pub fn validate(&self) -> Result<()> {
        if self.completion_api_key.trim().is_empty() {
            return Err(Error::config("completion API key is required"));
        }
        if self.has_corpus() && self.embedding_api_key().trim().is_empty() {
            return Err(Error::config("embedding API key is required to index a corpus"));
        }
        TextSplitter::new(self.chunk_size, self.chunk_overlap)?;
        Ok(())
    }

    /// Returns whether any corpus is configured.
    pub fn has_corpus(&self) -> bool {
        self.policy_corpus.is_some() || self.document_corpus.is_some()
    }

    /// Returns the key used for embeddings.
    pub fn embedding_api_key(&self) -> &str {
        self.embedding_api_key
            .as_deref()
            .unwrap_or(&self.completion_api_key)
    }

    /// Connects the configured completion provider.
    pub fn completion_provider(&self) -> Result<CompletionProvider> {
        CompletionProvider::new(&self.completion_model, &self.completion_api_key)
    }

    /// Returns the configured text splitter.
    pub fn splitter(&self) -> Result<TextSplitter> {
        TextSplitter::new(self.chunk_size, self.chunk_overlap)
    }
}
