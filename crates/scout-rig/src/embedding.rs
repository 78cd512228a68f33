//! Embedding models used to index corpora.

use rig::prelude::EmbeddingsClient;
use rig::providers::openai;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// OpenAI embedding models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OpenAiEmbeddingModel {
    /// text-embedding-3-small (1536 dimensions)
    #[default]
    #[serde(rename = "text-embedding-3-small")]
    #[strum(serialize = "text-embedding-3-small")]
    TextEmbedding3Small,
    /// text-embedding-3-large (3072 dimensions)
    #[serde(rename = "text-embedding-3-large")]
    #[strum(serialize = "text-embedding-3-large")]
    TextEmbedding3Large,
    /// text-embedding-ada-002 (legacy, 1536 dimensions)
    #[serde(rename = "text-embedding-ada-002")]
    #[strum(serialize = "text-embedding-ada-002")]
    TextEmbeddingAda002,
}

impl OpenAiEmbeddingModel {
    /// Returns the vector width produced by the model.
    pub fn dimensions(&self) -> usize {
        match self {
            Self::TextEmbedding3Small => 1536,
            Self::TextEmbedding3Large => 3072,
            Self::TextEmbeddingAda002 => 1536,
        }
    }

    /// Creates the rig embedding model for this reference.
    pub fn connect(&self, api_key: &str) -> Result<openai::EmbeddingModel> {
        let client =
            openai::Client::new(api_key).map_err(|e| Error::provider("openai", e.to_string()))?;
        Ok(client.embedding_model_with_ndims(self.as_ref(), self.dimensions()))
    }
}
