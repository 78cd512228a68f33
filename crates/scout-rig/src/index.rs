//! In-memory embedding index and the retriever adapter over it.

use rig::embeddings::{EmbeddingModel, EmbeddingsBuilder};
use rig::vector_store::VectorStoreIndex;
use rig::vector_store::in_memory_store::{InMemoryVectorIndex, InMemoryVectorStore};
use rig::vector_store::request::VectorSearchRequest;
use scout_core::retrieval::{Passage, RetrievalProvider};

use crate::corpus::ChunkDocument;
use crate::{Error, Result, TRACING_TARGET};

/// In-memory vector index over corpus chunks.
pub type ChunkIndex<M> = InMemoryVectorIndex<M, ChunkDocument>;

/// Embeds `chunks` with `model` and indexes them in memory.
#[tracing::instrument(skip_all, target = TRACING_TARGET, fields(chunks = chunks.len()))]
pub async fn build_index<M>(model: M, chunks: Vec<ChunkDocument>) -> Result<ChunkIndex<M>>
where
    M: EmbeddingModel + Clone + Sync,
{
    let embeddings = EmbeddingsBuilder::new(model.clone())
        .documents(chunks)
        .map_err(|e| Error::embedding(e.to_string()))?
        .build()
        .await
        .map_err(|e| Error::embedding(e.to_string()))?;

    tracing::info!(
        target: TRACING_TARGET,
        embedded = embeddings.len(),
        "Built in-memory index"
    );

    Ok(InMemoryVectorStore::from_documents(embeddings).index(model))
}

/// Retrieval provider over any rig vector index of [`ChunkDocument`]s.
#[derive(Clone)]
pub struct IndexRetriever<I> {
    index: I,
}

impl<I> IndexRetriever<I> {
    /// Wraps a vector index.
    pub fn new(index: I) -> Self {
        Self { index }
    }
}

impl<I> std::fmt::Debug for IndexRetriever<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexRetriever").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl<I> RetrievalProvider for IndexRetriever<I>
where
    I: VectorStoreIndex + Send + Sync,
{
    async fn search(&self, query: &str, k: usize) -> scout_core::Result<Vec<Passage>> {
        let request = VectorSearchRequest::builder()
            .query(query)
            .samples(k as u64)
            .build()
            .map_err(|e| Error::retrieval(e.to_string()))?;

        let hits = self
            .index
            .top_n::<ChunkDocument>(request)
            .await
            .map_err(|e| Error::retrieval(e.to_string()))?;

        Ok(hits
            .into_iter()
            .map(|(score, _id, chunk)| Passage::new(chunk.text, chunk.source).with_score(score))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use rig::embeddings::{Embedding, EmbeddingError};

    use super::*;

    const VOCABULARY: &[&str] = &["leave", "salary", "vpn"];

    /// Embeds text as keyword counts plus a constant bias component.
    #[derive(Clone)]
    struct KeywordEmbedder;

    impl EmbeddingModel for KeywordEmbedder {
        type Client = ();

        const MAX_DOCUMENTS: usize = 16;

        fn make(_client: &Self::Client, _model: impl Into<String>, _dims: Option<usize>) -> Self {
            Self
        }

        fn ndims(&self) -> usize {
            VOCABULARY.len() + 1
        }

        async fn embed_texts(
            &self,
            texts: impl IntoIterator<Item = String> + Send,
        ) -> std::result::Result<Vec<Embedding>, EmbeddingError> {
            Ok(texts
                .into_iter()
                .map(|text| {
                    let lower = text.to_lowercase();
                    let mut vec = vec![1.0];
                    vec.extend(VOCABULARY.iter().map(|w| lower.matches(w).count() as f64 * 4.0));
                    Embedding {
                        document: text,
                        vec,
                    }
                })
                .collect())
        }
    }

    fn chunk(text: &str, source: &str) -> ChunkDocument {
        ChunkDocument {
            text: text.to_owned(),
            source: source.to_owned(),
            chunk_index: 0,
        }
    }

    #[tokio::test]
    async fn retrieves_most_similar_chunks_first() {
        let index = build_index(
            KeywordEmbedder,
            vec![
                chunk("Salary reviews happen every April.", "pay.md"),
                chunk("Annual leave is 25 days; unused leave expires.", "leave.md"),
                chunk("Install the VPN client from the portal.", "it.md"),
            ],
        )
        .await
        .unwrap();

        let retriever = IndexRetriever::new(index);
        let passages = retriever.search("How much leave do I get?", 2).await.unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].source, "leave.md");
        assert!(passages[0].score >= passages[1].score);
    }
}
