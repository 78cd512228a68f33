//! Chunking of source documents.

use serde::{Deserialize, Serialize};
use text_splitter::{ChunkConfig, TextSplitter as TextSplitterImpl};

use super::SourceDocument;
use crate::{Error, Result, TRACING_TARGET};

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// A chunk of a source document, as stored in the vector index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDocument {
    /// The text content of the chunk.
    pub text: String,
    /// Label of the document the chunk came from.
    pub source: String,
    /// Position of the chunk within its document.
    pub chunk_index: u32,
}

impl rig::Embed for ChunkDocument {
    fn embed(
        &self,
        embedder: &mut rig::embeddings::TextEmbedder,
    ) -> std::result::Result<(), rig::embeddings::EmbedError> {
        embedder.embed(self.text.clone());
        Ok(())
    }
}

/// Text splitter for creating document chunks.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl TextSplitter {
    /// Creates a new text splitter.
    ///
    /// Fails if `chunk_size` is zero or `overlap` is not smaller than it.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk size must be positive"));
        }
        if overlap >= chunk_size {
            return Err(Error::config(format!(
                "chunk overlap ({overlap}) must be less than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Returns the maximum characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the overlap between chunks.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Splits one text into trimmed chunks.
    pub fn split<'a>(&self, text: &'a str) -> Result<Vec<&'a str>> {
        let config = ChunkConfig::new(self.chunk_size)
            .with_overlap(self.overlap)
            .map_err(|e| Error::config(e.to_string()))?
            .with_trim(true);

        Ok(TextSplitterImpl::new(config)
            .chunk_indices(text)
            .map(|(_, chunk)| chunk)
            .filter(|chunk| !chunk.is_empty())
            .collect())
    }

    /// Splits every document into chunk documents labelled with their source.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, fields(documents = documents.len()))]
    pub fn split_documents(&self, documents: &[SourceDocument]) -> Result<Vec<ChunkDocument>> {
        let mut chunks = Vec::new();
        for document in documents {
            for (index, text) in self.split(&document.text)?.into_iter().enumerate() {
                chunks.push(ChunkDocument {
                    text: text.to_owned(),
                    source: document.source.clone(),
                    chunk_index: index as u32,
                });
            }
        }

        tracing::debug!(target: TRACING_TARGET, chunks = chunks.len(), "Split corpus into chunks");
        Ok(chunks)
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_respect_size() {
        let splitter = TextSplitter::new(50, 10).unwrap();
        let text = "Annual leave is 25 days. Carry-over is capped at five days. \
                    Requests go through the HR portal two weeks ahead.";
        let chunks = splitter.split(text).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
            assert_eq!(chunk.trim(), *chunk);
        }
    }

    #[test]
    fn rejects_overlap_not_below_size() {
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(0, 0).is_err());
    }

    #[test]
    fn chunk_documents_carry_source_and_index() {
        let documents = vec![
            SourceDocument::new("leave.md", "Short policy."),
            SourceDocument::new("empty.md", "   "),
            SourceDocument::new("pay.md", "Salaries are paid monthly."),
        ];
        let chunks = TextSplitter::default().split_documents(&documents).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].source, "leave.md");
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[1].text, "Salaries are paid monthly.");
    }
}
