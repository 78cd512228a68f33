//! Corpus loading and chunking.
//!
//! A corpus is a single text file or a directory of `.txt` / `.md` files.
//! Documents are labelled with their file name so that passages retrieved
//! from them can be attributed.

mod splitter;

use std::path::Path;

pub use splitter::{
    ChunkDocument, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, TextSplitter,
};

use crate::{Error, Result, TRACING_TARGET};

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

/// A loaded document before chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Label used to attribute passages, usually the file name.
    pub source: String,
    /// Full document text.
    pub text: String,
}

impl SourceDocument {
    /// Creates a new source document.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// Loads a corpus from a file or a directory.
///
/// Directory entries are read in file name order; files with other
/// extensions and subdirectories are skipped.
#[tracing::instrument(skip_all, target = TRACING_TARGET, fields(path = %path.display()))]
pub async fn load_corpus(path: &Path) -> Result<Vec<SourceDocument>> {
    let metadata = tokio::fs::metadata(path).await?;

    let documents = if metadata.is_file() {
        vec![read_document(path).await?]
    } else {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();
            if entry.file_type().await?.is_file() && is_supported(&entry_path) {
                paths.push(entry_path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for entry_path in &paths {
            documents.push(read_document(entry_path).await?);
        }
        documents
    };

    if documents.is_empty() {
        return Err(Error::config(format!(
            "no .txt or .md documents found in {}",
            path.display()
        )));
    }

    tracing::info!(
        target: TRACING_TARGET,
        documents = documents.len(),
        "Loaded corpus"
    );

    Ok(documents)
}

async fn read_document(path: &Path) -> Result<SourceDocument> {
    let text = tokio::fs::read_to_string(path).await?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SourceDocument { source, text })
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}
