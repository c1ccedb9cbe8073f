//! Data types for documents, chunks, and search results.

use serde::{Deserialize, Serialize};

/// A source document: a stable name plus its raw text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Identifier of the document, usually the file name without extension.
    pub id: String,
    /// The raw text content of the document.
    pub text: String,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl Document {
    /// Create a document with no source URI.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), source_uri: None }
    }
}

/// A trimmed section of a [`Document`], the unit of retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The trimmed text content of the chunk.
    pub text: String,
    /// The ID of the parent [`Document`].
    pub source_id: String,
    /// Position of the section in the unfiltered split of its document.
    pub ordinal: usize,
}

impl Chunk {
    /// Traceability identifier in the form `{source_id}_{ordinal}`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.source_id, self.ordinal)
    }
}

/// A [`Chunk`] paired with its vector embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    /// The embedded chunk.
    pub chunk: Chunk,
    /// The chunk's vector, of the index's dimensionality.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] paired with its cosine similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score in `[-1, 1]` (higher is more relevant).
    pub score: f32,
}
