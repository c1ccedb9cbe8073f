//! Error types for the `tutor-rag` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
///
/// An empty search result is not an error: [`VectorIndex::search`](crate::VectorIndex::search)
/// returns `Ok(vec![])` when nothing clears the similarity threshold.
#[derive(Debug, Error)]
pub enum RagError {
    /// The document source produced no documents at all.
    #[error("Configuration error: no source documents found in {source_name}")]
    NoDocuments {
        /// Description of the source that was enumerated.
        source_name: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The index was asked to build from zero chunks.
    #[error("Empty corpus: no chunks available to index")]
    EmptyCorpus,

    /// A search was issued before the index was built.
    #[error("Vector index has not been built")]
    NotInitialized,

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A query vector did not match the dimensionality of the stored vectors.
    #[error("Dimension mismatch: index holds {expected}-dimensional vectors, query has {actual}")]
    DimensionMismatch {
        /// Dimensionality of the stored vectors.
        expected: usize,
        /// Dimensionality of the offending query vector.
        actual: usize,
    },

    /// The downstream answer generator failed.
    #[error("Generation error ({generator}): {message}")]
    GenerationError {
        /// The generator that produced the error.
        generator: String,
        /// A description of the failure.
        message: String,
    },

    /// An I/O error while reading source documents.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
