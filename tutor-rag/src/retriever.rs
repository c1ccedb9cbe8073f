//! Retrieval orchestrator.
//!
//! The [`Retriever`] ties a [`DocumentSource`], a [`Chunker`], and a
//! [`VectorIndex`] together. Ingestion collects every chunk of the corpus
//! first and embeds them in one batch; queries go straight to the index.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tutor_rag::{DirectorySource, HashingEmbedder, RagConfig, Retriever};
//!
//! let retriever = Arc::new(
//!     Retriever::builder()
//!         .config(RagConfig::default())
//!         .embedding_provider(Arc::new(HashingEmbedder::default()))
//!         .build()?,
//! );
//!
//! retriever.initialize(&DirectorySource::new("Lecture")).await?;
//! let results = retriever.answer_query("What is NumPy used for?").await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{Chunker, SectionChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::source::DocumentSource;

/// Summary of a completed [`Retriever::initialize`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of documents read from the source.
    pub documents: usize,
    /// Number of chunks embedded into the index.
    pub chunks: usize,
    /// Dimensionality of the stored embeddings.
    pub dimensions: usize,
}

/// The retrieval pipeline.
///
/// Construct one via [`Retriever::builder()`], initialize it once, then share
/// it (typically as `Arc<Retriever>`) with every query handler.
pub struct Retriever {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    index: VectorIndex,
}

impl Retriever {
    /// Create a new [`RetrieverBuilder`].
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::default()
    }

    /// Return a reference to the configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the underlying index.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Ingest a whole corpus: enumerate → chunk → embed once → build.
    ///
    /// Chunks keep their per-document ordinals but are flattened into a
    /// single sequence in document order before embedding.
    ///
    /// # Errors
    ///
    /// - [`RagError::NoDocuments`] if the source yields no documents
    /// - [`RagError::EmptyCorpus`] if every document was filtered away
    /// - any error from the source or the embedding provider
    pub async fn initialize(&self, source: &dyn DocumentSource) -> Result<IngestReport> {
        let documents = source.documents().await?;
        if documents.is_empty() {
            error!(source = %source.describe(), "no source documents found");
            return Err(RagError::NoDocuments { source_name: source.describe() });
        }
        info!(source = %source.describe(), document_count = documents.len(), "found documents");

        let mut chunks: Vec<Chunk> = Vec::new();
        for document in &documents {
            let document_chunks = self.chunker.chunk(document);
            info!(
                document.id = %document.id,
                chunk_count = document_chunks.len(),
                "chunked document"
            );
            chunks.extend(document_chunks);
        }

        let chunk_count = chunks.len();
        self.index.build(chunks).await?;
        let dimensions = self.index.dimensions().await.unwrap_or_default();

        info!(document_count = documents.len(), chunk_count, dimensions, "retriever initialized");
        Ok(IngestReport { documents: documents.len(), chunks: chunk_count, dimensions })
    }

    /// Retrieve context for a question with the configured `top_k` and threshold.
    ///
    /// An empty `Vec` means no chunk was relevant enough. Every call
    /// re-embeds the question; nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotInitialized`] before [`initialize`](Self::initialize)
    /// has succeeded, or any embedding error.
    pub async fn answer_query(&self, question: &str) -> Result<Vec<SearchResult>> {
        self.search(question, self.config.top_k).await
    }

    /// Retrieve up to `top_k` chunks using the configured similarity threshold.
    ///
    /// # Errors
    ///
    /// See [`VectorIndex::search`].
    pub async fn search(&self, question: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let results =
            self.index.search(question, top_k, self.config.similarity_threshold).await?;
        info!(top_k, result_count = results.len(), "query completed");
        Ok(results)
    }
}

/// Builder for constructing a [`Retriever`].
///
/// `embedding_provider` is required. `config` defaults to
/// [`RagConfig::default()`], and `chunker` defaults to a [`SectionChunker`]
/// built from the config.
#[derive(Default)]
pub struct RetrieverBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RetrieverBuilder {
    /// Set the configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Replace the default section chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`Retriever`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the embedding provider is missing
    /// or the configuration is invalid.
    pub fn build(self) -> Result<Retriever> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(SectionChunker::new(config.section_marker.clone(), config.min_chunk_length))
        });

        Ok(Retriever { config, chunker, index: VectorIndex::new(embedding_provider) })
    }
}
