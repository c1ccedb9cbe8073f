//! # tutor-rag
//!
//! Retrieval for course-material tutors: markdown lectures are split at
//! level-2 headings, embedded in one batch, and searched by cosine
//! similarity in memory.
//!
//! ## Overview
//!
//! - [`SectionChunker`] splits documents into heading-scoped [`Chunk`]s
//! - [`EmbeddingProvider`] is the seam to the embedding model
//! - [`VectorIndex`] stores embedded chunks and answers top-k queries
//! - [`Retriever`] runs ingestion and exposes [`Retriever::answer_query`]
//! - [`Tutor`] assembles bounded context and reports an [`Answer`]
//!
//! ## Features
//!
//! - `openai` — [`openai::OpenAIEmbeddingProvider`]
//! - `anthropic` — [`anthropic::AnthropicGenerator`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tutor_rag::{Answer, DirectorySource, HashingEmbedder, Retriever, Tutor};
//!
//! let retriever = Arc::new(
//!     Retriever::builder().embedding_provider(Arc::new(HashingEmbedder::default())).build()?,
//! );
//! retriever.initialize(&DirectorySource::new("Lecture")).await?;
//!
//! let tutor = Tutor::new(retriever);
//! let answer = tutor.ask("What is NumPy used for?").await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod hashing;
pub mod index;
pub mod retriever;
pub mod source;
pub mod tutor;

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{Chunker, Section, SectionChunker, split_sections};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, EmbeddingRecord, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use hashing::HashingEmbedder;
pub use index::{DEFAULT_MIN_SIMILARITY, VectorIndex, cosine_similarity};
pub use retriever::{IngestReport, Retriever, RetrieverBuilder};
pub use source::{DirectorySource, DocumentSource};
pub use tutor::{Answer, AnswerGenerator, GenerationRequest, Tutor, build_context, render_prompt};
