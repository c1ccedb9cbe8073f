//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::chunking::{DEFAULT_MIN_CHUNK_LENGTH, DEFAULT_SECTION_MARKER};
use crate::error::{RagError, Result};
use crate::index::DEFAULT_MIN_SIMILARITY;

/// Configuration parameters for chunking, retrieval, and answer assembly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Heading marker that opens a new section.
    pub section_marker: String,
    /// Sections must be strictly longer than this many characters to be kept.
    pub min_chunk_length: usize,
    /// Number of top results returned for a question.
    pub top_k: usize,
    /// Results must score strictly above this cosine similarity.
    pub similarity_threshold: f32,
    /// Maximum characters of each chunk passed to the answer generator.
    pub context_chars: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            section_marker: DEFAULT_SECTION_MARKER.to_string(),
            min_chunk_length: DEFAULT_MIN_CHUNK_LENGTH,
            top_k: 3,
            similarity_threshold: DEFAULT_MIN_SIMILARITY,
            context_chars: 400,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `section_marker` is empty
    /// - `top_k == 0`
    /// - `similarity_threshold` is outside `[-1, 1]`
    /// - `context_chars == 0`
    pub fn validate(&self) -> Result<()> {
        if self.section_marker.is_empty() {
            return Err(RagError::ConfigError("section_marker must not be empty".to_string()));
        }
        if self.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(RagError::ConfigError(format!(
                "similarity_threshold ({}) must be within [-1, 1]",
                self.similarity_threshold
            )));
        }
        if self.context_chars == 0 {
            return Err(RagError::ConfigError(
                "context_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the heading marker that opens a section.
    pub fn section_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.section_marker = marker.into();
        self
    }

    /// Set the minimum chunk length in characters.
    pub fn min_chunk_length(mut self, length: usize) -> Self {
        self.config.min_chunk_length = length;
        self
    }

    /// Set the number of top results to return per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity a result must exceed.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Set the per-chunk character budget for generated-answer context.
    pub fn context_chars(mut self, chars: usize) -> Self {
        self.config.context_chars = chars;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
