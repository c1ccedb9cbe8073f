//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations must be deterministic for a given model and must return
/// vectors of one fixed dimensionality for the lifetime of the process.
/// The default [`embed`](EmbeddingProvider::embed) implementation delegates
/// to [`embed_batch`](EmbeddingProvider::embed_batch) with a single input.
///
/// # Example
///
/// ```rust,ignore
/// use tutor_rag::{EmbeddingProvider, HashingEmbedder};
///
/// let provider = HashingEmbedder::new(256)?;
/// let vectors = provider.embed_batch(&["first", "second"]).await?;
/// assert_eq!(vectors.len(), 2);
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The output must have the same length and order as `texts`.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text]).await?;
        vectors.pop().ok_or_else(|| crate::error::RagError::EmbeddingError {
            provider: self.name().to_string(),
            message: "provider returned no vector for a single input".to_string(),
        })
    }

    /// Short provider name used in logs and error messages.
    fn name(&self) -> &str;
}
