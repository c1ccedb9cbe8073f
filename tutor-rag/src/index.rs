//! In-memory vector index using exhaustive cosine similarity.
//!
//! [`VectorIndex`] keeps every [`EmbeddingRecord`] in a `Vec` behind a
//! `tokio::sync::RwLock`. Search is a linear scan, which is fine for corpora
//! of a few thousand chunks. A nearest-neighbor structure could replace the
//! scan without changing the `search` contract.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::document::{Chunk, EmbeddingRecord, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Default minimum similarity a result must exceed to be returned.
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.1;

#[derive(Debug)]
struct Entries {
    dimensions: usize,
    records: Vec<EmbeddingRecord>,
}

/// An in-memory vector index over embedded chunks.
///
/// The index starts unbuilt. [`build`](VectorIndex::build) embeds a full
/// corpus in one batch and replaces any previous contents. After that the
/// index is only read, so any number of concurrent searches may share it.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use tutor_rag::{HashingEmbedder, VectorIndex};
///
/// let index = VectorIndex::new(Arc::new(HashingEmbedder::default()));
/// index.build(chunks).await?;
/// let results = index.search("how do I plot a light curve", 3, 0.1).await?;
/// ```
pub struct VectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Option<Entries>>,
}

impl VectorIndex {
    /// Create an unbuilt index that embeds with `embedder`.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder, entries: RwLock::new(None) }
    }

    /// Return a reference to the embedding provider.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Embed `chunks` in a single batch and store them, replacing prior contents.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyCorpus`] if `chunks` is empty
    /// - [`RagError::EmbeddingError`] if the provider fails, returns the wrong
    ///   number of vectors, or returns vectors of inconsistent length or with
    ///   non-finite components
    /// - [`RagError::DimensionMismatch`] if the index was already built with a
    ///   different dimensionality
    ///
    /// On error the previous contents are kept.
    pub async fn build(&self, chunks: Vec<Chunk>) -> Result<()> {
        if chunks.is_empty() {
            error!("refusing to build vector index from an empty corpus");
            return Err(RagError::EmptyCorpus);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        debug!(provider = self.embedder.name(), batch_size = texts.len(), "embedding corpus");
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(provider = self.embedder.name(), error = %e, "corpus embedding failed");
            e
        })?;

        let dimensions = self.validate_batch(chunks.len(), &embeddings)?;
        let records: Vec<EmbeddingRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| EmbeddingRecord { chunk, embedding })
            .collect();
        let record_count = records.len();

        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.as_ref().filter(|e| e.dimensions != dimensions) {
            error!(
                expected = existing.dimensions,
                actual = dimensions,
                "rebuild dimensionality does not match index"
            );
            return Err(RagError::DimensionMismatch {
                expected: existing.dimensions,
                actual: dimensions,
            });
        }
        *entries = Some(Entries { dimensions, records });
        info!(record_count, dimensions, "vector index built");
        Ok(())
    }

    fn validate_batch(&self, expected: usize, embeddings: &[Vec<f32>]) -> Result<usize> {
        let fail = |message: String| {
            error!(provider = self.embedder.name(), %message, "invalid embedding batch");
            RagError::EmbeddingError { provider: self.embedder.name().to_string(), message }
        };

        if embeddings.len() != expected {
            return Err(fail(format!(
                "expected {expected} vectors, provider returned {}",
                embeddings.len()
            )));
        }
        let dimensions = embeddings.first().map_or(0, Vec::len);
        if dimensions == 0 {
            return Err(fail("provider returned zero-length vectors".to_string()));
        }
        if let Some(position) = embeddings.iter().position(|v| v.len() != dimensions) {
            return Err(fail(format!(
                "vector {position} has {} dimensions, expected {dimensions}",
                embeddings[position].len()
            )));
        }
        if let Some(position) = embeddings.iter().position(|v| !is_finite(v)) {
            return Err(fail(format!("vector {position} has non-finite components")));
        }
        Ok(dimensions)
    }

    /// Return the `top_k` chunks most similar to `query` that score above `min_similarity`.
    ///
    /// Results are ordered by descending score; equal scores keep insertion
    /// order. An empty `Vec` means nothing was relevant enough.
    ///
    /// # Errors
    ///
    /// - [`RagError::NotInitialized`] if the index was never built
    /// - [`RagError::ConfigError`] if `top_k` is zero
    /// - [`RagError::EmbeddingError`] if the query cannot be embedded or its
    ///   vector has non-finite components
    /// - [`RagError::DimensionMismatch`] if the query vector has the wrong length
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_similarity: f32,
    ) -> Result<Vec<SearchResult>> {
        if top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }

        if !self.is_built().await {
            return Err(RagError::NotInitialized);
        }

        // The lock is not held while the provider runs.
        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(provider = self.embedder.name(), error = %e, "query embedding failed");
            e
        })?;
        if !is_finite(&query_embedding) {
            error!(provider = self.embedder.name(), "query vector has non-finite components");
            return Err(RagError::EmbeddingError {
                provider: self.embedder.name().to_string(),
                message: "query vector has non-finite components".to_string(),
            });
        }

        let guard = self.entries.read().await;
        let entries = guard.as_ref().ok_or(RagError::NotInitialized)?;
        if query_embedding.len() != entries.dimensions {
            error!(
                expected = entries.dimensions,
                actual = query_embedding.len(),
                "query vector dimensionality does not match index"
            );
            return Err(RagError::DimensionMismatch {
                expected: entries.dimensions,
                actual: query_embedding.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = entries
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| (i, cosine_similarity(&record.embedding, &query_embedding)))
            .collect();

        // `sort_by` is stable, so ties stay in insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        let results: Vec<SearchResult> = scored
            .into_iter()
            .filter(|(_, score)| *score > min_similarity)
            .map(|(i, score)| SearchResult { chunk: entries.records[i].chunk.clone(), score })
            .collect();

        debug!(top_k, min_similarity, result_count = results.len(), "search completed");
        Ok(results)
    }

    /// Number of stored records, zero when unbuilt.
    pub async fn len(&self) -> usize {
        self.entries.read().await.as_ref().map_or(0, |e| e.records.len())
    }

    /// Whether the index holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether [`build`](VectorIndex::build) has completed successfully.
    pub async fn is_built(&self) -> bool {
        self.entries.read().await.is_some()
    }

    /// Dimensionality of the stored vectors, `None` when unbuilt.
    pub async fn dimensions(&self) -> Option<usize> {
        self.entries.read().await.as_ref().map(|e| e.dimensions)
    }
}

fn is_finite(vector: &[f32]) -> bool {
    vector.iter().all(|x| x.is_finite())
}

/// Compute cosine similarity between two vectors.
///
/// Accumulates in `f64` so large finite components cannot overflow.
/// Returns 0.0 if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    /// Returns a fixed vector per known text, zero vector otherwise.
    struct TableEmbedder {
        table: HashMap<&'static str, Vec<f32>>,
    }

    #[async_trait]
    impl EmbeddingProvider for TableEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| self.table.get(*t).cloned().unwrap_or_else(|| vec![0.0, 0.0]))
                .collect())
        }

        fn name(&self) -> &str {
            "Table"
        }
    }

    fn chunk(text: &str, ordinal: usize) -> Chunk {
        Chunk { text: text.to_string(), source_id: "doc".to_string(), ordinal }
    }

    fn index() -> VectorIndex {
        let table = HashMap::from([
            ("east", vec![1.0, 0.0]),
            ("north", vec![0.0, 1.0]),
            ("northeast", vec![1.0, 1.0]),
            ("west", vec![-1.0, 0.0]),
            ("also east", vec![2.0, 0.0]),
            ("wide", vec![1.0, 0.0, 0.0]),
            ("huge", vec![1e20, 0.0]),
            ("nan", vec![f32::NAN, 0.0]),
            ("infinite", vec![f32::INFINITY, 1.0]),
        ]);
        VectorIndex::new(Arc::new(TableEmbedder { table }))
    }

    #[test]
    fn cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1e20, 0.0], &[1e20, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn search_before_build_is_not_initialized() {
        let index = index();
        assert!(!index.is_built().await);
        assert!(matches!(index.search("east", 3, 0.1).await, Err(RagError::NotInitialized)));
    }

    #[tokio::test]
    async fn build_with_no_chunks_is_empty_corpus() {
        let index = index();
        assert_eq!(index.embedder().name(), "Table");
        assert!(matches!(index.build(Vec::new()).await, Err(RagError::EmptyCorpus)));
        assert!(!index.is_built().await);
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn large_components_still_score_an_exact_match_first() {
        let index = index();
        index.build(vec![chunk("north", 0), chunk("huge", 1), chunk("east", 2)]).await.unwrap();

        let results = index.search("huge", 1, 0.1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.text, "huge");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn non_finite_vectors_are_rejected() {
        let index = index();
        let err = index.build(vec![chunk("nan", 0), chunk("east", 1)]).await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingError { .. }));
        let err = index.build(vec![chunk("infinite", 0)]).await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingError { .. }));
        assert!(!index.is_built().await);

        index.build(vec![chunk("east", 0)]).await.unwrap();
        assert!(!index.is_empty().await);
        let err = index.search("nan", 1, 0.1).await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingError { .. }));
        assert_eq!(index.search("east", 1, 0.1).await.unwrap()[0].chunk.text, "east");
    }

    /// Parks the query `"slow"` until released.
    struct GatedEmbedder {
        started: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    #[async_trait]
    impl EmbeddingProvider for GatedEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            if texts == ["slow"] {
                self.started.notify_one();
                self.release.notified().await;
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn name(&self) -> &str {
            "Gated"
        }
    }

    #[tokio::test]
    async fn pending_query_embedding_does_not_block_build() {
        let embedder = Arc::new(GatedEmbedder {
            started: tokio::sync::Notify::new(),
            release: tokio::sync::Notify::new(),
        });
        let index = Arc::new(VectorIndex::new(embedder.clone()));
        index.build(vec![chunk("east", 0)]).await.unwrap();

        let searching = tokio::spawn({
            let index = Arc::clone(&index);
            async move { index.search("slow", 1, 0.1).await }
        });
        embedder.started.notified().await;

        let rebuilt = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            index.build(vec![chunk("north", 0), chunk("west", 1)]),
        )
        .await;
        assert!(rebuilt.is_ok(), "build waited on an in-flight query embedding");
        rebuilt.unwrap().unwrap();

        embedder.release.notify_one();
        let results = searching.await.unwrap().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(index.len().await, 2);
    }

    #[tokio::test]
    async fn rebuild_with_new_dimensionality_is_rejected() {
        let index = index();
        index.build(vec![chunk("east", 0)]).await.unwrap();

        let err = index.build(vec![chunk("wide", 0)]).await.unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3 }));
        assert_eq!(index.dimensions().await, Some(2));
        assert_eq!(index.len().await, 1);
    }

    #[tokio::test]
    async fn ranks_by_descending_similarity_and_applies_threshold() {
        let index = index();
        index
            .build(vec![
                chunk("north", 0),
                chunk("northeast", 1),
                chunk("east", 2),
                chunk("west", 3),
            ])
            .await
            .unwrap();
        assert_eq!(index.len().await, 4);
        assert_eq!(index.dimensions().await, Some(2));

        let results = index.search("east", 10, DEFAULT_MIN_SIMILARITY).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["east", "northeast"]);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn top_k_is_applied_before_threshold() {
        let index = index();
        index.build(vec![chunk("west", 0), chunk("north", 1), chunk("east", 2)]).await.unwrap();

        let results = index.search("east", 1, 0.5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(index.search("north", 3, 0.99).await.unwrap().len() == 1);
        assert!(index.search("west", 3, 1.0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let index = index();
        let chunks = vec![chunk("also east", 0), chunk("north", 1), chunk("east", 2)];
        index.build(chunks).await.unwrap();

        let results = index.search("east", 3, 0.1).await.unwrap();
        let ordinals: Vec<usize> = results.iter().map(|r| r.chunk.ordinal).collect();
        assert_eq!(ordinals, vec![0, 2]);
    }

    #[tokio::test]
    async fn zero_top_k_is_rejected() {
        let index = index();
        index.build(vec![chunk("east", 0)]).await.unwrap();
        assert!(matches!(index.search("east", 0, 0.1).await, Err(RagError::ConfigError(_))));
    }

    #[tokio::test]
    async fn query_dimension_mismatch_is_reported() {
        let index = index();
        index.build(vec![chunk("east", 0)]).await.unwrap();
        let err = index.search("wide", 1, 0.1).await.unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[tokio::test]
    async fn inconsistent_batch_keeps_previous_contents() {
        let index = index();
        index.build(vec![chunk("east", 0)]).await.unwrap();

        let err = index.build(vec![chunk("north", 0), chunk("wide", 1)]).await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingError { .. }));
        assert_eq!(index.len().await, 1);
        assert_eq!(index.search("east", 1, 0.1).await.unwrap()[0].chunk.text, "east");
    }

    #[tokio::test]
    async fn rebuild_replaces_contents() {
        let index = index();
        index.build(vec![chunk("east", 0), chunk("west", 1)]).await.unwrap();
        index.build(vec![chunk("north", 0)]).await.unwrap();

        assert_eq!(index.len().await, 1);
        assert!(index.search("east", 3, 0.1).await.unwrap().is_empty());
    }
}
