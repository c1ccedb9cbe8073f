//! Property tests for vector index search ordering and bounds.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;
use tutor_rag::{Chunk, EmbeddingProvider, HashingEmbedder, RagError, VectorIndex};

/// Embeds texts by looking them up in a fixed table.
struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for TableEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> tutor_rag::Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|t| {
                self.table.get(*t).cloned().ok_or_else(|| RagError::EmbeddingError {
                    provider: "Table".to_string(),
                    message: format!("unknown text '{t}'"),
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "Table"
    }
}

/// Generate a non-zero embedding of the given dimension.
fn arb_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter("non-zero embedding", |v| {
        v.iter().map(|x| x * x).sum::<f32>().sqrt() > 1e-4
    })
}

fn chunk(text: String, ordinal: usize) -> Chunk {
    Chunk { text, source_id: "doc".to_string(), ordinal }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().unwrap()
}

mod prop_search_ordering {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Results are sorted by descending score, bounded by `top_k` and the
        /// corpus size, and every score clears the threshold.
        #[test]
        fn results_ordered_bounded_and_above_threshold(
            embeddings in proptest::collection::vec(arb_embedding(DIM), 1..20),
            query in arb_embedding(DIM),
            top_k in 1usize..25,
            min_similarity in -1.0f32..1.0f32,
        ) {
            let mut table: HashMap<String, Vec<f32>> = embeddings
                .iter()
                .enumerate()
                .map(|(i, e)| (format!("chunk-{i}"), e.clone()))
                .collect();
            table.insert("query".to_string(), query);
            let chunks: Vec<Chunk> =
                (0..embeddings.len()).map(|i| chunk(format!("chunk-{i}"), i)).collect();
            let count = chunks.len();

            let results = runtime().block_on(async {
                let index = VectorIndex::new(Arc::new(TableEmbedder { table }));
                index.build(chunks).await.unwrap();
                index.search("query", top_k, min_similarity).await.unwrap()
            });

            prop_assert!(results.len() <= top_k);
            prop_assert!(results.len() <= count);
            for result in &results {
                prop_assert!(result.score > min_similarity);
                prop_assert!((-1.0..=1.0).contains(&result.score));
            }
            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }

        /// Querying with a stored chunk's exact text ranks that chunk first
        /// with a score of one.
        #[test]
        fn exact_text_query_ranks_its_chunk_first(
            words in proptest::collection::btree_set("[a-z]{4,10}", 2..12),
            pick in any::<prop::sample::Index>(),
        ) {
            let texts: Vec<String> =
                words.iter().map(|w| format!("lecture about {w} {w}")).collect();
            let target = texts[pick.index(texts.len())].clone();
            let chunks: Vec<Chunk> =
                texts.iter().enumerate().map(|(i, t)| chunk(t.clone(), i)).collect();

            let results = runtime().block_on(async {
                let index = VectorIndex::new(Arc::new(HashingEmbedder::default()));
                index.build(chunks).await.unwrap();
                index.search(&target, 3, 0.1).await.unwrap()
            });

            prop_assert!(!results.is_empty());
            prop_assert!((results[0].score - 1.0).abs() < 1e-5);
            prop_assert!(
                results
                    .iter()
                    .take_while(|r| (r.score - 1.0).abs() < 1e-5)
                    .any(|r| r.chunk.text == target),
                "queried chunk should be among the top-scoring results"
            );
        }
    }
}

#[tokio::test]
async fn small_corpus_never_pads_results() {
    let index = VectorIndex::new(Arc::new(HashingEmbedder::default()));
    index
        .build(vec![
            chunk("## Arrays\nNumPy arrays store numbers".to_string(), 1),
            chunk("## Plots\nmatplotlib draws numbers".to_string(), 2),
        ])
        .await
        .unwrap();

    let results = index.search("numbers", 5, -1.0).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_ne!(results[0].chunk.ordinal, results[1].chunk.ordinal);
}

#[tokio::test]
async fn uninitialized_and_no_match_are_distinguishable() {
    let index = VectorIndex::new(Arc::new(HashingEmbedder::default()));
    assert!(matches!(index.search("anything", 3, 0.1).await, Err(RagError::NotInitialized)));
    assert!(matches!(index.build(Vec::new()).await, Err(RagError::EmptyCorpus)));

    index.build(vec![chunk("## Telescopes\nmirrors and lenses".to_string(), 0)]).await.unwrap();
    let results = index.search("spectroscopy", 3, 0.1).await.unwrap();
    assert!(results.is_empty());
}
