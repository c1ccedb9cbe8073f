//! # Lecture Search Example
//!
//! Chunks an in-memory lecture at its `## ` headings, embeds the sections
//! with `HashingEmbedder`, and prints the ranked sections for a few
//! questions. **Zero API keys.**
//!
//! Run: `cargo run -p tutor-demos --bin lecture_search`

use std::sync::Arc;

use tutor_rag::{Document, HashingEmbedder, RagConfig, Retriever};

const LECTURE: &str = r#"# Week 3: Scientific Python

This week introduces the numerical stack.

## NumPy Arrays

NumPy arrays hold homogeneous numbers in contiguous memory. Create them with
np.array, np.arange, or np.linspace, and prefer vectorized operations over
Python loops when processing large catalogs of stars.

## Plotting with matplotlib

Use matplotlib.pyplot to draw light curves and spectra. Call plt.plot with
time and flux arrays, label both axes with units, and save figures with
plt.savefig for your lab report.

## Reading FITS Files

Astronomical images and tables usually arrive as FITS files. Open them with
astropy.io.fits, inspect the header for exposure time and filter, and read
the data array from the primary HDU.

## Homework
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -- 1. Build the retriever --------------------------------------------
    let config = RagConfig::builder().top_k(2).similarity_threshold(0.05).build()?;
    let retriever = Retriever::builder()
        .config(config)
        .embedding_provider(Arc::new(HashingEmbedder::default()))
        .build()?;

    // -- 2. Ingest: the preamble and the empty "Homework" section are dropped
    let corpus = vec![Document::new("week3_scientific_python", LECTURE)];
    let report = retriever.initialize(&corpus).await?;
    println!(
        "Indexed {} chunks from {} document(s), {} dimensions\n",
        report.chunks, report.documents, report.dimensions
    );

    // -- 3. Query ------------------------------------------------------------
    let questions = ["How do I make NumPy arrays?", "plot a light curve", "open a FITS header"];
    for question in questions {
        println!("Question: \"{question}\"");
        let results = retriever.answer_query(question).await?;
        if results.is_empty() {
            println!("  (no relevant material found)");
        }
        for (rank, result) in results.iter().enumerate() {
            let heading = result.chunk.text.lines().next().unwrap_or_default();
            println!(
                "  {}. [score={:.4}] {} (chunk {})",
                rank + 1,
                result.score,
                heading,
                result.chunk.id()
            );
        }
        println!();
    }

    Ok(())
}
