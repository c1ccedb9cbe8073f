//! # Tutor Console Example
//!
//! Loads every `*.md` lecture in a directory, then answers questions typed
//! on stdin. Without the `anthropic` feature (or without
//! `ANTHROPIC_API_KEY`) it prints the retrieved sections instead of a
//! generated answer.
//!
//! Run: `cargo run -p tutor-demos --bin tutor_console -- ./Lecture`
//! With generation: `cargo run -p tutor-demos --bin tutor_console --features anthropic -- ./Lecture`
//!
//! Set `RUST_LOG=tutor_rag=debug` to see ingestion and search logs.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tutor_rag::{
    Answer, DirectorySource, HashingEmbedder, RagConfig, Retriever, Tutor, build_context,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tutor_rag=info")),
        )
        .init();

    let directory = std::env::args().nth(1).unwrap_or_else(|| "Lecture".to_string());
    let config = RagConfig::default();
    let context_chars = config.context_chars;

    // The composition root owns the retriever and hands out clones of the Arc.
    let retriever = Arc::new(
        Retriever::builder()
            .config(config)
            .embedding_provider(Arc::new(HashingEmbedder::default()))
            .build()?,
    );
    let report = retriever.initialize(&DirectorySource::new(&directory)).await?;
    println!(
        "Tutor ready: {} lectures, {} chunks. Ask a question (Ctrl-D to quit).",
        report.documents, report.chunks
    );

    let tutor = attach_generator(Tutor::new(Arc::clone(&retriever)));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        match tutor.ask(question).await {
            Ok(Answer::Found(text)) => println!("\n{text}\n"),
            Ok(Answer::NoRelevantContent) => println!(
                "\nSorry, I couldn't find relevant information for your question \
                 in the course materials.\n"
            ),
            Ok(Answer::GenerationUnavailable) => {
                let results = retriever.answer_query(question).await?;
                println!("\nAI responses not available. Relevant course material:\n");
                println!("{}\n", build_context(&results, context_chars));
            }
            Err(e) => warn!(error = %e, "question failed"),
        }
    }

    Ok(())
}

#[cfg(feature = "anthropic")]
fn attach_generator(tutor: Tutor) -> Tutor {
    match tutor_rag::anthropic::AnthropicGenerator::from_env() {
        Ok(generator) => tutor.with_generator(Arc::new(generator)),
        Err(e) => {
            warn!(error = %e, "answer generation disabled");
            tutor
        }
    }
}

#[cfg(not(feature = "anthropic"))]
fn attach_generator(tutor: Tutor) -> Tutor {
    tutor
}
