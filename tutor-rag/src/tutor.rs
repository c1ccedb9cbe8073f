//! Answer assembly on top of retrieval.
//!
//! The [`Tutor`] retrieves context for a question, truncates each chunk to a
//! bounded prefix, and hands the result to an optional [`AnswerGenerator`].
//! Outcomes are reported as an [`Answer`] so callers can match on "nothing
//! relevant" and "no generator configured" instead of catching errors.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::document::SearchResult;
use crate::error::Result;
use crate::retriever::Retriever;

/// The outcome of asking the tutor a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Answer {
    /// Generated prose grounded in retrieved course material.
    Found(String),
    /// No chunk cleared the similarity threshold.
    NoRelevantContent,
    /// Relevant material exists but no generator is configured.
    GenerationUnavailable,
}

/// A question plus the retrieved context handed to a generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The user's question, verbatim.
    pub question: String,
    /// Retrieved chunk prefixes in rank order, separated by blank lines.
    pub context: String,
}

/// A backend that turns a question and its context into prose.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer for `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Join the first `max_chars` characters of each result's text with blank lines.
pub fn build_context(results: &[SearchResult], max_chars: usize) -> String {
    results
        .iter()
        .map(|result| truncate_chars(&result.chunk.text, max_chars))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Render the tutoring prompt sent to a language model.
pub fn render_prompt(request: &GenerationRequest) -> String {
    format!(
        "Answer this student's question about the course based on the course materials:\n\n\
         Question: {}\n\n\
         Course Materials:\n{}\n\n\
         Provide a clear, helpful answer as a course tutor.",
        request.question, request.context
    )
}

/// Answers questions from retrieved course material.
///
/// # Example
///
/// ```rust,ignore
/// use tutor_rag::{Answer, Tutor};
///
/// let tutor = Tutor::new(retriever).with_generator(generator);
/// match tutor.ask("How do I create plots?").await? {
///     Answer::Found(text) => println!("{text}"),
///     Answer::NoRelevantContent => println!("nothing in the course covers that"),
///     Answer::GenerationUnavailable => println!("configure a generator"),
/// }
/// ```
pub struct Tutor {
    retriever: Arc<Retriever>,
    generator: Option<Arc<dyn AnswerGenerator>>,
}

impl Tutor {
    /// Create a tutor without a generator.
    pub fn new(retriever: Arc<Retriever>) -> Self {
        Self { retriever, generator: None }
    }

    /// Attach a generator.
    pub fn with_generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Return a reference to the retriever.
    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    /// Retrieve context for `question` and generate an answer.
    ///
    /// # Errors
    ///
    /// Retrieval errors (including [`RagError::NotInitialized`](crate::RagError::NotInitialized))
    /// and generator errors are returned as-is.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let results = self.retriever.answer_query(question).await?;
        if results.is_empty() {
            info!("no relevant content for question");
            return Ok(Answer::NoRelevantContent);
        }

        let Some(generator) = &self.generator else {
            info!(result_count = results.len(), "generation unavailable");
            return Ok(Answer::GenerationUnavailable);
        };

        let request = GenerationRequest {
            question: question.to_string(),
            context: build_context(&results, self.retriever.config().context_chars),
        };
        let text = generator.generate(&request).await.map_err(|e| {
            error!(error = %e, "answer generation failed");
            e
        })?;
        Ok(Answer::Found(text))
    }
}
