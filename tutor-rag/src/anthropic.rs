//! Answer generation through the Anthropic Messages API.
//!
//! This module is only available when the `anthropic` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};
use crate::tutor::{AnswerGenerator, GenerationRequest, render_prompt};

/// The Anthropic Messages API endpoint.
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// The API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The default model.
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

/// The default cap on generated tokens.
const DEFAULT_MAX_TOKENS: u32 = 300;

/// An [`AnswerGenerator`] that sends the tutoring prompt to Anthropic.
///
/// # Example
///
/// ```rust,ignore
/// use tutor_rag::anthropic::AnthropicGenerator;
///
/// let generator = AnthropicGenerator::from_env()?.with_max_tokens(500);
/// let tutor = Tutor::new(retriever).with_generator(Arc::new(generator));
/// ```
pub struct AnthropicGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicGenerator {
    /// Create a generator with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(generation_error("API key must not be empty".into()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Create a generator using the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            generation_error("ANTHROPIC_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

fn generation_error(message: String) -> RagError {
    RagError::GenerationError { generator: "Anthropic".into(), message }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn response_text(response: MessagesResponse) -> Option<String> {
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

#[async_trait]
impl AnswerGenerator for AnthropicGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let prompt = render_prompt(request);
        debug!(
            generator = "Anthropic",
            model = %self.model,
            prompt_len = prompt.len(),
            "generating answer"
        );

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message { role: "user", content: &prompt }],
        };

        let response = self
            .client
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(generator = "Anthropic", error = %e, "request failed");
                generation_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(generator = "Anthropic", %status, "API error");
            return Err(generation_error(format!("API returned {status}: {detail}")));
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| {
            error!(generator = "Anthropic", error = %e, "failed to parse response");
            generation_error(format!("failed to parse response: {e}"))
        })?;

        response_text(parsed).ok_or_else(|| generation_error("response contained no text".into()))
    }
}
