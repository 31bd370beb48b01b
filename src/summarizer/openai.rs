//! OpenAI-compatible chat-completions client.
//!
//! One POST per summarization request. The response shape is the standard
//! `choices[0].message.content`; anything else (non-2xx, transport error,
//! empty content) is a [`SummaryError`] that the capability layer converts
//! into an absent summary.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default API base for the hosted service.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default summarization model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str =
    "You are a technical writer who creates concise PR summaries for release notes.";

/// Errors from a summarization attempt.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Transport failure or non-2xx response.
    #[error("summarization request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered 2xx but carried no usable content.
    #[error("summarization service returned an empty response")]
    EmptyResponse,
}

/// A chat-completions client for PR summaries.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Creates a client.
    ///
    /// `api_base` is the versioned root (e.g. `https://api.openai.com/v1`);
    /// a trailing slash is tolerated.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let api_base = api_base.into();
        Ok(OpenAiClient {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Generates a 1–2 line summary of a pull request.
    pub async fn summarize_pr(
        &self,
        title: &str,
        description: &str,
    ) -> Result<String, SummaryError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.7,
            max_tokens: 100,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(title, description),
                },
            ],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: ChatResponse = response.json().await?;
        extract_summary(body)
    }
}

fn build_prompt(title: &str, description: &str) -> String {
    format!(
        "Generate a 1-2 line summary of this pull request. \
         Focus on the main changes and impact.\n\n\
         Title: {}\n\
         Description: {}\n\n\
         Respond with ONLY the summary, no additional text or formatting.",
        title, description
    )
}

fn extract_summary(response: ChatResponse) -> Result<String, SummaryError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(SummaryError::EmptyResponse)
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
