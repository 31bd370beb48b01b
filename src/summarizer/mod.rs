//! Best-effort pull-request summarization.
//!
//! [`Summarizer`] is the capability injected into the processor: either a
//! working [`OpenAiClient`] or `Unavailable` (no credential at startup).
//! Every failure path — unavailable client, transport error, malformed or
//! empty response — yields `None`; processing never aborts for a missing
//! summary.

pub mod openai;

pub use openai::{DEFAULT_API_BASE, DEFAULT_MODEL, OpenAiClient, SummaryError};

use tracing::warn;

use crate::processor::{MergeEvent, Summarize};

/// Summarization capability, constructed once at startup.
#[derive(Debug)]
pub enum Summarizer {
    /// A working client.
    OpenAi(OpenAiClient),
    /// No client; summaries are skipped.
    Unavailable,
}

impl Summarizer {
    /// Builds the capability from an optional credential.
    pub fn from_credentials(api_key: Option<&str>, model: &str, api_base: &str) -> Self {
        match api_key {
            Some(api_key) => match OpenAiClient::new(api_key, model, api_base) {
                Ok(client) => Summarizer::OpenAi(client),
                Err(err) => {
                    warn!(error = %err, "failed to build summarization client; summaries disabled");
                    Summarizer::Unavailable
                }
            },
            None => Summarizer::Unavailable,
        }
    }
}

impl Summarize for Summarizer {
    async fn summarize(&self, event: &MergeEvent) -> Option<String> {
        match self {
            Summarizer::OpenAi(client) => {
                match client.summarize_pr(&event.title, &event.description).await {
                    Ok(summary) => Some(summary),
                    Err(err) => {
                        warn!(pr = %event.pr_number, error = %err, "summary generation failed");
                        None
                    }
                }
            }
            Summarizer::Unavailable => {
                warn!(pr = %event.pr_number, "summarization skipped: client unavailable");
                None
            }
        }
    }
}
