//! HTTP server for the merge ledger.
//!
//! This module implements the HTTP server that:
//! - Accepts webhooks from GitHub and processes them synchronously
//! - Provides health checks for liveness probes
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

use crate::github::FileLister;
use crate::processor::Processor;
use crate::store::RecordStore;
use crate::summarizer::Summarizer;

/// The production processor wiring: capabilities built from configuration.
pub type LiveProcessor = Processor<FileLister, Summarizer, RecordStore>;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. The
/// processor holds no per-event state, so one instance serves all
/// concurrent deliveries.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// The event processor.
    processor: LiveProcessor,

    /// Webhook secret for HMAC-SHA256 signature verification; verification
    /// is skipped when absent.
    webhook_secret: Option<Vec<u8>>,
}

impl AppState {
    /// Creates a new `AppState`.
    pub fn new(processor: LiveProcessor, webhook_secret: Option<Vec<u8>>) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                processor,
                webhook_secret,
            }),
        }
    }

    /// Returns the event processor.
    pub fn processor(&self) -> &LiveProcessor {
        &self.inner.processor
    }

    /// Returns the webhook secret, if one is configured.
    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.inner.webhook_secret.as_deref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
