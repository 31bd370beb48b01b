//! Webhook endpoint handler.
//!
//! Accepts GitHub webhook deliveries and runs them through the processor in
//! the same request: a single synchronous attempt per delivery, no queueing
//! and no retry. Re-delivery of failed events is GitHub's responsibility.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::AppState;
use crate::processor::{MalformedEventError, Outcome};
use crate::types::DeliveryId;
use crate::webhooks::{ParseError, parse_webhook, verify_signature};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors reported to the webhook caller.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Invalid signature (only when a secret is configured).
    #[error("invalid signature")]
    InvalidSignature,

    /// The body was not valid JSON.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),

    /// A qualifying merge event was missing a required field.
    #[error(transparent)]
    MalformedEvent(#[from] MalformedEventError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::MalformedEvent(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        (status, self.to_string()).into_response()
    }
}

/// Response body for accepted deliveries.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Human-readable outcome description.
    pub message: &'static str,

    /// Reason code when the event was ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,

    /// PR number when the event was processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,

    /// Number of tracked model changes recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_changes: Option<usize>,

    /// True when an enrichment or write was skipped or failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<bool>,
}

impl WebhookResponse {
    fn ignored(reason: Option<&'static str>) -> Self {
        WebhookResponse {
            message: "webhook received but not processed",
            reason,
            pr_number: None,
            model_changes: None,
            degraded: None,
        }
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Headers:
///   - `X-GitHub-Event`: Event type (required)
///   - `X-GitHub-Delivery`: Delivery ID (logged when present)
///   - `X-Hub-Signature-256`: HMAC-SHA256 signature (required only when a
///     webhook secret is configured)
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK: processed or ignored; the JSON body carries the outcome
/// - 400 Bad Request: missing header or malformed JSON
/// - 401 Unauthorized: invalid signature
/// - 422 Unprocessable Entity: qualifying merge with a missing required field
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookError> {
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = headers
        .get(HEADER_DELIVERY)
        .and_then(|v| v.to_str().ok())
        .map(DeliveryId::new);

    debug!(
        event_type = %event_type,
        delivery_id = ?delivery_id,
        "received webhook"
    );

    // Verify the signature BEFORE any parsing; requests that fail here never
    // reach the processor.
    if let Some(secret) = app_state.webhook_secret() {
        let signature_header = get_header(&headers, HEADER_SIGNATURE)?;
        if !verify_signature(&body, &signature_header, secret) {
            warn!(delivery_id = ?delivery_id, "invalid webhook signature");
            return Err(WebhookError::InvalidSignature);
        }
    }

    let event = match parse_webhook(&event_type, &body)? {
        Some(event) => event,
        None => {
            debug!(event_type = %event_type, "unsupported event type");
            return Ok(Json(WebhookResponse::ignored(None)));
        }
    };

    match app_state.processor().process(&event, &body).await? {
        Outcome::Ignored(reason) => Ok(Json(WebhookResponse::ignored(Some(reason.as_code())))),
        Outcome::Processed(report) => Ok(Json(WebhookResponse {
            message: "webhook processed",
            reason: None,
            pr_number: Some(report.merge.pr_number.0),
            model_changes: Some(report.model_changes.len()),
            degraded: Some(report.is_degraded()),
        })),
    }
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_header_present() {
        let mut headers = HeaderMap::new();
        headers.insert("x-github-event", "pull_request".parse().unwrap());

        let result = get_header(&headers, "x-github-event").unwrap();
        assert_eq!(result, "pull_request");
    }

    #[test]
    fn get_header_missing() {
        let headers = HeaderMap::new();

        let result = get_header(&headers, "x-github-event");
        assert!(matches!(result, Err(WebhookError::MissingHeader(_))));
    }

    #[test]
    fn ignored_response_omits_processing_fields() {
        let value =
            serde_json::to_value(WebhookResponse::ignored(Some("non-trunk-branch"))).unwrap();
        assert_eq!(value["reason"], "non-trunk-branch");
        assert!(value.get("pr_number").is_none());
        assert!(value.get("model_changes").is_none());
    }
}
