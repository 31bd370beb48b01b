//! Health check endpoint for liveness probes.

use axum::http::StatusCode;

/// Health check handler.
///
/// Returns 200 OK with the text "OK" while the server is accepting
/// connections.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
