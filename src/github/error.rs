//! GitHub API error types.
//!
//! This module defines error types that distinguish between transient and
//! permanent GitHub API failures:
//!
//! - **Transient** errors (5xx, rate limits, network failures) could succeed
//!   on a later attempt
//! - **Permanent** errors (most 4xx: auth, permission, not-found) require
//!   intervention
//!
//! The processor performs no retries either way — re-delivery is the webhook
//! provider's responsibility — but the categorization drives log detail and
//! the degradation report.

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Transient error — a retry could have helped.
    ///
    /// Examples:
    /// - HTTP 5xx (server errors)
    /// - HTTP 429 (rate limited)
    /// - HTTP 403 with rate limit messaging
    /// - Network timeouts
    Transient,

    /// Permanent error — retrying would fail the same way.
    ///
    /// Examples:
    /// - Authentication failures (401, 403 non-rate-limit)
    /// - PR not found (404)
    /// - Other 4xx
    Permanent,
}

impl GitHubErrorKind {
    /// Returns true if this error is retriable in principle.
    pub fn is_retriable(&self) -> bool {
        matches!(self, GitHubErrorKind::Transient)
    }
}

/// A GitHub API error with categorization.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The kind of error (transient or permanent).
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates a transient error without an octocrab source.
    pub fn transient_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a permanent error without an octocrab source.
    pub fn permanent_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error with an explicit status code (used by tests to
    /// simulate specific provider responses).
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let kind = if (500..600).contains(&status_code) || status_code == 429 {
            GitHubErrorKind::Transient
        } else {
            GitHubErrorKind::Permanent
        };
        Self {
            kind,
            status_code: Some(status_code),
            message: message.into(),
            source: None,
        }
    }

    /// Categorizes an octocrab error.
    ///
    /// The categorization is based on HTTP status codes where one can be
    /// extracted, falling back to message patterns for network-level errors.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = Self::extract_status_code(&err);
        let message = err.to_string();

        let kind = match status_code {
            Some(429) => GitHubErrorKind::Transient, // Rate limited
            Some(403) if is_rate_limit_error(&message) => GitHubErrorKind::Transient,
            Some(code) if (500..600).contains(&code) => GitHubErrorKind::Transient,
            Some(_) => GitHubErrorKind::Permanent, // Remaining 4xx
            None => {
                // No status code - check if it's a network error
                if is_network_error(&message) {
                    GitHubErrorKind::Transient
                } else {
                    GitHubErrorKind::Permanent
                }
            }
        };

        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }

    /// Extracts the HTTP status code from an octocrab error, if present.
    ///
    /// octocrab's `Error` type doesn't expose a stable status-code accessor
    /// across all variants, so this falls back to matching well-established
    /// patterns in the rendered message. Returning `None` is safe: the error
    /// is then categorized conservatively by message content.
    fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
        let err_str = err.to_string();

        // octocrab formats GitHub errors with "status: <code>" in the message
        if let Some(idx) = err_str.find("status: ") {
            let rest = &err_str[idx + 8..];
            if let Some(end) = rest.find(|c: char| !c.is_ascii_digit()) {
                if let Ok(code) = rest[..end].parse() {
                    return Some(code);
                }
            } else if let Ok(code) = rest.trim().parse() {
                return Some(code);
            }
        }

        // Common patterns when the status isn't structured
        if err_str.contains("404") && err_str.to_lowercase().contains("not found") {
            return Some(404);
        }
        for code in [401u16, 403, 422, 429, 500, 502, 503] {
            if err_str.contains(&code.to_string()) {
                return Some(code);
            }
        }

        None
    }
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

/// Checks if an error message indicates a network-level error.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
        || message_lower.contains("timed out")
}
