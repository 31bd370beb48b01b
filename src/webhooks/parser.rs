//! GitHub webhook payload parser.
//!
//! Parses raw webhook JSON payloads into [`InboundEvent`] values.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. `pull_request` payloads are parsed into an [`InboundEvent`]
//! 3. Any other event type returns `Ok(None)` (ignored, not an error)
//! 4. Malformed JSON returns `Err` — a hard failure reported to the caller
//!
//! Missing fields inside an otherwise well-formed payload do NOT fail here:
//! the raw structures use `Option` liberally, and the validator decides
//! which absences matter.

use serde::Deserialize;
use thiserror::Error;

use super::events::InboundEvent;

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The payload body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses a webhook payload into an [`InboundEvent`].
///
/// # Arguments
///
/// * `event_type` - The value of the `X-GitHub-Event` header
/// * `payload` - The raw JSON payload bytes
///
/// # Returns
///
/// * `Ok(Some(event))` - A `pull_request` payload was parsed
/// * `Ok(None)` - Any other event type (ignored, not an error)
/// * `Err(e)` - The body was not valid JSON
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<InboundEvent>, ParseError> {
    match event_type {
        "pull_request" => parse_pull_request_payload(payload).map(Some),
        // ping, push, issue_comment, ... are not our concern
        _ => Ok(None),
    }
}

/// Parses a payload known to be a `pull_request` event (e.g., a saved file
/// in replay mode).
pub fn parse_pull_request_payload(payload: &[u8]) -> Result<InboundEvent, ParseError> {
    parse_pull_request(payload)
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's webhook JSON structure. Every field is Option so a
// sparse payload still parses; required-field enforcement happens in the
// validator, which can name the missing field.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: Option<String>,
    pull_request: Option<RawPullRequest>,
    repository: Option<RawRepository>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPullRequest {
    number: Option<u64>,
    title: Option<String>,
    body: Option<String>,
    merged: Option<bool>,
    created_at: Option<String>,
    html_url: Option<String>,
    user: Option<RawUser>,
    base: Option<RawRef>,
    head: Option<RawRef>,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    #[serde(rename = "ref")]
    ref_name: Option<String>,
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRepository {
    name: Option<String>,
    owner: Option<RawOwner>,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: Option<String>,
}

fn parse_pull_request(payload: &[u8]) -> Result<InboundEvent, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;
    let pr = raw.pull_request.unwrap_or_default();
    let repo = raw.repository.unwrap_or_default();

    Ok(InboundEvent {
        action: raw.action.unwrap_or_default(),
        merged: pr.merged.unwrap_or(false),
        base_branch: pr.base.and_then(|b| b.ref_name).unwrap_or_default(),
        pr_number: pr.number,
        title: pr.title,
        description: pr.body,
        creator: pr.user.and_then(|u| u.login),
        created_at: pr.created_at,
        html_url: pr.html_url,
        head_sha: pr.head.and_then(|h| h.sha),
        repo_owner: repo.owner.and_then(|o| o.login),
        repo_name: repo.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MERGE_PAYLOAD: &str = r#"{
        "action": "closed",
        "pull_request": {
            "number": 42,
            "title": "Add fact_sales model",
            "body": "Adds the sales mart.",
            "merged": true,
            "created_at": "2024-03-01T12:30:00Z",
            "html_url": "https://github.com/acme/warehouse/pull/42",
            "user": { "login": "octocat" },
            "base": { "ref": "main", "sha": "abcdef1234567890abcdef1234567890abcdef12" },
            "head": { "ref": "feature/fact-sales", "sha": "1234567890abcdef1234567890abcdef12345678" }
        },
        "repository": {
            "name": "warehouse",
            "owner": { "login": "acme" }
        }
    }"#;

    #[test]
    fn parse_merged_pull_request() {
        let event = parse_webhook("pull_request", MERGE_PAYLOAD.as_bytes())
            .unwrap()
            .expect("should parse");

        assert_eq!(event.action, "closed");
        assert!(event.merged);
        assert_eq!(event.base_branch, "main");
        assert_eq!(event.pr_number, Some(42));
        assert_eq!(event.title.as_deref(), Some("Add fact_sales model"));
        assert_eq!(event.description.as_deref(), Some("Adds the sales mart."));
        assert_eq!(event.creator.as_deref(), Some("octocat"));
        assert_eq!(event.created_at.as_deref(), Some("2024-03-01T12:30:00Z"));
        assert_eq!(
            event.html_url.as_deref(),
            Some("https://github.com/acme/warehouse/pull/42")
        );
        assert_eq!(
            event.head_sha.as_deref(),
            Some("1234567890abcdef1234567890abcdef12345678")
        );
        assert_eq!(event.repo_owner.as_deref(), Some("acme"));
        assert_eq!(event.repo_name.as_deref(), Some("warehouse"));
    }

    #[test]
    fn parse_opened_pull_request() {
        let payload = r#"{
            "action": "opened",
            "pull_request": {
                "number": 7,
                "title": "WIP",
                "user": { "login": "dev" },
                "base": { "ref": "main" }
            },
            "repository": { "name": "repo", "owner": { "login": "org" } }
        }"#;

        let event = parse_webhook("pull_request", payload.as_bytes())
            .unwrap()
            .expect("should parse");

        assert_eq!(event.action, "opened");
        // "merged" is absent for non-closed actions
        assert!(!event.merged);
        assert!(event.created_at.is_none());
    }

    #[test]
    fn sparse_payload_parses_with_defaults() {
        // A payload with nothing we need still parses; the validator decides
        // what is missing.
        let event = parse_webhook("pull_request", b"{}")
            .unwrap()
            .expect("should parse");

        assert_eq!(event.action, "");
        assert!(!event.merged);
        assert_eq!(event.base_branch, "");
        assert!(event.pr_number.is_none());
        assert!(event.repo_owner.is_none());
    }

    #[test]
    fn null_body_parses_as_none() {
        let payload = r#"{
            "action": "closed",
            "pull_request": {
                "number": 1,
                "body": null,
                "merged": true,
                "base": { "ref": "main" }
            },
            "repository": { "name": "r", "owner": { "login": "o" } }
        }"#;

        let event = parse_webhook("pull_request", payload.as_bytes())
            .unwrap()
            .expect("should parse");
        assert!(event.description.is_none());
    }

    #[test]
    fn other_event_types_return_none() {
        for event_type in ["ping", "push", "issue_comment", "check_suite", "star"] {
            assert!(
                parse_webhook(event_type, b"{}").unwrap().is_none(),
                "event type '{}' should be ignored",
                event_type
            );
        }
    }

    #[test]
    fn malformed_json_returns_error() {
        let result = parse_webhook("pull_request", b"not valid json");
        assert!(matches!(result, Err(ParseError::Json(_))));
    }

    #[test]
    fn malformed_json_on_ignored_event_type_is_not_parsed() {
        // Only pull_request payloads are deserialized at all.
        assert!(parse_webhook("push", b"not valid json").unwrap().is_none());
    }
}
