//! Typed representation of inbound GitHub webhook payloads.
//!
//! [`InboundEvent`] is a deliberately loose snapshot of a `pull_request`
//! webhook payload. Fields the processor requires stay `Option` here so that
//! a missing field surfaces as a validation error naming the field, not as a
//! deserialization failure. The validator promotes an `InboundEvent` to a
//! strongly-typed `MergeEvent` once the event qualifies.

use serde::{Deserialize, Serialize};

/// A `pull_request` webhook event as delivered by GitHub.
///
/// Ephemeral: consumed by the validator and discarded after processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// The action string (`opened`, `closed`, `reopened`, ...).
    pub action: String,

    /// Whether the PR was merged. Only meaningful for `closed` actions.
    pub merged: bool,

    /// The base (target) branch name. Empty when the payload carried none.
    pub base_branch: String,

    /// The PR number.
    pub pr_number: Option<u64>,

    /// The PR title.
    pub title: Option<String>,

    /// The PR body text.
    pub description: Option<String>,

    /// Login of the PR author.
    pub creator: Option<String>,

    /// PR creation timestamp as delivered (RFC 3339, any offset).
    pub created_at: Option<String>,

    /// Web URL of the PR.
    pub html_url: Option<String>,

    /// Head commit SHA of the PR branch.
    pub head_sha: Option<String>,

    /// Repository owner login.
    pub repo_owner: Option<String>,

    /// Repository name.
    pub repo_name: Option<String>,
}
