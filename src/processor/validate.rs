//! Trunk-merge validation.
//!
//! The validator classifies an [`InboundEvent`] as an actionable merge or an
//! ignorable event, and promotes actionable events to the strongly-typed
//! [`MergeEvent`]. Rules are evaluated in order:
//!
//! 1. The PR must have been closed **and** merged
//! 2. The base branch must be a trunk branch (`main` or `master`)
//! 3. Required fields must be present and non-empty
//!
//! Pure function of the payload; no side effects.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::types::{PrNumber, RepoId};
use crate::webhooks::InboundEvent;

/// Branch names treated as trunk. Comparison is case-sensitive.
pub const TRUNK_BRANCHES: [&str; 2] = ["main", "master"];

/// A required field was absent or carried an unusable value.
///
/// Fatal for the event: the caller reports it as a client-side error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEventError {
    /// A required field was missing or empty.
    #[error("malformed event: missing required field `{field}`")]
    MissingField { field: &'static str },

    /// A required field was present but unparseable.
    #[error("malformed event: invalid value for `{field}`: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Why an event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IgnoreReason {
    /// The event does not represent a merged-and-closed pull request.
    NotAMerge,
    /// The PR merged into a branch other than `main`/`master`.
    NonTrunkBranch,
}

impl IgnoreReason {
    /// Stable reason code reported through the invocation boundary.
    pub fn as_code(&self) -> &'static str {
        match self {
            IgnoreReason::NotAMerge => "not-a-merge",
            IgnoreReason::NonTrunkBranch => "non-trunk-branch",
        }
    }
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

/// The validator's verdict on an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The event is an actionable trunk merge.
    Proceed(MergeEvent),
    /// The event is not actionable.
    Ignore(IgnoreReason),
}

/// A validated pull-request merge.
///
/// All fields the downstream stages rely on are present and typed; the
/// creation timestamp is normalized to UTC regardless of the offset the
/// payload carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeEvent {
    /// The repository the PR merged into.
    pub repo: RepoId,

    /// The PR number.
    pub pr_number: PrNumber,

    /// The PR title (empty when the payload carried none).
    pub title: String,

    /// The PR body text (empty when the payload carried none).
    pub description: String,

    /// Login of the PR author.
    pub creator: String,

    /// PR creation time in UTC.
    pub created_at: DateTime<Utc>,

    /// Web URL of the PR (empty when the payload carried none).
    pub html_url: String,
}

/// Validates an inbound event.
///
/// Returns `Ok(Decision::Ignore(_))` for events that are not trunk merges,
/// `Ok(Decision::Proceed(_))` for qualifying merges, and `Err` when a
/// qualifying merge is missing a required field.
pub fn validate(event: &InboundEvent) -> Result<Decision, MalformedEventError> {
    // Rule 1: the PR must have been closed and merged. GitHub delivers
    // `closed` for both merged and abandoned PRs; the merge flag decides.
    if event.action != "closed" || !event.merged {
        return Ok(Decision::Ignore(IgnoreReason::NotAMerge));
    }

    // Rule 2: trunk branch only, case-sensitive.
    if !TRUNK_BRANCHES.contains(&event.base_branch.as_str()) {
        return Ok(Decision::Ignore(IgnoreReason::NonTrunkBranch));
    }

    // Rule 3: required fields.
    let pr_number = event
        .pr_number
        .ok_or(MalformedEventError::MissingField {
            field: "pull_request.number",
        })?;
    let repo_owner = required(&event.repo_owner, "repository.owner.login")?;
    let repo_name = required(&event.repo_name, "repository.name")?;
    let creator = required(&event.creator, "pull_request.user.login")?;
    let created_at_raw = required(&event.created_at, "pull_request.created_at")?;

    let created_at = DateTime::parse_from_rfc3339(created_at_raw)
        .map_err(|_| MalformedEventError::InvalidField {
            field: "pull_request.created_at",
            value: created_at_raw.to_string(),
        })?
        .with_timezone(&Utc);

    Ok(Decision::Proceed(MergeEvent {
        repo: RepoId::new(repo_owner, repo_name),
        pr_number: PrNumber(pr_number),
        title: event.title.clone().unwrap_or_default(),
        description: event.description.clone().unwrap_or_default(),
        creator: creator.to_string(),
        created_at,
        html_url: event.html_url.clone().unwrap_or_default(),
    }))
}

fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, MalformedEventError> {
    match value.as_deref() {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(MalformedEventError::MissingField { field }),
    }
}
