//! Persisted record shapes and transient changed-file data.
//!
//! `MergeRecord` and `ModelChangeRecord` serialize directly into the insert
//! bodies for their respective tables, so field names here are column names.
//! Nullable columns are `Option` fields without `skip_serializing_if`: a
//! missing summary must reach the store as an explicit `null`, not an
//! omitted key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PrNumber;

/// One row per pull request merged to trunk (`github_pr_merge` table).
///
/// Exactly one record exists per (repo, pr_number) pair; the writer upserts
/// on that key so webhook re-delivery does not duplicate rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRecord {
    /// The PR number, unique within the repository.
    pub pr_number: PrNumber,

    /// The PR title (empty string when the payload carried none).
    pub title: String,

    /// Login of the PR author.
    pub creator: String,

    /// PR creation time, normalized to UTC.
    pub created_at: DateTime<Utc>,

    /// Web URL of the PR.
    pub html_url: String,

    /// Repository owner login.
    pub repo_owner: String,

    /// Repository name.
    pub repo_name: String,

    /// AI-generated summary; null when summarization was unavailable or failed.
    pub summary: Option<String>,

    /// Legacy field: path of the archived payload file, when archiving is on.
    pub file_path: Option<String>,
}

/// One row per (merged PR, tracked changed file) pair (`dbt_model_changes` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelChangeRecord {
    /// Path of the tracked model file within the repository.
    pub dbt_model_name: String,

    /// Web URL of the PR that changed the model.
    pub pr_html_url: String,

    /// AI-generated summary; null when summarization was unavailable or failed.
    pub ai_summary: Option<String>,

    /// Creation time of the PR, normalized to UTC.
    pub pr_created_at: DateTime<Utc>,

    /// Login of the PR author.
    pub pr_creator: String,
}

/// How a file was changed by a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    /// File was added.
    Added,
    /// File content was modified.
    Modified,
    /// File was removed.
    Removed,
    /// File was renamed.
    Renamed,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Modified => "modified",
            ChangeStatus::Removed => "removed",
            ChangeStatus::Renamed => "renamed",
        };
        write!(f, "{}", s)
    }
}

/// A file changed by a pull request.
///
/// Transient: produced by the file lister, consumed by the model filter,
/// never persisted directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Repository-relative path of the file.
    pub path: String,

    /// The kind of change.
    pub status: ChangeStatus,
}

impl ChangedFile {
    pub fn new(path: impl Into<String>, status: ChangeStatus) -> Self {
        ChangedFile {
            path: path.into(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_merge_record(summary: Option<String>) -> MergeRecord {
        MergeRecord {
            pr_number: PrNumber(42),
            title: "Add fact_sales model".to_string(),
            creator: "octocat".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            html_url: "https://github.com/acme/warehouse/pull/42".to_string(),
            repo_owner: "acme".to_string(),
            repo_name: "warehouse".to_string(),
            summary,
            file_path: None,
        }
    }

    #[test]
    fn merge_record_uses_column_names() {
        let value = serde_json::to_value(sample_merge_record(None)).unwrap();
        let obj = value.as_object().unwrap();

        for key in [
            "pr_number",
            "title",
            "creator",
            "created_at",
            "html_url",
            "repo_owner",
            "repo_name",
            "summary",
            "file_path",
        ] {
            assert!(obj.contains_key(key), "missing column {}", key);
        }
    }

    #[test]
    fn merge_record_null_fields_are_explicit() {
        // Absent enrichments must serialize as null, not be omitted.
        let value = serde_json::to_value(sample_merge_record(None)).unwrap();
        assert!(value["summary"].is_null());
        assert!(value["file_path"].is_null());
    }

    #[test]
    fn merge_record_serializes_summary_when_present() {
        let value =
            serde_json::to_value(sample_merge_record(Some("Adds the sales mart.".into()))).unwrap();
        assert_eq!(value["summary"], "Adds the sales mart.");
    }

    #[test]
    fn merge_record_created_at_is_utc() {
        let value = serde_json::to_value(sample_merge_record(None)).unwrap();
        let ts = value["created_at"].as_str().unwrap();
        assert!(
            ts.ends_with('Z') || ts.ends_with("+00:00"),
            "timestamp not UTC: {}",
            ts
        );
    }

    #[test]
    fn model_change_record_uses_column_names() {
        let record = ModelChangeRecord {
            dbt_model_name: "models/marts/fact_sales.sql".to_string(),
            pr_html_url: "https://github.com/acme/warehouse/pull/42".to_string(),
            ai_summary: None,
            pr_created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            pr_creator: "octocat".to_string(),
        };
        let value = serde_json::to_value(record).unwrap();
        let obj = value.as_object().unwrap();

        for key in [
            "dbt_model_name",
            "pr_html_url",
            "ai_summary",
            "pr_created_at",
            "pr_creator",
        ] {
            assert!(obj.contains_key(key), "missing column {}", key);
        }
        assert!(value["ai_summary"].is_null());
    }

    #[test]
    fn change_status_json_format() {
        assert_eq!(
            serde_json::to_string(&ChangeStatus::Added).unwrap(),
            "\"added\""
        );
        assert_eq!(
            serde_json::to_string(&ChangeStatus::Removed).unwrap(),
            "\"removed\""
        );
        assert_eq!(
            serde_json::to_string(&ChangeStatus::Renamed).unwrap(),
            "\"renamed\""
        );
    }
}
