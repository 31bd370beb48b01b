//! Supabase (PostgREST) write client.
//!
//! Inserts go straight to the REST surface: `POST {base}/rest/v1/{table}`
//! with the service key in both the `apikey` and `Authorization` headers.
//! The merge table is upserted on its idempotency key so webhook re-delivery
//! cannot duplicate rows; model changes are plain batch inserts.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::types::{MergeRecord, ModelChangeRecord};

/// Table holding one row per merged PR.
pub const MERGE_TABLE: &str = "github_pr_merge";

/// Table holding one row per (merged PR, tracked model) pair.
pub const MODEL_CHANGES_TABLE: &str = "dbt_model_changes";

/// Upsert key for the merge table: one row per (repo, PR) pair.
pub const MERGE_CONFLICT_KEY: &str = "repo_owner,repo_name,pr_number";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A failed write to the data store.
///
/// Writes are never retried and never roll back the sibling write.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Transport-level failure.
    #[error("data store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// PostgREST answered with a non-success status.
    #[error("data store rejected write to `{table}` (HTTP {status}): {detail}")]
    Rejected {
        table: &'static str,
        status: u16,
        detail: String,
    },
}

/// A PostgREST client bound to one Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    /// Creates a client for the given project URL and service key.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = base_url.into();
        Ok(SupabaseClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Upserts one merge record on the `(repo_owner, repo_name, pr_number)` key.
    pub async fn insert_merge(&self, record: &MergeRecord) -> Result<(), PersistenceError> {
        let url = upsert_url(&self.base_url, MERGE_TABLE, MERGE_CONFLICT_KEY);
        self.execute(url, MERGE_TABLE, record, "resolution=merge-duplicates,return=minimal")
            .await
    }

    /// Inserts a batch of model-change records.
    pub async fn insert_model_changes(
        &self,
        records: &[ModelChangeRecord],
    ) -> Result<(), PersistenceError> {
        let url = insert_url(&self.base_url, MODEL_CHANGES_TABLE);
        self.execute(url, MODEL_CHANGES_TABLE, records, "return=minimal")
            .await
    }

    async fn execute<T: Serialize + ?Sized>(
        &self,
        url: String,
        table: &'static str,
        body: &T,
        prefer: &str,
    ) -> Result<(), PersistenceError> {
        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PersistenceError::Rejected {
                table,
                status: status.as_u16(),
                detail,
            });
        }
        Ok(())
    }
}

fn insert_url(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base_url, table)
}

fn upsert_url(base_url: &str, table: &str, conflict_key: &str) -> String {
    format!("{}?on_conflict={}", insert_url(base_url, table), conflict_key)
}
