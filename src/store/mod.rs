//! Durable record persistence.
//!
//! [`RecordStore`] is the capability injected into the processor: a
//! [`SupabaseClient`] when credentials were configured, `Unavailable`
//! otherwise. The two table writes are exposed as independent operations so
//! one failing never blocks the other.

pub mod supabase;

pub use supabase::{
    MERGE_CONFLICT_KEY, MERGE_TABLE, MODEL_CHANGES_TABLE, PersistenceError, SupabaseClient,
};

use tracing::warn;

use crate::processor::{RecordSink, WriteOutcome};
use crate::types::{MergeRecord, ModelChangeRecord};

/// Persistence capability, constructed once at startup.
#[derive(Debug)]
pub enum RecordStore {
    /// A working PostgREST client.
    Supabase(SupabaseClient),
    /// No client; writes are skipped and the event is
    /// processed-but-not-persisted.
    Unavailable,
}

impl RecordStore {
    /// Builds the capability from optional credentials. Both the project URL
    /// and the key are required for a working client.
    pub fn from_credentials(base_url: Option<&str>, api_key: Option<&str>) -> Self {
        match (base_url, api_key) {
            (Some(base_url), Some(api_key)) => match SupabaseClient::new(base_url, api_key) {
                Ok(client) => RecordStore::Supabase(client),
                Err(err) => {
                    warn!(error = %err, "failed to build data store client; persistence disabled");
                    RecordStore::Unavailable
                }
            },
            _ => RecordStore::Unavailable,
        }
    }
}

impl RecordSink for RecordStore {
    type Error = PersistenceError;

    async fn write_merge(&self, record: &MergeRecord) -> Result<WriteOutcome, Self::Error> {
        match self {
            RecordStore::Supabase(client) => client
                .insert_merge(record)
                .await
                .map(|()| WriteOutcome::Written),
            RecordStore::Unavailable => Ok(WriteOutcome::Skipped),
        }
    }

    async fn write_model_changes(
        &self,
        records: &[ModelChangeRecord],
    ) -> Result<WriteOutcome, Self::Error> {
        match self {
            RecordStore::Supabase(client) => client
                .insert_model_changes(records)
                .await
                .map(|()| WriteOutcome::Written),
            RecordStore::Unavailable => Ok(WriteOutcome::Skipped),
        }
    }
}
