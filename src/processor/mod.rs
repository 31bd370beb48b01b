//! The event processor.
//!
//! Sequences a single inbound webhook event through validation, file
//! listing, model filtering, summarization, and persistence, applying the
//! per-stage continue-on-error policy:
//!
//! ```text
//! Validate → Ignore                          (terminal: Ignored)
//!          → Proceed → ListFiles  (error → empty file list, continue)
//!                    → FilterFiles
//!                    → Summarize  (error → null summary, continue)
//!                    → Persist    (error → log, degraded outcome)
//!                                 → terminal: Processed
//! MalformedEventError during Validate → terminal: Failed (Err)
//! ```
//!
//! The processor holds no cross-event state; concurrent invocations are
//! independent. External collaborators are injected through the seam traits
//! ([`FileSource`], [`Summarize`], [`RecordSink`]) so tests substitute stubs
//! and production wires the capability enums built at startup.

use std::fmt;
use std::future::Future;

use serde::Serialize;
use tracing::{info, warn};

pub mod filter;
pub mod validate;

pub use filter::{PatternError, TrackedPattern, filter_tracked};
pub use validate::{Decision, IgnoreReason, MalformedEventError, MergeEvent, validate};

use crate::archive::PayloadArchive;
use crate::types::{ChangedFile, MergeRecord, ModelChangeRecord, PrNumber, RepoId};
use crate::webhooks::InboundEvent;

// ─── Seam traits ──────────────────────────────────────────────────────────────

/// Source of a pull request's changed files.
///
/// `Ok(None)` means the capability is unavailable (no client was configured
/// at startup); the processor skips the stage with a warning instead of
/// treating it as a failure.
pub trait FileSource {
    type Error: fmt::Display;

    fn changed_files(
        &self,
        repo: &RepoId,
        pr: PrNumber,
    ) -> impl Future<Output = Result<Option<Vec<ChangedFile>>, Self::Error>> + Send;
}

/// Best-effort natural-language summarization.
///
/// Returns `None` when the backing service is unavailable or failed; the
/// implementation logs the cause. The processor never aborts for a missing
/// summary.
pub trait Summarize {
    fn summarize(&self, event: &MergeEvent) -> impl Future<Output = Option<String>> + Send;
}

/// Sink for the two record collections.
///
/// The two writes are independent operations: failure of one must not
/// prevent an attempt at the other, and no atomicity is expected across
/// them.
pub trait RecordSink {
    type Error: fmt::Display;

    fn write_merge(
        &self,
        record: &MergeRecord,
    ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send;

    fn write_model_changes(
        &self,
        records: &[ModelChangeRecord],
    ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send;
}

/// Result of an attempted write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The records were written.
    Written,
    /// The store client is unavailable; nothing was attempted.
    Skipped,
}

// ─── Outcome types ────────────────────────────────────────────────────────────

/// Per-stage status recorded on the processing report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// The stage ran and succeeded.
    Ok,
    /// The stage was skipped (client unavailable, or nothing to do).
    Skipped,
    /// The stage ran and failed; processing continued degraded.
    Failed,
}

/// The structured result of processing one qualifying merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    /// The merge record (written or attempted).
    pub merge: MergeRecord,

    /// One record per tracked changed file.
    pub model_changes: Vec<ModelChangeRecord>,

    /// Status of the changed-file listing stage.
    pub file_listing: StageStatus,

    /// Status of the merge-record write.
    pub merge_write: StageStatus,

    /// Status of the model-change batch write.
    pub model_change_write: StageStatus,
}

impl ProcessReport {
    /// True when any enrichment or write was skipped or failed.
    pub fn is_degraded(&self) -> bool {
        self.file_listing != StageStatus::Ok
            || self.merge.summary.is_none()
            || self.merge_write != StageStatus::Ok
            || self.model_change_write != StageStatus::Ok
    }
}

/// Terminal outcome of processing one inbound event.
///
/// The third terminal state, Failed, is the `Err` arm of
/// [`Processor::process`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The event was a qualifying trunk merge and was processed.
    Processed(Box<ProcessReport>),
    /// The event was not actionable.
    Ignored(IgnoreReason),
}

// ─── Processor ────────────────────────────────────────────────────────────────

/// Orchestrates the processing of inbound events.
///
/// Constructed once at startup with the capability implementations and the
/// tracked-file pattern; shared across invocations behind the server state.
#[derive(Debug)]
pub struct Processor<L, S, W> {
    files: L,
    summarizer: S,
    store: W,
    tracked: TrackedPattern,
    archive: Option<PayloadArchive>,
}

impl<L, S, W> Processor<L, S, W>
where
    L: FileSource,
    S: Summarize,
    W: RecordSink,
{
    pub fn new(files: L, summarizer: S, store: W, tracked: TrackedPattern) -> Self {
        Processor {
            files,
            summarizer,
            store,
            tracked,
            archive: None,
        }
    }

    /// Enables payload archiving (populates the legacy `file_path` column).
    pub fn with_archive(mut self, archive: PayloadArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Processes one inbound event.
    ///
    /// A single synchronous attempt: no stage is retried. Only a malformed
    /// qualifying event produces `Err`; every external failure degrades the
    /// outcome instead.
    pub async fn process(
        &self,
        event: &InboundEvent,
        raw_payload: &[u8],
    ) -> Result<Outcome, MalformedEventError> {
        let merge = match validate(event)? {
            Decision::Ignore(reason) => {
                info!(reason = reason.as_code(), base_branch = %event.base_branch, "event ignored");
                return Ok(Outcome::Ignored(reason));
            }
            Decision::Proceed(merge) => merge,
        };

        info!(repo = %merge.repo, pr = %merge.pr_number, "processing merged pull request");

        let file_path = self.archive_payload(raw_payload);

        let (files, file_listing) = self.list_files(&merge).await;
        let tracked_paths = filter_tracked(&self.tracked, &files);
        if tracked_paths.is_empty() {
            info!("no tracked model files in this PR");
        } else {
            info!(count = tracked_paths.len(), files = ?tracked_paths, "found tracked model files");
        }

        let summary = self.summarizer.summarize(&merge).await;
        match &summary {
            Some(summary) => info!(pr = %merge.pr_number, %summary, "generated summary"),
            None => warn!(pr = %merge.pr_number, "no summary available"),
        }

        let record = MergeRecord {
            pr_number: merge.pr_number,
            title: merge.title.clone(),
            creator: merge.creator.clone(),
            created_at: merge.created_at,
            html_url: merge.html_url.clone(),
            repo_owner: merge.repo.owner.clone(),
            repo_name: merge.repo.repo.clone(),
            summary: summary.clone(),
            file_path,
        };
        let model_changes = build_model_changes(&record, &tracked_paths);

        let merge_write = self.write_merge(&record).await;
        let model_change_write = self.write_model_changes(&model_changes).await;

        Ok(Outcome::Processed(Box::new(ProcessReport {
            merge: record,
            model_changes,
            file_listing,
            merge_write,
            model_change_write,
        })))
    }

    fn archive_payload(&self, raw_payload: &[u8]) -> Option<String> {
        let archive = self.archive.as_ref()?;
        match archive.save(raw_payload) {
            Ok(path) => Some(path.display().to_string()),
            Err(err) => {
                warn!(error = %err, "failed to archive payload");
                None
            }
        }
    }

    async fn list_files(&self, merge: &MergeEvent) -> (Vec<ChangedFile>, StageStatus) {
        match self.files.changed_files(&merge.repo, merge.pr_number).await {
            Ok(Some(files)) => {
                info!(count = files.len(), pr = %merge.pr_number, "fetched changed files");
                (files, StageStatus::Ok)
            }
            Ok(None) => {
                warn!("file listing skipped: GitHub client unavailable");
                (Vec::new(), StageStatus::Skipped)
            }
            Err(err) => {
                warn!(error = %err, "file listing failed; continuing with empty file list");
                (Vec::new(), StageStatus::Failed)
            }
        }
    }

    async fn write_merge(&self, record: &MergeRecord) -> StageStatus {
        match self.store.write_merge(record).await {
            Ok(WriteOutcome::Written) => StageStatus::Ok,
            Ok(WriteOutcome::Skipped) => {
                warn!("merge record not persisted: store unavailable");
                StageStatus::Skipped
            }
            Err(err) => {
                warn!(error = %err, "failed to write merge record");
                StageStatus::Failed
            }
        }
    }

    async fn write_model_changes(&self, records: &[ModelChangeRecord]) -> StageStatus {
        if records.is_empty() {
            return StageStatus::Skipped;
        }
        match self.store.write_model_changes(records).await {
            Ok(WriteOutcome::Written) => StageStatus::Ok,
            Ok(WriteOutcome::Skipped) => {
                warn!("model change records not persisted: store unavailable");
                StageStatus::Skipped
            }
            Err(err) => {
                warn!(error = %err, "failed to write model change records");
                StageStatus::Failed
            }
        }
    }
}

/// Builds one model-change record per tracked path, sharing the PR metadata
/// and summary of the merge record.
fn build_model_changes(record: &MergeRecord, tracked_paths: &[String]) -> Vec<ModelChangeRecord> {
    tracked_paths
        .iter()
        .map(|path| ModelChangeRecord {
            dbt_model_name: path.clone(),
            pr_html_url: record.html_url.clone(),
            ai_summary: record.summary.clone(),
            pr_created_at: record.created_at,
            pr_creator: record.creator.clone(),
        })
        .collect()
}
