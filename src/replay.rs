//! Replay a saved webhook payload through the processor.
//!
//! A thin I/O wrapper around the same [`Processor`] the live webhook path
//! uses: reads a payload file (as written by the archive, or captured by
//! hand), parses it as a `pull_request` event, and processes it. Used for
//! testing and backfill.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::processor::{
    FileSource, MalformedEventError, Outcome, Processor, RecordSink, Summarize,
};
use crate::webhooks::{ParseError, parse_pull_request_payload};

/// Errors from replaying a payload file.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file was not valid JSON.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The payload was a qualifying merge with a missing required field.
    #[error(transparent)]
    Malformed(#[from] MalformedEventError),
}

/// Replays one payload file, returning the processing outcome.
pub async fn replay_file<L, S, W>(
    processor: &Processor<L, S, W>,
    path: &Path,
) -> Result<Outcome, ReplayError>
where
    L: FileSource,
    S: Summarize,
    W: RecordSink,
{
    let payload = std::fs::read(path).map_err(|source| ReplayError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let event = parse_pull_request_payload(&payload)?;
    let outcome = processor.process(&event, &payload).await?;

    info!(path = %path.display(), "replayed payload");
    Ok(outcome)
}
