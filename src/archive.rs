//! Optional archiving of raw webhook payloads.
//!
//! When enabled, each qualifying payload is written to a timestamped JSON
//! file under the archive directory and the path is recorded on the merge
//! record's legacy `file_path` column. Archiving failures are non-fatal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

/// Writes raw webhook payloads to timestamped files.
#[derive(Debug, Clone)]
pub struct PayloadArchive {
    dir: PathBuf,
}

impl PayloadArchive {
    /// Creates an archive rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, io::Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(PayloadArchive { dir })
    }

    /// Returns the archive directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves a payload, returning the path of the written file.
    ///
    /// Filenames carry a second-resolution timestamp
    /// (`webhook_payload_<YYYYmmdd_HHMMSS>.json`); payloads arriving within
    /// the same second overwrite each other, which is acceptable for an
    /// audit-trail convenience feature.
    pub fn save(&self, payload: &[u8]) -> Result<PathBuf, io::Error> {
        let filename = format!("webhook_payload_{}.json", Utc::now().format("%Y%m%d_%H%M%S"));
        let path = self.dir.join(filename);
        fs::write(&path, payload)?;
        Ok(path)
    }
}
