//! Tracked-file filtering.
//!
//! Narrows a changed-file listing to the files matching the tracked naming
//! convention: a directory prefix and a file extension, compared literally
//! and case-sensitively. Not a glob engine.

use thiserror::Error;

use crate::types::ChangedFile;

/// A malformed tracked pattern. Startup-time configuration fault only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The directory prefix was empty.
    #[error("tracked pattern prefix must not be empty")]
    EmptyPrefix,

    /// The extension must begin with a dot.
    #[error("tracked pattern extension must start with '.': {value}")]
    BadExtension { value: String },
}

/// The naming convention for tracked model files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPattern {
    prefix: String,
    extension: String,
}

impl TrackedPattern {
    /// Creates a pattern, validating both parts.
    pub fn new(
        prefix: impl Into<String>,
        extension: impl Into<String>,
    ) -> Result<Self, PatternError> {
        let prefix = prefix.into();
        let extension = extension.into();

        if prefix.is_empty() {
            return Err(PatternError::EmptyPrefix);
        }
        if !extension.starts_with('.') || extension.len() < 2 {
            return Err(PatternError::BadExtension { value: extension });
        }

        Ok(TrackedPattern { prefix, extension })
    }

    /// The dbt convention: SQL model definitions under `models/`.
    pub fn dbt_models() -> Self {
        TrackedPattern {
            prefix: "models/".to_string(),
            extension: ".sql".to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether a path matches the convention.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix) && path.ends_with(&self.extension)
    }
}

impl Default for TrackedPattern {
    fn default() -> Self {
        TrackedPattern::dbt_models()
    }
}

/// Returns the paths of the tracked files, preserving input order.
pub fn filter_tracked(pattern: &TrackedPattern, files: &[ChangedFile]) -> Vec<String> {
    files
        .iter()
        .filter(|file| pattern.matches(&file.path))
        .map(|file| file.path.clone())
        .collect()
}
