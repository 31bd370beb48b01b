//! GitHub API access.
//!
//! [`GitHubClient`] performs the authenticated file-listing query;
//! [`FileLister`] is the capability injected into the processor, with an
//! explicit `Unavailable` variant for the no-token degraded mode.

pub mod client;
pub mod error;

pub use client::GitHubClient;
pub use error::{GitHubApiError, GitHubErrorKind};

use tracing::warn;

use crate::processor::FileSource;
use crate::types::{ChangedFile, PrNumber, RepoId};

/// File-listing capability.
///
/// Constructed once at startup. When no GitHub token is configured (or the
/// client fails to build), the capability is `Unavailable` and every call
/// through it is skipped rather than attempted.
#[derive(Debug)]
pub enum FileLister {
    /// A working, authenticated client.
    Authenticated(GitHubClient),
    /// No client; file listings are skipped.
    Unavailable,
}

impl FileLister {
    /// Builds the capability from an optional token.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(token) => match GitHubClient::from_token(token) {
                Ok(client) => FileLister::Authenticated(client),
                Err(err) => {
                    warn!(error = %err, "failed to build GitHub client; file listing disabled");
                    FileLister::Unavailable
                }
            },
            None => FileLister::Unavailable,
        }
    }
}

impl FileSource for FileLister {
    type Error = GitHubApiError;

    async fn changed_files(
        &self,
        repo: &RepoId,
        pr: PrNumber,
    ) -> Result<Option<Vec<ChangedFile>>, Self::Error> {
        match self {
            FileLister::Authenticated(client) => {
                client.list_changed_files(repo, pr).await.map(Some)
            }
            FileLister::Unavailable => Ok(None),
        }
    }
}
