//! Octocrab client wrapper for pull-request file listings.
//!
//! Wraps an `Octocrab` instance behind the one query this service needs:
//! the files changed by a pull request. The listing endpoint is paginated;
//! all pages are followed and concatenated in provider order before the
//! result is returned.

use octocrab::Octocrab;
use octocrab::models::repos::{DiffEntry, DiffEntryStatus};

use crate::types::{ChangeStatus, ChangedFile, PrNumber, RepoId};

use super::error::GitHubApiError;

/// A GitHub API client authenticated with a personal token.
#[derive(Clone)]
pub struct GitHubClient {
    /// The underlying octocrab client.
    client: Octocrab,
}

impl GitHubClient {
    /// Creates a client from a GitHub token.
    pub fn from_token(token: impl Into<String>) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self { client })
    }

    /// Creates a client from a pre-configured Octocrab instance.
    ///
    /// Use this when you need custom authentication (e.g., GitHub App
    /// installation tokens).
    pub fn from_octocrab(client: Octocrab) -> Self {
        Self { client }
    }

    /// Lists the files changed by a pull request, following all pages.
    ///
    /// Provider order is preserved. Errors are categorized by
    /// [`GitHubApiError::from_octocrab`]; the caller decides whether a
    /// failure degrades or aborts its operation.
    pub async fn list_changed_files(
        &self,
        repo: &RepoId,
        pr: PrNumber,
    ) -> Result<Vec<ChangedFile>, GitHubApiError> {
        let first_page = self
            .client
            .pulls(repo.owner.as_str(), repo.repo.as_str())
            .list_files(pr.0)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let entries = self
            .client
            .all_pages(first_page)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(entries.into_iter().map(changed_file_from_entry).collect())
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient").finish_non_exhaustive()
    }
}

fn changed_file_from_entry(entry: DiffEntry) -> ChangedFile {
    ChangedFile {
        path: entry.filename,
        status: change_status(entry.status),
    }
}

/// Maps GitHub's diff entry status onto the four change kinds we track.
///
/// `copied` counts as an addition; `changed`/`unchanged` (which the PR files
/// endpoint emits only for type-level changes) count as modifications.
fn change_status(status: DiffEntryStatus) -> ChangeStatus {
    match status {
        DiffEntryStatus::Added | DiffEntryStatus::Copied => ChangeStatus::Added,
        DiffEntryStatus::Removed => ChangeStatus::Removed,
        DiffEntryStatus::Renamed => ChangeStatus::Renamed,
        _ => ChangeStatus::Modified,
    }
}
