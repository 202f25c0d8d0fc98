//! Version control: working tree status, staging, commits and history.

pub mod log;
pub mod session;
pub mod status;

use async_trait::async_trait;

use crate::error::VcsError;

pub use log::LoggedCommit;
pub use session::GitSession;
pub use status::{ChangedFile, FileStatus, StatusSnapshot};

/// Operations the commit and changelog flows need from the repository.
///
/// All paths are relative to the repository root.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Every changed, untracked or deleted file in the working tree.
    async fn status(&self) -> Result<Vec<ChangedFile>, VcsError>;

    /// Stage files that exist on disk.
    async fn add(&self, paths: &[String]) -> Result<(), VcsError>;

    /// Stage the removal of deleted files.
    async fn remove(&self, paths: &[String]) -> Result<(), VcsError>;

    /// Staged diff restricted to `paths`.
    async fn diff(&self, paths: &[String]) -> Result<String, VcsError>;

    /// Commit only `paths`, leaving anything else staged untouched.
    async fn commit(&self, message: &str, paths: &[String]) -> Result<(), VcsError>;

    async fn current_branch(&self) -> Result<String, VcsError>;

    /// Commits reachable from HEAD but not from `since`, newest first.
    async fn commit_log(&self, since: &str) -> Result<Vec<LoggedCommit>, VcsError>;
}
