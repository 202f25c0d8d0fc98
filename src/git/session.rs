//! Repository session backed by git2 for reads and the `git` binary for writes.
//!
//! Writes shell out so they inherit the user's git config, hooks and
//! signing setup.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use git2::{Repository, StatusOptions};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::VcsError;

use super::log::{LoggedCommit, commits_since};
use super::status::{ChangedFile, FileStatus};
use super::VersionControl;

/// An open repository. One per run; passed explicitly to the flows that need it.
pub struct GitSession {
    repo: Mutex<Repository>,
    workdir: PathBuf,
}

impl GitSession {
    /// Discover the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self, VcsError> {
        let repo = Repository::discover(path).map_err(VcsError::OpenRepository)?;
        let workdir = repo
            .workdir()
            .ok_or(VcsError::BareRepository)?
            .to_path_buf();

        debug!("Opened repository at {}", workdir.display());

        Ok(Self {
            repo: Mutex::new(repo),
            workdir,
        })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn with_repo<T>(
        &self,
        f: impl FnOnce(&Repository) -> Result<T, VcsError>,
    ) -> Result<T, VcsError> {
        let repo = self.repo.lock().unwrap_or_else(PoisonError::into_inner);
        f(&repo)
    }

    /// Run a git command in the working tree and return its stdout.
    async fn run_git(&self, args: &[&str], operation: &'static str) -> Result<String, VcsError> {
        debug!("git {}", args.join(" "));

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| VcsError::Spawn { operation, source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(VcsError::CommandFailed { operation, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// `git <subcommand> <flags> -- <paths>`
    async fn run_with_paths(
        &self,
        head: &[&str],
        paths: &[String],
        operation: &'static str,
    ) -> Result<String, VcsError> {
        let mut args: Vec<&str> = head.to_vec();
        args.push("--");
        args.extend(paths.iter().map(String::as_str));
        self.run_git(&args, operation).await
    }
}

fn read_status(repo: &Repository) -> Result<Vec<ChangedFile>, VcsError> {
    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .renames_head_to_index(true);

    let statuses = repo.statuses(Some(&mut options)).map_err(VcsError::Status)?;

    let mut files = Vec::new();
    for entry in statuses.iter() {
        let status = entry.status();

        // A staged rename reports both sides; the old path must be committed
        // as a deletion alongside the new one.
        if status.is_index_renamed() {
            if let Some(delta) = entry.head_to_index() {
                if let Some(old) = delta.old_file().path() {
                    files.push(ChangedFile::new(
                        old.to_string_lossy(),
                        FileStatus::Deleted,
                    ));
                }
                if let Some(new) = delta.new_file().path() {
                    let file_status = if status.is_wt_deleted() {
                        FileStatus::Deleted
                    } else {
                        FileStatus::Renamed
                    };
                    files.push(ChangedFile::new(new.to_string_lossy(), file_status));
                }
                continue;
            }
        }

        let Some(path) = entry.path() else {
            warn!("Skipping status entry with a non UTF-8 path");
            continue;
        };

        if let Some(file_status) = FileStatus::from_git2(status) {
            files.push(ChangedFile::new(path, file_status));
        }
    }

    Ok(files)
}

#[async_trait]
impl VersionControl for GitSession {
    async fn status(&self) -> Result<Vec<ChangedFile>, VcsError> {
        let files = self.with_repo(read_status)?;
        debug!("Status reported {} changed files", files.len());
        Ok(files)
    }

    async fn add(&self, paths: &[String]) -> Result<(), VcsError> {
        if paths.is_empty() {
            return Ok(());
        }
        self.run_with_paths(&["add"], paths, "add").await?;
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<(), VcsError> {
        if paths.is_empty() {
            return Ok(());
        }
        self.run_with_paths(
            &["rm", "--cached", "--quiet", "--ignore-unmatch"],
            paths,
            "rm",
        )
        .await?;
        Ok(())
    }

    async fn diff(&self, paths: &[String]) -> Result<String, VcsError> {
        if paths.is_empty() {
            return Ok(String::new());
        }
        self.run_with_paths(&["diff", "--cached", "--no-color"], paths, "diff")
            .await
    }

    async fn commit(&self, message: &str, paths: &[String]) -> Result<(), VcsError> {
        if paths.is_empty() {
            return Err(VcsError::CommandFailed {
                operation: "commit",
                stderr: "no paths to commit".to_string(),
            });
        }
        self.run_with_paths(&["commit", "--quiet", "-m", message], paths, "commit")
            .await?;
        Ok(())
    }

    async fn current_branch(&self) -> Result<String, VcsError> {
        self.with_repo(|repo| {
            let head = repo
                .head()
                .map_err(|e| VcsError::ReferenceNotFound("HEAD".to_string(), e))?;
            if !head.is_branch() {
                return Err(VcsError::DetachedHead);
            }
            head.shorthand()
                .map(str::to_string)
                .ok_or(VcsError::DetachedHead)
        })
    }

    async fn commit_log(&self, since: &str) -> Result<Vec<LoggedCommit>, VcsError> {
        self.with_repo(|repo| commits_since(repo, since))
    }
}
