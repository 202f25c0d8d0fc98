//! Working tree status snapshot.

use std::fmt;

use git2::Status;

/// Status of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Untracked,
}

impl FileStatus {
    /// Classify a git2 status entry. Ignored and unchanged entries yield `None`.
    ///
    /// Deletion wins over every other flag: a file added to the index and
    /// then removed from disk has nothing left to stage.
    pub fn from_git2(status: Status) -> Option<Self> {
        if status.is_ignored() || status.is_empty() || status == Status::CURRENT {
            return None;
        }

        let file_status = if status.is_index_deleted() || status.is_wt_deleted() {
            FileStatus::Deleted
        } else if status.is_index_renamed() || status.is_wt_renamed() {
            FileStatus::Renamed
        } else if status.is_index_new() {
            FileStatus::Added
        } else if status.is_wt_new() {
            FileStatus::Untracked
        } else {
            FileStatus::Modified
        };

        Some(file_status)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, FileStatus::Deleted)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
            FileStatus::Untracked => write!(f, "Untracked"),
        }
    }
}

/// A file that was changed in the working tree, relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
}

impl ChangedFile {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

/// One status query, split the way staging needs it.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    /// Everything that still exists on disk and must be `git add`ed.
    pub present: Vec<ChangedFile>,
    /// Files removed from the working tree that must be `git rm`ed.
    pub deleted: Vec<ChangedFile>,
}

impl StatusSnapshot {
    pub fn from_files(files: Vec<ChangedFile>) -> Self {
        let (deleted, present) = files.into_iter().partition(|f| f.status.is_deleted());
        Self { present, deleted }
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty() && self.deleted.is_empty()
    }

    pub fn is_present(&self, path: &str) -> bool {
        self.present.iter().any(|f| f.path == path)
    }

    pub fn is_deleted(&self, path: &str) -> bool {
        self.deleted.iter().any(|f| f.path == path)
    }

    /// Present files first, then deletions, deduplicated by path.
    pub fn all_files(&self) -> Vec<ChangedFile> {
        let mut files: Vec<ChangedFile> = self.present.clone();
        for file in &self.deleted {
            if !self.is_present(&file.path) {
                files.push(file.clone());
            }
        }
        files
    }
}
