//! Scope-by-scope commit flow.

pub mod orchestrator;
pub mod reduce;

use crate::error::ScopeError;
use crate::message::CommitType;

pub use orchestrator::CommitOrchestrator;
pub use reduce::{DiffReducer, ReducedDiff};

/// Options of `cb commit-all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitArgs {
    pub breaking: bool,
    /// Only this scope is committed, without confirmation.
    pub scope: Option<String>,
    pub commit_type: Option<CommitType>,
    pub issue: Option<String>,
    pub reason: Option<String>,
}

/// Bound on generate/review rounds per scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` keeps asking until the user accepts or skips.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    pub fn limited(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
        }
    }

    pub fn allows(&self, attempts_made: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts_made < max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedScope {
    pub scope: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ScopeFailure {
    pub scope: String,
    pub error: ScopeError,
}

/// Outcome of one `commit-all` run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub committed: Vec<CommittedScope>,
    pub skipped: Vec<String>,
    pub failed: Vec<ScopeFailure>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn committed_scopes(&self) -> Vec<&str> {
        self.committed.iter().map(|c| c.scope.as_str()).collect()
    }

    pub fn failed_scopes(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.scope.as_str()).collect()
    }

    /// One-line summary printed at the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "{} committed, {} skipped, {} failed",
            self.committed.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}
