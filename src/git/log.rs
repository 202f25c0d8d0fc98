//! Commit history between a baseline and HEAD.

use git2::{Oid, Repository};

use crate::error::VcsError;

/// A commit as it appears in the changelog input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedCommit {
    pub hash: String,
    pub message: String,
}

impl LoggedCommit {
    pub fn new(hash: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            message: message.into(),
        }
    }
}

/// Resolve a reference (branch, tag, commit hash) to a commit OID.
pub fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, VcsError> {
    // Try as a direct OID first
    if let Ok(oid) = Oid::from_str(reference) {
        if repo.find_commit(oid).is_ok() {
            return Ok(oid);
        }
    }

    repo.revparse_single(reference)
        .and_then(|obj| obj.peel_to_commit())
        .map(|commit| commit.id())
        .map_err(|e| VcsError::ReferenceNotFound(reference.to_string(), e))
}

/// Walk commits reachable from HEAD and hidden from `since`.
pub fn commits_since(repo: &Repository, since: &str) -> Result<Vec<LoggedCommit>, VcsError> {
    let head = resolve_reference(repo, "HEAD")?;
    let base = resolve_reference(repo, since)?;

    let mut revwalk = repo.revwalk().map_err(VcsError::Revwalk)?;
    revwalk.push(head).map_err(VcsError::Revwalk)?;
    revwalk.hide(base).map_err(VcsError::Revwalk)?;

    let mut commits = Vec::new();
    for oid_result in revwalk {
        let oid = oid_result.map_err(VcsError::Revwalk)?;
        let commit = repo.find_commit(oid).map_err(VcsError::Revwalk)?;
        let message = String::from_utf8_lossy(commit.message_bytes())
            .trim_end()
            .to_string();
        commits.push(LoggedCommit::new(oid.to_string(), message));
    }

    Ok(commits)
}

/// Join commit messages with blank lines, the shape the changelog prompt expects.
pub fn render_log(commits: &[LoggedCommit]) -> String {
    commits
        .iter()
        .map(|c| c.message.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_log_separates_with_blank_lines() {
        let commits = vec![
            LoggedCommit::new("a", "feat(ui): add button"),
            LoggedCommit::new("b", "fix: handle empty input\n\nDetails here"),
        ];
        assert_eq!(
            render_log(&commits),
            "feat(ui): add button\n\nfix: handle empty input\n\nDetails here"
        );
    }

    #[test]
    fn test_render_log_empty() {
        assert_eq!(render_log(&[]), "");
    }
}
