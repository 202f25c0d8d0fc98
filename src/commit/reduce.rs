//! Keep the diff sent to the generator within bounds.

use tracing::debug;

use crate::config::DiffConfig;
use crate::error::ScopeError;
use crate::git::VersionControl;
use crate::prompt::Prompter;

/// Diff and the paths it covers after reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedDiff {
    pub diff: String,
    pub files: Vec<String>,
}

/// Applies `[diff]` exclusions and the size limit.
#[derive(Debug, Clone, Default)]
pub struct DiffReducer {
    exclude: Vec<String>,
    /// 0 disables the limit.
    max_size: usize,
}

impl DiffReducer {
    pub fn new(exclude: Vec<String>, max_size: usize) -> Self {
        Self { exclude, max_size }
    }

    pub fn from_config(config: &DiffConfig) -> Self {
        Self::new(config.exclude.clone(), config.max_size)
    }

    /// Drop excluded paths, then let the user narrow the file list while the
    /// diff is at or above the size limit.
    pub async fn reduce<V, P>(
        &self,
        diff: String,
        files: Vec<String>,
        vcs: &V,
        prompter: &P,
    ) -> Result<ReducedDiff, ScopeError>
    where
        V: VersionControl + ?Sized,
        P: Prompter + ?Sized,
    {
        let mut reduced = ReducedDiff { diff, files };

        let kept: Vec<String> = reduced
            .files
            .iter()
            .filter(|f| !self.exclude.contains(f))
            .cloned()
            .collect();
        if kept.len() != reduced.files.len() {
            debug!(
                "Excluded {} file(s) from the diff",
                reduced.files.len() - kept.len()
            );
            reduced.diff = diff_paths(vcs, &kept).await?;
            reduced.files = kept;
        }

        if self.max_size == 0 || reduced.diff.len() < self.max_size {
            return Ok(reduced);
        }

        let selected = prompter.select_files(&reduced.files, reduced.diff.len())?;
        debug!(
            "Diff of {} chars over limit, user kept {} of {} files",
            reduced.diff.len(),
            selected.len(),
            reduced.files.len()
        );
        reduced.diff = diff_paths(vcs, &selected).await?;
        reduced.files = selected;

        Ok(reduced)
    }
}

async fn diff_paths<V>(vcs: &V, paths: &[String]) -> Result<String, ScopeError>
where
    V: VersionControl + ?Sized,
{
    if paths.is_empty() {
        return Ok(String::new());
    }
    vcs.diff(paths).await.map_err(ScopeError::Diff)
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::error::VcsError;
    use crate::git::MockVersionControl;
    use crate::prompt::MockPrompter;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_small_diff_passes_through() {
        let reducer = DiffReducer::new(Vec::new(), 100);
        let vcs = MockVersionControl::new();
        let prompter = MockPrompter::new();

        let reduced = reducer
            .reduce("tiny".to_string(), paths(&["a.ts"]), &vcs, &prompter)
            .await
            .unwrap();
        assert_eq!(reduced.diff, "tiny");
        assert_eq!(reduced.files, paths(&["a.ts"]));
    }

    #[tokio::test]
    async fn test_excluded_files_trigger_rediff() {
        let reducer = DiffReducer::new(paths(&["package-lock.json"]), 1000);
        let mut vcs = MockVersionControl::new();
        vcs.expect_diff()
            .with(eq(paths(&["src/a.ts"])))
            .times(1)
            .returning(|_| Ok("diff of a".to_string()));
        let prompter = MockPrompter::new();

        let reduced = reducer
            .reduce(
                "huge lockfile diff".to_string(),
                paths(&["src/a.ts", "package-lock.json"]),
                &vcs,
                &prompter,
            )
            .await
            .unwrap();
        assert_eq!(reduced.diff, "diff of a");
        assert_eq!(reduced.files, paths(&["src/a.ts"]));
    }

    #[tokio::test]
    async fn test_everything_excluded_never_diffs_empty_pathspec() {
        let reducer = DiffReducer::new(paths(&["yarn.lock"]), 1000);
        // No diff expectation: calling vcs.diff would panic
        let vcs = MockVersionControl::new();
        let prompter = MockPrompter::new();

        let reduced = reducer
            .reduce("x".to_string(), paths(&["yarn.lock"]), &vcs, &prompter)
            .await
            .unwrap();
        assert_eq!(reduced.diff, "");
        assert!(reduced.files.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_diff_asks_user() {
        let reducer = DiffReducer::new(Vec::new(), 10);
        let mut vcs = MockVersionControl::new();
        vcs.expect_diff()
            .with(eq(paths(&["b.ts"])))
            .times(1)
            .returning(|_| Ok("b only".to_string()));
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_files()
            .withf(|files, len| files == paths(&["a.ts", "b.ts"]).as_slice() && *len == 10)
            .times(1)
            .returning(|_, _| Ok(vec!["b.ts".to_string()]));

        let reduced = reducer
            .reduce("0123456789".to_string(), paths(&["a.ts", "b.ts"]), &vcs, &prompter)
            .await
            .unwrap();
        assert_eq!(reduced.diff, "b only");
        assert_eq!(reduced.files, paths(&["b.ts"]));
    }

    #[tokio::test]
    async fn test_zero_max_size_disables_limit() {
        let reducer = DiffReducer::new(Vec::new(), 0);
        let vcs = MockVersionControl::new();
        let prompter = MockPrompter::new();

        let reduced = reducer
            .reduce("a".repeat(50_000), paths(&["a.ts"]), &vcs, &prompter)
            .await
            .unwrap();
        assert_eq!(reduced.diff.len(), 50_000);
    }

    #[tokio::test]
    async fn test_diff_failure_is_scope_error() {
        let reducer = DiffReducer::new(paths(&["b.ts"]), 100);
        let mut vcs = MockVersionControl::new();
        vcs.expect_diff().returning(|_| {
            Err(VcsError::CommandFailed {
                operation: "diff",
                stderr: "boom".to_string(),
            })
        });
        let prompter = MockPrompter::new();

        let err = reducer
            .reduce("x".to_string(), paths(&["a.ts", "b.ts"]), &vcs, &prompter)
            .await
            .unwrap_err();
        assert_eq!(err.operation(), "diff");
    }
}
