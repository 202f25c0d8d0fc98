//! Integration tests for `GitSession` against temporary repositories.

mod common;

use codebuddy::git::{ChangedFile, FileStatus, GitSession, VersionControl};
use codebuddy::VcsError;
use common::TestRepo;

fn paths(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn status_of<'a>(files: &'a [ChangedFile], path: &str) -> Option<&'a FileStatus> {
    files.iter().find(|f| f.path == path).map(|f| &f.status)
}

// =============================================================================
// STATUS
// =============================================================================

#[tokio::test]
async fn test_status_reports_modified_untracked_and_deleted() {
    let test_repo = TestRepo::new();
    test_repo.write("apps/web/index.ts", "v1");
    test_repo.write("apps/web/old.ts", "old");
    test_repo.commit_files(&["apps/web/index.ts", "apps/web/old.ts"], "chore: init");

    test_repo.write("apps/web/index.ts", "v2");
    test_repo.write("packages/ui/button.tsx", "new");
    test_repo.delete("apps/web/old.ts");

    let session = GitSession::open(test_repo.path()).unwrap();
    let files = session.status().await.unwrap();

    assert_eq!(files.len(), 3);
    assert_eq!(status_of(&files, "apps/web/index.ts"), Some(&FileStatus::Modified));
    assert_eq!(
        status_of(&files, "packages/ui/button.tsx"),
        Some(&FileStatus::Untracked)
    );
    assert_eq!(status_of(&files, "apps/web/old.ts"), Some(&FileStatus::Deleted));
}

#[tokio::test]
async fn test_clean_tree_has_empty_status() {
    let test_repo = TestRepo::new();
    test_repo.commit("README.md", "docs: readme");

    let session = GitSession::open(test_repo.path()).unwrap();
    assert!(session.status().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_open_discovers_from_subdirectory() {
    let test_repo = TestRepo::new();
    test_repo.write("src/nested/file.rs", "");

    let session = GitSession::open(&test_repo.path().join("src/nested")).unwrap();
    assert_eq!(
        session.workdir().canonicalize().unwrap(),
        test_repo.path().canonicalize().unwrap()
    );
}

#[test]
fn test_open_outside_repository_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = GitSession::open(dir.path());
    assert!(matches!(result, Err(VcsError::OpenRepository(_))));
}

// =============================================================================
// STAGING, DIFF AND COMMIT
// =============================================================================

#[tokio::test]
async fn test_add_then_diff_is_restricted_to_paths() {
    let test_repo = TestRepo::new();
    test_repo.commit("README.md", "docs: readme");
    test_repo.write("apps/a/x.ts", "export const a = 1;\n");
    test_repo.write("apps/b/y.ts", "export const b = 2;\n");

    let session = GitSession::open(test_repo.path()).unwrap();
    session
        .add(&paths(&["apps/a/x.ts", "apps/b/y.ts"]))
        .await
        .unwrap();

    let diff = session.diff(&paths(&["apps/a/x.ts"])).await.unwrap();
    assert!(diff.contains("apps/a/x.ts"));
    assert!(diff.contains("export const a = 1;"));
    assert!(!diff.contains("apps/b/y.ts"));
}

#[tokio::test]
async fn test_diff_of_no_paths_is_empty() {
    let test_repo = TestRepo::new();
    test_repo.commit("README.md", "docs: readme");
    test_repo.write("README.md", "changed");

    let session = GitSession::open(test_repo.path()).unwrap();
    session.add(&paths(&["README.md"])).await.unwrap();
    assert_eq!(session.diff(&[]).await.unwrap(), "");
}

#[tokio::test]
async fn test_commit_only_takes_given_paths() {
    let test_repo = TestRepo::new();
    test_repo.commit("README.md", "docs: readme");
    test_repo.write("apps/a/x.ts", "a");
    test_repo.write("apps/b/y.ts", "b");

    let session = GitSession::open(test_repo.path()).unwrap();
    session
        .add(&paths(&["apps/a/x.ts", "apps/b/y.ts"]))
        .await
        .unwrap();
    session
        .commit("feat(a): add x", &paths(&["apps/a/x.ts"]))
        .await
        .unwrap();

    let head = test_repo.history()[0];
    assert_eq!(test_repo.files_in_commit(head), vec!["apps/a/x.ts"]);
    assert_eq!(test_repo.log_subjects()[0], "feat(a): add x");

    // The other scope is still pending
    let remaining = session.status().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].path, "apps/b/y.ts");
}

#[tokio::test]
async fn test_remove_stages_deletion() {
    let test_repo = TestRepo::new();
    test_repo.write("apps/a/gone.ts", "bye");
    test_repo.commit_files(&["apps/a/gone.ts"], "chore: init");
    test_repo.delete("apps/a/gone.ts");

    let session = GitSession::open(test_repo.path()).unwrap();
    session.remove(&paths(&["apps/a/gone.ts"])).await.unwrap();
    session
        .commit("chore(a): remove gone", &paths(&["apps/a/gone.ts"]))
        .await
        .unwrap();

    assert!(session.status().await.unwrap().is_empty());
    assert_eq!(test_repo.log_subjects()[0], "chore(a): remove gone");
}

#[tokio::test]
async fn test_commit_without_paths_is_rejected() {
    let test_repo = TestRepo::new();
    let session = GitSession::open(test_repo.path()).unwrap();
    let result = session.commit("feat: nothing", &[]).await;
    assert!(matches!(
        result,
        Err(VcsError::CommandFailed {
            operation: "commit",
            ..
        })
    ));
}

#[tokio::test]
async fn test_add_unknown_path_fails_with_command_error() {
    let test_repo = TestRepo::new();
    test_repo.commit("README.md", "docs: readme");

    let session = GitSession::open(test_repo.path()).unwrap();
    let result = session.add(&paths(&["does/not/exist.ts"])).await;
    assert!(matches!(
        result,
        Err(VcsError::CommandFailed { operation: "add", .. })
    ));
}

// =============================================================================
// BRANCH AND HISTORY
// =============================================================================

#[tokio::test]
async fn test_current_branch() {
    let test_repo = TestRepo::new();
    test_repo.commit("README.md", "docs: readme");
    test_repo.checkout("feature/ABC-123-login");

    let session = GitSession::open(test_repo.path()).unwrap();
    assert_eq!(
        session.current_branch().await.unwrap(),
        "feature/ABC-123-login"
    );
}

#[tokio::test]
async fn test_detached_head_has_no_branch() {
    let test_repo = TestRepo::new();
    let oid = test_repo.commit("README.md", "docs: readme");
    test_repo.repo.set_head_detached(oid).unwrap();

    let session = GitSession::open(test_repo.path()).unwrap();
    assert!(matches!(
        session.current_branch().await,
        Err(VcsError::DetachedHead)
    ));
}

#[tokio::test]
async fn test_commit_log_since_branch() {
    let test_repo = TestRepo::new();
    let base = test_repo.commit("README.md", "docs: readme");
    test_repo.branch("main-base", base);
    test_repo.commit("apps/a/x.ts", "feat(a): add x");
    test_repo.commit("apps/b/y.ts", "fix(b): handle y");

    let session = GitSession::open(test_repo.path()).unwrap();
    let log = session.commit_log("main-base").await.unwrap();

    let messages: Vec<&str> = log.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, vec!["fix(b): handle y", "feat(a): add x"]);
}

#[tokio::test]
async fn test_commit_log_up_to_date_is_empty() {
    let test_repo = TestRepo::new();
    let head = test_repo.commit("README.md", "docs: readme");
    test_repo.branch("release", head);

    let session = GitSession::open(test_repo.path()).unwrap();
    assert!(session.commit_log("release").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_commit_log_unknown_reference() {
    let test_repo = TestRepo::new();
    test_repo.commit("README.md", "docs: readme");

    let session = GitSession::open(test_repo.path()).unwrap();
    assert!(matches!(
        session.commit_log("no-such-branch").await,
        Err(VcsError::ReferenceNotFound(..))
    ));
}
