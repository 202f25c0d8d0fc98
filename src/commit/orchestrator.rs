//! One commit per scope: confirm, stage, diff, generate, review, commit.

use tracing::{debug, error, info, warn};

use crate::error::{GenerateError, ScopeError, VcsError};
use crate::git::{ChangedFile, StatusSnapshot, VersionControl};
use crate::llm::{MessageGenerator, MessageRequest};
use crate::message::CommitMessage;
use crate::prompt::{Prompter, ReviewOutcome};
use crate::scope::{ROOT_SCOPE, ScopeGroup, ScopeResolver, group_files};
use crate::transform::TransformPipeline;

use super::reduce::DiffReducer;
use super::{CommitArgs, CommittedScope, RetryPolicy, RunReport, ScopeFailure};

enum ScopeOutcome {
    Committed(String),
    Skipped,
}

/// Drives a `commit-all` run over borrowed collaborators.
pub struct CommitOrchestrator<'a, V: ?Sized, G: ?Sized, P: ?Sized> {
    vcs: &'a V,
    generator: &'a G,
    prompter: &'a P,
    resolver: ScopeResolver,
    pipeline: TransformPipeline,
    reducer: DiffReducer,
    retry_policy: RetryPolicy,
}

impl<'a, V, G, P> CommitOrchestrator<'a, V, G, P>
where
    V: VersionControl + ?Sized,
    G: MessageGenerator + ?Sized,
    P: Prompter + ?Sized,
{
    pub fn new(
        vcs: &'a V,
        generator: &'a G,
        prompter: &'a P,
        resolver: ScopeResolver,
        pipeline: TransformPipeline,
        reducer: DiffReducer,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            vcs,
            generator,
            prompter,
            resolver,
            pipeline,
            reducer,
            retry_policy,
        }
    }

    /// Commit every confirmed scope.
    ///
    /// Only a failed status snapshot is an error; per-scope failures are
    /// collected in the report and never stop later scopes.
    pub async fn run_all(&self, args: &CommitArgs) -> Result<RunReport, VcsError> {
        let snapshot = StatusSnapshot::from_files(self.vcs.status().await?);
        let mut report = RunReport::default();

        if snapshot.is_empty() {
            println!("No changes to commit.");
            return Ok(report);
        }

        let groups = group_files(snapshot.all_files(), &self.resolver);
        debug!(
            "{} changed files in {} scopes: {:?}",
            groups.total_files(),
            groups.len(),
            groups.keys().collect::<Vec<_>>()
        );

        let target = args.scope.as_deref().map(str::trim).filter(|s| !s.is_empty());
        if let Some(target) = target {
            if groups.get(target).is_none() {
                warn!("Scope '{}' has no changes", target);
                eprintln!("\x1b[33m⚠ No changes found in scope '{}'\x1b[0m", target);
                return Ok(report);
            }
        }

        let pipeline = self.pipeline.clone().with_issue_override(args.issue.clone());

        for group in &groups {
            if target.is_some_and(|t| t != group.key) {
                continue;
            }

            match self.process_scope(group, &snapshot, args, &pipeline).await {
                Ok(ScopeOutcome::Committed(message)) => {
                    info!("Committed scope {}", group.key);
                    println!("✓ Committed {}", display_scope(&group.key));
                    report.committed.push(CommittedScope {
                        scope: group.key.clone(),
                        message,
                    });
                }
                Ok(ScopeOutcome::Skipped) => {
                    println!("Skipped {}", display_scope(&group.key));
                    report.skipped.push(group.key.clone());
                }
                Err(e) => {
                    error!(scope = %group.key, operation = e.operation(), "{}", e);
                    eprintln!(
                        "\x1b[31m✗ {}: {} failed: {}\x1b[0m",
                        display_scope(&group.key),
                        e.operation(),
                        e
                    );
                    report.failed.push(ScopeFailure {
                        scope: group.key.clone(),
                        error: e,
                    });
                }
            }
        }

        Ok(report)
    }

    async fn process_scope(
        &self,
        group: &ScopeGroup,
        snapshot: &StatusSnapshot,
        args: &CommitArgs,
        pipeline: &TransformPipeline,
    ) -> Result<ScopeOutcome, ScopeError> {
        let preselected = args.scope.as_deref().map(str::trim) == Some(group.key.as_str());
        if !preselected && !self.prompter.confirm_scope(&display_scope(&group.key))? {
            return Ok(ScopeOutcome::Skipped);
        }

        let (to_add, to_remove) = partition(&group.files, snapshot);
        if !to_add.is_empty() {
            self.vcs.add(&to_add).await.map_err(ScopeError::Staging)?;
        }
        if !to_remove.is_empty() {
            self.vcs.remove(&to_remove).await.map_err(ScopeError::Staging)?;
        }

        let diff_paths = if to_add.is_empty() { &to_remove } else { &to_add };
        let diff = self.vcs.diff(diff_paths).await.map_err(ScopeError::Diff)?;
        let reduced = self
            .reducer
            .reduce(diff, diff_paths.clone(), self.vcs, self.prompter)
            .await?;

        let request = MessageRequest {
            diff: reduced.diff,
            scope: group.key.clone(),
            files: reduced.files,
            commit_type: args.commit_type,
            reason: args.reason.clone(),
        };

        let mut attempts = 0;
        let accepted = loop {
            if !self.retry_policy.allows(attempts) {
                return Err(ScopeError::AttemptsExhausted(attempts));
            }
            attempts += 1;

            println!(
                "Generating commit message for {}{}...",
                display_scope(&group.key),
                if attempts > 1 {
                    format!(" (attempt {})", attempts)
                } else {
                    String::new()
                }
            );

            let message = self
                .generator
                .generate_commit_message(&request)
                .await
                .map_err(ScopeError::Generation)?;
            let message = self.prepare(message, &group.key, args);
            if message.is_empty() {
                return Err(ScopeError::Generation(GenerateError::Empty));
            }

            let message = pipeline.apply(message, self.vcs, self.prompter).await;

            match self.prompter.review_message(&message.to_string())? {
                ReviewOutcome::Accept(text) => break text,
                ReviewOutcome::Regenerate => {
                    debug!("Regenerating message for {}", group.key);
                }
                ReviewOutcome::Skip => return Ok(ScopeOutcome::Skipped),
            }
        };

        let mut commit_paths = to_add;
        commit_paths.extend(to_remove);
        self.vcs
            .commit(&accepted, &commit_paths)
            .await
            .map_err(ScopeError::Commit)?;

        Ok(ScopeOutcome::Committed(accepted))
    }

    /// Apply the command-line overrides to a generated message.
    fn prepare(&self, mut message: CommitMessage, scope: &str, args: &CommitArgs) -> CommitMessage {
        message.scope = (scope != ROOT_SCOPE).then(|| scope.to_string());
        if let Some(kind) = args.commit_type {
            message.commit_type = kind.to_string();
        }
        if args.breaking {
            message.breaking = true;
        }
        message
    }
}

/// Present files to `git add`; deleted files to `git rm` unless the same
/// path also exists on disk.
fn partition(files: &[ChangedFile], snapshot: &StatusSnapshot) -> (Vec<String>, Vec<String>) {
    let to_add = files
        .iter()
        .filter(|f| !f.status.is_deleted())
        .map(|f| f.path.clone())
        .collect();
    let to_remove = files
        .iter()
        .filter(|f| f.status.is_deleted() && !snapshot.is_present(&f.path))
        .map(|f| f.path.clone())
        .collect();
    (to_add, to_remove)
}

fn display_scope(key: &str) -> String {
    if key == ROOT_SCOPE {
        "root".to_string()
    } else {
        key.to_string()
    }
}
