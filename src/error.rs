//! Error types for codebuddy modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

use crate::llm::router::LlmError;

/// Errors from loading `codebuddy.toml`. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("Invalid {field} pattern '{pattern}': {reason}")]
    InvalidRegex {
        field: &'static str,
        pattern: String,
        reason: String,
    },
}

/// Errors from version-control operations.
#[derive(Error, Debug)]
pub enum VcsError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Bare repositories are not supported")]
    BareRepository,

    #[error("Failed to read working tree status: {0}")]
    Status(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("HEAD is detached, no branch name available")]
    DetachedHead,

    #[error("Failed to walk commit history: {0}")]
    Revwalk(#[source] git2::Error),

    #[error("Failed to run git {operation}: {source}")]
    Spawn {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed {
        operation: &'static str,
        stderr: String,
    },
}

/// Errors from the message generator.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("The generator returned an empty message")]
    Empty,

    #[error("{0}")]
    Llm(#[from] LlmError),

    #[error("Could not parse generator response: {0}")]
    InvalidResponse(String),
}

/// Errors from interactive prompts.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Prompt failed: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    #[error("Prompt cancelled")]
    Cancelled,
}

/// Why one scope of a commit run failed. Never stops the remaining scopes.
#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("Failed to stage files: {0}")]
    Staging(#[source] VcsError),

    #[error("Failed to read staged diff: {0}")]
    Diff(#[source] VcsError),

    #[error("Failed to generate commit message: {0}")]
    Generation(#[source] GenerateError),

    #[error("No message accepted after {0} attempts")]
    AttemptsExhausted(u32),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] PromptError),

    #[error("Failed to commit: {0}")]
    Commit(#[source] VcsError),
}

impl ScopeError {
    /// Short name of the step that failed, for log lines.
    pub fn operation(&self) -> &'static str {
        match self {
            ScopeError::Staging(_) => "stage",
            ScopeError::Diff(_) => "diff",
            ScopeError::Generation(_) => "generate",
            ScopeError::AttemptsExhausted(_) => "review",
            ScopeError::Prompt(_) => "prompt",
            ScopeError::Commit(_) => "commit",
        }
    }
}

/// Errors from LLM provider subprocesses.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0} CLI not found in PATH")]
    NotInstalled(&'static str),

    #[error("Failed to spawn {provider} process: {source}")]
    SpawnFailed {
        provider: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{provider} process timed out after {secs} seconds")]
    Timeout { provider: &'static str, secs: u64 },

    #[error("{provider} CLI exited with code {code}: {stderr}")]
    NonZeroExit {
        provider: &'static str,
        code: i32,
        stderr: String,
    },

    #[error("{0} reported an error: {1}")]
    ExecutionFailed(&'static str, String),

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<ProviderError>),
}

/// Errors from reading or updating the project manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("No manifest with a version found (looked for package.json, Cargo.toml, pyproject.toml)")]
    NotFound,

    #[error("Failed to update {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Errors from changelog generation.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("No commits found since '{0}'. Nothing to add.")]
    NothingToRelease(String),

    #[error("Failed to read commit log: {0}")]
    Vcs(#[from] VcsError),

    #[error("Failed to generate changelog text: {0}")]
    Generate(#[from] GenerateError),

    #[error("Failed to read changelog: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write changelog: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to create backup: {0}")]
    BackupFailed(#[source] std::io::Error),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}
