//! codebuddy - commit pending changes scope by scope with LLM-generated
//! conventional commit messages.
//!
//! # Overview
//!
//! `cb commit-all` partitions the working tree's changes into scopes
//! (monorepo packages or source folders), asks Claude or Codex for one
//! conventional commit message per scope, applies the configured text
//! transforms and lets the user review each message before committing.
//! `cb changelog` turns the commits since a baseline branch into a changelog
//! section and bumps the project version accordingly.

pub mod changelog;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod manifest;
pub mod message;
pub mod prompt;
pub mod scope;
pub mod transform;

// Re-export commonly used types
pub use commit::{CommitArgs, CommitOrchestrator, RetryPolicy, RunReport};
pub use config::Config;
pub use error::{ChangelogError, ConfigError, GenerateError, ScopeError, VcsError};
pub use git::{GitSession, VersionControl};
pub use llm::{LlmGenerator, MessageGenerator};
pub use message::{CommitMessage, CommitType};
pub use prompt::{DialoguerPrompter, Prompter};
pub use scope::{ROOT_SCOPE, ScopeResolver};
