//! Conventional commit message record.
//!
//! Messages stay structured while transforms run and are rendered to text
//! only when they are shown to the user or committed.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::scope::ROOT_SCOPE;

/// Marker rendered after the summary of a breaking change.
pub const BREAKING_MARKER: &str = "BREAKING";

/// Conventional commit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Chore,
    Revert,
}

impl CommitType {
    pub const ALL: [CommitType; 11] = [
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Docs,
        CommitType::Style,
        CommitType::Refactor,
        CommitType::Perf,
        CommitType::Test,
        CommitType::Build,
        CommitType::Ci,
        CommitType::Chore,
        CommitType::Revert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Perf => "perf",
            CommitType::Test => "test",
            CommitType::Build => "build",
            CommitType::Ci => "ci",
            CommitType::Chore => "chore",
            CommitType::Revert => "revert",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            CommitType::Feat => "🎉",
            CommitType::Fix => "🐛",
            CommitType::Docs => "📚",
            CommitType::Style => "💄",
            CommitType::Refactor => "🧹",
            CommitType::Perf => "🚀",
            CommitType::Test => "🧪",
            CommitType::Build => "🏗️",
            CommitType::Ci => "🤖",
            CommitType::Chore => "🧹",
            CommitType::Revert => "⏪",
        }
    }

    /// One-line guidance used when the type is forced on the generator.
    pub fn description(&self) -> &'static str {
        match self {
            CommitType::Feat => "A new feature",
            CommitType::Fix => "A bug fix",
            CommitType::Docs => "Documentation or code comment changes only",
            CommitType::Style => {
                "Changes that do not affect the meaning of the code (white-space, formatting, missing semi-colons, etc)"
            }
            CommitType::Refactor => "A code change that neither fixes a bug nor adds a feature",
            CommitType::Perf => "A code change that improves performance",
            CommitType::Test => "Adding missing tests or correcting existing tests",
            CommitType::Build => {
                "Changes that affect the build system or external dependencies"
            }
            CommitType::Ci => "Changes to CI configuration files and scripts",
            CommitType::Chore => {
                "Changes to the build process or auxiliary tools and libraries"
            }
            CommitType::Revert => "Reverts a previous commit",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        CommitType::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("Unknown commit type: {}", s))
    }
}

/// A commit message broken into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitMessage {
    /// Kept as text so generator output with an unknown type still renders.
    pub commit_type: String,
    pub scope: Option<String>,
    pub summary: String,
    pub description: Option<String>,
    pub breaking: bool,
    pub issue_key: Option<String>,
    pub emoji: Option<String>,
}

impl CommitMessage {
    pub fn new(commit_type: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            commit_type: commit_type.into(),
            summary: summary.into(),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    pub fn kind(&self) -> Option<CommitType> {
        self.commit_type.parse().ok()
    }

    /// Scope as rendered: `None` for the root scope.
    pub fn visible_scope(&self) -> Option<&str> {
        self.scope
            .as_deref()
            .filter(|s| !s.is_empty() && *s != ROOT_SCOPE)
    }

    pub fn is_empty(&self) -> bool {
        self.summary.trim().is_empty()
    }

    /// `type(scope): [emoji ]summary[ BREAKING][ [KEY]]`
    pub fn header(&self) -> String {
        let mut header = self.commit_type.clone();
        if let Some(scope) = self.visible_scope() {
            header.push('(');
            header.push_str(scope);
            header.push(')');
        }
        header.push_str(": ");
        if let Some(emoji) = &self.emoji {
            header.push_str(emoji);
            header.push(' ');
        }
        header.push_str(self.summary.trim());
        if self.breaking {
            header.push(' ');
            header.push_str(BREAKING_MARKER);
        }
        if let Some(key) = &self.issue_key {
            header.push_str(" [");
            header.push_str(key);
            header.push(']');
        }
        header
    }

    /// Parse a rendered message. Returns `None` when the first line is not
    /// a conventional commit header.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (first_line, rest) = match text.split_once('\n') {
            Some((first, rest)) => (first.trim_end(), rest),
            None => (text, ""),
        };

        let caps = header_pattern().captures(first_line)?;
        let commit_type = caps.get(1)?.as_str().to_string();
        let scope = caps.get(2).map(|m| m.as_str().trim().to_string());
        let bang = caps.get(3).is_some();
        let mut summary = caps.get(4).map_or("", |m| m.as_str()).trim().to_string();

        let mut issue_key = None;
        if let Some(key_caps) = trailing_key_pattern().captures(&summary) {
            issue_key = key_caps.get(1).map(|m| m.as_str().to_string());
            let start = key_caps.get(0).map_or(summary.len(), |m| m.start());
            summary.truncate(start);
            summary = summary.trim_end().to_string();
        }

        let mut breaking = bang;
        if let Some(stripped) = summary.strip_suffix(BREAKING_MARKER) {
            if stripped.is_empty() || stripped.ends_with(' ') {
                breaking = true;
                summary = stripped.trim_end().to_string();
            }
        }

        let mut emoji = None;
        for candidate in CommitType::ALL.iter().map(|t| t.emoji()) {
            if let Some(stripped) = summary.strip_prefix(candidate) {
                emoji = Some(candidate.to_string());
                summary = stripped.trim_start().to_string();
                break;
            }
        }

        let body = rest.trim();
        let description = (!body.is_empty()).then(|| body.to_string());

        Some(Self {
            commit_type,
            scope,
            summary,
            description,
            breaking,
            issue_key,
            emoji,
        })
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header())?;
        if let Some(description) = &self.description {
            let description = description.trim();
            if !description.is_empty() {
                write!(f, "\n\n{}", description)?;
            }
        }
        Ok(())
    }
}

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\w+)(?:\(([^)]*)\))?(!)?\s*:\s*(.*)$").unwrap_or_else(|e| {
            unreachable!("static header pattern is valid: {e}")
        })
    })
}

fn trailing_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\s*\[([^\[\]\s]+)\]$")
            .unwrap_or_else(|e| unreachable!("static issue key pattern is valid: {e}"))
    })
}
