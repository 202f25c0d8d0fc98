//! Deterministic message transforms applied after generation.
//!
//! Stages run in a fixed order: issue key, sentence case, scope trim, emoji.
//! Disabled stages are never built.

use regex_lite::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::git::VersionControl;
use crate::message::CommitMessage;
use crate::prompt::Prompter;

/// Default pattern for issue keys such as `ABC-123`.
pub const DEFAULT_KEY_REGEX: &str = r"[A-Za-z]+-\d+";

/// Where the issue key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssuePolicy {
    #[default]
    Off,
    /// Match `key_regex` against the current branch name.
    DetectFromBranch,
    /// Ask the user for every message.
    PromptUser,
}

/// Issue key settings (`[commit.issue]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IssueConfig {
    pub policy: IssuePolicy,
    pub key_regex: String,
    pub fallback_key: Option<String>,
}

impl Default for IssueConfig {
    fn default() -> Self {
        Self {
            policy: IssuePolicy::Off,
            key_regex: DEFAULT_KEY_REGEX.to_string(),
            fallback_key: None,
        }
    }
}

/// Which transforms run and with what parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformConfig {
    pub issue: IssueConfig,
    pub sentence_case: bool,
    pub use_emoji: bool,
    pub scope_trim: Option<String>,
}

#[derive(Debug, Clone)]
enum Stage {
    IssueKey {
        policy: IssuePolicy,
        pattern: Regex,
        fallback: Option<String>,
    },
    SentenceCase,
    ScopeTrim(String),
    Emoji,
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::IssueKey { .. } => "issue-key",
            Stage::SentenceCase => "sentence-case",
            Stage::ScopeTrim(_) => "scope-trim",
            Stage::Emoji => "emoji",
        }
    }
}

/// Ordered list of enabled transforms.
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    stages: Vec<Stage>,
    issue_override: Option<String>,
}

impl TransformPipeline {
    pub fn from_config(config: &TransformConfig) -> Result<Self, ConfigError> {
        let mut stages = Vec::new();

        if config.issue.policy != IssuePolicy::Off {
            stages.push(Stage::IssueKey {
                policy: config.issue.policy,
                pattern: compile_key_regex(&config.issue.key_regex)?,
                fallback: non_empty(config.issue.fallback_key.as_deref()),
            });
        }

        if config.sentence_case {
            stages.push(Stage::SentenceCase);
        }

        if let Some(literal) = non_empty(config.scope_trim.as_deref()) {
            stages.push(Stage::ScopeTrim(literal));
        }

        if config.use_emoji {
            stages.push(Stage::Emoji);
        }

        Ok(Self {
            stages,
            issue_override: None,
        })
    }

    /// Force the issue key, bypassing branch detection and prompts.
    pub fn with_issue_override(mut self, key: Option<String>) -> Self {
        let Some(key) = non_empty(key.as_deref()) else {
            return self;
        };

        if !self.stages.iter().any(|s| matches!(s, Stage::IssueKey { .. })) {
            self.stages.insert(
                0,
                Stage::IssueKey {
                    policy: IssuePolicy::Off,
                    pattern: default_key_regex(),
                    fallback: None,
                },
            );
        }
        self.issue_override = Some(key);
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every enabled stage over `message`.
    pub async fn apply<V, P>(
        &self,
        mut message: CommitMessage,
        vcs: &V,
        prompter: &P,
    ) -> CommitMessage
    where
        V: VersionControl + ?Sized,
        P: Prompter + ?Sized,
    {
        for stage in &self.stages {
            match stage {
                Stage::IssueKey {
                    policy,
                    pattern,
                    fallback,
                } => {
                    let key = match &self.issue_override {
                        Some(key) => Some(key.clone()),
                        None => lookup_issue_key(*policy, pattern, vcs, prompter)
                            .await
                            .or_else(|| fallback.clone()),
                    };
                    match key {
                        Some(key) => message.issue_key = Some(key),
                        None => debug!("No issue key found, leaving message unchanged"),
                    }
                }
                Stage::SentenceCase => {
                    message.summary = sentence_case(&message.summary);
                }
                Stage::ScopeTrim(literal) => {
                    message.scope = message
                        .scope
                        .take()
                        .map(|scope| scope.replace(literal.as_str(), ""))
                        .filter(|scope| !scope.trim().is_empty());
                }
                Stage::Emoji => match message.kind() {
                    Some(kind) => message.emoji = Some(kind.emoji().to_string()),
                    None => debug!(
                        "No emoji for commit type '{}', skipping",
                        message.commit_type
                    ),
                },
            }
        }

        message
    }
}

async fn lookup_issue_key<V, P>(
    policy: IssuePolicy,
    pattern: &Regex,
    vcs: &V,
    prompter: &P,
) -> Option<String>
where
    V: VersionControl + ?Sized,
    P: Prompter + ?Sized,
{
    match policy {
        IssuePolicy::Off => None,
        IssuePolicy::DetectFromBranch => match vcs.current_branch().await {
            Ok(branch) => {
                let key = pattern.find(&branch).map(|m| m.as_str().to_string());
                debug!("Branch '{}' issue key: {:?}", branch, key);
                key
            }
            Err(e) => {
                warn!("Could not read branch name for issue key: {}", e);
                None
            }
        },
        IssuePolicy::PromptUser => match prompter.issue_key() {
            Ok(key) => non_empty(key.as_deref()),
            Err(e) => {
                warn!("Issue key prompt failed: {}", e);
                None
            }
        },
    }
}

/// Lowercase the first character when it is uppercase.
pub fn sentence_case(summary: &str) -> String {
    let mut chars = summary.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => first.to_lowercase().chain(chars).collect(),
        _ => summary.to_string(),
    }
}

fn compile_key_regex(source: &str) -> Result<Regex, ConfigError> {
    Regex::new(source).map_err(|e| ConfigError::InvalidRegex {
        field: "commit.issue.key_regex",
        pattern: source.to_string(),
        reason: e.to_string(),
    })
}

fn default_key_regex() -> Regex {
    Regex::new(DEFAULT_KEY_REGEX)
        .unwrap_or_else(|e| unreachable!("default issue key pattern is valid: {e}"))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
