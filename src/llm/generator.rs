//! Message generation behind a mockable trait.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::GenerateError;
use crate::message::{CommitMessage, CommitType};
use crate::scope::ROOT_SCOPE;

use super::json::parse_json;
use super::prompt::{build_changelog_prompt, build_commit_prompt};
use super::router::{LlmRouter, ProviderSelection};

/// Everything the generator knows about one scope's changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRequest {
    pub diff: String,
    pub scope: String,
    pub files: Vec<String>,
    /// Forced type; the generator picks one when `None`.
    pub commit_type: Option<CommitType>,
    pub reason: Option<String>,
}

/// How the changelog groups entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogStyle {
    /// One section per scope, each with its own increment.
    Monorepo,
    SingleRepo { app_name: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate_commit_message(
        &self,
        request: &MessageRequest,
    ) -> Result<CommitMessage, GenerateError>;

    /// Markdown changelog section, including a `## +x.y.z` increment marker.
    async fn generate_changelog_text(
        &self,
        log: &str,
        style: ChangelogStyle,
    ) -> Result<String, GenerateError>;
}

/// JSON answer requested by the commit prompt.
#[derive(Debug, Deserialize)]
struct GeneratedMessage {
    #[serde(rename = "type", default)]
    commit_type: Option<String>,
    summary: String,
    #[serde(default)]
    description: Option<String>,
}

/// Generator backed by the Claude/Codex CLIs.
pub struct LlmGenerator {
    router: Mutex<LlmRouter>,
}

impl LlmGenerator {
    pub fn new(selection: ProviderSelection) -> Self {
        Self {
            router: Mutex::new(LlmRouter::new(selection)),
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerateError> {
        debug!("Prompt is {} characters", prompt.len());
        let mut router = self.router.lock().await;
        let completion = router.generate(prompt).await?;
        if let Some(primary_error) = &completion.primary_error {
            debug!(
                "Answered by {} after primary failed: {}",
                completion.provider, primary_error
            );
        }
        Ok(completion.output)
    }
}

#[async_trait]
impl MessageGenerator for LlmGenerator {
    async fn generate_commit_message(
        &self,
        request: &MessageRequest,
    ) -> Result<CommitMessage, GenerateError> {
        let output = self.complete(&build_commit_prompt(request)).await?;
        parse_commit_answer(&output, request)
    }

    async fn generate_changelog_text(
        &self,
        log: &str,
        style: ChangelogStyle,
    ) -> Result<String, GenerateError> {
        let output = self.complete(&build_changelog_prompt(log, &style)).await?;
        let text = strip_markdown_fence(&output);
        if text.is_empty() {
            return Err(GenerateError::Empty);
        }
        Ok(text)
    }
}

/// Turn the provider's answer into a message for `request.scope`.
///
/// Prefers the requested JSON; accepts a plain conventional commit as well
/// since Codex sometimes ignores the format instruction.
fn parse_commit_answer(
    output: &str,
    request: &MessageRequest,
) -> Result<CommitMessage, GenerateError> {
    let mut message = match parse_json::<GeneratedMessage>(output) {
        Ok(answer) => {
            let commit_type = answer
                .commit_type
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .or_else(|| request.commit_type.map(|t| t.to_string()))
                .unwrap_or_else(|| CommitType::Chore.to_string());
            CommitMessage::new(commit_type, answer.summary.trim())
                .with_description(answer.description.unwrap_or_default())
        }
        Err(json_error) => match CommitMessage::parse(output) {
            Some(parsed) => parsed,
            None => {
                warn!("Unparseable generator output: {}", json_error);
                return Err(GenerateError::InvalidResponse(json_error));
            }
        },
    };

    if message.is_empty() {
        return Err(GenerateError::Empty);
    }

    message.scope = (request.scope != ROOT_SCOPE).then(|| request.scope.clone());
    Ok(message)
}

fn strip_markdown_fence(output: &str) -> String {
    let trimmed = output.trim();
    let inner = trimmed
        .strip_prefix("```markdown")
        .or_else(|| trimmed.strip_prefix("```md"))
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"));
    inner.unwrap_or(trimmed).trim().to_string()
}
