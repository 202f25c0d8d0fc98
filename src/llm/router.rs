//! Provider selection and fallback orchestration.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::error::ProviderError;

use super::retry::run_with_retry;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Claude,
    Codex,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Claude => "Claude",
            Provider::Codex => "Codex",
        }
    }

    /// Executable looked up in PATH.
    pub fn binary(&self) -> &'static str {
        match self {
            Provider::Claude => "claude",
            Provider::Codex => "codex",
        }
    }

    pub fn other(&self) -> Provider {
        match self {
            Provider::Claude => Provider::Codex,
            Provider::Codex => Provider::Claude,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary + fallback selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSelection {
    pub primary: Provider,
    pub fallback: Provider,
}

impl ProviderSelection {
    pub fn from_primary(primary: Provider) -> Self {
        Self {
            primary,
            fallback: primary.other(),
        }
    }
}

impl Default for ProviderSelection {
    fn default() -> Self {
        ProviderSelection::from_primary(Provider::Claude)
    }
}

/// Both providers failed.
#[derive(Error, Debug)]
#[error("Both LLM providers failed. {primary} error: {primary_error}. {fallback} error: {fallback_error}.")]
pub struct LlmError {
    pub primary: Provider,
    #[source]
    pub primary_error: ProviderError,
    pub fallback: Provider,
    pub fallback_error: ProviderError,
}

/// Successful generation with the provider that produced it.
#[derive(Debug)]
pub struct LlmCompletion {
    pub output: String,
    pub provider: Provider,
    pub primary_error: Option<ProviderError>,
}

#[async_trait]
trait ProviderRunner: Send + Sync {
    async fn run(&self, provider: Provider, prompt: &str) -> Result<String, ProviderError>;
}

struct SubprocessRunner;

#[async_trait]
impl ProviderRunner for SubprocessRunner {
    async fn run(&self, provider: Provider, prompt: &str) -> Result<String, ProviderError> {
        run_with_retry(provider, prompt).await
    }
}

/// Provider router with fallback and stickiness: once the fallback succeeds
/// it becomes the primary for the rest of the run.
pub struct LlmRouter {
    primary: Provider,
    fallback: Provider,
}

impl LlmRouter {
    pub fn new(selection: ProviderSelection) -> Self {
        Self {
            primary: selection.primary,
            fallback: selection.fallback,
        }
    }

    pub fn primary(&self) -> Provider {
        self.primary
    }

    pub fn fallback(&self) -> Provider {
        self.fallback
    }

    pub async fn generate(&mut self, prompt: &str) -> Result<LlmCompletion, LlmError> {
        self.generate_with(prompt, &SubprocessRunner).await
    }

    async fn generate_with<R: ProviderRunner>(
        &mut self,
        prompt: &str,
        runner: &R,
    ) -> Result<LlmCompletion, LlmError> {
        let primary = self.primary;
        let fallback = self.fallback;

        let primary_error = match runner.run(primary, prompt).await {
            Ok(output) => {
                return Ok(LlmCompletion {
                    output,
                    provider: primary,
                    primary_error: None,
                });
            }
            Err(e) => e,
        };

        warn!("{} failed ({}), falling back to {}", primary, primary_error, fallback);
        eprintln!(
            "\x1b[33m⚠ {} failed, falling back to {}\x1b[0m",
            primary, fallback
        );

        match runner.run(fallback, prompt).await {
            Ok(output) => {
                self.primary = fallback;
                self.fallback = primary;
                Ok(LlmCompletion {
                    output,
                    provider: fallback,
                    primary_error: Some(primary_error),
                })
            }
            Err(fallback_error) => Err(LlmError {
                primary,
                primary_error,
                fallback,
                fallback_error,
            }),
        }
    }
}
