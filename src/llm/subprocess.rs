//! Claude and Codex CLI spawning.

use std::env;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::ProviderError;

use super::router::Provider;

/// Default timeout for a provider subprocess (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable overriding the timeout, in seconds.
pub const TIMEOUT_ENV_VAR: &str = "CB_LLM_TIMEOUT";

/// Read the timeout from `CB_LLM_TIMEOUT`, warning on unusable values.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Fail fast when the provider's CLI is not on PATH.
pub fn check_installed(provider: Provider) -> Result<(), ProviderError> {
    which::which(provider.binary())
        .map(|_| ())
        .map_err(|_| ProviderError::NotInstalled(provider.binary()))
}

/// Run a provider once and return its text answer.
///
/// Claude: `claude -p <prompt> --output-format json`, unwrapping the
/// `{result, is_error}` envelope. Codex: `codex exec <prompt>`, stdout as is.
pub async fn run_provider(provider: Provider, prompt: &str) -> Result<String, ProviderError> {
    let mut cmd = Command::new(provider.binary());
    match provider {
        Provider::Claude => {
            cmd.arg("-p").arg(prompt).arg("--output-format").arg("json");
        }
        Provider::Codex => {
            cmd.arg("exec").arg(prompt);
        }
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let stdout = run_command(provider.as_str(), cmd).await?;

    match provider {
        Provider::Claude => unwrap_claude_envelope(&stdout),
        Provider::Codex => Ok(stdout),
    }
}

async fn run_command(provider: &'static str, mut cmd: Command) -> Result<String, ProviderError> {
    let timeout_duration = get_timeout();
    let secs = timeout_duration.as_secs();

    debug!("Running {} with a {}s timeout", provider, secs);

    let output = timeout(timeout_duration, cmd.output())
        .await
        .map_err(|_| ProviderError::Timeout { provider, secs })?
        .map_err(|source| ProviderError::SpawnFailed { provider, source })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let code = output.status.code().unwrap_or(-1);
        return Err(ProviderError::NonZeroExit {
            provider,
            code,
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Claude CLI JSON envelope when using `--output-format json`.
#[derive(Deserialize)]
struct ClaudeEnvelope {
    result: String,
    #[serde(default)]
    is_error: bool,
}

fn unwrap_claude_envelope(stdout: &str) -> Result<String, ProviderError> {
    match serde_json::from_str::<ClaudeEnvelope>(stdout) {
        Ok(envelope) if envelope.is_error => {
            Err(ProviderError::ExecutionFailed("Claude", envelope.result))
        }
        Ok(envelope) => Ok(envelope.result),
        // Older CLIs print the answer directly
        Err(_) => Ok(stdout.to_string()),
    }
}
