//! Path → scope key strategies.

use regex_lite::Regex;

use crate::error::ConfigError;

use super::{ROOT_SCOPE, ScopeConfig, ScopeMode};

/// Default source root for traditional mode.
const DEFAULT_SRC_DIR: &str = "src";

/// A compiled scope detection strategy.
#[derive(Debug, Clone)]
pub enum ScopeResolver {
    /// Matches `^(?:dir1/([^/]+)|dir2/([^/]+)|...)`. `None` when the
    /// directory list was empty.
    Monorepo { pattern: Option<Regex> },
    Traditional {
        src_dir: String,
        entry_files: Vec<String>,
    },
}

impl ScopeResolver {
    /// Build the strategy selected by `config.mode`.
    pub fn from_config(config: &ScopeConfig) -> Result<Self, ConfigError> {
        match config.mode {
            ScopeMode::Monorepo => {
                let alternatives: Vec<String> = config
                    .directories
                    .iter()
                    .map(|d| d.trim_matches('/'))
                    .filter(|d| !d.is_empty())
                    .map(|d| format!("{}/([^/]+)", regex_lite::escape(d)))
                    .collect();

                if alternatives.is_empty() {
                    return Ok(ScopeResolver::Monorepo { pattern: None });
                }

                let source = format!("^(?:{})", alternatives.join("|"));
                let pattern = Regex::new(&source).map_err(|e| ConfigError::InvalidRegex {
                    field: "commit.scope.directories",
                    pattern: source.clone(),
                    reason: e.to_string(),
                })?;

                Ok(ScopeResolver::Monorepo {
                    pattern: Some(pattern),
                })
            }
            ScopeMode::Traditional => Ok(ScopeResolver::Traditional {
                src_dir: config
                    .src_dir
                    .clone()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_SRC_DIR.to_string()),
                entry_files: config.entry_files.clone(),
            }),
        }
    }

    /// Resolve the scope of a single path.
    ///
    /// Monorepo mode returns `None` for paths outside every package directory;
    /// traditional mode always yields a scope, falling back to [`ROOT_SCOPE`].
    pub fn resolve(&self, path: &str) -> Option<String> {
        match self {
            ScopeResolver::Monorepo { pattern } => {
                let caps = pattern.as_ref()?.captures(path)?;
                caps.iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str())
                    .find(|s| !s.is_empty())
                    .map(str::to_string)
            }
            ScopeResolver::Traditional {
                src_dir,
                entry_files,
            } => {
                let segments: Vec<&str> = path.split('/').collect();
                let scope = segments
                    .iter()
                    .position(|s| *s == src_dir.as_str())
                    .and_then(|idx| segments.get(idx + 1).copied())
                    .filter(|next| {
                        !next.is_empty() && !entry_files.iter().any(|e| e.as_str() == *next)
                    });

                Some(scope.unwrap_or(ROOT_SCOPE).to_string())
            }
        }
    }
}
