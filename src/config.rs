//! `codebuddy.toml` loading.
//!
//! A missing file yields defaults. An unreadable or malformed file is fatal.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::llm::Provider;
use crate::scope::{ScopeConfig, ScopeMode};
use crate::transform::{IssueConfig, TransformConfig};

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "codebuddy.toml";

/// Diffs at or above this many characters trigger file selection.
pub const DEFAULT_MAX_DIFF_SIZE: usize = 20_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub commit: CommitSection,
    pub diff: DiffConfig,
    pub changelog: ChangelogConfig,
    pub llm: LlmConfig,
}

/// `[commit]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommitSection {
    /// Literal removed from every scope, e.g. a package name prefix.
    pub scope_trim: Option<String>,
    pub issue: IssueConfig,
    pub format: FormatConfig,
    pub scope: ScopeConfig,
}

/// `[commit.format]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub sentence_case: bool,
    pub use_emoji: bool,
}

/// `[diff]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub max_size: usize,
    /// Paths never sent to the generator (exact match).
    pub exclude: Vec<String>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_DIFF_SIZE,
            exclude: Vec::new(),
        }
    }
}

/// `[changelog]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Baseline branch the changelog is computed against.
    pub destination: String,
    /// Name used in single-repo changelog prompts.
    pub app_name: String,
    pub path: PathBuf,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            destination: "main".to_string(),
            app_name: "CodeBuddy".to_string(),
            path: PathBuf::from("CHANGELOG.md"),
        }
    }
}

/// `[llm]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Primary provider; the other one is the fallback.
    pub provider: Option<Provider>,
    /// Generate/review rounds per scope. 0 means unbounded.
    pub max_message_attempts: u32,
}

impl Config {
    /// Load `path`, or `codebuddy.toml` in `dir` when no path is given.
    ///
    /// An explicit path must exist; the default file may be absent.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = dir.join(CONFIG_FILE_NAME);
                match fs::read_to_string(&path) {
                    Ok(contents) => Self::parse(&contents, &path),
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                        Ok(Self::default())
                    }
                    Err(source) => Err(ConfigError::ReadFailed { path, source }),
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(contents).map_err(|e| ConfigError::ParseFailed {
                path: path.to_path_buf(),
                source: Box::new(e),
            })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig {
            issue: self.commit.issue.clone(),
            sentence_case: self.commit.format.sentence_case,
            use_emoji: self.commit.format.use_emoji,
            scope_trim: self.commit.scope_trim.clone(),
        }
    }

    pub fn is_monorepo(&self) -> bool {
        self.commit.scope.mode == ScopeMode::Monorepo
    }

    /// `None` when attempts are unbounded.
    pub fn max_message_attempts(&self) -> Option<u32> {
        (self.llm.max_message_attempts > 0).then_some(self.llm.max_message_attempts)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::{NamedTempFile, TempDir};

    use super::*;
    use crate::transform::IssuePolicy;

    #[test]
    fn test_missing_default_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.changelog.destination, "main");
        assert_eq!(config.changelog.app_name, "CodeBuddy");
        assert_eq!(config.diff.max_size, DEFAULT_MAX_DIFF_SIZE);
        assert_eq!(config.max_message_attempts(), None);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[commit\nbroken").unwrap();
        let err = Config::load(None, dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { .. }));
    }

    #[test]
    fn test_unknown_enum_value_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[commit.scope]\nmode = \"galaxy\"").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { .. }));
    }

    #[test]
    fn test_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[commit]
scope_trim = "inspace-"

[commit.issue]
policy = "detect-from-branch"
key_regex = "IN-\\d+"
fallback_key = "no-key"

[commit.format]
sentence_case = true
use_emoji = true

[commit.scope]
mode = "monorepo"
directories = ["apps", "services"]

[diff]
max_size = 5000
exclude = ["package-lock.json"]

[changelog]
destination = "develop"
app_name = "Inspace"

[llm]
provider = "codex"
max_message_attempts = 3
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.commit.scope_trim.as_deref(), Some("inspace-"));
        assert_eq!(config.commit.issue.policy, IssuePolicy::DetectFromBranch);
        assert_eq!(config.commit.issue.key_regex, "IN-\\d+");
        assert_eq!(config.commit.issue.fallback_key.as_deref(), Some("no-key"));
        assert!(config.commit.format.sentence_case);
        assert!(config.commit.format.use_emoji);
        assert!(config.is_monorepo());
        assert_eq!(config.commit.scope.directories, vec!["apps", "services"]);
        // Unset fields keep their defaults
        assert!(config.commit.scope.entry_files.contains(&"index.ts".to_string()));
        assert_eq!(config.diff.max_size, 5000);
        assert_eq!(config.diff.exclude, vec!["package-lock.json"]);
        assert_eq!(config.changelog.destination, "develop");
        assert_eq!(config.changelog.app_name, "Inspace");
        assert_eq!(config.changelog.path, PathBuf::from("CHANGELOG.md"));
        assert_eq!(config.llm.provider, Some(Provider::Codex));
        assert_eq!(config.max_message_attempts(), Some(3));

        let transform = config.transform_config();
        assert!(transform.sentence_case);
        assert_eq!(transform.scope_trim.as_deref(), Some("inspace-"));
    }
}
