//! Scope detection: which logical unit of the repository a changed file belongs to.

pub mod grouper;
pub mod resolver;

use serde::Deserialize;

pub use grouper::{ScopeGroup, ScopeGroups, group_files};
pub use resolver::ScopeResolver;

/// Scope key for files that belong to no specific scope.
pub const ROOT_SCOPE: &str = ".";

/// How scopes are derived from file paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// `apps/<scope>/...`, `packages/<scope>/...` and friends.
    Monorepo,
    /// `<src_dir>/<scope>/...` under a single source root.
    #[default]
    Traditional,
}

/// Scope detection settings (`[commit.scope]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub mode: ScopeMode,
    /// Source root for traditional mode. Defaults to `src` when unset.
    pub src_dir: Option<String>,
    /// Top-level package directories for monorepo mode, in match order.
    pub directories: Vec<String>,
    /// File names directly under the source root that never form a scope.
    pub entry_files: Vec<String>,
}

impl ScopeConfig {
    pub fn monorepo() -> Self {
        Self {
            mode: ScopeMode::Monorepo,
            ..Self::default()
        }
    }

    pub fn traditional(src_dir: &str) -> Self {
        Self {
            mode: ScopeMode::Traditional,
            src_dir: Some(src_dir.to_string()),
            ..Self::default()
        }
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            mode: ScopeMode::default(),
            src_dir: None,
            directories: ["apps", "packages", "functions"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            entry_files: ["index.ts", "index.js", "main.rs", "lib.rs"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}
