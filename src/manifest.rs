//! Project manifest detection and version updates.
//!
//! Supports package.json, Cargo.toml and pyproject.toml (PEP 621 + Poetry).

use std::fmt;
use std::path::{Path, PathBuf};

use semver::Version;
use tracing::debug;

use crate::error::ManifestError;

/// The kind of manifest detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    PackageJson,
    CargoToml,
    PyprojectToml,
}

impl ManifestKind {
    /// Lookup order when several manifests exist.
    const ALL: [ManifestKind; 3] = [
        ManifestKind::PackageJson,
        ManifestKind::CargoToml,
        ManifestKind::PyprojectToml,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestKind::PackageJson => "package.json",
            ManifestKind::CargoToml => "Cargo.toml",
            ManifestKind::PyprojectToml => "pyproject.toml",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A manifest carrying the project version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub path: PathBuf,
    pub kind: ManifestKind,
    pub version: Version,
}

impl Manifest {
    /// Find the first manifest in `root` that declares a version.
    ///
    /// A manifest without a version field is passed over; one whose version
    /// is not valid semver is an error.
    pub fn detect(root: &Path) -> Result<Self, ManifestError> {
        for kind in ManifestKind::ALL {
            let path = root.join(kind.file_name());
            if !path.exists() {
                continue;
            }

            let content = read_file(&path)?;
            let Some(raw) = read_version(kind, &path, &content)? else {
                debug!("{} has no version field, skipping", path.display());
                continue;
            };

            let version = Version::parse(raw.trim()).map_err(|e| ManifestError::Invalid {
                path: path.clone(),
                reason: format!("Version '{}' is not semver: {}", raw, e),
            })?;

            debug!("Using {} at version {}", kind, version);
            return Ok(Self {
                path,
                kind,
                version,
            });
        }

        Err(ManifestError::NotFound)
    }

    /// Rewrite the manifest's version field, preserving the rest of the file.
    pub fn write_version(&self, new_version: &Version) -> Result<(), ManifestError> {
        let content = read_file(&self.path)?;
        let updated = match self.kind {
            ManifestKind::PackageJson => update_package_json(&self.path, &content, new_version)?,
            ManifestKind::CargoToml => update_cargo_toml(&self.path, &content, new_version)?,
            ManifestKind::PyprojectToml => update_pyproject_toml(&self.path, &content, new_version)?,
        };
        std::fs::write(&self.path, updated).map_err(|e| ManifestError::Invalid {
            path: self.path.clone(),
            reason: format!("Failed to write: {}", e),
        })
    }
}

fn read_version(
    kind: ManifestKind,
    path: &Path,
    content: &str,
) -> Result<Option<String>, ManifestError> {
    let version = match kind {
        ManifestKind::PackageJson => parse_json(path, content)?
            .get("version")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        ManifestKind::CargoToml => parse_toml(path, content)?
            .get("package")
            .and_then(|p| p.get("version"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        ManifestKind::PyprojectToml => {
            let doc = parse_toml(path, content)?;
            // PEP 621 first, then Poetry
            doc.get("project")
                .and_then(|p| p.get("version"))
                .and_then(|v| v.as_str())
                .or_else(|| {
                    doc.get("tool")
                        .and_then(|t| t.get("poetry"))
                        .and_then(|p| p.get("version"))
                        .and_then(|v| v.as_str())
                })
                .map(str::to_string)
        }
    };
    Ok(version)
}

// --- package.json ---

fn update_package_json(
    path: &Path,
    content: &str,
    new_version: &Version,
) -> Result<String, ManifestError> {
    let mut json = parse_json(path, content)?;
    let Some(object) = json.as_object_mut() else {
        return Err(ManifestError::Invalid {
            path: path.to_path_buf(),
            reason: "Top-level value is not an object".into(),
        });
    };
    object.insert(
        "version".to_string(),
        serde_json::Value::String(new_version.to_string()),
    );

    let output = serde_json::to_string_pretty(&json).map_err(|e| ManifestError::Invalid {
        path: path.to_path_buf(),
        reason: format!("Failed to serialize JSON: {}", e),
    })?;

    // npm keeps a trailing newline
    Ok(format!("{}\n", output))
}

// --- Cargo.toml ---

fn update_cargo_toml(
    path: &Path,
    content: &str,
    new_version: &Version,
) -> Result<String, ManifestError> {
    let mut doc = parse_toml(path, content)?;
    if doc.get("package").and_then(|p| p.get("version")).is_none() {
        return Err(ManifestError::Invalid {
            path: path.to_path_buf(),
            reason: "No version field found in [package]".into(),
        });
    }
    doc["package"]["version"] = toml_edit::value(new_version.to_string());
    Ok(doc.to_string())
}

// --- pyproject.toml ---

fn update_pyproject_toml(
    path: &Path,
    content: &str,
    new_version: &Version,
) -> Result<String, ManifestError> {
    let mut doc = parse_toml(path, content)?;

    if doc.get("project").and_then(|p| p.get("version")).is_some() {
        doc["project"]["version"] = toml_edit::value(new_version.to_string());
    } else if doc
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("version"))
        .is_some()
    {
        doc["tool"]["poetry"]["version"] = toml_edit::value(new_version.to_string());
    } else {
        return Err(ManifestError::Invalid {
            path: path.to_path_buf(),
            reason: "No version field found in [project] or [tool.poetry]".into(),
        });
    }

    Ok(doc.to_string())
}

// --- Shared helpers ---

fn parse_json(path: &Path, content: &str) -> Result<serde_json::Value, ManifestError> {
    serde_json::from_str(content).map_err(|e| ManifestError::Invalid {
        path: path.to_path_buf(),
        reason: format!("Invalid JSON: {}", e),
    })
}

fn parse_toml(path: &Path, content: &str) -> Result<toml_edit::DocumentMut, ManifestError> {
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| ManifestError::Invalid {
            path: path.to_path_buf(),
            reason: format!("Invalid TOML: {}", e),
        })
}

fn read_file(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|e| ManifestError::Invalid {
        path: path.to_path_buf(),
        reason: format!("Failed to read: {}", e),
    })
}
