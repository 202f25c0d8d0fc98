//! Changelog generation: commit log → generated section → version bump.

pub mod directive;
pub mod inject;

use std::io::Write;
use std::path::{Path, PathBuf};

use semver::Version;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::ChangelogError;
use crate::git::{VersionControl, log::render_log};
use crate::llm::{ChangelogStyle, MessageGenerator};
use crate::manifest::{Manifest, ManifestKind};

pub use directive::{Bump, IncrementDirective, next_version};
pub use inject::{DEFAULT_HEADER, inject_section, strip_title};

/// Where and how the changelog is written.
#[derive(Debug, Clone)]
pub struct ChangelogSettings {
    pub style: ChangelogStyle,
    pub changelog_path: PathBuf,
    /// Directory searched for package.json, Cargo.toml or pyproject.toml.
    pub manifest_root: PathBuf,
    /// Compute everything, write nothing.
    pub dry_run: bool,
}

/// Result of one changelog run.
#[derive(Debug, Clone)]
pub struct ChangelogReport {
    pub commit_count: usize,
    pub increment: Option<IncrementDirective>,
    pub manifest: ManifestKind,
    pub current_version: Version,
    pub new_version: Version,
    /// Section as inserted, with the marker replaced.
    pub section: String,
    pub backup_path: Option<PathBuf>,
    pub written: bool,
}

impl ChangelogReport {
    pub fn bumped(&self) -> bool {
        self.new_version != self.current_version
    }
}

pub struct ChangelogAssembler<'a, V: ?Sized, G: ?Sized> {
    vcs: &'a V,
    generator: &'a G,
    settings: ChangelogSettings,
}

impl<'a, V, G> ChangelogAssembler<'a, V, G>
where
    V: VersionControl + ?Sized,
    G: MessageGenerator + ?Sized,
{
    pub fn new(vcs: &'a V, generator: &'a G, settings: ChangelogSettings) -> Self {
        Self {
            vcs,
            generator,
            settings,
        }
    }

    /// Build a section from the commits on HEAD that `destination` lacks.
    pub async fn generate(&self, destination: &str) -> Result<ChangelogReport, ChangelogError> {
        let commits = self.vcs.commit_log(destination).await?;
        if commits.is_empty() {
            return Err(ChangelogError::NothingToRelease(destination.to_string()));
        }
        info!("{} commits since {}", commits.len(), destination);

        let log = render_log(&commits);
        let text = self
            .generator
            .generate_changelog_text(&log, self.settings.style.clone())
            .await?;

        let text = strip_title(&text);
        let increment = IncrementDirective::parse(text);
        let bump = increment.and_then(|d| d.bump());
        if increment.is_none() {
            warn!("Generated changelog has no '+x.y.z' marker, version stays unchanged");
        }

        let manifest = Manifest::detect(&self.settings.manifest_root)?;
        let new_version = next_version(&manifest.version, bump);

        println!("📦 Current version: {}", manifest.version);
        match increment {
            Some(directive) => println!("📦 Increment: {}", directive),
            None => println!("📦 Increment: none"),
        }
        println!("📦 New version: {}", new_version);

        let section = IncrementDirective::replace_in(text, &new_version);
        let existing = read_changelog(&self.settings.changelog_path)?;
        let updated = inject_section(
            existing.as_deref().unwrap_or(DEFAULT_HEADER),
            &section,
        );

        let mut report = ChangelogReport {
            commit_count: commits.len(),
            increment,
            manifest: manifest.kind,
            current_version: manifest.version.clone(),
            new_version: new_version.clone(),
            section,
            backup_path: None,
            written: false,
        };

        if self.settings.dry_run {
            debug!("Dry run, leaving {} untouched", self.settings.changelog_path.display());
            return Ok(report);
        }

        if existing.is_some() {
            let backup = backup_path(&self.settings.changelog_path);
            std::fs::copy(&self.settings.changelog_path, &backup)
                .map_err(ChangelogError::BackupFailed)?;
            report.backup_path = Some(backup);
        }

        // Manifest first: a failed manifest write leaves the changelog as it was
        if report.bumped() {
            manifest.write_version(&new_version)?;
        }
        if let Err(e) = write_atomic(&self.settings.changelog_path, &updated) {
            if report.bumped() {
                if let Err(restore) = manifest.write_version(&manifest.version) {
                    warn!(
                        "Could not restore {} to {}: {}",
                        manifest.path.display(),
                        manifest.version,
                        restore
                    );
                }
            }
            return Err(e);
        }
        report.written = true;

        Ok(report)
    }
}

/// `CHANGELOG.md` → `CHANGELOG.md.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

fn read_changelog(path: &Path) -> Result<Option<String>, ChangelogError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} does not exist, starting a new one", path.display());
            Ok(None)
        }
        Err(e) => Err(ChangelogError::ReadFailed(e)),
    }
}

/// Write through a temp file in the same directory, then rename over `path`.
fn write_atomic(path: &Path, content: &str) -> Result<(), ChangelogError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(ChangelogError::WriteFailed)?;
    file.write_all(content.as_bytes())
        .map_err(ChangelogError::WriteFailed)?;
    file.persist(path)
        .map_err(|e| ChangelogError::WriteFailed(e.error))?;
    Ok(())
}
