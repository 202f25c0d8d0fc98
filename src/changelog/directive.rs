//! The `## +x.y.z` increment markers in generated changelog text.

use std::fmt;
use std::sync::OnceLock;

use regex_lite::Regex;
use semver::Version;

/// Which version component to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bump {
    Patch,
    Minor,
    Major,
}

impl fmt::Display for Bump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bump::Patch => "patch",
            Bump::Minor => "minor",
            Bump::Major => "major",
        })
    }
}

/// Increment suggested by the generator, e.g. `## +0.1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementDirective {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl IncrementDirective {
    /// Strongest directive in `text`, if any.
    ///
    /// Both the overall `## +x.y.z` and per-scope `## ui +x.y.z` markers
    /// count; the largest bump wins and ties go to the earliest marker.
    pub fn parse(text: &str) -> Option<Self> {
        markers(text)
            .map(|m| m.directive)
            .reduce(|best, next| if next.bump() > best.bump() { next } else { best })
    }

    /// The first non-zero component decides; `None` when all are zero.
    pub fn bump(&self) -> Option<Bump> {
        if self.major != 0 {
            Some(Bump::Major)
        } else if self.minor != 0 {
            Some(Bump::Minor)
        } else if self.patch != 0 {
            Some(Bump::Patch)
        } else {
            None
        }
    }

    /// Text with the version heading `## <version>` in place.
    ///
    /// The first overall marker becomes the heading. Without one, the
    /// heading goes above the first per-scope marker, which stays as is.
    /// Text without markers is returned unchanged.
    pub fn replace_in(text: &str, version: &Version) -> String {
        let heading = format!("## {}", version);
        let found: Vec<Marker> = markers(text).collect();

        if let Some(overall) = found.iter().find(|m| m.scope.is_none()) {
            return format!("{}{}{}", &text[..overall.start], heading, &text[overall.end..]);
        }
        match found.first() {
            Some(scoped) => format!(
                "{}{}\n\n{}",
                &text[..scoped.start],
                heading,
                &text[scoped.start..]
            ),
            None => text.to_string(),
        }
    }
}

/// One `## [scope ]+x.y.z` occurrence and its byte range.
struct Marker {
    start: usize,
    end: usize,
    scope: Option<String>,
    directive: IncrementDirective,
}

fn markers(text: &str) -> impl Iterator<Item = Marker> + '_ {
    directive_pattern().captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let component = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
        Some(Marker {
            start: whole.start(),
            end: whole.end(),
            scope: caps.get(1).map(|m| m.as_str().to_string()),
            directive: IncrementDirective {
                major: component(2)?,
                minor: component(3)?,
                patch: component(4)?,
            },
        })
    })
}

impl fmt::Display for IncrementDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Apply `bump` to `current`, resetting the lower components.
pub fn next_version(current: &Version, bump: Option<Bump>) -> Version {
    match bump {
        Some(Bump::Major) => Version::new(current.major + 1, 0, 0),
        Some(Bump::Minor) => Version::new(current.major, current.minor + 1, 0),
        Some(Bump::Patch) => Version::new(current.major, current.minor, current.patch + 1),
        None => current.clone(),
    }
}

fn directive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^##[ \t]+(?:([\w@./-]+)[ \t]+)?\+(\d+)\.(\d+)\.(\d+)")
            .unwrap_or_else(|e| unreachable!("directive pattern is valid: {}", e))
    })
}
