//! Splice a new section into the changelog text.

/// Lines kept above every new section.
pub const HEADER_LINES: usize = 4;

/// Starting content when no changelog exists yet.
pub const DEFAULT_HEADER: &str =
    "# Changelog\n\nAll notable changes to this project will be documented in this file.\n\n";

/// Insert `section` plus a blank line after the first [`HEADER_LINES`]
/// lines of `changelog`, or at the end when it is shorter.
pub fn inject_section(changelog: &str, section: &str) -> String {
    let mut lines: Vec<&str> = changelog.split('\n').collect();
    let block = format!("{}\n", section.trim_end());
    let at = HEADER_LINES.min(lines.len());
    lines.insert(at, &block);
    lines.join("\n")
}

/// Drop a leading `# ...` title the generator may echo from the changelog
/// it was shown, so the file keeps a single H1.
pub fn strip_title(section: &str) -> &str {
    let trimmed = section.trim_start();
    if !trimmed.starts_with("# ") {
        return trimmed;
    }
    match trimmed.split_once('\n') {
        Some((_, rest)) => rest.trim_start(),
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_after_header() {
        let existing = "# Changelog\n\nIntro.\n\n## 1.0.0\n\n- old\n";
        let result = inject_section(existing, "## 1.1.0\n\n- new");
        assert_eq!(
            result,
            "# Changelog\n\nIntro.\n\n## 1.1.0\n\n- new\n\n## 1.0.0\n\n- old\n"
        );
    }

    #[test]
    fn test_inject_into_default_header() {
        let result = inject_section(DEFAULT_HEADER, "## 0.1.0\n- first");
        assert!(result.starts_with(DEFAULT_HEADER));
        assert!(result.contains("## 0.1.0\n- first\n"));
    }

    #[test]
    fn test_short_changelog_appends_at_end() {
        let result = inject_section("# Changelog", "## 0.0.1");
        assert_eq!(result, "# Changelog\n## 0.0.1\n");
    }

    #[test]
    fn test_trailing_whitespace_of_section_is_trimmed() {
        let result = inject_section("a\nb\nc\nd\ne", "## 2.0.0\n\n\n");
        assert_eq!(result, "a\nb\nc\nd\n## 2.0.0\n\ne");
    }

    #[test]
    fn test_strip_title() {
        assert_eq!(strip_title("# Changelog\n\n## +0.1.0\n- a"), "## +0.1.0\n- a");
        assert_eq!(strip_title("\n## +0.1.0"), "## +0.1.0");
        assert_eq!(strip_title("## +0.1.0\n# not a title"), "## +0.1.0\n# not a title");
        assert_eq!(strip_title("# Changelog"), "");
    }

    #[test]
    fn test_echoed_title_is_not_spliced_twice() {
        let existing = "# Changelog\n\nIntro.\n\n## 1.0.0\n";
        let result = inject_section(existing, strip_title("# Changelog\n\n## 1.1.0"));
        assert_eq!(result.matches("# Changelog").count(), 1);
        assert!(result.starts_with("# Changelog\n\nIntro.\n\n## 1.1.0\n\n## 1.0.0"));
    }
}
