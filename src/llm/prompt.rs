//! Prompt construction for commit messages and changelogs.

use crate::message::CommitType;
use crate::scope::ROOT_SCOPE;

use super::generator::{ChangelogStyle, MessageRequest};

/// Build the commit message prompt. The answer must be a JSON object with
/// `type`, `summary` and `description`.
pub fn build_commit_prompt(request: &MessageRequest) -> String {
    let diff = escape_fences(&request.diff);

    let scope_line = if request.scope == ROOT_SCOPE || request.scope.is_empty() {
        "This commit affects more than one scope.".to_string()
    } else {
        format!("The scope of the changes is \"{}\".", request.scope)
    };

    let type_section = match request.commit_type {
        Some(kind) => format!(
            "The commit is of type \"{kind}\" ({}). The summary should clearly state what changed under this type.",
            kind.description()
        ),
        None => {
            let mut section = String::from("Determine the type of the commit. Commit types:");
            for kind in CommitType::ALL {
                section.push_str(&format!("\n- {}: {}", kind, kind.description()));
            }
            section
        }
    };

    let reason_line = request
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| format!("\nThe changes were made because {}.\n", sanitize_for_prompt(r)))
        .unwrap_or_default();

    let files = if request.files.is_empty() {
        String::from("(none listed)")
    } else {
        request
            .files
            .iter()
            .map(|f| format!("- {}", f))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are writing a conventional commit message for the following staged changes.

{scope_line}
{reason_line}
{type_section}

## Files
{files}

## Diff
```diff
{diff}
```

## Instructions
1. The summary is a single line of at most 100 characters, written in the imperative mood.
2. The description explains the changes as dot points, at most 200 words.
3. Do not include the type, scope, issue keys or emojis in the summary.

Respond with JSON only:
{{"type": "<commit type>", "summary": "...", "description": "- ...\n- ..."}}"#
    )
}

const CHANGELOG_RULES: &str = "organizing them under the scope with suggested version increments (+x.y.z). \
Include explanations for the suggested increments and organize the commits into \"Major\", \"Minor\", and \"Revisions\" categories. \
Omit any 'chore' commits. If a commit contains 'BREAKING' (placed after the commit message and before the issue key), \
suggest a major version increment. Include emojis if present in the commit messages.";

const MONOREPO_SAMPLE_COMMITS: &str = "feat(ui): 🎉 added usePrevious hook to the exports in inspace-ui [IN-889]

- A new hook 'usePrevious' has been added to the exports in the hooks index file of inspace-ui package.

refactor(api): 🧹 updated API endpoints BREAKING [IN-900]

- The API endpoints were updated to improve performance and security. This change is not backward compatible.";

const MONOREPO_SAMPLE_OUTPUT: &str = "## +1.0.0

The overall increment is the largest of the scope increments below.

### ui +0.1.0

The version increment is suggested due to the addition of new features that do not break backward compatibility.

#### Minor
- 🎉 Added `usePrevious` hook to the exports in inspace-ui ([IN-889](link-to-issue-IN-889))
  - A new hook 'usePrevious' has been added to the exports in the hooks index file of inspace-ui package.

### api +1.0.0

The introduction of breaking changes to the API warrants a major version increment.

#### Major
- 🧹 Updated API endpoints (BREAKING CHANGE) ([IN-900](link-to-issue-IN-900))
  - The API endpoints were updated to improve performance and security. This change is not backward compatible.";

/// Monorepo answers open with one overall marker above the per-scope ones.
const MONOREPO_OVERALL_RULE: &str = " Start with a single \"## +x.y.z\" line holding the largest scope increment, \
then one \"### <scope> +x.y.z\" heading per scope.";

const SINGLE_REPO_SAMPLE_COMMITS: &str = "feat: added changelog command [no-key]

- Added options for the destination branch

feat(utils): added getCommitLogs helper [no-key]

- Added a new function 'getCommitLogs' in git.ts under utils.";

const SINGLE_REPO_SAMPLE_OUTPUT: &str = "## +0.1.0

The version increment is suggested due to the addition of new features that do not break backward compatibility.

### Minor
- 🎉 Added changelog command ([no-key](#))
  - Added options for the destination branch

- 🎉 (utils) Added getCommitLogs helper ([no-key](#))
  - Added a new function 'getCommitLogs' in git.ts under utils.";

/// Build the changelog prompt for the rendered commit log.
pub fn build_changelog_prompt(log: &str, style: &ChangelogStyle) -> String {
    let (intro, sample_commits, sample_output) = match style {
        ChangelogStyle::Monorepo => (
            format!(
                "Generate a changelog from the provided commit messages, {}{}",
                CHANGELOG_RULES, MONOREPO_OVERALL_RULE
            ),
            MONOREPO_SAMPLE_COMMITS,
            MONOREPO_SAMPLE_OUTPUT,
        ),
        ChangelogStyle::SingleRepo { app_name } => (
            format!(
                "For the app called {}, generate a changelog from the provided commit messages, {}",
                sanitize_for_prompt(app_name),
                CHANGELOG_RULES.replacen("under the scope", "under the scope (if available)", 1)
            ),
            SINGLE_REPO_SAMPLE_COMMITS,
            SINGLE_REPO_SAMPLE_OUTPUT,
        ),
    };

    let commits = log
        .split("\n\n")
        .map(sanitize_for_prompt)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"{intro}

Given the following sample commit messages:

{sample_commits}

The expected output would be:

{sample_output}

Reply with the new changelog section only, without a title heading or code fences.

Commit messages:

{commits}"#
    )
}

/// Neutralise markdown that could break out of the prompt structure.
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("```", "'''")
        .replace("##", "//")
        .lines()
        .take(50)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Diffs keep their content; only code fences are defused.
fn escape_fences(text: &str) -> String {
    text.replace("```", "'''")
}
