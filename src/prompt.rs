//! Interactive prompts.

use dialoguer::{Confirm, Editor, Input, MultiSelect, Select};

use crate::error::PromptError;

/// What the user decided about a generated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Commit with this text (possibly edited).
    Accept(String),
    Regenerate,
    Skip,
}

/// User interaction needed by the commit flow.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Ask whether the changes in `scope` should be committed.
    fn confirm_scope(&self, scope: &str) -> Result<bool, PromptError>;

    fn review_message(&self, message: &str) -> Result<ReviewOutcome, PromptError>;

    /// Pick the files whose diff is sent to the generator when the full diff
    /// is too large.
    fn select_files(&self, files: &[String], diff_len: usize)
    -> Result<Vec<String>, PromptError>;

    /// Ask for an issue key. `None` when the commit has none.
    fn issue_key(&self) -> Result<Option<String>, PromptError>;
}

/// Terminal prompts backed by dialoguer.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompter;

const REVIEW_CHOICES: [&str; 4] = ["Use it", "Edit", "Regenerate", "Skip this scope"];

impl Prompter for DialoguerPrompter {
    fn confirm_scope(&self, scope: &str) -> Result<bool, PromptError> {
        Ok(Confirm::new()
            .with_prompt(format!("Would you like to commit all changes in {}?", scope))
            .default(true)
            .interact()?)
    }

    fn review_message(&self, message: &str) -> Result<ReviewOutcome, PromptError> {
        println!("\n\x1b[32m✅ Successfully Generated\x1b[0m\n");
        println!("\x1b[1;33m{}\x1b[0m\n", message);

        let choice = Select::new()
            .with_prompt("Would you like to use it?")
            .items(&REVIEW_CHOICES[..])
            .default(0)
            .interact()?;

        match choice {
            0 => Ok(ReviewOutcome::Accept(message.to_string())),
            1 => match Editor::new()
                .edit(message)
                .map_err(dialoguer::Error::from)?
            {
                Some(edited) if !edited.trim().is_empty() => {
                    Ok(ReviewOutcome::Accept(edited.trim().to_string()))
                }
                // Editor closed without saving, or everything was deleted
                _ => Ok(ReviewOutcome::Skip),
            },
            2 => Ok(ReviewOutcome::Regenerate),
            _ => Ok(ReviewOutcome::Skip),
        }
    }

    fn select_files(
        &self,
        files: &[String],
        diff_len: usize,
    ) -> Result<Vec<String>, PromptError> {
        let picked = MultiSelect::new()
            .with_prompt(format!(
                "\x1b[31m❌ The diff is too large to generate a commit message (length {}). Please select the files you want to use in the commit message.\x1b[0m",
                diff_len
            ))
            .items(files)
            .interact()?;

        Ok(picked.into_iter().map(|i| files[i].clone()).collect())
    }

    fn issue_key(&self) -> Result<Option<String>, PromptError> {
        let has_issue = Confirm::new()
            .with_prompt("Does this commit have an issue key?")
            .default(true)
            .interact()?;

        if !has_issue {
            return Ok(None);
        }

        let key: String = Input::new()
            .with_prompt("Please enter the issue key")
            .allow_empty(true)
            .interact_text()?;

        let key = key.trim();
        Ok((!key.is_empty()).then(|| key.to_string()))
    }
}
