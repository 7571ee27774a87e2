//! CLI command implementations.
//!
//! Each command takes its collaborators (resolver, repository, generator,
//! prompter) by reference so the flows can run against fakes in tests.

pub mod config;
pub mod generate;
pub mod hook;
pub mod setup;

use dialoguer::{Confirm, Editor, Password, Select};

use crate::config::{ConfigResolver, ModelTier};

pub use config::{ConfigAction, run_config};
pub use generate::{GenerateOptions, GenerateOutcome, run_generate};
pub use hook::{HookAction, run_hook};
pub use setup::run_setup;

/// Next step offered after a message has been generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    Commit,
    Edit,
    Cancel,
}

impl CommitAction {
    pub const ALL: [CommitAction; 3] = [CommitAction::Commit, CommitAction::Edit, CommitAction::Cancel];

    fn label(&self) -> &'static str {
        match self {
            CommitAction::Commit => "Commit with this message",
            CommitAction::Edit => "Edit the message",
            CommitAction::Cancel => "Cancel",
        }
    }
}

/// Interactive questions asked by the commands.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, dialoguer::Error>;

    fn select_action(&self) -> Result<CommitAction, dialoguer::Error>;

    /// Edit `initial`. `None` means the user aborted the edit.
    fn edit_message(&self, initial: &str) -> Result<Option<String>, dialoguer::Error>;

    fn password(&self, prompt: &str) -> Result<String, dialoguer::Error>;

    fn select_model(&self, current: ModelTier) -> Result<ModelTier, dialoguer::Error>;
}

/// [`Prompter`] backed by dialoguer on the controlling terminal.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, dialoguer::Error> {
        Confirm::new().with_prompt(prompt).default(default).interact()
    }

    fn select_action(&self) -> Result<CommitAction, dialoguer::Error> {
        let labels: Vec<&str> = CommitAction::ALL.iter().map(CommitAction::label).collect();
        let index = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(CommitAction::ALL[index])
    }

    fn edit_message(&self, initial: &str) -> Result<Option<String>, dialoguer::Error> {
        Editor::new().edit(initial).map_err(dialoguer::Error::from)
    }

    fn password(&self, prompt: &str) -> Result<String, dialoguer::Error> {
        Password::new().with_prompt(prompt).allow_empty_password(true).interact()
    }

    fn select_model(&self, current: ModelTier) -> Result<ModelTier, dialoguer::Error> {
        let labels: Vec<String> = ModelTier::ALL
            .iter()
            .map(|m| format!("{} ({})", m, m.describe()))
            .collect();
        let default = ModelTier::ALL.iter().position(|m| *m == current).unwrap_or(0);
        let index = Select::new()
            .with_prompt("Choose your preferred model")
            .items(&labels)
            .default(default)
            .interact()?;
        Ok(ModelTier::ALL[index])
    }
}

/// Print the advisory messages of the applied remote override, if any.
pub fn print_remote_messages(resolver: &ConfigResolver) {
    let Some(messages) = resolver.remote_override().and_then(|r| r.messages.as_ref()) else {
        return;
    };
    if let Some(warning) = messages.warning.as_deref() {
        eprintln!("Warning: {warning}");
    }
    if let Some(info) = messages.info.as_deref() {
        eprintln!("{info}");
    }
}
