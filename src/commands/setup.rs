//! `gcomet setup`: first-run wizard.

use crate::config::{ConfigKey, ConfigResolver};
use crate::error::CommandError;

use super::Prompter;

const TOKEN_SETTINGS_URL: &str = "https://github.com/settings/tokens";

/// Ask for the credential, model and confirmation preference, then persist them.
pub async fn run_setup(
    resolver: &mut ConfigResolver,
    prompter: &dyn Prompter,
) -> Result<(), CommandError> {
    println!("gcomet setup wizard\n");

    let existing = resolver.resolve_credential().await?;
    let reuse = match existing.as_deref() {
        Some(_) => prompter.confirm("GitHub token found. Use existing token?", true)?,
        None => false,
    };

    let token = match existing {
        Some(token) if reuse => token,
        _ => {
            println!("You need a GitHub Personal Access Token with \"models:read\" scope.");
            println!("Create one at: {TOKEN_SETTINGS_URL}\n");
            prompter.password("Enter your GitHub Personal Access Token")?
        }
    };

    if token.trim().is_empty() {
        return Err(CommandError::CredentialMissing);
    }
    resolver.set(ConfigKey::GithubToken.as_str(), token.trim()).await?;

    let current = resolver.load().await?.model;
    let model = prompter.select_model(current)?;
    let always_ask = prompter.confirm("Always ask before committing?", true)?;

    resolver.set(ConfigKey::Model.as_str(), model.as_str()).await?;
    resolver
        .set(ConfigKey::AlwaysAskBeforeCommit.as_str(), &always_ask.to_string())
        .await?;

    println!("\nSetup completed successfully.");
    println!("\nTry it out:");
    println!("  git add .");
    println!("  gcomet generate");
    println!("\nOr install the Git hook:");
    println!("  gcomet hook install");
    Ok(())
}
