//! `gcomet hook install|uninstall`.

use std::path::PathBuf;

use crate::error::CommandError;
use crate::git::VersionControlProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    Install,
    Uninstall,
}

/// Install or remove the `prepare-commit-msg` hook. Returns the hook path.
pub fn run_hook(vcs: &dyn VersionControlProvider, action: HookAction) -> Result<PathBuf, CommandError> {
    match action {
        HookAction::Install => {
            let path = vcs.install_hook()?;
            println!("prepare-commit-msg hook installed at {}", path.display());
            println!("\"git commit\" will now generate commit messages automatically.");
            Ok(path)
        }
        HookAction::Uninstall => {
            let path = vcs.uninstall_hook()?;
            println!("prepare-commit-msg hook removed from {}", path.display());
            Ok(path)
        }
    }
}
