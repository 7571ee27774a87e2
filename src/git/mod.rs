//! Git operations: staged diff collection with git2, commits through the
//! system `git` binary, and the `prepare-commit-msg` hook.

pub mod executor;
pub mod hook;
pub mod repo;

use std::path::PathBuf;

use crate::error::{GitError, HookError};

pub use hook::{HOOK_MARKER, HOOK_NAME, hook_script};
pub use repo::{GitRepository, StagedDiff};

/// Everything the generation flow needs from version control.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControlProvider {
    /// Unified diff of the index against HEAD, capped at `max_len` bytes.
    fn staged_diff(&self, max_len: usize) -> Result<StagedDiff, GitError>;

    fn has_staged_changes(&self) -> Result<bool, GitError>;

    /// Subject line of the HEAD commit, or `None` in an empty repository.
    fn last_commit_message(&self) -> Option<String>;

    /// Short name of the checked-out branch, `main` when it cannot be determined.
    fn current_branch(&self) -> String;

    fn commit(&self, message: &str) -> Result<(), GitError>;

    /// Write the hook script. Returns its path.
    fn install_hook(&self) -> Result<PathBuf, HookError>;

    /// Remove the hook script. Returns the path it was removed from.
    fn uninstall_hook(&self) -> Result<PathBuf, HookError>;
}
