//! Shelling out to the system `git` binary.
//!
//! Commits go through `git` rather than git2 so the user's hooks, signing
//! configuration and identity all apply.

use std::path::Path;
use std::process::Command;

use crate::error::GitError;

/// Run a git command in `workdir` and return success or a descriptive error.
pub fn run_git(workdir: &Path, args: &[&str], operation: &str) -> Result<(), GitError> {
    let output = Command::new("git")
        .current_dir(workdir)
        .args(args)
        .output()
        .map_err(|source| GitError::SpawnFailed {
            operation: operation.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        // `git commit` reports "nothing to commit" on stdout.
        let detail = if stderr.trim().is_empty() { stdout } else { stderr };
        return Err(GitError::CommandFailed {
            operation: operation.to_string(),
            stderr: detail.trim().to_string(),
        });
    }

    Ok(())
}
