//! `prepare-commit-msg` hook installation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::HookError;

pub const HOOK_NAME: &str = "prepare-commit-msg";

/// First comment line of the generated script, used to recognise our hook.
pub const HOOK_MARKER: &str = "# gcomet prepare-commit-msg hook";

/// The hook script.
///
/// Git passes the message file as `$1` and the message source as `$2`. A
/// message is generated only for plain `git commit` (no source) or when a
/// template is in use; `-m`, merges and amends are left alone. If generation
/// fails the message file is not touched.
pub fn hook_script() -> String {
    format!(
        r#"#!/bin/sh
{HOOK_MARKER}
if [ -z "$2" ] || [ "$2" = "template" ]; then
  if message=$(gcomet generate --stdout); then
    printf '%s\n' "$message" > "$1"
  fi
fi
"#
    )
}

fn hook_path(git_dir: &Path) -> PathBuf {
    git_dir.join("hooks").join(HOOK_NAME)
}

/// Write the hook into `<git_dir>/hooks`, replacing any existing one.
pub fn install(git_dir: &Path) -> Result<PathBuf, HookError> {
    let path = hook_path(git_dir);

    if let Ok(existing) = fs::read_to_string(&path)
        && !existing.contains(HOOK_MARKER)
    {
        warn!("Replacing existing {} hook at {}", HOOK_NAME, path.display());
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(HookError::InstallFailed)?;
    }
    fs::write(&path, hook_script()).map_err(HookError::InstallFailed)?;
    make_executable(&path)?;

    Ok(path)
}

/// Remove the hook from `<git_dir>/hooks`.
pub fn uninstall(git_dir: &Path) -> Result<PathBuf, HookError> {
    let path = hook_path(git_dir);
    match fs::remove_file(&path) {
        Ok(()) => Ok(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(HookError::NotInstalled),
        Err(e) => Err(HookError::UninstallFailed(e)),
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), HookError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(HookError::InstallFailed)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), HookError> {
    Ok(())
}
