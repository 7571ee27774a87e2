//! GitHub credential sources.
//!
//! Resolution order:
//! 1. `GITHUB_TOKEN` environment variable
//! 2. `githubToken` in the persisted config
//! 3. `gh auth token` (GitHub CLI)

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::CredentialHelperError;

/// Environment variable checked before any persisted credential.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// An external command that can produce a credential.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHelper: Send + Sync {
    fn token(&self) -> Result<String, CredentialHelperError>;
}

/// Reads the token from an authenticated GitHub CLI.
pub struct GhCliHelper;

impl CredentialHelper for GhCliHelper {
    fn token(&self) -> Result<String, CredentialHelperError> {
        if which::which("gh").is_err() {
            return Err(CredentialHelperError::NotInstalled);
        }

        let status = Command::new("gh")
            .args(["auth", "status"])
            .output()
            .map_err(CredentialHelperError::SpawnFailed)?;

        if !status.status.success() {
            return Err(CredentialHelperError::NotAuthenticated);
        }

        let output = Command::new("gh")
            .args(["auth", "token"])
            .output()
            .map_err(CredentialHelperError::SpawnFailed)?;

        if !output.status.success() {
            return Err(CredentialHelperError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(CredentialHelperError::EmptyToken);
        }
        Ok(token)
    }
}

/// Token from [`TOKEN_ENV_VAR`], ignoring an empty value.
pub fn token_from_env() -> Option<String> {
    env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.is_empty())
}

/// Pick the first available credential: environment, stored, then helper.
///
/// The helper is only invoked when both earlier sources are empty, and its
/// failure means "no credential from this source".
pub fn resolve_credential(
    stored: Option<&str>,
    helper: &dyn CredentialHelper,
) -> Option<String> {
    if let Some(token) = token_from_env() {
        debug!("Using credential from {}", TOKEN_ENV_VAR);
        return Some(token);
    }

    if let Some(token) = stored.filter(|t| !t.is_empty()) {
        debug!("Using credential from config file");
        return Some(token.to_string());
    }

    match helper.token() {
        Ok(token) => {
            debug!("Using credential from credential helper");
            Some(token)
        }
        Err(e) => {
            debug!("Credential helper unavailable: {}", e);
            None
        }
    }
}
