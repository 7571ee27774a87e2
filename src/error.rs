//! Error types for gcomet modules using thiserror.

use thiserror::Error;

/// Errors from configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration key \"{key}\". Valid keys: {valid}")]
    InvalidKey { key: String, valid: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to persist configuration to {path}: {source}")]
    PersistFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Could not determine home directory. Set GCOMET_HOME to choose a config directory.")]
    NoHomeDirectory,
}

/// Errors from fetching or reading the remote override.
///
/// These never reach the user: the resolver logs them and continues with the
/// local configuration.
#[derive(Error, Debug)]
pub enum RemoteFetchError {
    #[error("Remote config request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Remote config returned HTTP {0}")]
    Status(u16),

    #[error("Remote config is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("HTTP client could not be initialized: {0}")]
    ClientInit(String),
}

/// Errors from the external credential helper (`gh`).
#[derive(Error, Debug)]
pub enum CredentialHelperError {
    #[error("GitHub CLI (gh) not found in PATH")]
    NotInstalled,

    #[error("GitHub CLI is not authenticated")]
    NotAuthenticated,

    #[error("Failed to spawn gh: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("gh auth token exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("gh auth token returned an empty token")]
    EmptyToken,
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },
}

/// Errors from Git hook management.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Failed to install prepare-commit-msg hook: {0}")]
    InstallFailed(#[source] std::io::Error),

    #[error("Failed to uninstall prepare-commit-msg hook: {0}")]
    UninstallFailed(#[source] std::io::Error),

    #[error("No prepare-commit-msg hook is installed")]
    NotInstalled,
}

/// Errors from commit message generation.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Invalid GitHub token. Please run \"gcomet setup\" to reconfigure.")]
    Unauthorized,

    #[error("GitHub token does not have required \"models:read\" permissions.")]
    Forbidden,

    #[error("Rate limit exceeded. Please wait a moment and try again.")]
    RateLimited,

    #[error("Network error. Please check your internet connection and try again. ({0})")]
    Transport(#[source] reqwest::Error),

    #[error("No response from AI model")]
    EmptyResponse,

    #[error("Sensitive data detected in diff. Please review your staged changes.")]
    SensitiveContent,

    #[error("GitHub Models API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<GenerateError>),

    #[error("HTTP client could not be initialized: {0}")]
    ClientInit(String),
}

impl GenerateError {
    /// Whether this failure came from the network rather than the service.
    pub fn is_transport(&self) -> bool {
        match self {
            GenerateError::Transport(_) => true,
            GenerateError::RetriesExhausted(inner) => inner.is_transport(),
            _ => false,
        }
    }
}

/// Errors surfaced by the CLI commands.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Not in a Git repository")]
    NotARepository,

    #[error("No staged changes found. Use \"git add\" first.")]
    NoStagedChanges,

    #[error("GitHub token not found. Run \"gcomet setup\" first.")]
    CredentialMissing,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}
