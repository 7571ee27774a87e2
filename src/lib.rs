//! gcomet - A CLI tool that generates Git commit messages from staged changes.
//!
//! # Overview
//!
//! gcomet reads the staged diff, screens it for credentials with
//! [`SensitiveDataScanner`], asks GitHub Models for a Conventional Commits
//! message and commits it. Settings come from [`ConfigResolver`], which layers
//! defaults, `~/.gcomet/config.json`, environment/`gh` credentials and a cached
//! remote override.

pub mod commands;
pub mod config;
pub mod error;
pub mod generator;
pub mod git;
pub mod security;

// Re-export commonly used types
pub use config::{ConfigKey, ConfigPaths, ConfigResolver, Configuration, ModelTier};
pub use error::{
    CommandError, ConfigError, CredentialHelperError, GenerateError, GitError, HookError,
    RemoteFetchError,
};
pub use generator::{CommitMessage, CommitMessageGenerator, GitHubModelsClient};
pub use git::{GitRepository, VersionControlProvider};
pub use security::{Finding, SensitiveDataScanner};
