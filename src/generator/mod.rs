//! Commit message generation through GitHub Models.

pub mod client;
pub mod message;
pub mod prompt;
pub mod retry;

use async_trait::async_trait;

use crate::config::ModelTier;
use crate::error::GenerateError;

pub use client::{GITHUB_MODELS_ENDPOINT, GitHubModelsClient};
pub use message::CommitMessage;
pub use prompt::{SYSTEM_PROMPT, build_user_prompt};

/// Inputs for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub diff: &'a str,
    pub last_commit: Option<&'a str>,
    pub branch: &'a str,
    pub model: ModelTier,
    pub token: &'a str,
}

/// Turns a staged diff into a commit message.
#[async_trait]
pub trait CommitMessageGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<CommitMessage, GenerateError>;
}
