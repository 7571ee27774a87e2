//! HTTP client for the GitHub Models chat completions API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ModelTier;
use crate::error::GenerateError;

use super::message::{CommitMessage, is_sensitive_warning};
use super::prompt::{SYSTEM_PROMPT, build_user_prompt};
use super::retry::retry_with_backoff;
use super::{CommitMessageGenerator, GenerationRequest};

pub const GITHUB_MODELS_ENDPOINT: &str = "https://models.github.ai/inference";

const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Model identifier understood by GitHub Models.
pub fn api_model_name(model: ModelTier) -> &'static str {
    match model {
        ModelTier::Fast => "openai/gpt-4o-mini",
        ModelTier::Accurate => "openai/gpt-4o",
        ModelTier::Legacy => "openai/gpt-3.5-turbo",
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    model: &'static str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// [`CommitMessageGenerator`] backed by GitHub Models.
pub struct GitHubModelsClient {
    client: Result<reqwest::Client, String>,
    endpoint: String,
}

impl GitHubModelsClient {
    pub fn new() -> Self {
        Self::with_endpoint(GITHUB_MODELS_ENDPOINT)
    }

    /// Point the client at another inference base URL.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                warn!("Failed to build GitHub Models HTTP client: {}", e);
                e.to_string()
            });
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    async fn complete(&self, body: &ChatRequest<'_>, token: &str) -> Result<String, GenerateError> {
        let url = format!("{}/chat/completions", self.endpoint);
        debug!("POST {url} model={}", body.model);

        let client = self
            .client
            .as_ref()
            .map_err(|e| GenerateError::ClientInit(e.clone()))?;
        let response = client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(GenerateError::Transport)?;

        let status = response.status();
        let text = response.text().await.map_err(GenerateError::Transport)?;

        match status.as_u16() {
            200..=299 => {}
            401 => return Err(GenerateError::Unauthorized),
            403 => return Err(GenerateError::Forbidden),
            429 => return Err(GenerateError::RateLimited),
            code => {
                let message = serde_json::from_str::<ErrorBody>(&text)
                    .ok()
                    .and_then(|b| b.error)
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "Unknown error".to_string());
                return Err(GenerateError::Api {
                    status: code,
                    message,
                });
            }
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| GenerateError::Api {
                status: status.as_u16(),
                message: format!("unexpected response body: {e}"),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(GenerateError::EmptyResponse)
    }
}

impl Default for GitHubModelsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommitMessageGenerator for GitHubModelsClient {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<CommitMessage, GenerateError> {
        let user_prompt = build_user_prompt(request.diff, request.last_commit, request.branch);
        let body = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            model: api_model_name(request.model),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let content = retry_with_backoff(
            || self.complete(&body, request.token),
            GenerateError::is_transport,
            |e| GenerateError::RetriesExhausted(Box::new(e)),
        )
        .await?;

        if is_sensitive_warning(&content) {
            return Err(GenerateError::SensitiveContent);
        }

        CommitMessage::parse(&content).ok_or(GenerateError::EmptyResponse)
    }
}
