//! Remote configuration override fetched over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::settings::ModelTier;
use crate::error::RemoteFetchError;

/// Upper bound on a remote override request.
pub const REMOTE_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Advisory messages shipped with an override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMessages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Externally hosted configuration fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOverride {
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub min_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<RemoteMessages>,
}

impl RemoteOverride {
    /// The suggested model, if it names a supported tier.
    pub fn suggested_model(&self) -> Option<ModelTier> {
        let name = self.default_model.as_deref()?;
        match name.parse() {
            Ok(model) => Some(model),
            Err(_) => {
                warn!("Remote config suggests unknown model '{}', ignoring", name);
                None
            }
        }
    }

    /// Whether `current` is older than the advertised minimum version.
    ///
    /// Advisory only: an unparseable version on either side is treated as
    /// "not older".
    pub fn requires_newer_than(&self, current: &str) -> bool {
        let Some(min) = self.min_version.as_deref() else {
            return false;
        };
        match (Version::parse(min), Version::parse(current)) {
            (Ok(min), Ok(current)) => current < min,
            _ => {
                debug!("Cannot compare versions '{}' and '{}'", min, current);
                false
            }
        }
    }
}

/// Source of remote overrides.
///
/// This abstraction allows counting or failing network calls in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch and parse the override document at `url`.
    async fn fetch(&self, url: &str) -> Result<RemoteOverride, RemoteFetchError>;
}

/// Fetches overrides with a plain HTTP GET.
///
/// A client that fails to build is kept as an error and reported by every
/// fetch, so no request is ever sent without the timeout.
pub struct HttpRemoteSource {
    client: Result<reqwest::Client, String>,
    timeout: Duration,
}

impl HttpRemoteSource {
    pub fn new() -> Self {
        Self::with_timeout(REMOTE_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                warn!("Failed to build remote config HTTP client: {}", e);
                e.to_string()
            });
        Self { client, timeout }
    }

    /// Upper bound applied to each fetch.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for HttpRemoteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch(&self, url: &str) -> Result<RemoteOverride, RemoteFetchError> {
        let client = self
            .client
            .as_ref()
            .map_err(|e| RemoteFetchError::ClientInit(e.clone()))?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(RemoteFetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteFetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(RemoteFetchError::Transport)?;
        serde_json::from_str(&body).map_err(RemoteFetchError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_document() {
        let json = r#"{
            "defaultModel": "gpt-4o",
            "minVersion": "1.2.0",
            "messages": {"warning": "Service degraded", "info": "New models available"}
        }"#;
        let remote: RemoteOverride = serde_json::from_str(json).unwrap();
        assert_eq!(remote.suggested_model(), Some(ModelTier::Accurate));
        assert_eq!(remote.min_version.as_deref(), Some("1.2.0"));
        let messages = remote.messages.unwrap();
        assert_eq!(messages.warning.as_deref(), Some("Service degraded"));
        assert_eq!(messages.info.as_deref(), Some("New models available"));
    }

    #[test]
    fn test_deserialize_minimal_document() {
        let remote: RemoteOverride = serde_json::from_str("{}").unwrap();
        assert!(remote.suggested_model().is_none());
        assert!(remote.messages.is_none());
    }

    #[test]
    fn test_unknown_suggested_model_ignored() {
        let remote = RemoteOverride {
            default_model: Some("gpt-9".to_string()),
            ..Default::default()
        };
        assert!(remote.suggested_model().is_none());
    }

    #[test]
    fn test_requires_newer_than() {
        let remote = RemoteOverride {
            min_version: Some("1.5.0".to_string()),
            ..Default::default()
        };
        assert!(remote.requires_newer_than("1.0.0"));
        assert!(!remote.requires_newer_than("1.5.0"));
        assert!(!remote.requires_newer_than("2.0.0"));
        assert!(!remote.requires_newer_than("not-a-version"));
        assert!(!RemoteOverride::default().requires_newer_than("1.0.0"));
    }

    #[test]
    fn test_default_source_uses_fetch_timeout() {
        let source = HttpRemoteSource::default();
        assert!(source.client.is_ok());
        assert_eq!(source.timeout(), REMOTE_FETCH_TIMEOUT);
    }

    #[tokio::test]
    async fn test_unbuilt_client_fails_without_request() {
        let source = HttpRemoteSource {
            client: Err("tls backend unavailable".to_string()),
            timeout: REMOTE_FETCH_TIMEOUT,
        };
        let err = source.fetch("http://127.0.0.1:9/config.json").await.unwrap_err();
        match err {
            RemoteFetchError::ClientInit(reason) => assert!(reason.contains("tls")),
            other => panic!("Expected ClientInit, got {other:?}"),
        }
    }
}
