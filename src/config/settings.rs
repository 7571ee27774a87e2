//! The persisted configuration record and its closed key set.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ConfigError;

/// Remote override location used when nothing else is configured.
pub const DEFAULT_REMOTE_CONFIG_URL: &str =
    "https://raw.githubusercontent.com/your-org/gcomet-config/main/config.json";

/// Default cap on the number of diff characters sent for generation.
pub const DEFAULT_MAX_DIFF_SIZE: usize = 10_000;

/// The closed set of supported model tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelTier {
    /// Fast, recommended default.
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Fast,
    /// Slower, more accurate.
    #[serde(rename = "gpt-4o")]
    Accurate,
    #[serde(rename = "gpt-3.5-turbo")]
    Legacy,
}

impl ModelTier {
    pub const ALL: [ModelTier; 3] = [ModelTier::Fast, ModelTier::Accurate, ModelTier::Legacy];

    /// Identifier stored in the config file and accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Fast => "gpt-4o-mini",
            ModelTier::Accurate => "gpt-4o",
            ModelTier::Legacy => "gpt-3.5-turbo",
        }
    }

    /// Human-readable description for the setup wizard.
    pub fn describe(&self) -> &'static str {
        match self {
            ModelTier::Fast => "GPT-4o Mini (fast, recommended)",
            ModelTier::Accurate => "GPT-4o (slower, more accurate)",
            ModelTier::Legacy => "GPT-3.5 Turbo (fastest)",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelTier::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| ConfigError::InvalidValue {
                key: ConfigKey::Model.as_str().to_string(),
                reason: format!(
                    "model must be one of: {}",
                    ModelTier::ALL.map(|m| m.as_str()).join(", ")
                ),
            })
    }
}

/// Recognized configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Model,
    AlwaysAskBeforeCommit,
    MaxDiffSize,
    GithubToken,
    RemoteConfigUrl,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 5] = [
        ConfigKey::Model,
        ConfigKey::AlwaysAskBeforeCommit,
        ConfigKey::MaxDiffSize,
        ConfigKey::GithubToken,
        ConfigKey::RemoteConfigUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Model => "model",
            ConfigKey::AlwaysAskBeforeCommit => "alwaysAskBeforeCommit",
            ConfigKey::MaxDiffSize => "maxDiffSize",
            ConfigKey::GithubToken => "githubToken",
            ConfigKey::RemoteConfigUrl => "remoteConfigUrl",
        }
    }

    /// Keys whose values must never be echoed back.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, ConfigKey::GithubToken)
    }

    fn valid_keys() -> String {
        ConfigKey::ALL.map(|k| k.as_str()).join(", ")
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidKey {
                key: s.to_string(),
                valid: ConfigKey::valid_keys(),
            })
    }
}

/// Effective configuration, persisted as camelCase JSON.
///
/// Fields missing from a persisted file fall back to [`Configuration::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    pub model: ModelTier,
    pub always_ask_before_commit: bool,
    pub max_diff_size: usize,
    /// Serialized as `null` when cleared so the default is not restored on reload.
    pub remote_config_url: Option<String>,
    /// Epoch milliseconds of the last successful remote fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_remote_config_fetch: Option<i64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            github_token: None,
            model: ModelTier::default(),
            always_ask_before_commit: true,
            max_diff_size: DEFAULT_MAX_DIFF_SIZE,
            remote_config_url: Some(DEFAULT_REMOTE_CONFIG_URL.to_string()),
            last_remote_config_fetch: None,
        }
    }
}

impl Configuration {
    /// Build a configuration from a parsed file, one field at a time.
    ///
    /// A field that is present but invalid keeps its default and is logged;
    /// the remaining fields are still honored. Returns `None` when `value` is
    /// not a JSON object.
    pub fn from_json_lenient(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };

        let mut config = Configuration::default();
        recover_field(&mut fields, "githubToken", &mut config.github_token);
        recover_field(&mut fields, "model", &mut config.model);
        recover_field(
            &mut fields,
            "alwaysAskBeforeCommit",
            &mut config.always_ask_before_commit,
        );
        recover_field(&mut fields, "maxDiffSize", &mut config.max_diff_size);
        recover_field(&mut fields, "remoteConfigUrl", &mut config.remote_config_url);
        recover_field(
            &mut fields,
            "lastRemoteConfigFetch",
            &mut config.last_remote_config_fetch,
        );
        Some(config)
    }

    /// Render the current value of `key`, or `None` when unset.
    pub fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::Model => Some(self.model.to_string()),
            ConfigKey::AlwaysAskBeforeCommit => Some(self.always_ask_before_commit.to_string()),
            ConfigKey::MaxDiffSize => Some(self.max_diff_size.to_string()),
            ConfigKey::GithubToken => self.github_token.clone(),
            ConfigKey::RemoteConfigUrl => self.remote_config_url.clone(),
        }
    }

    /// Parse `raw` for `key` and assign it.
    ///
    /// Validation happens before assignment, so on error `self` is unchanged.
    pub fn apply(&mut self, key: ConfigKey, raw: &str) -> Result<(), ConfigError> {
        match key {
            ConfigKey::Model => self.model = raw.parse()?,
            ConfigKey::AlwaysAskBeforeCommit => {
                self.always_ask_before_commit = parse_bool(key, raw)?;
            }
            ConfigKey::MaxDiffSize => {
                self.max_diff_size = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.as_str().to_string(),
                    reason: format!("'{raw}' is not a non-negative integer"),
                })?;
            }
            ConfigKey::GithubToken => self.github_token = non_empty(raw),
            ConfigKey::RemoteConfigUrl => {
                self.remote_config_url = match non_empty(raw) {
                    Some(url) => Some(validate_url(key, url)?),
                    None => None,
                };
            }
        }
        Ok(())
    }

    /// Restore `key` to its default. Returns `false` for keys with no default.
    pub fn reset_key(&mut self, key: ConfigKey) -> bool {
        let defaults = Configuration::default();
        match key {
            ConfigKey::Model => self.model = defaults.model,
            ConfigKey::AlwaysAskBeforeCommit => {
                self.always_ask_before_commit = defaults.always_ask_before_commit;
            }
            ConfigKey::MaxDiffSize => self.max_diff_size = defaults.max_diff_size,
            ConfigKey::RemoteConfigUrl => self.remote_config_url = defaults.remote_config_url,
            ConfigKey::GithubToken => return false,
        }
        true
    }

    /// Restore model, confirmation and diff size. The stored credential is kept.
    pub fn reset_all(&mut self) {
        for key in [
            ConfigKey::Model,
            ConfigKey::AlwaysAskBeforeCommit,
            ConfigKey::MaxDiffSize,
        ] {
            self.reset_key(key);
        }
    }
}

fn recover_field<T: DeserializeOwned>(fields: &mut Map<String, Value>, name: &str, slot: &mut T) {
    let Some(raw) = fields.remove(name) else {
        return;
    };
    match serde_json::from_value(raw) {
        Ok(value) => *slot = value,
        Err(e) => warn!("Ignoring invalid '{}' in config, using default: {}", name, e),
    }
}

fn parse_bool(key: ConfigKey, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.as_str().to_string(),
            reason: format!("'{raw}' is not true or false"),
        }),
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn validate_url(key: ConfigKey, url: String) -> Result<String, ConfigError> {
    match reqwest::Url::parse(&url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(url),
        Ok(parsed) => Err(ConfigError::InvalidValue {
            key: key.as_str().to_string(),
            reason: format!("unsupported URL scheme '{}'", parsed.scheme()),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.as_str().to_string(),
            reason: format!("'{url}' is not a valid URL: {e}"),
        }),
    }
}
