//! Single-flight configuration resolution.
//!
//! One resolver is constructed per process and passed by reference to every
//! call site. The local file is read at most once; every mutation rewrites it.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::credential::{self, CredentialHelper, GhCliHelper};
use crate::config::remote::{HttpRemoteSource, RemoteOverride, RemoteSource};
use crate::config::settings::{ConfigKey, Configuration};
use crate::config::store::{self, ConfigPaths};
use crate::error::ConfigError;

/// How long a fetched remote override stays fresh (24 hours).
pub const REMOTE_CACHE_MAX_AGE_MS: i64 = 24 * 60 * 60 * 1000;

/// Result of a reset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// A single key was restored to `value`.
    Key { key: ConfigKey, value: String },
    /// The key has no modeled default; nothing changed.
    NoDefault(ConfigKey),
    /// Model, confirmation and diff size were restored. The credential was kept.
    All,
}

/// Merges defaults, the local file, the credential sources and the remote
/// override into one effective configuration.
pub struct ConfigResolver {
    paths: ConfigPaths,
    defaults: Configuration,
    remote: Box<dyn RemoteSource>,
    helper: Box<dyn CredentialHelper>,
    config: Option<Configuration>,
    applied_override: Option<RemoteOverride>,
}

impl ConfigResolver {
    /// Resolver backed by HTTP for the remote override and `gh` for credentials.
    pub fn new(paths: ConfigPaths) -> Self {
        Self::with_sources(paths, Box::new(HttpRemoteSource::new()), Box::new(GhCliHelper))
    }

    pub fn with_sources(
        paths: ConfigPaths,
        remote: Box<dyn RemoteSource>,
        helper: Box<dyn CredentialHelper>,
    ) -> Self {
        Self {
            paths,
            defaults: Configuration::default(),
            remote,
            helper,
            config: None,
            applied_override: None,
        }
    }

    /// Replace the built-in defaults used when no local file exists.
    pub fn with_defaults(mut self, defaults: Configuration) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// The remote override merged during [`load`](Self::load), if any.
    pub fn remote_override(&self) -> Option<&RemoteOverride> {
        self.applied_override.as_ref()
    }

    /// Return the effective configuration, reading local state on first use.
    ///
    /// A missing file, or one that is not a JSON object, is replaced by the
    /// defaults, which are persisted immediately. Invalid fields in an
    /// otherwise readable file fall back to their defaults individually and
    /// the file is left as is. The remote override is merged once; any failure
    /// on that path leaves the local configuration untouched.
    pub async fn load(&mut self) -> Result<&Configuration, ConfigError> {
        let config = match self.config.take() {
            Some(config) => config,
            None => {
                let mut config = self.load_local()?;
                if let Some(remote) = self.fetch_remote(&mut config).await {
                    self.apply_remote(&mut config, remote);
                }
                config
            }
        };

        Ok(&*self.config.insert(config))
    }

    /// Effective value of `key`.
    pub async fn get(&mut self, key: &str) -> Result<Option<String>, ConfigError> {
        let key: ConfigKey = key.parse()?;
        Ok(self.load().await?.get(key))
    }

    /// All keys with their effective values, in declaration order.
    pub async fn list(&mut self) -> Result<Vec<(ConfigKey, Option<String>)>, ConfigError> {
        let config = self.load().await?;
        Ok(ConfigKey::ALL.into_iter().map(|k| (k, config.get(k))).collect())
    }

    /// Validate and store `value` under `key`, then persist the whole record.
    ///
    /// On any error the cached and persisted configuration stay as they were.
    pub async fn set(&mut self, key: &str, value: &str) -> Result<ConfigKey, ConfigError> {
        let key: ConfigKey = key.parse()?;
        let mut updated = self.load().await?.clone();
        updated.apply(key, value)?;
        self.commit(updated)?;
        Ok(key)
    }

    /// Restore one key, or with `None` the model, confirmation and diff size.
    pub async fn reset(&mut self, key: Option<&str>) -> Result<ResetOutcome, ConfigError> {
        let key = key.map(str::parse::<ConfigKey>).transpose()?;
        let mut updated = self.load().await?.clone();

        let outcome = match key {
            Some(key) => {
                if !updated.reset_key(key) {
                    warn!("No default value for {}", key);
                    return Ok(ResetOutcome::NoDefault(key));
                }
                ResetOutcome::Key {
                    key,
                    value: updated.get(key).unwrap_or_else(|| "not set".to_string()),
                }
            }
            None => {
                updated.reset_all();
                ResetOutcome::All
            }
        };

        self.commit(updated)?;
        Ok(outcome)
    }

    /// The active credential: environment, then config file, then `gh`.
    pub async fn resolve_credential(&mut self) -> Result<Option<String>, ConfigError> {
        let stored = self.load().await?.github_token.clone();
        Ok(credential::resolve_credential(stored.as_deref(), &*self.helper))
    }

    fn load_local(&self) -> Result<Configuration, ConfigError> {
        if let Some(config) = store::read_json::<serde_json::Value>(&self.paths.config_file)
            .and_then(Configuration::from_json_lenient)
        {
            debug!("Loaded config from {}", self.paths.config_file.display());
            return Ok(config);
        }

        info!(
            "No usable config at {}, writing defaults",
            self.paths.config_file.display()
        );
        let config = self.defaults.clone();
        store::write_json(&self.paths.config_file, &config)?;
        Ok(config)
    }

    fn commit(&mut self, config: Configuration) -> Result<(), ConfigError> {
        store::write_json(&self.paths.config_file, &config)?;
        self.config = Some(config);
        Ok(())
    }

    /// Cached override when fresh, otherwise one live fetch.
    ///
    /// A successful live fetch refreshes the cache file and stamps
    /// `last_remote_config_fetch`. Every failure yields `None`.
    async fn fetch_remote(&self, config: &mut Configuration) -> Option<RemoteOverride> {
        let url = config.remote_config_url.clone()?;
        let now = Utc::now().timestamp_millis();

        if let Some(last) = config.last_remote_config_fetch
            && now - last < REMOTE_CACHE_MAX_AGE_MS
        {
            match store::read_json::<RemoteOverride>(&self.paths.remote_cache_file) {
                Some(cached) => {
                    debug!("Using cached remote config");
                    return Some(cached);
                }
                None => debug!("Remote config cache unavailable, fetching"),
            }
        }

        let remote = match self.remote.fetch(&url).await {
            Ok(remote) => remote,
            Err(e) => {
                debug!("Remote config fetch from {} failed: {}", url, e);
                return None;
            }
        };

        if let Err(e) = store::write_json(&self.paths.remote_cache_file, &remote) {
            warn!("Failed to cache remote config: {}", e);
        }

        config.last_remote_config_fetch = Some(now);
        if let Err(e) = store::write_json(&self.paths.config_file, config) {
            warn!("Failed to record remote config fetch time: {}", e);
        }

        Some(remote)
    }

    fn apply_remote(&mut self, config: &mut Configuration, remote: RemoteOverride) {
        if let Some(model) = remote.suggested_model() {
            config.model = model;
        }

        if remote.requires_newer_than(env!("CARGO_PKG_VERSION")) {
            warn!(
                "gcomet {} is older than the recommended minimum version {}",
                env!("CARGO_PKG_VERSION"),
                remote.min_version.as_deref().unwrap_or_default()
            );
        }

        self.applied_override = Some(remote);
    }
}
