//! User-scoped config directory and JSON file persistence.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Directory name under the user's home directory.
pub const CONFIG_DIR_NAME: &str = ".gcomet";

/// Environment variable that overrides the config directory.
pub const CONFIG_HOME_ENV_VAR: &str = "GCOMET_HOME";

const CONFIG_FILE_NAME: &str = "config.json";
const REMOTE_CACHE_FILE_NAME: &str = "remote-config.json";

/// Locations of the persisted config and the remote override cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub dir: PathBuf,
    pub config_file: PathBuf,
    pub remote_cache_file: PathBuf,
}

impl ConfigPaths {
    /// Paths rooted at an explicit directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            config_file: dir.join(CONFIG_FILE_NAME),
            remote_cache_file: dir.join(REMOTE_CACHE_FILE_NAME),
            dir,
        }
    }

    /// `$GCOMET_HOME` if set, otherwise `~/.gcomet`.
    pub fn user() -> Result<Self, ConfigError> {
        if let Ok(dir) = env::var(CONFIG_HOME_ENV_VAR)
            && !dir.is_empty()
        {
            return Ok(Self::in_dir(dir));
        }

        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(Self::in_dir(home.join(CONFIG_DIR_NAME)))
    }
}

/// Read and parse a JSON file.
///
/// Returns `None` when the file is missing or unparseable. Parse failures are
/// logged at warn level.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring unreadable {}: {}", path.display(), e);
            None
        }
    }
}

/// Serialize `value` as pretty JSON and atomically replace `path`.
///
/// The parent directory is created on demand. The content is written to a
/// temp file in the same directory and renamed over the target, so readers
/// never observe a partially written file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(value).map_err(ConfigError::Serialize)?;
    let persist_err = |source: std::io::Error| ConfigError::PersistFailed {
        path: path.display().to_string(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(persist_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(persist_err)?;
    tmp.write_all(json.as_bytes()).map_err(persist_err)?;
    tmp.write_all(b"\n").map_err(persist_err)?;
    tmp.persist(path).map_err(|e| persist_err(e.error))?;

    Ok(())
}
