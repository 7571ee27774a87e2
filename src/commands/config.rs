//! `gcomet config set|get|list|reset`.

use crate::config::{ConfigKey, ConfigResolver, ResetOutcome};
use crate::error::CommandError;

/// Placeholder printed instead of the stored credential.
pub const HIDDEN_VALUE: &str = "***hidden***";
const NOT_SET: &str = "not set";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    Set { key: String, value: String },
    Get { key: String },
    List,
    Reset { key: Option<String> },
}

/// Render a value for display, masking the credential.
pub fn display_value(key: ConfigKey, value: Option<&str>) -> String {
    match value {
        Some(_) if key.is_sensitive() => HIDDEN_VALUE.to_string(),
        Some(v) => v.to_string(),
        None => NOT_SET.to_string(),
    }
}

/// Execute a config action and return the lines to print.
pub async fn run_config(
    resolver: &mut ConfigResolver,
    action: ConfigAction,
) -> Result<Vec<String>, CommandError> {
    let lines = match action {
        ConfigAction::Set { key, value } => {
            let key = resolver.set(&key, &value).await?;
            let stored = resolver.get(key.as_str()).await?;
            vec![format!("Set {} = {}", key, display_value(key, stored.as_deref()))]
        }
        ConfigAction::Get { key } => {
            let parsed: ConfigKey = key.parse().map_err(CommandError::Config)?;
            let value = resolver.get(parsed.as_str()).await?;
            vec![format!("{} = {}", parsed, display_value(parsed, value.as_deref()))]
        }
        ConfigAction::List => {
            let mut lines = vec!["Current configuration:".to_string()];
            for (key, value) in resolver.list().await? {
                lines.push(format!("  {} = {}", key, display_value(key, value.as_deref())));
            }
            lines
        }
        ConfigAction::Reset { key } => match resolver.reset(key.as_deref()).await? {
            ResetOutcome::Key { key, value } => {
                vec![format!("Reset {} to default value: {}", key, value)]
            }
            ResetOutcome::NoDefault(key) => vec![format!("Warning: No default value for {key}")],
            ResetOutcome::All => vec![
                "Reset all configuration to defaults".to_string(),
                "Note: GitHub token was not reset. Run \"gcomet setup\" to reconfigure.".to_string(),
            ],
        },
    };
    Ok(lines)
}
