//! Bot configuration loading from picord.toml
//!
//! The recognised options are the command prefix and the storage selector.
//! The bot token is deliberately absent: it is read from `DISCORD_BOT_TOKEN`
//! directly before connecting.

use crate::config::database::DbType;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

fn default_prefix() -> String {
    "!".to_string()
}

const fn default_gate() -> bool {
    true
}

/// Options recognised when the bot is initialised.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotConfig {
    /// Prefix that marks a text message as a command
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Storage engine selector, `None` runs without a database
    #[serde(default)]
    pub db_type: Option<DbType>,
    /// Connection target for the storage engine (file path or URL)
    #[serde(default)]
    pub database: Option<String>,
    /// Hold command events until the ready hook has finished
    #[serde(default = "default_gate")]
    pub gate_until_ready: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            db_type: None,
            database: None,
            gate_until_ready: default_gate(),
        }
    }
}

impl BotConfig {
    /// Creates a config with the given prefix and no database.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Selects the storage engine and its connection target.
    #[must_use]
    pub fn with_database(mut self, db_type: DbType, target: impl Into<String>) -> Self {
        self.db_type = Some(db_type);
        self.database = Some(target.into());
        self
    }

    /// Checks the options that would otherwise fail late, at dispatch time.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() {
            return Err(Error::Config {
                message: "Command prefix cannot be empty".to_string(),
            });
        }
        if self.prefix.chars().any(char::is_whitespace) {
            return Err(Error::Config {
                message: format!("Command prefix {:?} contains whitespace", self.prefix),
            });
        }
        if self.db_type.is_some() && self.database.is_none() {
            return Err(Error::Config {
                message: "`db_type` is set but `database` is missing".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads bot configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The options fail validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BotConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    let config: BotConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads bot configuration from the default location (./picord.toml)
pub fn load_default_config() -> Result<BotConfig> {
    load_config("picord.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_bot_config() {
        let toml_str = r#"
            prefix = "~"
            db_type = "sqlite"
            database = "fishing.db"
        "#;

        let config: BotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.prefix, "~");
        assert_eq!(config.db_type, Some(DbType::Sqlite));
        assert_eq!(config.database.as_deref(), Some("fishing.db"));
        assert!(config.gate_until_ready);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_empty() {
        let config: BotConfig = toml::from_str("").unwrap();
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.prefix, "!");
    }

    #[test]
    fn test_unknown_db_type_rejected() {
        let result: std::result::Result<BotConfig, _> = toml::from_str(r#"db_type = "oracle""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_blank_prefix() {
        let config = BotConfig::with_prefix(" ");
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_requires_target_for_db_type() {
        let config = BotConfig {
            db_type: Some(DbType::Sqlite),
            ..BotConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
