//! Database configuration - storage engine selection and connection URLs.
//!
//! Applications name an engine (`sqlite`, `postgres`) and a target. `SQLite`
//! targets are file paths or `:memory:`; Postgres targets are connection URLs.
//! `DATABASE_URL` in the environment wins over whatever the config says.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Storage engine selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// File-backed or in-memory `SQLite`
    Sqlite,
    /// Networked Postgres
    Postgres,
}

impl FromStr for DbType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(Error::Config {
                message: format!("Unsupported db_type {other:?}"),
            }),
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => f.write_str("sqlite"),
            Self::Postgres => f.write_str("postgres"),
        }
    }
}

/// Turns a selector and target into a connection URL.
///
/// `SQLite` file paths get `mode=rwc` so the file is created on first use.
pub fn connection_url(db_type: DbType, target: &str) -> Result<String> {
    let target = target.trim();
    if target.is_empty() {
        return Err(Error::Config {
            message: "Database target cannot be empty".to_string(),
        });
    }

    match db_type {
        DbType::Sqlite => {
            if target == ":memory:" || target == "sqlite::memory:" {
                Ok("sqlite::memory:".to_string())
            } else if target.starts_with("sqlite:") {
                Ok(target.to_string())
            } else {
                Ok(format!("sqlite://{target}?mode=rwc"))
            }
        }
        DbType::Postgres => {
            if target.starts_with("postgres://") || target.starts_with("postgresql://") {
                Ok(target.to_string())
            } else {
                Err(Error::Config {
                    message: format!("Postgres target must be a URL, got {target:?}"),
                })
            }
        }
    }
}

/// Gets the database URL from `DATABASE_URL` or builds it from the selector.
pub fn resolve_database_url(db_type: DbType, target: &str) -> Result<String> {
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => Ok(url),
        _ => connection_url(db_type, target),
    }
}
