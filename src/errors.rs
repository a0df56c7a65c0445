//! Unified error types for picord.
//!
//! Storage and object-construction errors propagate to the calling handler.
//! Handler failures are caught by the dispatcher and handed to the error hook,
//! they never reach the event loop.

use thiserror::Error;

/// Every failure picord can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Constraint violation, connection loss or malformed SQL.
    #[error("Storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),

    /// A table or column name that cannot be safely quoted.
    #[error("Invalid SQL identifier: {name:?}")]
    InvalidIdentifier {
        /// The rejected identifier
        name: String,
    },

    /// A row lacks the requested column or it has an unexpected type.
    #[error("Column `{column}`: {message}")]
    Column {
        /// Requested column
        column: String,
        /// Why the value could not be read
        message: String,
    },

    /// Failure reported by the chat platform.
    #[error("Platform error: {message}")]
    Platform {
        /// What the platform reported
        message: String,
    },

    /// Bad or missing configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// I/O failure while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable is missing.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A slash command argument was missing or had the wrong type.
    #[error("Argument `{name}`: {message}")]
    Argument {
        /// Declared parameter name
        name: String,
        /// What went wrong
        message: String,
    },

    /// An Embed, Button or reply with an empty mandatory field.
    #[error("Invalid payload: {message}")]
    InvalidPayload {
        /// Which field was empty
        message: String,
    },

    /// Application handler failure.
    #[error("Handler error: {message}")]
    Handler {
        /// Message supplied by the application
        message: String,
    },

    /// An application handler panicked.
    #[error("Handler panicked: {message}")]
    HandlerPanicked {
        /// Panic payload, when it was a string
        message: String,
    },

    /// Formatting into a reply buffer failed.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

impl Error {
    /// Builds an application-level handler error.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
        }
    }

    /// Builds a platform error from anything displayable.
    pub fn platform(message: impl std::fmt::Display) -> Self {
        Self::Platform {
            message: message.to_string(),
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::platform(value)
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
