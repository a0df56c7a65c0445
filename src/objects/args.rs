//! Slash command arguments.
//!
//! The platform decodes and coerces option values before the dispatcher sees
//! them; handlers read them back by parameter name with [`Args::get`] or
//! [`Context::arg`](super::Context::arg).

use super::Sender;
use crate::errors::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Declared type of a slash command parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Free text
    String,
    /// Whole number
    Integer,
    /// Floating point number
    Number,
    /// True or false
    Boolean,
    /// A user, resolved to a [`Sender`]
    User,
    /// A channel id
    Channel,
    /// A role id
    Role,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::User => "user",
            Self::Channel => "channel",
            Self::Role => "role",
        };
        f.write_str(name)
    }
}

/// A decoded argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Free text
    String(String),
    /// Whole number
    Integer(i64),
    /// Floating point number
    Number(f64),
    /// True or false
    Boolean(bool),
    /// Resolved user snapshot
    User(Sender),
    /// Channel id
    Channel(u64),
    /// Role id
    Role(u64),
}

impl ArgValue {
    /// The kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::String(_) => ParamKind::String,
            Self::Integer(_) => ParamKind::Integer,
            Self::Number(_) => ParamKind::Number,
            Self::Boolean(_) => ParamKind::Boolean,
            Self::User(_) => ParamKind::User,
            Self::Channel(_) => ParamKind::Channel,
            Self::Role(_) => ParamKind::Role,
        }
    }

    /// Whether this value satisfies a parameter declared as `kind`.
    ///
    /// Integers are accepted where numbers are expected.
    #[must_use]
    pub fn fits(&self, kind: ParamKind) -> bool {
        self.kind() == kind || (kind == ParamKind::Number && matches!(self, Self::Integer(_)))
    }
}

/// Conversion from an [`ArgValue`] into a handler-facing type.
pub trait FromArg: Sized {
    /// Extracts `Self`, or `None` when the value has another type.
    fn from_arg(value: &ArgValue) -> Option<Self>;
}

impl FromArg for String {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromArg for i64 {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromArg for f64 {
    #[allow(clippy::cast_precision_loss)] // slash integers are bounded well below 2^53
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Number(n) => Some(*n),
            ArgValue::Integer(i) => Some(*i as Self),
            _ => None,
        }
    }
}

impl FromArg for bool {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromArg for Sender {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::User(user) => Some(user.clone()),
            _ => None,
        }
    }
}

impl FromArg for ArgValue {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        Some(value.clone())
    }
}

/// Arguments of one slash command invocation, by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: HashMap<String, ArgValue>,
}

impl Args {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    /// Adds an argument, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: ArgValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Raw value of `name`.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Reads a required argument.
    pub fn get<T: FromArg>(&self, name: &str) -> Result<T> {
        self.optional(name)?.ok_or_else(|| Error::Argument {
            name: name.to_string(),
            message: "missing".to_string(),
        })
    }

    /// Reads an optional argument; present but mistyped is still an error.
    pub fn optional<T: FromArg>(&self, name: &str) -> Result<Option<T>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(value) => T::from_arg(value).map(Some).ok_or_else(|| Error::Argument {
                name: name.to_string(),
                message: format!("unexpected {} value", value.kind()),
            }),
        }
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_typed_reads() {
        let args = Args::new()
            .with("amount", ArgValue::Integer(50))
            .with("user", ArgValue::User(Sender::new(2, "bob")));

        assert_eq!(args.get::<i64>("amount").unwrap(), 50);
        assert!((args.get::<f64>("amount").unwrap() - 50.0).abs() < f64::EPSILON);
        assert_eq!(args.get::<Sender>("user").unwrap().name, "bob");
    }

    #[test]
    fn test_missing_and_mistyped() {
        let args = Args::new().with("amount", ArgValue::String("lots".to_string()));

        assert!(matches!(args.get::<i64>("amount"), Err(Error::Argument { .. })));
        assert!(matches!(args.get::<i64>("other"), Err(Error::Argument { .. })));
        assert_eq!(args.optional::<i64>("other").unwrap(), None);
    }

    #[test]
    fn test_integer_fits_number() {
        assert!(ArgValue::Integer(1).fits(ParamKind::Number));
        assert!(!ArgValue::Number(1.0).fits(ParamKind::Integer));
        assert!(ArgValue::Boolean(true).fits(ParamKind::Boolean));
    }
}
