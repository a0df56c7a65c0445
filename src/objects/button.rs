//! Buttons attached to replies.
//!
//! A button's `custom_id` comes back with the click and is the dispatch key
//! for button handlers. By convention the part before the first `:` names the
//! handler and the rest carries data, e.g. `sell_one:Golden Carp`.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Visual style of a button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    /// Blurple call to action
    #[default]
    Primary,
    /// Grey
    Secondary,
    /// Green
    Success,
    /// Red
    Danger,
}

impl FromStr for ButtonStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" | "blurple" => Ok(Self::Primary),
            "secondary" | "grey" | "gray" => Ok(Self::Secondary),
            "success" | "green" => Ok(Self::Success),
            "danger" | "red" => Ok(Self::Danger),
            other => Err(Error::InvalidPayload {
                message: format!("Unknown button style {other:?}"),
            }),
        }
    }
}

/// A clickable button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Text on the button
    pub label: String,
    /// Visual style
    pub style: ButtonStyle,
    /// Echoed back on click, used to find the handler
    pub custom_id: String,
    /// Greyed out and unclickable
    pub disabled: bool,
}

impl Button {
    /// Creates an enabled primary button.
    pub fn new(label: impl Into<String>, custom_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            style: ButtonStyle::Primary,
            custom_id: custom_id.into(),
            disabled: false,
        }
    }

    /// Creates a button whose custom id is `prefix:data`.
    pub fn with_data(label: impl Into<String>, prefix: &str, data: &str) -> Self {
        Self::new(label, format!("{prefix}:{data}"))
    }

    /// Sets the style.
    #[must_use]
    pub const fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    /// Enables or disables the button.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Rejects empty labels and custom ids.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::InvalidPayload {
                message: "Button label cannot be empty".to_string(),
            });
        }
        if self.custom_id.trim().is_empty() {
            return Err(Error::InvalidPayload {
                message: format!("Button {:?} has an empty custom_id", self.label),
            });
        }
        Ok(())
    }
}
