//! Rich embeds.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An RGB embed color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    /// `#3498DB`
    pub const BLUE: Self = Self(0x0034_98DB);
    /// `#F1C40F`
    pub const YELLOW: Self = Self(0x00F1_C40F);
    /// `#E74C3C`
    pub const RED: Self = Self(0x00E7_4C3C);
    /// `#2ECC71`
    pub const GREEN: Self = Self(0x002E_CC71);
    /// `#9B59B6`
    pub const PURPLE: Self = Self(0x009B_59B6);
    /// `#E67E22`
    pub const ORANGE: Self = Self(0x00E6_7E22);
    /// `#D4AF37`
    pub const GOLD: Self = Self(0x00D4_AF37);
    /// `#95A5A6`
    pub const GREY: Self = Self(0x0095_A5A6);
    /// `#FFFFFF`
    pub const WHITE: Self = Self(0x00FF_FFFF);
    /// `#000000`
    pub const BLACK: Self = Self(0);

    /// The raw RGB value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self(value & 0x00FF_FFFF)
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Accepts a color name or `#RRGGBB`.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        let color = match name.as_str() {
            "blue" => Self::BLUE,
            "yellow" => Self::YELLOW,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "purple" => Self::PURPLE,
            "orange" => Self::ORANGE,
            "gold" => Self::GOLD,
            "grey" | "gray" => Self::GREY,
            "white" => Self::WHITE,
            "black" => Self::BLACK,
            hex => {
                let digits = hex.strip_prefix('#').unwrap_or(hex);
                if digits.len() != 6 {
                    return Err(Error::InvalidPayload {
                        message: format!("Unknown color {s:?}"),
                    });
                }
                u32::from_str_radix(digits, 16)
                    .map(Self)
                    .map_err(|_| Error::InvalidPayload {
                        message: format!("Unknown color {s:?}"),
                    })?
            }
        };
        Ok(color)
    }
}

/// One `name: value` block in an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field heading
    pub name: String,
    /// Field body
    pub value: String,
    /// Rendered side by side with neighbouring inline fields
    pub inline: bool,
}

/// A rich embed. Fields keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Heading
    pub title: Option<String>,
    /// Main text
    pub description: Option<String>,
    /// Side bar color
    pub color: Option<Color>,
    /// Ordered fields
    pub fields: Vec<EmbedField>,
    /// Small text at the bottom
    pub footer: Option<String>,
    /// Small image in the corner
    pub thumbnail: Option<String>,
}

impl Embed {
    /// Creates an empty embed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the color.
    #[must_use]
    pub fn color(mut self, color: impl Into<Color>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.add_field(name, value, inline);
        self
    }

    /// Appends a field in place.
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
    }

    /// Sets the footer text.
    #[must_use]
    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    /// Sets the thumbnail url.
    #[must_use]
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    /// Rejects embeds with nothing to show or with empty field parts.
    pub fn validate(&self) -> Result<()> {
        let has_text = |text: &Option<String>| text.as_deref().is_some_and(|t| !t.trim().is_empty());
        if !has_text(&self.title) && !has_text(&self.description) && self.fields.is_empty() {
            return Err(Error::InvalidPayload {
                message: "Embed needs a title, a description or a field".to_string(),
            });
        }
        for field in &self.fields {
            if field.name.trim().is_empty() || field.value.trim().is_empty() {
                return Err(Error::InvalidPayload {
                    message: format!("Embed field {:?} has an empty name or value", field.name),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_color_names_and_hex() {
        assert_eq!("blue".parse::<Color>().unwrap(), Color::BLUE);
        assert_eq!("Yellow".parse::<Color>().unwrap(), Color::YELLOW);
        assert_eq!("#00ff00".parse::<Color>().unwrap(), Color(0x00FF00));
        assert!("chartreuse-ish".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
    }

    #[test]
    fn test_fields_keep_order() {
        let mut embed = Embed::new().title("Profile").field("Balance", "10 coins", true);
        embed.add_field("Inventory", "Empty", false);

        let names: Vec<&str> = embed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Balance", "Inventory"]);
        assert!(!embed.fields[1].inline);
        assert!(embed.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_embed() {
        assert!(Embed::new().validate().is_err());
        assert!(Embed::new().title("  ").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_field_value() {
        let embed = Embed::new().title("x").field("Inventory", "", false);
        assert!(matches!(embed.validate(), Err(Error::InvalidPayload { .. })));
    }
}
