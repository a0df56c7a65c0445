//! Outgoing message payloads.

use super::{Button, Embed};
use crate::errors::{Error, Result};
use std::time::Duration;

/// Everything a reply or send call can carry.
///
/// `hidden` and `delete_after` only apply to [`Context::reply`](super::Context::reply);
/// [`Context::send`](super::Context::send) clears them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    /// Plain text
    pub content: Option<String>,
    /// Embeds, in order
    pub embeds: Vec<Embed>,
    /// Buttons, laid out in rows of five
    pub buttons: Vec<Button>,
    /// Ask for an ephemeral response
    pub hidden: bool,
    /// Delete the sent message after this long
    pub delete_after: Option<Duration>,
}

impl Reply {
    /// Creates an empty reply.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a text-only reply.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new().content(content)
    }

    /// Sets the text content.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Adds an embed.
    #[must_use]
    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    /// Adds a button.
    #[must_use]
    pub fn button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }

    /// Adds several buttons.
    #[must_use]
    pub fn buttons(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        self.buttons.extend(buttons);
        self
    }

    /// Requests an ephemeral response.
    #[must_use]
    pub const fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Schedules deletion of the sent message.
    #[must_use]
    pub const fn delete_after(mut self, delay: Duration) -> Self {
        self.delete_after = Some(delay);
        self
    }

    /// Rejects replies with nothing to show and invalid embeds or buttons.
    pub fn validate(&self) -> Result<()> {
        let has_content = self.content.as_deref().is_some_and(|c| !c.trim().is_empty());
        if !has_content && self.embeds.is_empty() {
            return Err(Error::InvalidPayload {
                message: "Reply needs content or an embed".to_string(),
            });
        }
        for embed in &self.embeds {
            embed.validate()?;
        }
        for button in &self.buttons {
            button.validate()?;
        }
        Ok(())
    }
}

impl From<&str> for Reply {
    fn from(content: &str) -> Self {
        Self::text(content)
    }
}

impl From<String> for Reply {
    fn from(content: String) -> Self {
        Self::text(content)
    }
}

impl From<Embed> for Reply {
    fn from(embed: Embed) -> Self {
        Self::new().embed(embed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reply_rejected() {
        assert!(Reply::new().validate().is_err());
        assert!(Reply::text("   ").validate().is_err());
    }

    #[test]
    fn test_buttons_validated() {
        let reply = Reply::text("Catch!").button(Button::new("Keep", ""));
        assert!(matches!(reply.validate(), Err(Error::InvalidPayload { .. })));
    }

    #[test]
    fn test_embed_only_reply_is_valid() {
        let reply = Reply::from(Embed::new().title("Leaderboard"));
        assert!(reply.validate().is_ok());
        assert!(reply.content.is_none());
    }
}
