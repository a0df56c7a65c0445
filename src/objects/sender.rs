use serde::{Deserialize, Serialize};
use std::fmt;

/// The identity that triggered an event, as it was at event time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sender {
    /// Stable platform id (a Discord snowflake)
    pub id: u64,
    /// Display name
    pub name: String,
    /// Avatar image, when the user has one
    pub avatar_url: Option<String>,
}

impl Sender {
    /// Creates a sender without an avatar.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar_url: None,
        }
    }

    /// Sets the avatar url.
    #[must_use]
    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    /// Mention markup that pings this user.
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
