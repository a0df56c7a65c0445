//! Raw platform events, as the dispatcher receives them.
//!
//! The gateway adapter translates serenity events into these; tests build
//! them directly.

use crate::objects::{Args, ArgValue, Message, Sender};

/// An inbound event, before classification.
#[derive(Debug, Clone)]
pub enum RawEvent {
    /// Connection established
    Ready(ReadyEvent),
    /// Plain text message
    Message(MessageEvent),
    /// Slash command invocation
    Slash(SlashEvent),
    /// Button click
    Component(ComponentEvent),
}

impl RawEvent {
    /// Short name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Ready(_) => "ready",
            Self::Message(_) => "message",
            Self::Slash(_) => "slash",
            Self::Component(_) => "component",
        }
    }
}

/// Lifecycle event fired once per connection establishment.
#[derive(Debug, Clone)]
pub struct ReadyEvent {
    /// The bot's own identity
    pub user: Sender,
    /// Gateway session; a repeated id is the same connection
    pub session_id: String,
}

/// A text message posted in a channel.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    /// Channel it was posted in
    pub channel_id: u64,
    /// Message id
    pub message_id: u64,
    /// Who posted it
    pub author: Sender,
    /// Whether the author is a bot account
    pub author_is_bot: bool,
    /// Raw text
    pub content: String,
}

impl MessageEvent {
    /// Creates a message from a human author in channel 1.
    pub fn new(author: Sender, content: impl Into<String>) -> Self {
        Self {
            channel_id: 1,
            message_id: 1,
            author,
            author_is_bot: false,
            content: content.into(),
        }
    }
}

/// A slash command invocation with decoded arguments.
#[derive(Debug, Clone)]
pub struct SlashEvent {
    /// Interaction id
    pub interaction_id: u64,
    /// Interaction token
    pub token: String,
    /// Channel the command was used in
    pub channel_id: u64,
    /// Who used it
    pub user: Sender,
    /// Command name
    pub name: String,
    /// Arguments, already coerced by the platform
    pub args: Args,
}

impl SlashEvent {
    /// Creates an invocation of `name` by `user` without arguments.
    pub fn new(user: Sender, name: impl Into<String>) -> Self {
        Self {
            interaction_id: 1,
            token: "interaction-token".to_string(),
            channel_id: 1,
            user,
            name: name.into(),
            args: Args::new(),
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, value: ArgValue) -> Self {
        self.args.insert(name, value);
        self
    }
}

/// A button click.
#[derive(Debug, Clone)]
pub struct ComponentEvent {
    /// Interaction id
    pub interaction_id: u64,
    /// Interaction token
    pub token: String,
    /// Channel the button lives in
    pub channel_id: u64,
    /// Who clicked
    pub user: Sender,
    /// The clicked button's custom id
    pub custom_id: String,
    /// Message carrying the button
    pub message: Option<Message>,
}

impl ComponentEvent {
    /// Creates a click on `custom_id` by `user`.
    pub fn new(user: Sender, custom_id: impl Into<String>) -> Self {
        Self {
            interaction_id: 1,
            token: "interaction-token".to_string(),
            channel_id: 1,
            user,
            custom_id: custom_id.into(),
            message: None,
        }
    }

    /// Attaches the message that carries the button.
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }
}
