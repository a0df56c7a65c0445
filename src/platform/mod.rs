//! Platform seam - what the dispatch core needs from the chat platform.
//!
//! The core never talks to the gateway directly. It asks a [`Platform`] to
//! respond, send, defer and delete, and identifies targets with [`Origin`] and
//! [`MessageRef`]. The serenity-backed implementation lives in
//! [`crate::bot::gateway`]; [`MemoryPlatform`] records calls for tests.

mod memory;

pub use memory::{MemoryPlatform, Outbound, OutboundKind};

use crate::errors::Result;
use crate::objects::{Reply, Sender};
use async_trait::async_trait;

/// Where an event came from, and therefore how to answer it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// A plain text message in a channel
    Message {
        /// Channel the message was posted in
        channel_id: u64,
        /// The message itself
        message_id: u64,
    },
    /// A slash command or component interaction
    Interaction {
        /// Interaction id, needed for the initial response
        interaction_id: u64,
        /// Continuation token for responses and follow-ups
        token: String,
        /// Channel the interaction happened in
        channel_id: u64,
    },
}

impl Origin {
    /// Channel the event happened in.
    #[must_use]
    pub const fn channel_id(&self) -> u64 {
        match self {
            Self::Message { channel_id, .. } | Self::Interaction { channel_id, .. } => *channel_id,
        }
    }

    /// Whether replies to this origin can be ephemeral.
    #[must_use]
    pub const fn supports_hidden(&self) -> bool {
        matches!(self, Self::Interaction { .. })
    }
}

/// A message the bot can later delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageRef {
    /// A regular channel message
    Channel {
        /// Channel holding the message
        channel_id: u64,
        /// Message id
        message_id: u64,
    },
    /// The initial response to an interaction
    OriginalResponse {
        /// Interaction token
        token: String,
    },
    /// A follow-up message to an interaction
    Followup {
        /// Interaction token
        token: String,
        /// Follow-up message id
        message_id: u64,
    },
}

/// The primitives the dispatch core calls into.
///
/// Implementations serialize [`Reply`] values into platform payloads.
#[async_trait]
pub trait Platform: Send + Sync + 'static {
    /// Answers the event identified by `origin`.
    ///
    /// `followup` is set once the interaction already has a response
    /// (a reply or a deferral); platforms without that notion ignore it.
    async fn respond(&self, origin: &Origin, reply: &Reply, followup: bool) -> Result<MessageRef>;

    /// Acknowledges an interaction so the handler can take its time.
    async fn defer(&self, origin: &Origin, hidden: bool) -> Result<()>;

    /// Posts a new, always visible message to a channel.
    async fn send(&self, channel_id: u64, reply: &Reply) -> Result<MessageRef>;

    /// Deletes a message. Fails if it is already gone.
    async fn delete(&self, message: &MessageRef) -> Result<()>;

    /// Looks up a user by id.
    async fn fetch_user(&self, user_id: u64) -> Result<Sender>;
}
