//! Context - the request object every handler receives.
//!
//! A `Context` is built by the dispatcher immediately before a handler runs.
//! Construction is pure: it copies data out of the raw event and never talks
//! to the platform. Talking happens through [`Context::reply`],
//! [`Context::send`] and friends.

use super::{ArgValue, Args, FromArg, Reply, Sender};
use crate::db::Database;
use crate::errors::{Error, Result};
use crate::events::{ComponentEvent, MessageEvent, SlashEvent};
use crate::platform::{MessageRef, Origin, Platform};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

/// The platform message tied to an event: the command message for text
/// commands, the message carrying the button for clicks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Channel holding the message
    pub channel_id: u64,
    /// Message id
    pub id: u64,
    /// Text content
    pub content: String,
    /// Author, when known
    pub author: Option<Sender>,
}

impl Message {
    /// Reference usable with [`Context::delete`].
    #[must_use]
    pub const fn reference(&self) -> MessageRef {
        MessageRef::Channel {
            channel_id: self.channel_id,
            message_id: self.id,
        }
    }
}

/// One inbound interaction, ready for a handler.
///
/// Cloning is cheap; clones share the "already responded" state so a reply
/// from any clone turns later replies into follow-ups.
#[derive(Clone)]
pub struct Context {
    sender: Sender,
    db: Option<Database>,
    custom_id: Option<String>,
    message: Option<Message>,
    args: Args,
    text_args: Vec<String>,
    command: String,
    origin: Origin,
    platform: Arc<dyn Platform>,
    hidden_by_default: bool,
    responded: Arc<AtomicBool>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("command", &self.command)
            .field("sender", &self.sender)
            .field("custom_id", &self.custom_id)
            .field("origin", &self.origin)
            .field("has_db", &self.db.is_some())
            .finish_non_exhaustive()
    }
}

impl Context {
    fn build(
        sender: Sender,
        command: &str,
        origin: Origin,
        db: Option<Database>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        Self {
            sender,
            db,
            custom_id: None,
            message: None,
            args: Args::new(),
            text_args: Vec::new(),
            command: command.to_string(),
            origin,
            platform,
            hidden_by_default: false,
            responded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Context for a prefix text command.
    pub(crate) fn for_message(
        event: &MessageEvent,
        command: &str,
        text_args: Vec<String>,
        db: Option<Database>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        let origin = Origin::Message {
            channel_id: event.channel_id,
            message_id: event.message_id,
        };
        let mut ctx = Self::build(event.author.clone(), command, origin, db, platform);
        ctx.text_args = text_args;
        ctx.message = Some(Message {
            channel_id: event.channel_id,
            id: event.message_id,
            content: event.content.clone(),
            author: Some(event.author.clone()),
        });
        ctx
    }

    /// Context for a slash command.
    pub(crate) fn for_slash(
        event: &SlashEvent,
        db: Option<Database>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        let origin = Origin::Interaction {
            interaction_id: event.interaction_id,
            token: event.token.clone(),
            channel_id: event.channel_id,
        };
        let mut ctx = Self::build(event.user.clone(), &event.name, origin, db, platform);
        ctx.args = event.args.clone();
        ctx
    }

    /// Context for a button click matched by `prefix`.
    pub(crate) fn for_component(
        event: &ComponentEvent,
        prefix: &str,
        db: Option<Database>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        let origin = Origin::Interaction {
            interaction_id: event.interaction_id,
            token: event.token.clone(),
            channel_id: event.channel_id,
        };
        let mut ctx = Self::build(event.user.clone(), prefix, origin, db, platform);
        ctx.custom_id = Some(event.custom_id.clone());
        ctx.message.clone_from(&event.message);
        ctx
    }

    pub(crate) const fn with_hidden_default(mut self, hidden: bool) -> Self {
        self.hidden_by_default = hidden;
        self
    }

    /// Who triggered the event.
    #[must_use]
    pub const fn sender(&self) -> &Sender {
        &self.sender
    }

    /// The bot's database, if one is configured.
    #[must_use]
    pub const fn db(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    /// The bot's database, or an error when none is configured.
    pub fn database(&self) -> Result<&Database> {
        self.db.as_ref().ok_or_else(|| Error::Config {
            message: "No database configured for this bot".to_string(),
        })
    }

    /// Custom id of the clicked button; `None` for commands.
    #[must_use]
    pub fn custom_id(&self) -> Option<&str> {
        self.custom_id.as_deref()
    }

    /// Everything after the first `:` of the custom id.
    ///
    /// `sell_one:Golden Carp` yields `Golden Carp`; `a:b:c` yields `b:c`.
    #[must_use]
    pub fn custom_id_data(&self) -> Option<&str> {
        self.custom_id()
            .and_then(|id| id.split_once(':'))
            .map(|(_, data)| data)
    }

    /// The message associated with the event.
    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Name of the command, or the button prefix that matched.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Where the event came from.
    #[must_use]
    pub const fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Channel the event happened in.
    #[must_use]
    pub const fn channel_id(&self) -> u64 {
        self.origin.channel_id()
    }

    /// All slash command arguments.
    #[must_use]
    pub const fn args(&self) -> &Args {
        &self.args
    }

    /// Reads a required slash command argument.
    pub fn arg<T: FromArg>(&self, name: &str) -> Result<T> {
        self.args.get(name)
    }

    /// Reads an optional slash command argument.
    pub fn opt_arg<T: FromArg>(&self, name: &str) -> Result<Option<T>> {
        self.args.optional(name)
    }

    /// Raw slash command argument.
    #[must_use]
    pub fn raw_arg(&self, name: &str) -> Option<&ArgValue> {
        self.args.raw(name)
    }

    /// Whitespace-separated words after a text command's name.
    #[must_use]
    pub fn text_args(&self) -> &[String] {
        &self.text_args
    }

    /// The platform this context talks to.
    #[must_use]
    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    /// Answers the event.
    ///
    /// A hidden reply degrades to a normal one when the origin cannot carry
    /// ephemeral messages. With `delete_after` set, deletion is scheduled in
    /// the background and this call returns right after sending.
    pub async fn reply(&self, reply: impl Into<Reply>) -> Result<MessageRef> {
        let mut reply = reply.into();
        reply.validate()?;

        reply.hidden |= self.hidden_by_default;
        if reply.hidden && !self.origin.supports_hidden() {
            debug!(command = %self.command, "Hidden reply not supported here, sending visibly");
            reply.hidden = false;
        }

        let followup = self.responded.swap(true, Ordering::SeqCst);
        let sent = match self.platform.respond(&self.origin, &reply, followup).await {
            Ok(sent) => sent,
            Err(e) => {
                if !followup {
                    self.responded.store(false, Ordering::SeqCst);
                }
                return Err(e);
            }
        };

        if let Some(delay) = reply.delete_after {
            self.delete_later(sent.clone(), delay);
        }
        Ok(sent)
    }

    /// Posts a new, always visible message in the event's channel.
    ///
    /// `hidden` and `delete_after` are ignored.
    pub async fn send(&self, reply: impl Into<Reply>) -> Result<MessageRef> {
        let mut reply = reply.into();
        reply.validate()?;
        reply.hidden = false;
        reply.delete_after = None;
        self.platform.send(self.channel_id(), &reply).await
    }

    /// Acknowledges an interaction so a slow handler is not timed out.
    ///
    /// No-op for text commands and for interactions that were already answered.
    pub async fn defer(&self) -> Result<()> {
        if !matches!(self.origin, Origin::Interaction { .. }) {
            return Ok(());
        }
        if self.responded.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Err(e) = self.platform.defer(&self.origin, self.hidden_by_default).await {
            self.responded.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }

    /// Best-effort deletion: failures are logged and reported as `false`.
    pub async fn delete(&self, message: &MessageRef) -> bool {
        match self.platform.delete(message).await {
            Ok(()) => true,
            Err(e) => {
                debug!(?message, "Ignoring failed delete: {e}");
                false
            }
        }
    }

    /// Best-effort deletion of [`Context::message`].
    pub async fn delete_message(&self) -> bool {
        match &self.message {
            Some(message) => self.delete(&message.reference()).await,
            None => false,
        }
    }

    /// Looks up a user through the platform.
    pub async fn fetch_user(&self, user_id: u64) -> Result<Sender> {
        self.platform.fetch_user(user_id).await
    }

    fn delete_later(&self, message: MessageRef, delay: Duration) {
        let platform = Arc::clone(&self.platform);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = platform.delete(&message).await {
                debug!(?message, "Scheduled delete failed, ignoring: {e}");
            }
        });
    }
}
