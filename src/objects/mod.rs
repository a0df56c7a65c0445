//! Object model - platform-agnostic views handed to handlers.
//!
//! [`Context`] is built fresh for every event. [`Sender`] is the identity
//! snapshot taken at event time. [`Embed`], [`Button`] and [`Reply`] are pure
//! value objects serialized by the platform when a reply is sent.

/// Typed slash command arguments
pub mod args;
/// Interactive buttons
pub mod button;
/// Per-event request object
pub mod context;
/// Rich embeds and colors
pub mod embed;
/// Outgoing message payloads
pub mod reply;
/// Invoking identity
pub mod sender;

pub use args::{ArgValue, Args, FromArg, ParamKind};
pub use button::{Button, ButtonStyle};
pub use context::{Context, Message};
pub use embed::{Color, Embed, EmbedField};
pub use reply::Reply;
pub use sender::Sender;
