//! `picord` - a convenience layer over a Discord bot framework
//!
//! Applications register text commands, slash commands and button handlers,
//! then receive a simple [`Context`] per event instead of raw gateway payloads.
//! Handlers get a [`Database`] for state and answer with [`Embed`], [`Button`]
//! and [`Reply`] values.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_types_passed_by_value,
    clippy::unnecessary_wraps,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Complexity and readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::too_many_lines,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::result_large_err,
)]

/// Bot assembly, dispatch and the Discord gateway
pub mod bot;
/// Bot options and storage selection
pub mod config;
/// Relational storage wrapper
pub mod db;
/// Unified error types and result handling
pub mod errors;
/// Raw inbound events
pub mod events;
/// Context, Sender, Embed, Button and Reply
pub mod objects;
/// What the dispatcher needs from the chat platform
pub mod platform;
/// Trigger keys mapped to handlers
pub mod registry;

#[cfg(test)]
pub mod test_utils;

pub use bot::{Bot, BotBuilder, DispatchOutcome, Dispatcher, Ready};
pub use config::{BotConfig, DbType};
pub use db::{Database, Row};
pub use errors::{Error, Result};
pub use events::RawEvent;
pub use objects::{
    ArgValue, Args, Button, ButtonStyle, Color, Context, Embed, Message, ParamKind, Reply, Sender,
};
pub use platform::{MemoryPlatform, MessageRef, Origin, Platform};
pub use registry::{Command, HandlerResult, Property, Registry};

// Statement parameters are `sea_orm::Value`s; re-exported so applications
// can name the type without depending on sea-orm directly.
pub use sea_orm::Value;
