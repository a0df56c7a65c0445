//! Registry - trigger keys mapped to handlers.
//!
//! Three independent key spaces, built once before serving starts:
//!
//! 1. text commands, keyed by the first word after the prefix
//! 2. slash commands, keyed by name, with a declared parameter schema
//! 3. buttons, keyed by custom-id prefix with longest-prefix-match
//!
//! A button registered as `keep` matches custom ids `keep` and `keep:<data>`.
//! When several registered prefixes match, the longest one wins.

use crate::errors::{Error, Result};
use crate::objects::{Args, Context, ParamKind};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Boxed `Send` future returned by handlers and hooks.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// What a handler returns.
pub type HandlerResult = Result<()>;

/// An application handler.
///
/// Implemented for every `Fn(Context) -> impl Future<Output = HandlerResult>`,
/// so plain `async fn fish(ctx: Context) -> picord::Result<()>` functions can be
/// registered and still called directly.
pub trait Handler: Send + Sync + 'static {
    /// Runs the handler.
    fn call(&self, ctx: Context) -> BoxFuture<HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture<HandlerResult> {
        Box::pin(self(ctx))
    }
}

/// Behaviour switches attached to a command at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    /// Text command also matches without the prefix
    NoPrefix,
    /// Replies default to ephemeral
    Hidden,
    /// Text command is also registered as a slash command
    Slash,
    /// Interaction is deferred before the handler runs
    Background,
    /// Every invocation is logged at info level
    Logged,
    /// Runs at most once per sender
    Once,
    /// Per-sender cooldown
    Cooldown(Duration),
    /// Clears [`Property::Once`]
    Repeatable,
}

/// Resolved set of [`Property`] values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Properties {
    /// See [`Property::NoPrefix`]
    pub no_prefix: bool,
    /// See [`Property::Hidden`]
    pub hidden: bool,
    /// See [`Property::Slash`]
    pub slash: bool,
    /// See [`Property::Background`]
    pub background: bool,
    /// See [`Property::Logged`]
    pub logged: bool,
    /// See [`Property::Once`]
    pub once: bool,
    /// See [`Property::Cooldown`]
    pub cooldown: Option<Duration>,
}

impl Properties {
    fn apply(&mut self, property: Property) {
        match property {
            Property::NoPrefix => self.no_prefix = true,
            Property::Hidden => self.hidden = true,
            Property::Slash => self.slash = true,
            Property::Background => self.background = true,
            Property::Logged => self.logged = true,
            Property::Once => self.once = true,
            Property::Repeatable => self.once = false,
            Property::Cooldown(duration) => self.cooldown = Some(duration),
        }
    }
}

/// A declared slash command parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Name the handler reads it by
    pub name: String,
    /// Expected type
    pub kind: ParamKind,
    /// Shown in the client
    pub description: String,
    /// Whether the platform must supply it
    pub required: bool,
}

/// Which key space a command lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Prefix text command
    Text,
    /// Slash command
    Slash,
    /// Button custom-id prefix
    Button,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Slash => f.write_str("slash"),
            Self::Button => f.write_str("button"),
        }
    }
}

/// A registration: trigger key, schema, properties and handler.
#[derive(Clone)]
pub struct Command {
    /// Key space
    pub trigger: Trigger,
    /// Command name or button prefix
    pub name: String,
    /// Shown in the client for slash commands
    pub description: String,
    /// Declared slash parameters, in order
    pub params: Vec<Param>,
    /// Behaviour switches
    pub properties: Properties,
    handler: Arc<dyn Handler>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("trigger", &self.trigger)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

impl Command {
    fn new(trigger: Trigger, name: &str, description: &str, handler: impl Handler) -> Self {
        Self {
            trigger,
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
            properties: Properties::default(),
            handler: Arc::new(handler),
        }
    }

    /// A prefix text command, matched on the first word after the prefix.
    pub fn text(name: &str, handler: impl Handler) -> Self {
        Self::new(Trigger::Text, name, "", handler)
    }

    /// A slash command.
    pub fn slash(name: &str, description: &str, handler: impl Handler) -> Self {
        Self::new(Trigger::Slash, name, description, handler)
    }

    /// A button handler for custom ids equal to `prefix` or starting with `prefix:`.
    pub fn button(prefix: &str, handler: impl Handler) -> Self {
        Self::new(Trigger::Button, prefix, "", handler)
    }

    /// Sets the description shown in the client.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Declares a required parameter.
    #[must_use]
    pub fn param(mut self, name: &str, kind: ParamKind, description: &str) -> Self {
        self.params.push(Param {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: true,
        });
        self
    }

    /// Declares an optional parameter.
    #[must_use]
    pub fn optional_param(mut self, name: &str, kind: ParamKind, description: &str) -> Self {
        self.params.push(Param {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: false,
        });
        self
    }

    /// Applies a property.
    #[must_use]
    pub fn with(mut self, property: Property) -> Self {
        self.properties.apply(property);
        self
    }

    /// The handler.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Whether this command should appear in the platform's slash menu.
    #[must_use]
    pub fn is_slash(&self) -> bool {
        self.trigger == Trigger::Slash || (self.trigger == Trigger::Text && self.properties.slash)
    }

    /// Checks `args` against the declared schema.
    ///
    /// Required parameters must be present and every declared parameter that
    /// is present must have the declared type. Undeclared extras are ignored.
    pub fn bind(&self, args: &Args) -> Result<()> {
        for param in &self.params {
            match args.raw(&param.name) {
                None if param.required => {
                    return Err(Error::Argument {
                        name: param.name.clone(),
                        message: "missing".to_string(),
                    });
                }
                Some(value) if !value.fits(param.kind) => {
                    return Err(Error::Argument {
                        name: param.name.clone(),
                        message: format!("expected {}, got {}", param.kind, value.kind()),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::Config { message });

        if self.name.is_empty() || self.name.chars().any(char::is_whitespace) {
            return invalid(format!(
                "{} command name {:?} must be a single non-empty word",
                self.trigger, self.name
            ));
        }
        if self.is_slash() {
            let valid_name = self.name.len() <= 32
                && self
                    .name
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
            if !valid_name {
                return invalid(format!(
                    "Slash command name {:?} must be 1-32 lowercase letters, digits, `-` or `_`",
                    self.name
                ));
            }
            if self.description.trim().is_empty() || self.description.chars().count() > 100 {
                return invalid(format!(
                    "Slash command {:?} needs a description of 1-100 characters",
                    self.name
                ));
            }
        }
        Ok(())
    }
}

/// Immutable trigger → command mappings.
#[derive(Debug, Default)]
pub struct Registry {
    text: HashMap<String, Arc<Command>>,
    unprefixed: HashMap<String, Arc<Command>>,
    slash: HashMap<String, Arc<Command>>,
    buttons: HashMap<String, Arc<Command>>,
}

impl Registry {
    /// Builds the mappings, rejecting invalid names and duplicate keys.
    pub fn build(commands: Vec<Command>) -> Result<Self> {
        let mut registry = Self::default();
        for command in commands {
            command.validate()?;
            let command = Arc::new(command);
            match command.trigger {
                Trigger::Text => {
                    insert_unique(&mut registry.text, &command, "text")?;
                    if command.properties.no_prefix {
                        insert_unique(&mut registry.unprefixed, &command, "unprefixed text")?;
                    }
                    if command.properties.slash {
                        insert_unique(&mut registry.slash, &command, "slash")?;
                    }
                }
                Trigger::Slash => insert_unique(&mut registry.slash, &command, "slash")?,
                Trigger::Button => insert_unique(&mut registry.buttons, &command, "button")?,
            }
        }
        Ok(registry)
    }

    /// Text command registered under `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&Arc<Command>> {
        self.text.get(name)
    }

    /// Text command that also answers without the prefix.
    #[must_use]
    pub fn unprefixed(&self, name: &str) -> Option<&Arc<Command>> {
        self.unprefixed.get(name)
    }

    /// Slash command registered under `name`.
    #[must_use]
    pub fn slash(&self, name: &str) -> Option<&Arc<Command>> {
        self.slash.get(name)
    }

    /// Button handler for `custom_id`, by longest matching prefix.
    ///
    /// Candidates are the full id and every part of it that ends right before
    /// a `:`; they are tried from longest to shortest.
    #[must_use]
    pub fn button(&self, custom_id: &str) -> Option<&Arc<Command>> {
        if let Some(command) = self.buttons.get(custom_id) {
            return Some(command);
        }
        custom_id
            .rmatch_indices(':')
            .find_map(|(idx, _)| self.buttons.get(&custom_id[..idx]))
    }

    /// Every command that belongs in the slash menu.
    pub fn slash_commands(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.slash.values()
    }

    /// Number of registrations across all key spaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len() + self.slash.len() + self.buttons.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert_unique(
    map: &mut HashMap<String, Arc<Command>>,
    command: &Arc<Command>,
    space: &str,
) -> Result<()> {
    match map.entry(command.name.clone()) {
        Entry::Occupied(_) => Err(Error::Config {
            message: format!("Duplicate {space} registration for {:?}", command.name),
        }),
        Entry::Vacant(slot) => {
            slot.insert(Arc::clone(command));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::objects::ArgValue;

    async fn noop(_ctx: Context) -> HandlerResult {
        Ok(())
    }

    fn buttons(prefixes: &[&str]) -> Registry {
        Registry::build(prefixes.iter().map(|p| Command::button(p, noop)).collect()).unwrap()
    }

    fn matched<'a>(registry: &'a Registry, custom_id: &str) -> Option<&'a str> {
        registry.button(custom_id).map(|c| c.name.as_str())
    }

    #[test]
    fn test_button_exact_and_data_match() {
        let registry = buttons(&["keep"]);
        assert_eq!(matched(&registry, "keep"), Some("keep"));
        assert_eq!(matched(&registry, "keep:Golden Carp"), Some("keep"));
        assert_eq!(matched(&registry, "keeper"), None);
        assert_eq!(matched(&registry, "kee"), None);
    }

    #[test]
    fn test_button_longest_prefix_wins() {
        let registry = buttons(&["shop", "shop:buy", "sell", "sell_all"]);
        assert_eq!(matched(&registry, "shop:buy:carp"), Some("shop:buy"));
        assert_eq!(matched(&registry, "shop:sell"), Some("shop"));
        assert_eq!(matched(&registry, "sell_all"), Some("sell_all"));
        assert_eq!(matched(&registry, "sell:1"), Some("sell"));
    }

    #[test]
    fn test_button_longest_prefix_regardless_of_registration_order() {
        let registry = buttons(&["a:b", "a"]);
        assert_eq!(matched(&registry, "a:b:c"), Some("a:b"));
        let registry = buttons(&["a", "a:b"]);
        assert_eq!(matched(&registry, "a:b:c"), Some("a:b"));
    }

    #[test]
    fn test_button_no_match() {
        let registry = buttons(&["keep"]);
        assert!(registry.button("trash").is_none());
        assert!(registry.button("").is_none());
    }

    #[test]
    fn test_key_spaces_are_independent() {
        let registry = Registry::build(vec![
            Command::text("fish", noop),
            Command::slash("fish", "Go fishing", noop),
            Command::button("fish", noop),
        ])
        .unwrap();
        assert!(registry.text("fish").is_some());
        assert!(registry.slash("fish").is_some());
        assert!(registry.button("fish").is_some());
        assert!(registry.text("Fish").is_none());
    }

    #[test]
    fn test_duplicates_rejected() {
        let result = Registry::build(vec![
            Command::slash("fish", "Go fishing", noop),
            Command::slash("fish", "Again", noop),
        ]);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_slash_names_validated() {
        assert!(Registry::build(vec![Command::slash("Fish", "x", noop)]).is_err());
        assert!(Registry::build(vec![Command::slash("fish", "", noop)]).is_err());
        assert!(Registry::build(vec![Command::text("two words", noop)]).is_err());
        // Text commands may use any case unless they also go to the slash menu.
        assert!(Registry::build(vec![Command::text("Fish", noop)]).is_ok());
        assert!(
            Registry::build(vec![Command::text("Fish", noop).with(Property::Slash)]).is_err()
        );
    }

    #[test]
    fn test_slash_property_registers_both() {
        let registry = Registry::build(vec![
            Command::text("ping", noop)
                .description("Check the bot")
                .with(Property::Slash)
                .with(Property::NoPrefix),
        ])
        .unwrap();
        assert!(registry.text("ping").is_some());
        assert!(registry.unprefixed("ping").is_some());
        assert!(registry.slash("ping").is_some());
        assert_eq!(registry.slash_commands().count(), 1);
    }

    #[test]
    fn test_properties_apply_in_order() {
        let command = Command::slash("fish", "Go fishing", noop)
            .with(Property::Once)
            .with(Property::Repeatable)
            .with(Property::Cooldown(Duration::from_secs(3)));
        assert!(!command.properties.once);
        assert_eq!(command.properties.cooldown, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_bind_checks_schema() {
        let command = Command::slash("transfer", "Send coins", noop)
            .param("amount", ParamKind::Integer, "How many")
            .optional_param("note", ParamKind::String, "Why");

        assert!(command.bind(&Args::new()).is_err());
        assert!(
            command
                .bind(&Args::new().with("amount", ArgValue::String("5".to_string())))
                .is_err()
        );
        assert!(
            command
                .bind(&Args::new().with("amount", ArgValue::Integer(5)))
                .is_ok()
        );
        assert!(
            command
                .bind(
                    &Args::new()
                        .with("amount", ArgValue::Integer(5))
                        .with("note", ArgValue::Boolean(true))
                )
                .is_err()
        );
    }
}
