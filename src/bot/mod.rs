//! Bot layer - registration, lifecycle and the Discord connection.
//!
//! A [`Bot`] is assembled once with [`Bot::builder`], which collects command
//! and button registrations plus the ready and error hooks. [`BotBuilder::build`]
//! freezes them into an immutable [`Registry`]; nothing can be added while
//! events are being served.

/// Event classification and handler invocation
pub mod dispatcher;
/// serenity-backed platform and gateway event translation
pub mod gateway;
mod throttle;

pub use dispatcher::{DispatchOutcome, Dispatcher, ErrorHook, Ready, ReadyHook};

use crate::config::BotConfig;
use crate::db::Database;
use crate::errors::{Error, Result};
use crate::objects::Context;
use crate::platform::Platform;
use crate::registry::{Command, Handler, HandlerResult, Registry};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument};

/// Collects registrations before the bot starts serving.
pub struct BotBuilder {
    config: BotConfig,
    commands: Vec<Command>,
    ready_hook: Option<ReadyHook>,
    error_hook: ErrorHook,
    database: Option<Database>,
}

impl BotBuilder {
    /// Registers a fully configured command.
    #[must_use]
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Registers a prefix text command.
    #[must_use]
    pub fn on_command(self, name: &str, handler: impl Handler) -> Self {
        self.command(Command::text(name, handler))
    }

    /// Registers a slash command without parameters.
    #[must_use]
    pub fn on_slash(self, name: &str, description: &str, handler: impl Handler) -> Self {
        self.command(Command::slash(name, description, handler))
    }

    /// Registers a button handler for a custom-id prefix.
    #[must_use]
    pub fn on_button(self, prefix: &str, handler: impl Handler) -> Self {
        self.command(Command::button(prefix, handler))
    }

    /// Sets the hook run once per connection before commands are served.
    #[must_use]
    pub fn on_ready<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Ready) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.ready_hook = Some(dispatcher::ready_hook(hook));
        self
    }

    /// Replaces the default log-and-suppress error hook.
    #[must_use]
    pub fn on_error<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Error, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.error_hook = dispatcher::error_hook(hook);
        self
    }

    /// Uses an already opened database instead of the configured one.
    #[must_use]
    pub fn database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Validates the configuration and freezes the registry.
    pub fn build(self) -> Result<Bot> {
        self.config.validate()?;
        let registry = Registry::build(self.commands)?;
        info!(
            registrations = registry.len(),
            prefix = %self.config.prefix,
            "Registry built"
        );
        Ok(Bot {
            config: self.config,
            registry: Arc::new(registry),
            ready_hook: self.ready_hook,
            error_hook: self.error_hook,
            db: self.database,
        })
    }
}

/// One bot instance: configuration, registry, hooks and database.
pub struct Bot {
    config: BotConfig,
    registry: Arc<Registry>,
    ready_hook: Option<ReadyHook>,
    error_hook: ErrorHook,
    db: Option<Database>,
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("has_db", &self.db.is_some())
            .finish_non_exhaustive()
    }
}

impl Bot {
    /// Starts a registration phase.
    #[must_use]
    pub fn builder(config: BotConfig) -> BotBuilder {
        BotBuilder {
            config,
            commands: Vec::new(),
            ready_hook: None,
            error_hook: dispatcher::log_error_hook(),
            database: None,
        }
    }

    /// The bot's configuration.
    #[must_use]
    pub const fn config(&self) -> &BotConfig {
        &self.config
    }

    /// The frozen registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The database, once connected.
    #[must_use]
    pub const fn db(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    /// Opens the configured store, or returns the one already open.
    ///
    /// # Errors
    /// Fails with [`Error::Config`] when no store is configured and with
    /// [`Error::Storage`] when the connection cannot be made.
    #[instrument(skip(self))]
    pub async fn connect_database(&mut self) -> Result<Database> {
        if let Some(db) = &self.db {
            return Ok(db.clone());
        }
        let (Some(db_type), Some(target)) = (self.config.db_type, self.config.database.as_deref())
        else {
            return Err(Error::Config {
                message: "No database configured: set `db_type` and `database`".to_string(),
            });
        };

        let db = Database::open(db_type, target).await?;
        self.db = Some(db.clone());
        Ok(db)
    }

    /// Creates a dispatcher serving this bot's registry through `platform`.
    #[must_use]
    pub fn dispatcher(&self, platform: Arc<dyn Platform>) -> Dispatcher {
        Dispatcher::new(
            Arc::clone(&self.registry),
            platform,
            self.db.clone(),
            &self.config.prefix,
            self.ready_hook.clone(),
            Arc::clone(&self.error_hook),
            self.config.gate_until_ready,
        )
    }

    /// Connects to Discord and serves events until the client stops.
    ///
    /// Opens the configured database first when none is attached yet.
    pub async fn run(mut self, token: &str) -> Result<()> {
        if self.db.is_none() && self.config.db_type.is_some() {
            self.connect_database().await?;
        }
        let platform = gateway::SerenityPlatform::new(token);
        let http = platform.http();
        let dispatcher = self.dispatcher(Arc::new(platform));
        gateway::serve(token, dispatcher, http).await
    }
}
