//! Dispatcher - raw events in, handler invocations out.
//!
//! For each event the dispatcher classifies it, resolves a registry entry,
//! builds a [`Context`] and runs the handler in its own task. Misses are
//! dropped silently. Handler errors and panics go to the error hook and stop
//! there, so one bad handler never takes down the event loop or its
//! neighbours.
//!
//! Command events wait until the ready hook has finished (unless gating is
//! disabled), so setup such as table creation completes before the first
//! command is served.

use super::throttle::{Refusal, Throttle};
use crate::db::Database;
use crate::errors::Error;
use crate::events::{ComponentEvent, MessageEvent, RawEvent, ReadyEvent, SlashEvent};
use crate::objects::{Context, Reply, Sender};
use crate::platform::Platform;
use crate::registry::{BoxFuture, Command, HandlerResult, Registry};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// What happened to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The ready hook ran (or there was none)
    Ready,
    /// A repeated ready for a connection that was already set up
    DuplicateReady,
    /// Not something the dispatcher handles, e.g. a bot's own message
    Ignored,
    /// No registry entry matched
    Miss,
    /// Refused by a cooldown or run-once rule
    Throttled,
    /// Handler returned normally
    Completed,
    /// Handler failed; the error hook has it
    Failed,
}

/// Setup data handed to the ready hook.
#[derive(Clone)]
pub struct Ready {
    /// The bot's own identity
    pub user: Sender,
    /// Gateway session id
    pub session_id: String,
    /// The bot's database, if configured
    pub db: Option<Database>,
    /// The platform
    pub platform: Arc<dyn Platform>,
}

impl fmt::Debug for Ready {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ready")
            .field("user", &self.user)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

/// Runs once per connection before commands are served.
pub type ReadyHook = Arc<dyn Fn(Ready) -> BoxFuture<HandlerResult> + Send + Sync>;

/// Receives every handler failure together with its context.
pub type ErrorHook = Arc<dyn Fn(Error, Context) -> BoxFuture<()> + Send + Sync>;

/// Wraps an async closure as a [`ReadyHook`].
pub fn ready_hook<F, Fut>(hook: F) -> ReadyHook
where
    F: Fn(Ready) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ready| Box::pin(hook(ready)))
}

/// Wraps an async closure as an [`ErrorHook`].
pub fn error_hook<F, Fut>(hook: F) -> ErrorHook
where
    F: Fn(Error, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |error, ctx| Box::pin(hook(error, ctx)))
}

/// The default error hook: log and suppress.
pub fn log_error_hook() -> ErrorHook {
    error_hook(|error, ctx: Context| async move {
        error!(
            command = ctx.command(),
            sender = ctx.sender().id,
            "Error in handler: {error}"
        );
    })
}

struct Shared {
    registry: Arc<Registry>,
    platform: Arc<dyn Platform>,
    db: Option<Database>,
    prefix: String,
    ready_hook: Option<ReadyHook>,
    error_hook: ErrorHook,
    gate: watch::Sender<bool>,
    sessions: Mutex<HashSet<String>>,
    throttle: Throttle,
}

/// Routes raw events to registered handlers.
///
/// Cloning is cheap; clones share registry, hooks and state.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("prefix", &self.shared.prefix)
            .field("registrations", &self.shared.registry.len())
            .field("has_db", &self.shared.db.is_some())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// With `gate_until_ready` set, command events wait for the first ready
    /// event to finish its hook.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<Registry>,
        platform: Arc<dyn Platform>,
        db: Option<Database>,
        prefix: &str,
        ready_hook: Option<ReadyHook>,
        error_hook: ErrorHook,
        gate_until_ready: bool,
    ) -> Self {
        let (gate, _) = watch::channel(!gate_until_ready);
        Self {
            shared: Arc::new(Shared {
                registry,
                platform,
                db,
                prefix: prefix.to_string(),
                ready_hook,
                error_hook,
                gate,
                sessions: Mutex::new(HashSet::new()),
                throttle: Throttle::default(),
            }),
        }
    }

    /// The registry this dispatcher resolves against.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.shared.registry
    }

    /// Whether command events are currently being served.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.shared.gate.borrow()
    }

    /// Handles `event` in a new task so the receiving loop never waits on a handler.
    pub fn spawn(&self, event: RawEvent) -> JoinHandle<DispatchOutcome> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch(event).await })
    }

    /// Handles `event` to completion and reports what happened.
    pub async fn dispatch(&self, event: RawEvent) -> DispatchOutcome {
        let span = info_span!("dispatch", kind = event.kind());
        async move {
            match event {
                RawEvent::Ready(ready) => self.on_ready(ready).await,
                RawEvent::Message(message) => {
                    self.wait_until_open().await;
                    self.on_message(&message).await
                }
                RawEvent::Slash(slash) => {
                    self.wait_until_open().await;
                    self.on_slash(&slash).await
                }
                RawEvent::Component(component) => {
                    self.wait_until_open().await;
                    self.on_component(&component).await
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn wait_until_open(&self) {
        let mut open = self.shared.gate.subscribe();
        if open.wait_for(|open| *open).await.is_err() {
            // Sender lives in `Shared`, which outlives this borrow.
            warn!("Ready gate closed unexpectedly");
        }
    }

    async fn on_ready(&self, event: ReadyEvent) -> DispatchOutcome {
        if !self
            .shared
            .sessions
            .lock()
            .await
            .insert(event.session_id.clone())
        {
            debug!(session = %event.session_id, "Ready already handled for this session");
            return DispatchOutcome::DuplicateReady;
        }

        info!("Logged in as {}", event.user.name);
        if let Some(hook) = &self.shared.ready_hook {
            let ready = Ready {
                user: event.user,
                session_id: event.session_id,
                db: self.shared.db.clone(),
                platform: Arc::clone(&self.shared.platform),
            };
            match tokio::spawn(hook(ready)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Ready hook failed, serving commands anyway: {e}"),
                Err(join_error) if join_error.is_panic() => error!(
                    "Ready hook panicked, serving commands anyway: {}",
                    panic_message(join_error.into_panic())
                ),
                Err(join_error) => {
                    error!("Ready hook cancelled, serving commands anyway: {join_error}");
                }
            }
        }

        self.shared.gate.send_replace(true);
        DispatchOutcome::Ready
    }

    async fn on_message(&self, event: &MessageEvent) -> DispatchOutcome {
        if event.author_is_bot {
            return DispatchOutcome::Ignored;
        }

        let Some((command, text_args)) = self.resolve_text(&event.content) else {
            return DispatchOutcome::Miss;
        };
        let ctx = Context::for_message(
            event,
            &command.name,
            text_args,
            self.shared.db.clone(),
            Arc::clone(&self.shared.platform),
        );
        self.invoke(command, ctx).await
    }

    /// Finds the text command for `content` and splits off its arguments.
    fn resolve_text(&self, content: &str) -> Option<(Arc<Command>, Vec<String>)> {
        let registry = &self.shared.registry;
        let (body, prefixed) = content
            .strip_prefix(self.shared.prefix.as_str())
            .map_or((content, false), |rest| (rest, true));

        // The command word must follow the prefix directly.
        if prefixed && body.starts_with(char::is_whitespace) {
            return None;
        }
        let mut words = body.split_whitespace();
        let name = words.next()?;
        let command = if prefixed {
            registry.text(name)
        } else {
            registry.unprefixed(name)
        }?;
        Some((Arc::clone(command), words.map(str::to_string).collect()))
    }

    async fn on_slash(&self, event: &SlashEvent) -> DispatchOutcome {
        let Some(command) = self.shared.registry.slash(&event.name).cloned() else {
            debug!(name = %event.name, "No slash command registered");
            return DispatchOutcome::Miss;
        };
        let ctx = Context::for_slash(
            event,
            self.shared.db.clone(),
            Arc::clone(&self.shared.platform),
        );
        self.invoke(command, ctx).await
    }

    async fn on_component(&self, event: &ComponentEvent) -> DispatchOutcome {
        let Some(command) = self.shared.registry.button(&event.custom_id).cloned() else {
            debug!(custom_id = %event.custom_id, "No button handler matches");
            return DispatchOutcome::Miss;
        };
        let ctx = Context::for_component(
            event,
            &command.name,
            self.shared.db.clone(),
            Arc::clone(&self.shared.platform),
        );
        self.invoke(command, ctx).await
    }

    async fn invoke(&self, command: Arc<Command>, ctx: Context) -> DispatchOutcome {
        let ctx = ctx.with_hidden_default(command.properties.hidden);

        if let Err(e) = command.bind(ctx.args()) {
            self.report(e, ctx).await;
            return DispatchOutcome::Failed;
        }

        if let Some(refusal) = self
            .shared
            .throttle
            .admit(&command, ctx.sender().id, chrono::Utc::now())
            .await
        {
            self.refuse(&ctx, refusal).await;
            return DispatchOutcome::Throttled;
        }

        if command.properties.logged {
            info!(
                trigger = %command.trigger,
                command = %command.name,
                sender = ctx.sender().id,
                "Command invoked"
            );
        }

        if command.properties.background {
            if let Err(e) = ctx.defer().await {
                self.report(e, ctx).await;
                return DispatchOutcome::Failed;
            }
        }

        let handler = Arc::clone(command.handler());
        let task_ctx = ctx.clone();
        let result = tokio::spawn(async move { handler.call(task_ctx).await }).await;

        match result {
            Ok(Ok(())) => DispatchOutcome::Completed,
            Ok(Err(e)) => {
                self.report(e, ctx).await;
                DispatchOutcome::Failed
            }
            Err(join_error) => {
                let message = if join_error.is_panic() {
                    panic_message(join_error.into_panic())
                } else {
                    "task cancelled".to_string()
                };
                self.report(Error::HandlerPanicked { message }, ctx).await;
                DispatchOutcome::Failed
            }
        }
    }

    async fn refuse(&self, ctx: &Context, refusal: Refusal) {
        let notice = match refusal {
            Refusal::AlreadyUsed => {
                debug!(command = ctx.command(), sender = ctx.sender().id, "Run-once command reused");
                return;
            }
            Refusal::Cooldown(left) => {
                format!("Slow down! Try again in {:.1}s.", left.as_secs_f64())
            }
        };
        if let Err(e) = ctx.reply(Reply::text(notice).hidden(true)).await {
            debug!("Could not send cooldown notice: {e}");
        }
    }

    async fn report(&self, error: Error, ctx: Context) {
        (self.shared.error_hook)(error, ctx).await;
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
