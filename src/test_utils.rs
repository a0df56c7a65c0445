//! Shared test utilities for picord.
//!
//! Helpers for in-memory databases, sender snapshots and a dispatcher wired
//! to a [`MemoryPlatform`].

use crate::bot::dispatcher::{DispatchOutcome, Dispatcher, ErrorHook, log_error_hook};
use crate::db::Database;
use crate::events::{RawEvent, ReadyEvent};
use crate::objects::Sender;
use crate::platform::MemoryPlatform;
use crate::registry::{Command, Registry};
use std::sync::Arc;

/// Creates an in-memory `SQLite` database with a `users` table.
/// This is the standard setup for storage tests.
pub async fn setup_test_db() -> crate::Result<Database> {
    let db = Database::in_memory().await?;
    db.create_table(
        "users",
        &[
            ("user_id", "INTEGER PRIMARY KEY"),
            ("coins", "INTEGER DEFAULT 0"),
            ("fishes_caught", "INTEGER DEFAULT 0"),
        ],
    )
    .await?;
    Ok(db)
}

/// A sender named after its id.
pub fn user(id: u64) -> Sender {
    Sender::new(id, format!("user{id}"))
}

/// A ready event for the test bot identity.
pub fn ready_event(session_id: &str) -> ReadyEvent {
    ReadyEvent {
        user: Sender::new(999, "picord"),
        session_id: session_id.to_string(),
    }
}

/// A dispatcher over a [`MemoryPlatform`], already past its ready event.
pub struct TestBot {
    /// The dispatcher under test
    pub dispatcher: Dispatcher,
    /// Records everything the handlers sent
    pub platform: Arc<MemoryPlatform>,
    /// The database handlers see
    pub db: Database,
}

impl TestBot {
    /// Builds a test bot with the default error hook and prefix `~`.
    ///
    /// # Panics
    /// Panics if the registrations are invalid.
    pub async fn new(commands: Vec<Command>) -> Self {
        Self::with_hook(commands, log_error_hook()).await
    }

    /// Builds a test bot with a custom error hook.
    ///
    /// # Panics
    /// Panics if the registrations are invalid.
    #[allow(clippy::unwrap_used)]
    pub async fn with_hook(commands: Vec<Command>, error_hook: ErrorHook) -> Self {
        let platform = Arc::new(MemoryPlatform::new());
        let db = setup_test_db().await.unwrap();
        let dispatcher = Dispatcher::new(
            Arc::new(Registry::build(commands).unwrap()),
            Arc::clone(&platform) as Arc<dyn crate::platform::Platform>,
            Some(db.clone()),
            "~",
            None,
            error_hook,
            true,
        );
        dispatcher.dispatch(RawEvent::Ready(ready_event("s1"))).await;
        Self {
            dispatcher,
            platform,
            db,
        }
    }

    /// Dispatches one event to completion.
    pub async fn dispatch(&self, event: RawEvent) -> DispatchOutcome {
        self.dispatcher.dispatch(event).await
    }
}
