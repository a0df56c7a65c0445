//! Per-sender cooldown and run-once bookkeeping.

use crate::registry::Command;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::Mutex;

/// Why an invocation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// The sender already used a run-once command
    AlreadyUsed,
    /// The cooldown has this much left
    Cooldown(Duration),
}

type Key = (String, u64);

#[derive(Debug, Default)]
struct Usage {
    /// When each running cooldown ends
    cooling_until: HashMap<Key, DateTime<Utc>>,
    used_once: HashSet<Key>,
}

/// Tracks who used what and when.
#[derive(Debug, Default)]
pub struct Throttle {
    usage: Mutex<Usage>,
}

impl Throttle {
    /// Records an invocation of `command` by `sender_id` at `now`, or refuses it.
    ///
    /// Checking and recording happen under one lock so two concurrent clicks
    /// cannot both pass.
    pub async fn admit(&self, command: &Command, sender_id: u64, now: DateTime<Utc>) -> Option<Refusal> {
        let key = (format!("{}:{}", command.trigger, command.name), sender_id);
        let mut usage = self.usage.lock().await;

        usage.cooling_until.retain(|_, until| *until > now);

        if command.properties.once && usage.used_once.contains(&key) {
            return Some(Refusal::AlreadyUsed);
        }
        if let Some(until) = usage.cooling_until.get(&key) {
            let left = (*until - now).to_std().unwrap_or(Duration::ZERO);
            return Some(Refusal::Cooldown(left));
        }

        if command.properties.once {
            usage.used_once.insert(key.clone());
        }
        if let Some(cooldown) = command.properties.cooldown {
            let until = chrono::Duration::from_std(cooldown)
                .ok()
                .and_then(|cooldown| now.checked_add_signed(cooldown))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            usage.cooling_until.insert(key, until);
        }
        None
    }
}
