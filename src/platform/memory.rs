//! In-memory platform that records everything the bot sends.
//!
//! Useful for testing handlers without a gateway connection: dispatch events
//! into a [`Dispatcher`](crate::Dispatcher) built on a `MemoryPlatform`, then
//! inspect [`MemoryPlatform::outbound`].

use super::{MessageRef, Origin, Platform};
use crate::errors::{Error, Result};
use crate::objects::{Reply, Sender};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

/// What kind of call produced an [`Outbound`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundKind {
    /// First answer to an event
    Response,
    /// Answer to an interaction that was already answered or deferred
    Followup,
    /// New channel message via [`Platform::send`]
    Send,
}

/// One recorded message.
#[derive(Debug, Clone)]
pub struct Outbound {
    /// How it was sent
    pub kind: OutboundKind,
    /// Channel it landed in
    pub channel_id: u64,
    /// The payload as handed to the platform
    pub reply: Reply,
    /// Reference returned to the caller
    pub message: MessageRef,
}

/// A [`Platform`] that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    outbound: Mutex<Vec<Outbound>>,
    deferred: Mutex<Vec<Origin>>,
    deleted: Mutex<HashSet<MessageRef>>,
    users: Mutex<HashMap<u64, Sender>>,
    next_id: AtomicU64,
    fail_deletes: AtomicBool,
}

impl MemoryPlatform {
    /// Creates an empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes [`MemoryPlatform::fetch_user`] know about `user`.
    pub async fn add_user(&self, user: Sender) {
        self.users.lock().await.insert(user.id, user);
    }

    /// Makes every subsequent deletion fail.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Everything sent so far, in order.
    pub async fn outbound(&self) -> Vec<Outbound> {
        self.outbound.lock().await.clone()
    }

    /// Text content of everything sent so far, in order.
    pub async fn contents(&self) -> Vec<String> {
        self.outbound
            .lock()
            .await
            .iter()
            .filter_map(|out| out.reply.content.clone())
            .collect()
    }

    /// Origins that were deferred.
    pub async fn deferred(&self) -> Vec<Origin> {
        self.deferred.lock().await.clone()
    }

    /// Whether `message` has been deleted.
    pub async fn is_deleted(&self, message: &MessageRef) -> bool {
        self.deleted.lock().await.contains(message)
    }

    fn next_message_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1_000
    }

    async fn record(&self, kind: OutboundKind, channel_id: u64, reply: &Reply, message: MessageRef) {
        self.outbound.lock().await.push(Outbound {
            kind,
            channel_id,
            reply: reply.clone(),
            message,
        });
    }
}

#[async_trait]
impl Platform for MemoryPlatform {
    async fn respond(&self, origin: &Origin, reply: &Reply, followup: bool) -> Result<MessageRef> {
        let (kind, message) = match origin {
            Origin::Message { channel_id, .. } => (
                OutboundKind::Response,
                MessageRef::Channel {
                    channel_id: *channel_id,
                    message_id: self.next_message_id(),
                },
            ),
            Origin::Interaction { token, .. } if followup => (
                OutboundKind::Followup,
                MessageRef::Followup {
                    token: token.clone(),
                    message_id: self.next_message_id(),
                },
            ),
            Origin::Interaction { token, .. } => (
                OutboundKind::Response,
                MessageRef::OriginalResponse {
                    token: token.clone(),
                },
            ),
        };

        self.record(kind, origin.channel_id(), reply, message.clone())
            .await;
        Ok(message)
    }

    async fn defer(&self, origin: &Origin, _hidden: bool) -> Result<()> {
        self.deferred.lock().await.push(origin.clone());
        Ok(())
    }

    async fn send(&self, channel_id: u64, reply: &Reply) -> Result<MessageRef> {
        let message = MessageRef::Channel {
            channel_id,
            message_id: self.next_message_id(),
        };
        self.record(OutboundKind::Send, channel_id, reply, message.clone())
            .await;
        Ok(message)
    }

    async fn delete(&self, message: &MessageRef) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::platform("Unknown Message"));
        }
        if !self.deleted.lock().await.insert(message.clone()) {
            return Err(Error::platform("Unknown Message"));
        }
        Ok(())
    }

    async fn fetch_user(&self, user_id: u64) -> Result<Sender> {
        self.users
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(|| Error::platform(format!("Unknown User {user_id}")))
    }
}
