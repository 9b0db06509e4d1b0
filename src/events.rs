// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process auth event bus.
//!
//! The request pipeline publishes here when it sees a session die; the
//! session store (and anything else interested) subscribes. Publishing never
//! blocks and never fails, even with no subscribers.

use tokio::sync::broadcast;

/// Events are rare; a small buffer is plenty and lagging receivers only
/// lose duplicates of the same signal.
const EVENT_CAPACITY: usize = 16;

/// Application-wide auth signals. Payload-less by design of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A protected endpoint answered 401; durable credentials are gone.
    SessionInvalidated,
}

/// Cloneable publish/subscribe handle.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AuthEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Fire-and-forget publish. Returns the number of subscribers reached.
    pub fn publish(&self, event: AuthEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(?event, receivers, "Auth event published");
                receivers
            }
            Err(_) => {
                tracing::debug!(?event, "Auth event published with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
