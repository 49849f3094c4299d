//! Outstanding-reply gate shared by the transmitter and the listener.
//!
//! SeedLink has no request IDs, so the only way to know how to decode the next
//! reply is to remember which command was sent last. The gate holds that
//! memory as an explicit state and lets both sides wait on transitions instead
//! of polling.

use std::sync::Arc;

use crystalline_protocol::Command;
use tokio::sync::watch;

use crate::error::{ClientError, Result};

/// Which reply, if any, the listener is expected to decode next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outstanding {
    /// Nothing sent, or the last reply has been handled.
    Idle,
    /// A reply to this command is pending.
    Awaiting(Command),
    /// The reply to this command was decoded but the message queue is full.
    Stalled(Command),
    /// The listener has stopped; no further replies will be decoded.
    Closed,
}

#[derive(Clone, Debug)]
pub(crate) struct ReplyGate {
    tx: Arc<watch::Sender<Outstanding>>,
}

impl ReplyGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Outstanding::Idle);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Outstanding {
        *self.tx.borrow()
    }

    /// Wait until no reply is pending.
    ///
    /// Fails with [`ClientError::QueueFull`] if the listener is stalled on a
    /// full message queue, and with [`ClientError::Disconnected`] once the gate
    /// is closed.
    pub async fn wait_idle(&self) -> Result<()> {
        let mut rx = self.tx.subscribe();
        let state = *rx
            .wait_for(|s| !matches!(s, Outstanding::Awaiting(_)))
            .await
            .map_err(|_| ClientError::Disconnected)?;
        match state {
            Outstanding::Idle => Ok(()),
            Outstanding::Stalled(_) => Err(ClientError::QueueFull),
            Outstanding::Awaiting(_) | Outstanding::Closed => Err(ClientError::Disconnected),
        }
    }

    /// Wait until a command is awaiting its reply. `None` once closed.
    pub async fn wait_armed(&self) -> Option<Command> {
        let mut rx = self.tx.subscribe();
        let state = *rx
            .wait_for(|s| !matches!(s, Outstanding::Idle))
            .await
            .ok()?;
        match state {
            Outstanding::Awaiting(command) | Outstanding::Stalled(command) => Some(command),
            Outstanding::Idle | Outstanding::Closed => None,
        }
    }

    /// Record that `command`'s reply is pending. Only takes effect from `Idle`.
    pub fn arm(&self, command: Command) -> bool {
        self.tx.send_if_modified(|s| {
            if *s == Outstanding::Idle {
                *s = Outstanding::Awaiting(command);
                true
            } else {
                false
            }
        })
    }

    /// Record that the pending reply is waiting for room in the message queue.
    pub fn stall(&self) {
        self.tx.send_if_modified(|s| match *s {
            Outstanding::Awaiting(command) => {
                *s = Outstanding::Stalled(command);
                true
            }
            _ => false,
        });
    }

    /// Mark the pending reply as handled.
    pub fn clear(&self) {
        self.tx.send_if_modified(|s| {
            if matches!(s, Outstanding::Awaiting(_) | Outstanding::Stalled(_)) {
                *s = Outstanding::Idle;
                true
            } else {
                false
            }
        });
    }

    pub fn close(&self) {
        self.tx.send_replace(Outstanding::Closed);
    }
}
