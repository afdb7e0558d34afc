// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport adapter for deterministic testing.
//!
//! `MockTransport` implements `TransportAdapter` with scripted session
//! behaviour per identity and captures every sent message for assertions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;

use courier_core::{
    AdapterType, Address, CourierError, DisconnectReason, HealthStatus, MessageId, PluginAdapter,
    SendError, SenderId, TransportAdapter, TransportEvent,
};

/// What `open` does for an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenBehavior {
    /// Report `Ready` immediately.
    Ready,
    /// Report `PairingRequired` with this code and nothing else.
    Pairing(String),
    /// Report the session as signed out.
    SignedOut,
    /// Return an error from `open`.
    Fail(String),
    /// Accept the open and never report anything.
    Silent,
}

/// A message captured by [`MockTransport::send_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub identity: SenderId,
    pub to: Address,
    pub text: String,
    pub at: Instant,
}

#[derive(Default)]
struct State {
    behaviors: HashMap<SenderId, OpenBehavior>,
    failing_users: HashSet<String>,
    send_delay: Option<Duration>,
    events: HashMap<SenderId, mpsc::Sender<TransportEvent>>,
    opens: Vec<SenderId>,
    closes: Vec<SenderId>,
    sent: Vec<SentMessage>,
}

/// A scripted messaging transport for testing.
///
/// Identities without a scripted behaviour open straight to `Ready`.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
    next_id: Arc<AtomicU64>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script how `open` behaves for `identity`.
    pub fn with_behavior(self, identity: impl Into<SenderId>, behavior: OpenBehavior) -> Self {
        self.state
            .try_lock()
            .map(|mut s| s.behaviors.insert(identity.into(), behavior))
            .ok();
        self
    }

    /// Make every send to this destination user (digits before `@`) fail with `Rejected`.
    pub fn with_failing_destination(self, user: impl Into<String>) -> Self {
        self.state
            .try_lock()
            .map(|mut s| s.failing_users.insert(user.into()))
            .ok();
        self
    }

    /// Delay every send by `delay` before it completes.
    pub fn with_send_delay(self, delay: Duration) -> Self {
        self.state
            .try_lock()
            .map(|mut s| s.send_delay = Some(delay))
            .ok();
        self
    }

    /// Change the scripted behaviour for subsequent opens.
    pub async fn set_behavior(&self, identity: impl Into<SenderId>, behavior: OpenBehavior) {
        self.state
            .lock()
            .await
            .behaviors
            .insert(identity.into(), behavior);
    }

    /// Deliver `event` on the channel handed to the last `open` of its identity.
    ///
    /// Returns `false` if the identity was never opened or the pool is gone.
    pub async fn emit(&self, event: TransportEvent) -> bool {
        let sender = self.state.lock().await.events.get(event.identity()).cloned();
        match sender {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Report the session of `identity` as dropped.
    pub async fn drop_session(&self, identity: impl Into<SenderId>, reason: &str) -> bool {
        self.emit(TransportEvent::Closed {
            identity: identity.into(),
            reason: DisconnectReason::Lost(reason.to_string()),
        })
        .await
    }

    /// Number of `open` calls made for `identity`.
    pub async fn open_count(&self, identity: &SenderId) -> usize {
        self.state
            .lock()
            .await
            .opens
            .iter()
            .filter(|id| *id == identity)
            .count()
    }

    pub async fn closed(&self) -> Vec<SenderId> {
        self.state.lock().await.closes.clone()
    }

    /// All messages that were sent through `send_text`, in order.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.state.lock().await.sent.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.state.lock().await.sent.len()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl TransportAdapter for MockTransport {
    async fn open(
        &self,
        identity: &SenderId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<(), CourierError> {
        let behavior = {
            let mut state = self.state.lock().await;
            state.opens.push(identity.clone());
            state.events.insert(identity.clone(), events.clone());
            state
                .behaviors
                .get(identity)
                .cloned()
                .unwrap_or(OpenBehavior::Ready)
        };

        let event = match behavior {
            OpenBehavior::Ready => TransportEvent::Ready {
                identity: identity.clone(),
            },
            OpenBehavior::Pairing(code) => TransportEvent::PairingRequired {
                identity: identity.clone(),
                code,
            },
            OpenBehavior::SignedOut => TransportEvent::Closed {
                identity: identity.clone(),
                reason: DisconnectReason::SignedOut,
            },
            OpenBehavior::Fail(message) => {
                return Err(CourierError::Transport {
                    message,
                    source: None,
                });
            }
            OpenBehavior::Silent => return Ok(()),
        };
        let _ = events.send(event).await;
        Ok(())
    }

    async fn send_text(
        &self,
        identity: &SenderId,
        to: &Address,
        text: &str,
    ) -> Result<MessageId, SendError> {
        let (delay, fails) = {
            let state = self.state.lock().await;
            (state.send_delay, state.failing_users.contains(to.user()))
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fails {
            return Err(SendError::Rejected {
                message: format!("{} is not on the network", to.user()),
            });
        }

        self.state.lock().await.sent.push(SentMessage {
            identity: identity.clone(),
            to: to.clone(),
            text: text.to_string(),
            at: Instant::now(),
        });
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(MessageId(format!("mock-msg-{n}")))
    }

    async fn close(&self, identity: &SenderId) -> Result<(), CourierError> {
        let mut state = self.state.lock().await;
        state.closes.push(identity.clone());
        state.events.remove(identity);
        Ok(())
    }
}
