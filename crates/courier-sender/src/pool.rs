// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session registry keyed by sender identity.
//!
//! The pool is the only owner of transport state. Transport notifications
//! arrive on an mpsc channel and are applied by the pool's control loop;
//! callers only ever see [`SessionState`] snapshots through a watch channel
//! per identity.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use courier_config::model::{EngineConfig, SenderConfig};
use courier_core::{
    Ack, Address, CourierError, DisconnectReason, SendError, SenderId, TransportAdapter,
    TransportEvent,
};
use dashmap::DashMap;
use tokio::sync::{Mutex, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backoff::Backoff;
use crate::session::{Session, SessionInfo, SessionState};

/// Capacity of the transport event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Timing knobs for the pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    /// Upper bound on how long `acquire` waits for a settled state.
    pub acquire_timeout: Duration,
    /// Upper bound on a single `send`.
    pub send_timeout: Duration,
    pub backoff: Backoff,
}

impl PoolSettings {
    pub fn from_config(sender: &SenderConfig, engine: &EngineConfig) -> Self {
        Self {
            acquire_timeout: Duration::from_secs(sender.acquire_timeout_secs),
            send_timeout: Duration::from_secs(engine.send_timeout_secs),
            backoff: Backoff::new(
                Duration::from_millis(sender.reconnect_base_ms),
                Duration::from_millis(sender.reconnect_cap_ms),
                sender.max_reconnect_attempts,
            ),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            acquire_timeout: Duration::from_secs(120),
            send_timeout: Duration::from_secs(30),
            backoff: Backoff::default(),
        }
    }
}

struct SessionSlot {
    state: watch::Sender<SessionState>,
    /// Serializes open attempts for one identity.
    connect: Mutex<()>,
}

impl SessionSlot {
    fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            state,
            connect: Mutex::new(()),
        }
    }

    fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    fn set(&self, state: SessionState) {
        self.state.send_replace(state);
    }
}

struct PoolInner {
    transport: Arc<dyn TransportAdapter>,
    slots: DashMap<SenderId, Arc<SessionSlot>>,
    events: mpsc::Sender<TransportEvent>,
    settings: PoolSettings,
    cancel: CancellationToken,
}

/// Registry of sender sessions with single-flight acquire and automatic reconnect.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct SenderPool {
    inner: Arc<PoolInner>,
}

impl SenderPool {
    /// Create the pool and spawn its control loop on the current runtime.
    pub fn start(transport: Arc<dyn TransportAdapter>, settings: PoolSettings) -> Self {
        let (events, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let inner = Arc::new(PoolInner {
            transport,
            slots: DashMap::new(),
            events,
            settings,
            cancel: CancellationToken::new(),
        });
        tokio::spawn(control_loop(
            Arc::downgrade(&inner),
            rx,
            inner.cancel.clone(),
        ));
        Self { inner }
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.inner.settings
    }

    fn slot(&self, identity: &SenderId) -> Arc<SessionSlot> {
        self.inner
            .slots
            .entry(identity.clone())
            .or_insert_with(|| Arc::new(SessionSlot::new()))
            .clone()
    }

    /// Get a ready session for `identity`, opening it if needed.
    ///
    /// Concurrent calls for the same identity share one open attempt. Waits
    /// until the session is ready, signed out, or failed, bounded by the
    /// acquire timeout. Malformed identities are refused without creating a
    /// slot.
    pub async fn acquire(&self, identity: &SenderId) -> Result<Session, SendError> {
        if self.inner.cancel.is_cancelled() {
            return Err(unavailable(identity, "sender pool is shut down"));
        }
        if !identity.is_valid() {
            warn!(identity = %identity, "refusing malformed sender identity");
            return Err(unavailable(identity, "malformed sender identity"));
        }
        let slot = self.slot(identity);
        let limit = self.inner.settings.acquire_timeout;
        match tokio::time::timeout(limit, self.acquire_slot(identity, &slot)).await {
            Ok(result) => result,
            Err(_) => {
                let state = slot.current();
                warn!(identity = %identity, state = %state, "session not ready before acquire timeout");
                Err(unavailable(
                    identity,
                    format!("not ready after {limit:?} (state: {state})"),
                ))
            }
        }
    }

    async fn acquire_slot(
        &self,
        identity: &SenderId,
        slot: &SessionSlot,
    ) -> Result<Session, SendError> {
        {
            let _flight = slot.connect.lock().await;
            match slot.current() {
                SessionState::Ready => return Ok(Session::new(identity.clone())),
                SessionState::SignedOut => {
                    return Err(unavailable(identity, "signed out, pairing required"));
                }
                SessionState::Idle | SessionState::Failed { .. } => {
                    info!(identity = %identity, "opening session");
                    slot.set(SessionState::Connecting);
                    if let Err(e) = self
                        .inner
                        .transport
                        .open(identity, self.inner.events.clone())
                        .await
                    {
                        error!(identity = %identity, error = %e, "failed to open session");
                        slot.set(SessionState::Failed {
                            reason: e.to_string(),
                        });
                        return Err(unavailable(identity, e.to_string()));
                    }
                }
                SessionState::Connecting
                | SessionState::AwaitingPairing { .. }
                | SessionState::Reconnecting { .. } => {}
            }
        }

        let mut rx = slot.state.subscribe();
        let settled = rx
            .wait_for(SessionState::is_settled)
            .await
            .map_err(|_| unavailable(identity, "session slot dropped"))?
            .clone();
        match settled {
            SessionState::Ready => Ok(Session::new(identity.clone())),
            SessionState::SignedOut => Err(unavailable(identity, "signed out, pairing required")),
            other => Err(unavailable(identity, other.to_string())),
        }
    }

    /// Send `text` to `to` through `session`.
    ///
    /// Every failure, including a session that stopped being ready, comes
    /// back as a [`SendError`].
    pub async fn send(
        &self,
        session: &Session,
        to: &Address,
        text: &str,
    ) -> Result<Ack, SendError> {
        let identity = session.identity();
        let state = self
            .inner
            .slots
            .get(identity)
            .map(|slot| slot.current())
            .unwrap_or(SessionState::Idle);
        if state != SessionState::Ready {
            return Err(unavailable(identity, format!("session is {state}")));
        }

        let limit = self.inner.settings.send_timeout;
        let message_id =
            tokio::time::timeout(limit, self.inner.transport.send_text(identity, to, text))
                .await
                .map_err(|_| SendError::Timeout { duration: limit })??;

        debug!(identity = %identity, to = %to, message_id = %message_id.0, "message sent");
        Ok(Ack {
            message_id,
            identity: identity.clone(),
            address: to.clone(),
            sent_at: Utc::now(),
        })
    }

    /// Close the session for `identity` and forget it.
    pub async fn release(&self, identity: &SenderId) -> Result<(), CourierError> {
        if let Some((_, slot)) = self.inner.slots.remove(identity) {
            slot.set(SessionState::Failed {
                reason: "session released".into(),
            });
            info!(identity = %identity, "releasing session");
            self.inner.transport.close(identity).await?;
        }
        Ok(())
    }

    /// Current state of one identity, if the pool knows it.
    pub fn state(&self, identity: &SenderId) -> Option<SessionState> {
        self.inner.slots.get(identity).map(|slot| slot.current())
    }

    /// Snapshot of every known session, ordered by identity.
    pub fn sessions(&self) -> Vec<SessionInfo> {
        let mut sessions: Vec<SessionInfo> = self
            .inner
            .slots
            .iter()
            .map(|entry| SessionInfo {
                identity: entry.key().clone(),
                state: entry.value().current(),
            })
            .collect();
        sessions.sort_by(|a, b| a.identity.cmp(&b.identity));
        sessions
    }

    /// Stop the control loop and close every session.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let identities: Vec<SenderId> =
            self.inner.slots.iter().map(|e| e.key().clone()).collect();
        for identity in identities {
            if let Some((_, slot)) = self.inner.slots.remove(&identity) {
                slot.set(SessionState::Failed {
                    reason: "sender pool shut down".into(),
                });
            }
            if let Err(e) = self.inner.transport.close(&identity).await {
                warn!(identity = %identity, error = %e, "failed to close session during shutdown");
            }
        }
        info!("sender pool shut down");
    }
}

fn unavailable(identity: &SenderId, reason: impl Into<String>) -> SendError {
    SendError::SessionUnavailable {
        identity: identity.clone(),
        reason: reason.into(),
    }
}

async fn control_loop(
    pool: Weak<PoolInner>,
    mut rx: mpsc::Receiver<TransportEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };
        let Some(inner) = pool.upgrade() else {
            break;
        };
        apply_event(&inner, event);
    }
    debug!("sender pool control loop stopped");
}

fn apply_event(inner: &Arc<PoolInner>, event: TransportEvent) {
    let identity = event.identity().clone();
    let Some(slot) = inner.slots.get(&identity).map(|s| Arc::clone(s.value())) else {
        debug!(identity = %identity, "event for unknown session ignored");
        return;
    };

    match event {
        TransportEvent::PairingRequired { code, .. } => {
            info!(identity = %identity, code = %code, "pairing required, scan or enter the code on the device");
            slot.set(SessionState::AwaitingPairing { code });
        }
        TransportEvent::Ready { .. } => {
            info!(identity = %identity, "session ready");
            slot.set(SessionState::Ready);
        }
        TransportEvent::Closed {
            reason: DisconnectReason::SignedOut,
            ..
        } => {
            warn!(identity = %identity, "session signed out, not reconnecting");
            slot.set(SessionState::SignedOut);
        }
        TransportEvent::Closed {
            reason: DisconnectReason::Lost(reason),
            ..
        } => {
            let attempt = match slot.current() {
                SessionState::SignedOut | SessionState::Idle => {
                    debug!(identity = %identity, "drop for inactive session ignored");
                    return;
                }
                SessionState::Reconnecting { attempt } => attempt + 1,
                _ => 1,
            };
            let backoff = inner.settings.backoff;
            if !backoff.allows(attempt) {
                error!(identity = %identity, attempts = attempt - 1, reason = %reason, "giving up on session");
                slot.set(SessionState::Failed {
                    reason: format!("reconnect gave up after {} attempts: {reason}", attempt - 1),
                });
                return;
            }
            let delay = backoff.delay(attempt - 1);
            warn!(identity = %identity, reason = %reason, attempt, delay_ms = delay.as_millis() as u64, "session lost, scheduling reconnect");
            slot.set(SessionState::Reconnecting { attempt });
            tokio::spawn(reconnect(Arc::downgrade(inner), identity, slot, attempt, delay));
        }
    }
}

async fn reconnect(
    pool: Weak<PoolInner>,
    identity: SenderId,
    slot: Arc<SessionSlot>,
    attempt: u32,
    delay: Duration,
) {
    let cancel = match pool.upgrade() {
        Some(inner) => inner.cancel.clone(),
        None => return,
    };
    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(delay) => {}
    }
    let Some(inner) = pool.upgrade() else {
        return;
    };
    if slot.current() != (SessionState::Reconnecting { attempt }) {
        return;
    }

    let _flight = slot.connect.lock().await;
    debug!(identity = %identity, attempt, "reconnecting session");
    if let Err(e) = inner.transport.open(&identity, inner.events.clone()).await {
        // Feed the failure back through the control loop so the attempt count advances.
        let event = TransportEvent::Closed {
            identity: identity.clone(),
            reason: DisconnectReason::Lost(e.to_string()),
        };
        if inner.events.send(event).await.is_err() {
            slot.set(SessionState::Failed {
                reason: e.to_string(),
            });
        }
    }
}
