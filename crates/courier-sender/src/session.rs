// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session handles and lifecycle states.

use std::fmt;

use courier_core::SenderId;
use serde::Serialize;

/// Lifecycle of one sender identity's session inside the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// Never opened, or released.
    Idle,
    /// `open` was called; waiting for the transport to report readiness.
    Connecting,
    /// The transport needs an out-of-band pairing step.
    AwaitingPairing { code: String },
    /// Usable for sends.
    Ready,
    /// Dropped unexpectedly; reconnect attempt `attempt` is scheduled.
    Reconnecting { attempt: u32 },
    /// Signed out by the network. Terminal until re-paired.
    SignedOut,
    /// Open failed or reconnect attempts ran out.
    Failed { reason: String },
}

impl SessionState {
    /// States an `acquire` call stops waiting at.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            SessionState::Ready | SessionState::SignedOut | SessionState::Failed { .. }
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => f.write_str("idle"),
            SessionState::Connecting => f.write_str("connecting"),
            SessionState::AwaitingPairing { .. } => f.write_str("awaiting pairing"),
            SessionState::Ready => f.write_str("ready"),
            SessionState::Reconnecting { attempt } => write!(f, "reconnecting (attempt {attempt})"),
            SessionState::SignedOut => f.write_str("signed out"),
            SessionState::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Handle to a ready session, issued by [`SenderPool::acquire`](crate::SenderPool::acquire).
///
/// Holding a handle does not pin the session; the pool checks readiness again
/// on every send.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    identity: SenderId,
}

impl Session {
    pub(crate) fn new(identity: SenderId) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &SenderId {
        &self.identity
    }
}

/// Snapshot row returned by [`SenderPool::sessions`](crate::SenderPool::sessions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub identity: SenderId,
    #[serde(flatten)]
    pub state: SessionState,
}
