// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sender identities for the Courier campaign dispatcher.
//!
//! [`SenderPool`] owns one session per sender identity on top of a
//! [`TransportAdapter`](courier_core::TransportAdapter), reconnecting dropped
//! sessions with exponential backoff. [`BridgeTransport`] is the transport
//! that talks to a messaging bridge sidecar over HTTP.

pub mod backoff;
pub mod bridge;
pub mod credentials;
pub mod pool;
pub mod session;

pub use backoff::Backoff;
pub use bridge::BridgeTransport;
pub use credentials::list_identities;
pub use pool::{PoolSettings, SenderPool};
pub use session::{Session, SessionInfo, SessionState};
