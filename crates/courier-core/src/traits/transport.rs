// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport adapter trait for the messaging network behind the sender pool.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{CourierError, SendError};
use crate::traits::adapter::PluginAdapter;
use crate::types::{Address, MessageId, SenderId, TransportEvent};

/// A messaging transport holding one session per sender identity.
///
/// Session lifecycle changes are reported asynchronously through the event
/// sender handed to [`open`](TransportAdapter::open); the transport never calls
/// back into business logic. Only the sender pool talks to a transport.
#[async_trait]
pub trait TransportAdapter: PluginAdapter {
    /// Starts establishing a session for `identity`.
    ///
    /// Returning `Ok` means the attempt has started; readiness is signalled by
    /// a [`TransportEvent::Ready`] (or pairing/close events) on `events`.
    async fn open(
        &self,
        identity: &SenderId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<(), CourierError>;

    /// Sends a text message from `identity` to `to`.
    async fn send_text(
        &self,
        identity: &SenderId,
        to: &Address,
        text: &str,
    ) -> Result<MessageId, SendError>;

    /// Closes the session for `identity`, if any.
    async fn close(&self, identity: &SenderId) -> Result<(), CourierError>;
}
