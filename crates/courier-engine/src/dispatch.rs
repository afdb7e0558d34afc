// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-contact send loop.

use std::collections::HashMap;

use courier_core::{Address, Contact, ContactStatus, SendError, SenderId, Template};
use courier_sender::{SenderPool, Session};
use courier_template::render;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::pacer::Pacer;
use crate::reconcile::StatusWriter;

/// Outcome of `acquire` for each sender identity a run dispatches through.
///
/// Failures are kept so every contact of a broken identity fails with the
/// same cause instead of re-attempting the session per contact.
pub type SessionTable = HashMap<SenderId, Result<Session, SendError>>;

/// Counters produced by one [`DispatchLoop::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub attempted: usize,
    pub sent: usize,
    pub errored: usize,
    pub write_failures: usize,
}

/// Renders, sends, and records each contact in order.
pub struct DispatchLoop<'a> {
    pool: &'a SenderPool,
    writer: &'a StatusWriter,
    pacer: &'a Mutex<Pacer>,
    network_suffix: &'a str,
}

impl<'a> DispatchLoop<'a> {
    pub fn new(
        pool: &'a SenderPool,
        writer: &'a StatusWriter,
        pacer: &'a Mutex<Pacer>,
        network_suffix: &'a str,
    ) -> Self {
        Self {
            pool,
            writer,
            pacer,
            network_suffix,
        }
    }

    /// Attempt every contact once, continuing past failures.
    ///
    /// Each attempt, failed ones included, is followed by the pacing pause
    /// before the next one, and its outcome is written as `Sent` or `Error`
    /// before that pause starts. The pacer stays locked for the whole
    /// attempt, so concurrent runs never interleave inside a pause.
    pub async fn run(
        &self,
        contacts: &[Contact],
        template: &Template,
        sessions: &SessionTable,
    ) -> DispatchStats {
        let mut stats = DispatchStats::default();
        for contact in contacts {
            let mut pacer = self.pacer.lock().await;
            pacer.wait().await;
            stats.attempted += 1;

            let outcome = self.attempt(contact, template, sessions).await;
            let status = match &outcome {
                Ok(address) => {
                    info!(contact = %contact.id, name = %contact.display_name(), to = %address, "sent");
                    stats.sent += 1;
                    ContactStatus::Sent
                }
                Err(e) => {
                    warn!(
                        contact = %contact.id,
                        name = %contact.display_name(),
                        identity = %contact.assigned_sender,
                        error = %e,
                        "send failed"
                    );
                    stats.errored += 1;
                    ContactStatus::Error
                }
            };

            if self.writer.write_contact(contact.id, status).await.is_err() {
                stats.write_failures += 1;
            }
            pacer.finish();
        }
        stats
    }

    async fn attempt(
        &self,
        contact: &Contact,
        template: &Template,
        sessions: &SessionTable,
    ) -> Result<Address, SendError> {
        let session = match sessions.get(&contact.assigned_sender) {
            Some(Ok(session)) => session,
            Some(Err(e)) => return Err(e.clone()),
            None => {
                return Err(SendError::SessionUnavailable {
                    identity: contact.assigned_sender.clone(),
                    reason: "identity not part of this run".into(),
                });
            }
        };

        let address = Address::normalize(&contact.destination, self.network_suffix);
        if address.user().is_empty() {
            return Err(SendError::Rejected {
                message: format!("contact has no usable destination: `{}`", contact.destination),
            });
        }

        let text = render(&template.body, &contact.fields);
        self.pool.send(session, &address, &text).await?;
        Ok(address)
    }
}
