// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the directory, transport, and engine crates.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CourierError;

/// Stable row identifier in the backing directory (1-based, header is row 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(pub u32);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Routing key of a sender identity, e.g. `5511999999999`.
///
/// The identity names a credential directory and a bridge URL segment, so
/// anything read from outside goes through [`SenderId::parse`]. [`SenderId::new`]
/// does not check and is meant for trusted values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SenderId(pub String);

impl SenderId {
    pub const MAX_LEN: usize = 64;

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Trim and validate untrusted input.
    pub fn parse(raw: &str) -> Result<Self, CourierError> {
        let id = Self::new(raw.trim());
        if id.is_valid() {
            Ok(id)
        } else {
            Err(CourierError::InvalidSender {
                value: raw.to_string(),
            })
        }
    }

    /// 1 to [`MAX_LEN`](Self::MAX_LEN) ASCII letters, digits, `-` or `_`.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= Self::MAX_LEN
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SenderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Transport-assigned identifier for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// A destination in the transport's addressing form: `<digits>@<network-suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Normalize a raw directory destination into transport form.
    ///
    /// Input that already carries an `@` suffix is kept verbatim. Otherwise every
    /// non-digit character is stripped and `@<suffix>` is appended.
    pub fn normalize(raw: &str, network_suffix: &str) -> Self {
        let raw = raw.trim();
        if raw.contains('@') {
            return Self(raw.to_string());
        }
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        Self(format!("{digits}@{network_suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the `@`.
    pub fn user(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Directory,
    Templates,
    Transport,
}

/// Lifecycle of a campaign row.
///
/// `Pending -> InProgress -> {Finished, Error}`; a campaign never regresses.
/// `Finished` only means the attempt loop completed, per-contact statuses are
/// the source of truth for delivery.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum CampaignStatus {
    Pending,
    #[strum(to_string = "InProgress", serialize = "in progress", serialize = "in_progress")]
    InProgress,
    Finished,
    Error,
}

impl CampaignStatus {
    /// `true` for states the engine never leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, CampaignStatus::Finished | CampaignStatus::Error)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: CampaignStatus) -> bool {
        matches!(
            (self, next),
            (CampaignStatus::Pending, CampaignStatus::InProgress)
                | (CampaignStatus::InProgress, CampaignStatus::Finished)
                | (CampaignStatus::InProgress, CampaignStatus::Error)
        )
    }
}

/// Delivery state of a contact row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ContactStatus {
    Pending,
    Sent,
    Error,
}

/// A scheduled campaign read from the directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Campaign {
    pub id: RowId,
    pub name: String,
    /// Local wall-clock time. `None` when the date or time cell is empty, which
    /// means the campaign is never due.
    pub scheduled_at: Option<NaiveDateTime>,
    /// Ordered sender identities the campaign dispatches through.
    pub senders: Vec<SenderId>,
    pub template_id: String,
    pub status: CampaignStatus,
}

impl Campaign {
    /// A campaign is due when it is still pending and its schedule has passed.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.status == CampaignStatus::Pending
            && self.scheduled_at.is_some_and(|at| at <= now)
    }
}

/// A contact row read from the directory.
///
/// Contacts in `Error` remain eligible on later runs. Delivery is at-least-once:
/// a failed contact is retried by every campaign that targets its sender until
/// it is marked `Sent`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    pub id: RowId,
    /// Profile fields available to templates, keyed by field name.
    pub fields: BTreeMap<String, String>,
    /// Raw routing address as stored in the directory.
    pub destination: String,
    pub assigned_sender: SenderId,
    pub status: ContactStatus,
}

impl Contact {
    /// Eligibility predicate: assigned to one of `senders` and not yet sent.
    pub fn is_eligible_for(&self, senders: &[SenderId]) -> bool {
        self.status != ContactStatus::Sent && senders.contains(&self.assigned_sender)
    }

    /// Display name used in logs, falling back to the row id.
    pub fn display_name(&self) -> String {
        self.fields
            .get("name")
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("row {}", self.id))
    }
}

/// A message template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub body: String,
}

/// Acknowledgement of a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub message_id: MessageId,
    pub identity: SenderId,
    pub address: Address,
    pub sent_at: DateTime<Utc>,
}

/// Why a transport session closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The identity was signed out; terminal, never retried automatically.
    SignedOut,
    /// Any other drop (network loss, server restart); eligible for reconnect.
    Lost(String),
}

/// Notification emitted by a transport about one of its sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The session needs an out-of-band pairing step before it becomes usable.
    PairingRequired { identity: SenderId, code: String },
    /// The session is ready to send.
    Ready { identity: SenderId },
    /// The session closed.
    Closed {
        identity: SenderId,
        reason: DisconnectReason,
    },
}

impl TransportEvent {
    pub fn identity(&self) -> &SenderId {
        match self {
            TransportEvent::PairingRequired { identity, .. }
            | TransportEvent::Ready { identity }
            | TransportEvent::Closed { identity, .. } => identity,
        }
    }
}
