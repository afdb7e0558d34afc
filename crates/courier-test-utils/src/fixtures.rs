// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row builders for tests.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use courier_core::{Campaign, CampaignStatus, Contact, ContactStatus, RowId, SenderId};

/// Parse `dd/mm/yyyy hh:mm` local time.
///
/// # Panics
///
/// On malformed input; fixtures are expected to be literals.
pub fn at(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%d/%m/%Y %H:%M")
        .unwrap_or_else(|e| panic!("bad fixture timestamp `{text}`: {e}"))
}

/// A pending campaign scheduled at `scheduled` (`dd/mm/yyyy hh:mm`).
pub fn campaign(row: u32, name: &str, scheduled: &str, senders: &[&str], template: &str) -> Campaign {
    Campaign {
        id: RowId(row),
        name: name.to_string(),
        scheduled_at: Some(at(scheduled)),
        senders: senders.iter().map(|s| SenderId::from(*s)).collect(),
        template_id: template.to_string(),
        status: CampaignStatus::Pending,
    }
}

/// A pending contact with a `name` field.
pub fn contact(row: u32, name: &str, destination: &str, sender: &str) -> Contact {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), name.to_string());
    Contact {
        id: RowId(row),
        fields,
        destination: destination.to_string(),
        assigned_sender: SenderId::from(sender),
        status: ContactStatus::Pending,
    }
}
