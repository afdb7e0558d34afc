// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-position row layout shared by every directory backend.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use courier_config::model::StatusLabels;
use courier_core::{Campaign, CampaignStatus, Contact, ContactStatus, RowId, SenderId};
use tracing::{debug, warn};

/// Number of columns in the campaigns table.
pub const CAMPAIGN_COLUMNS: usize = 6;

/// Zero-based column of the campaign status cell.
pub const CAMPAIGN_STATUS_COLUMN: usize = 5;

/// Row number of the first data row (row 1 is the header).
pub const FIRST_DATA_ROW: u32 = 2;

/// Maps statuses to the labels stored in status cells and back.
#[derive(Debug, Clone, Default)]
pub struct StatusCodec {
    labels: StatusLabels,
}

impl StatusCodec {
    pub fn new(labels: StatusLabels) -> Self {
        Self { labels }
    }

    pub fn campaign_label(&self, status: CampaignStatus) -> &str {
        match status {
            CampaignStatus::Pending => &self.labels.pending,
            CampaignStatus::InProgress => &self.labels.in_progress,
            CampaignStatus::Finished => &self.labels.finished,
            CampaignStatus::Error => &self.labels.error,
        }
    }

    pub fn contact_label(&self, status: ContactStatus) -> &str {
        match status {
            ContactStatus::Pending => &self.labels.pending,
            ContactStatus::Sent => &self.labels.sent,
            ContactStatus::Error => &self.labels.error,
        }
    }

    /// Parse a campaign status cell. Accepts the configured label or the
    /// canonical state name, ignoring case and surrounding whitespace.
    pub fn parse_campaign(&self, cell: &str) -> Option<CampaignStatus> {
        let cell = cell.trim();
        [
            CampaignStatus::Pending,
            CampaignStatus::InProgress,
            CampaignStatus::Finished,
            CampaignStatus::Error,
        ]
        .into_iter()
        .find(|s| self.campaign_label(*s).trim().eq_ignore_ascii_case(cell))
        .or_else(|| CampaignStatus::from_str(cell).ok())
    }

    /// Parse a contact status cell. Anything unrecognized, including an empty
    /// cell, reads as `Pending` so the contact stays eligible.
    pub fn parse_contact(&self, cell: &str) -> ContactStatus {
        let cell = cell.trim();
        [ContactStatus::Sent, ContactStatus::Error, ContactStatus::Pending]
            .into_iter()
            .find(|s| self.contact_label(*s).trim().eq_ignore_ascii_case(cell))
            .or_else(|| ContactStatus::from_str(cell).ok())
            .unwrap_or(ContactStatus::Pending)
    }
}

/// Column layout of the contacts and campaigns tables.
#[derive(Debug, Clone)]
pub struct RowLayout {
    contact_fields: Vec<String>,
    codec: StatusCodec,
}

impl RowLayout {
    pub fn new(contact_fields: Vec<String>, codec: StatusCodec) -> Self {
        Self {
            contact_fields,
            codec,
        }
    }

    pub fn codec(&self) -> &StatusCodec {
        &self.codec
    }

    /// Profile fields, destination, sender, status.
    pub fn contact_columns(&self) -> usize {
        self.contact_fields.len() + 3
    }

    pub fn contact_status_column(&self) -> usize {
        self.contact_fields.len() + 2
    }

    /// Decode one contact row. Missing trailing cells read as empty.
    pub fn parse_contact(&self, row: RowId, cells: &[String]) -> Contact {
        let cell = |i: usize| cells.get(i).map(|s| s.trim()).unwrap_or_default();
        let fields: BTreeMap<String, String> = self
            .contact_fields
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), cell(i).to_string()))
            .collect();
        let base = self.contact_fields.len();
        Contact {
            id: row,
            fields,
            destination: cell(base).to_string(),
            assigned_sender: SenderId::new(cell(base + 1)),
            status: self.codec.parse_contact(cell(base + 2)),
        }
    }

    /// Decode one campaign row.
    ///
    /// Returns `None` when the status cell is empty or unrecognized; such a
    /// row is never due and is left alone.
    pub fn parse_campaign(&self, row: RowId, cells: &[String]) -> Option<Campaign> {
        let cell = |i: usize| cells.get(i).map(|s| s.trim()).unwrap_or_default();
        let name = cell(0).to_string();

        let status_cell = cell(CAMPAIGN_STATUS_COLUMN);
        let Some(status) = self.codec.parse_campaign(status_cell) else {
            if status_cell.is_empty() {
                debug!(campaign = %name, row = %row, "campaign row has no status, skipping");
            } else {
                warn!(
                    campaign = %name,
                    row = %row,
                    status = status_cell,
                    "unrecognized campaign status, skipping row"
                );
            }
            return None;
        };

        let scheduled_at = parse_schedule(cell(1), cell(2));
        if scheduled_at.is_none() && !(cell(1).is_empty() || cell(2).is_empty()) {
            warn!(
                campaign = %name,
                row = %row,
                date = cell(1),
                time = cell(2),
                "unparseable campaign schedule, campaign will never be due"
            );
        }

        Some(Campaign {
            id: row,
            name,
            scheduled_at,
            senders: parse_senders(cell(3)),
            template_id: cell(4).to_string(),
            status,
        })
    }
}

/// Combine a `DD/MM/YYYY` date and an `HH:MM` time into local wall-clock time.
///
/// Either part empty or malformed yields `None`. Single-digit day, month,
/// hour, and minute are accepted, and a trailing `:SS` is tolerated.
pub fn parse_schedule(date: &str, time: &str) -> Option<NaiveDateTime> {
    let (date, time) = (date.trim(), time.trim());
    if date.is_empty() || time.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, "%d/%m/%Y").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()?;
    Some(date.and_time(time))
}

/// Split a comma-separated sender list, trimming whitespace and dropping blanks.
///
/// Entries that are not valid identities are dropped with a warning, so a
/// campaign never dispatches through them.
pub fn parse_senders(cell: &str) -> Vec<SenderId> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match SenderId::parse(s) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "dropping sender from campaign row");
                None
            }
        })
        .collect()
}

/// Spreadsheet column letter for a zero-based index (`0 -> A`, `26 -> AA`).
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn layout() -> RowLayout {
        RowLayout::new(
            vec!["name".into(), "company".into(), "tax_id".into()],
            StatusCodec::default(),
        )
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_full_contact_row() {
        let c = layout().parse_contact(
            RowId(2),
            &cells(&["Ana", "ACME", "123", "+55 11 9999-0000", "5511", "sent"]),
        );
        assert_eq!(c.fields["name"], "Ana");
        assert_eq!(c.fields["company"], "ACME");
        assert_eq!(c.destination, "+55 11 9999-0000");
        assert_eq!(c.assigned_sender, SenderId::from("5511"));
        assert_eq!(c.status, ContactStatus::Sent);
    }

    #[test]
    fn short_contact_row_defaults_to_pending() {
        let c = layout().parse_contact(RowId(3), &cells(&["Bo", "", "", "5511888", "5511"]));
        assert_eq!(c.status, ContactStatus::Pending);
        assert_eq!(c.fields["tax_id"], "");
    }

    #[test]
    fn unknown_contact_status_reads_pending() {
        let codec = StatusCodec::default();
        assert_eq!(codec.parse_contact("delivered?"), ContactStatus::Pending);
        assert_eq!(codec.parse_contact(" ERROR "), ContactStatus::Error);
    }

    #[test]
    fn localized_labels_parse_alongside_canonical_names() {
        let codec = StatusCodec::new(StatusLabels {
            pending: "Pendente".into(),
            in_progress: "Em andamento".into(),
            finished: "Finalizado".into(),
            error: "Erro".into(),
            sent: "Enviado".into(),
        });
        assert_eq!(codec.parse_contact("enviado"), ContactStatus::Sent);
        assert_eq!(codec.parse_contact("Sent"), ContactStatus::Sent);
        assert_eq!(codec.parse_campaign("pendente"), Some(CampaignStatus::Pending));
        assert_eq!(
            codec.parse_campaign("Em Andamento"),
            Some(CampaignStatus::InProgress)
        );
        assert_eq!(codec.parse_campaign("finished"), Some(CampaignStatus::Finished));
        assert_eq!(codec.campaign_label(CampaignStatus::Error), "Erro");
    }

    #[test]
    fn parses_campaign_row() {
        let c = layout()
            .parse_campaign(
                RowId(2),
                &cells(&["Launch", "01/01/2024", "09:00", "5511, 5522 ,", "t1", "Pending"]),
            )
            .unwrap();
        assert_eq!(c.name, "Launch");
        assert_eq!(c.scheduled_at, parse_schedule("1/1/2024", "9:00"));
        assert_eq!(c.senders, vec![SenderId::from("5511"), SenderId::from("5522")]);
        assert_eq!(c.template_id, "t1");
        assert_eq!(c.status, CampaignStatus::Pending);
    }

    #[test]
    #[traced_test]
    fn path_like_senders_are_dropped() {
        let senders = parse_senders("5511, ../../etc, a/b, 5522");
        assert_eq!(senders, vec![SenderId::from("5511"), SenderId::from("5522")]);
        assert!(logs_contain("dropping sender from campaign row"));
    }

    #[test]
    fn missing_time_is_never_due() {
        let c = layout()
            .parse_campaign(RowId(4), &cells(&["X", "01/01/2024", "", "a", "t", "pending"]))
            .unwrap();
        assert!(c.scheduled_at.is_none());
    }

    #[test]
    #[traced_test]
    fn unrecognized_campaign_status_is_skipped() {
        let row = cells(&["X", "01/01/2024", "09:00", "a", "t", "paused"]);
        assert!(layout().parse_campaign(RowId(5), &row).is_none());
        assert!(logs_contain("unrecognized campaign status"));
    }

    #[test]
    fn schedule_parsing() {
        let at = parse_schedule("31/12/2024", "23:59").unwrap();
        assert_eq!(at.to_string(), "2024-12-31 23:59:00");
        assert!(parse_schedule("2024-12-31", "23:59").is_none());
        assert!(parse_schedule("31/12/2024", "25:00").is_none());
        assert!(parse_schedule("", "10:00").is_none());
        assert!(parse_schedule("31/12/2024", "10:00:30").is_some());
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(5), "F");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn contact_status_column_follows_profile_fields() {
        let l = layout();
        assert_eq!(l.contact_columns(), 6);
        assert_eq!(l.contact_status_column(), 5);
    }
}
