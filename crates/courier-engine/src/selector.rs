// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact selection for a campaign.

use courier_core::{Campaign, Contact, SenderId};

/// Contacts assigned to one of `senders` that are not yet sent.
///
/// Input order is preserved; nothing is deduplicated or re-sorted.
pub fn select(contacts: &[Contact], senders: &[SenderId]) -> Vec<Contact> {
    contacts
        .iter()
        .filter(|c| c.is_eligible_for(senders))
        .cloned()
        .collect()
}

/// [`select`] with the campaign's sender list.
pub fn select_for_campaign(contacts: &[Contact], campaign: &Campaign) -> Vec<Contact> {
    select(contacts, &campaign.senders)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use courier_core::{ContactStatus, RowId};
    use proptest::prelude::*;

    use super::*;

    fn contact(row: u32, sender: &str, status: ContactStatus) -> Contact {
        Contact {
            id: RowId(row),
            fields: BTreeMap::new(),
            destination: format!("55119{row:08}"),
            assigned_sender: SenderId::from(sender),
            status,
        }
    }

    #[test]
    fn filters_by_sender_and_status() {
        let contacts = vec![
            contact(2, "a", ContactStatus::Pending),
            contact(3, "b", ContactStatus::Pending),
            contact(4, "a", ContactStatus::Sent),
            contact(5, "a", ContactStatus::Error),
            contact(6, "c", ContactStatus::Pending),
        ];
        let ids: Vec<RowId> = select(&contacts, &[SenderId::from("a"), SenderId::from("b")])
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![RowId(2), RowId(3), RowId(5)]);
    }

    #[test]
    fn empty_sender_list_selects_nothing() {
        let contacts = vec![contact(2, "a", ContactStatus::Pending)];
        assert!(select(&contacts, &[]).is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let contacts = vec![
            contact(2, "a", ContactStatus::Pending),
            contact(2, "a", ContactStatus::Pending),
        ];
        assert_eq!(select(&contacts, &[SenderId::from("a")]).len(), 2);
    }

    fn arb_contact() -> impl Strategy<Value = Contact> {
        (
            2u32..500,
            prop::sample::select(vec!["a", "b", "c", "d"]),
            prop::sample::select(vec![
                ContactStatus::Pending,
                ContactStatus::Sent,
                ContactStatus::Error,
            ]),
        )
            .prop_map(|(row, sender, status)| contact(row, sender, status))
    }

    proptest! {
        #[test]
        fn selection_matches_predicate(
            contacts in prop::collection::vec(arb_contact(), 0..40),
            senders in prop::sample::subsequence(vec!["a", "b", "c", "d"], 0..=4),
        ) {
            let senders: Vec<SenderId> = senders.into_iter().map(SenderId::from).collect();
            let selected = select(&contacts, &senders);

            for c in &selected {
                prop_assert!(senders.contains(&c.assigned_sender));
                prop_assert_ne!(c.status, ContactStatus::Sent);
            }
            let expected = contacts
                .iter()
                .filter(|c| senders.contains(&c.assigned_sender) && c.status != ContactStatus::Sent)
                .count();
            prop_assert_eq!(selected.len(), expected);
        }

        #[test]
        fn selection_preserves_relative_order(
            contacts in prop::collection::vec(arb_contact(), 0..40).prop_shuffle(),
        ) {
            let senders = vec![SenderId::from("a"), SenderId::from("c")];
            let selected = select(&contacts, &senders);
            let expected: Vec<&Contact> = contacts
                .iter()
                .filter(|c| c.is_eligible_for(&senders))
                .collect();
            prop_assert_eq!(selected.iter().collect::<Vec<_>>(), expected);
        }
    }
}
