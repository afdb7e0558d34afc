// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory adapter trait: the source of record for contacts and campaigns.

use async_trait::async_trait;

use crate::error::CourierError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Campaign, CampaignStatus, Contact, ContactStatus, RowId};

/// Read/write access to contact and campaign rows.
///
/// Rows are returned in the backing store's insertion order. Status writes
/// update exactly one field keyed by row id and must be visible to the next
/// read once the returned future resolves.
#[async_trait]
pub trait DirectoryAdapter: PluginAdapter {
    /// Lists every campaign row.
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, CourierError>;

    /// Lists every contact row.
    async fn list_contacts(&self) -> Result<Vec<Contact>, CourierError>;

    /// Writes the status cell of a campaign row.
    async fn update_campaign_status(
        &self,
        id: RowId,
        status: CampaignStatus,
    ) -> Result<(), CourierError>;

    /// Writes the status cell of a contact row.
    async fn update_contact_status(
        &self,
        id: RowId,
        status: ContactStatus,
    ) -> Result<(), CourierError>;
}
