// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory directory adapter.
//!
//! Status writes update the stored rows, so the next read sees them, and are
//! recorded in order for assertions. Read and write failures can be injected.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use courier_core::{
    AdapterType, Campaign, CampaignStatus, Contact, ContactStatus, CourierError,
    DirectoryAdapter, HealthStatus, PluginAdapter, RowId,
};

/// One status write observed by [`MemoryDirectory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusWrite {
    Campaign(RowId, CampaignStatus),
    Contact(RowId, ContactStatus),
}

#[derive(Default)]
struct State {
    campaigns: Vec<Campaign>,
    contacts: Vec<Contact>,
    writes: Vec<StatusWrite>,
    failing_writes: u32,
    fail_contact_reads: bool,
    fail_campaign_reads: bool,
    campaign_reads: usize,
}

/// A directory held in memory.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    state: Arc<Mutex<State>>,
}

impl MemoryDirectory {
    pub fn new(campaigns: Vec<Campaign>, contacts: Vec<Contact>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                campaigns,
                contacts,
                ..State::default()
            })),
        }
    }

    pub async fn push_campaign(&self, campaign: Campaign) {
        self.state.lock().await.campaigns.push(campaign);
    }

    pub async fn push_contact(&self, contact: Contact) {
        self.state.lock().await.contacts.push(contact);
    }

    /// Make the next `n` status writes fail.
    pub async fn fail_next_writes(&self, n: u32) {
        self.state.lock().await.failing_writes = n;
    }

    pub async fn fail_contact_reads(&self, fail: bool) {
        self.state.lock().await.fail_contact_reads = fail;
    }

    pub async fn fail_campaign_reads(&self, fail: bool) {
        self.state.lock().await.fail_campaign_reads = fail;
    }

    /// Every successful status write, in order.
    pub async fn writes(&self) -> Vec<StatusWrite> {
        self.state.lock().await.writes.clone()
    }

    pub async fn campaign_status(&self, id: RowId) -> Option<CampaignStatus> {
        let state = self.state.lock().await;
        state.campaigns.iter().find(|c| c.id == id).map(|c| c.status)
    }

    pub async fn contact_status(&self, id: RowId) -> Option<ContactStatus> {
        let state = self.state.lock().await;
        state.contacts.iter().find(|c| c.id == id).map(|c| c.status)
    }

    /// Number of `list_campaigns` calls served.
    pub async fn campaign_reads(&self) -> usize {
        self.state.lock().await.campaign_reads
    }

    fn take_write_failure(state: &mut State, row: RowId) -> Result<(), CourierError> {
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(CourierError::directory_write(row, "injected write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MemoryDirectory {
    fn name(&self) -> &str {
        "mock-directory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Directory
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl DirectoryAdapter for MemoryDirectory {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, CourierError> {
        let mut state = self.state.lock().await;
        state.campaign_reads += 1;
        if state.fail_campaign_reads {
            return Err(CourierError::directory_read("injected read failure"));
        }
        Ok(state.campaigns.clone())
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, CourierError> {
        let state = self.state.lock().await;
        if state.fail_contact_reads {
            return Err(CourierError::directory_read("injected read failure"));
        }
        Ok(state.contacts.clone())
    }

    async fn update_campaign_status(
        &self,
        id: RowId,
        status: CampaignStatus,
    ) -> Result<(), CourierError> {
        let mut state = self.state.lock().await;
        Self::take_write_failure(&mut state, id)?;
        let row = state
            .campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CourierError::directory_write(id, "no such campaign row"))?;
        row.status = status;
        state.writes.push(StatusWrite::Campaign(id, status));
        Ok(())
    }

    async fn update_contact_status(
        &self,
        id: RowId,
        status: ContactStatus,
    ) -> Result<(), CourierError> {
        let mut state = self.state.lock().await;
        Self::take_write_failure(&mut state, id)?;
        let row = state
            .contacts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CourierError::directory_write(id, "no such contact row"))?;
        row.status = status;
        state.writes.push(StatusWrite::Contact(id, status));
        Ok(())
    }
}
