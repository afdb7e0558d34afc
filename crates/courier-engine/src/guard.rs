// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process single-flight guard for campaigns.
//!
//! Two overlapping ticks in one process must not both run the same campaign.
//! The guard does not coordinate between processes sharing a directory.

use std::sync::Arc;

use courier_core::RowId;
use dashmap::DashSet;

/// Set of campaigns currently being dispatched.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    claimed: Arc<DashSet<RowId>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `campaign`, or `None` if another run already holds it.
    pub fn claim(&self, campaign: RowId) -> Option<CampaignClaim> {
        self.claimed.insert(campaign).then(|| CampaignClaim {
            campaign,
            claimed: Arc::clone(&self.claimed),
        })
    }
}

/// Held while a campaign runs; dropping it releases the claim.
#[derive(Debug)]
pub struct CampaignClaim {
    campaign: RowId,
    claimed: Arc<DashSet<RowId>>,
}

impl Drop for CampaignClaim {
    fn drop(&mut self) {
        self.claimed.remove(&self.campaign);
    }
}
