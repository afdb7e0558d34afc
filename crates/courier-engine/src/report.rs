// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tick and campaign outcome reports.

use chrono::NaiveDateTime;
use courier_core::RowId;
use serde::Serialize;

/// How a campaign run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum CampaignOutcome {
    /// The contact loop completed. Individual contacts may still have failed.
    Finished,
    /// The campaign was marked `Error` without sending.
    Error(String),
    /// Nothing was done for this campaign on this tick.
    Skipped(String),
}

/// Counters and outcome for one campaign (or one manual run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignReport {
    /// `None` for manual runs that have no campaign row.
    pub campaign: Option<RowId>,
    pub name: String,
    pub attempted: usize,
    pub sent: usize,
    pub errored: usize,
    /// Status writes that were given up on after retries.
    pub write_failures: usize,
    pub outcome: CampaignOutcome,
}

impl CampaignReport {
    pub fn new(campaign: Option<RowId>, name: impl Into<String>) -> Self {
        Self {
            campaign,
            name: name.into(),
            attempted: 0,
            sent: 0,
            errored: 0,
            write_failures: 0,
            outcome: CampaignOutcome::Finished,
        }
    }

    pub fn with_outcome(mut self, outcome: CampaignOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// Result of one [`run_tick`](crate::CampaignEngine::run_tick).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub now: NaiveDateTime,
    /// Number of campaigns found due at the start of the tick.
    pub due: usize,
    pub campaigns: Vec<CampaignReport>,
}

impl TickReport {
    pub fn empty(now: NaiveDateTime) -> Self {
        Self {
            now,
            due: 0,
            campaigns: Vec::new(),
        }
    }

    pub fn sent(&self) -> usize {
        self.campaigns.iter().map(|c| c.sent).sum()
    }

    pub fn errored(&self) -> usize {
        self.campaigns.iter().map(|c| c.errored).sum()
    }
}
