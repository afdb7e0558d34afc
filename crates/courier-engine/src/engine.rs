// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The campaign dispatch engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use courier_config::CourierConfig;
use courier_core::{
    Campaign, CampaignStatus, CourierError, DirectoryAdapter, RowId, SenderId, Template,
    TemplateStore,
};
use courier_sender::SenderPool;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::dispatch::{DispatchLoop, SessionTable};
use crate::guard::InFlight;
use crate::pacer::Pacer;
use crate::reconcile::StatusWriter;
use crate::report::{CampaignOutcome, CampaignReport, TickReport};
use crate::selector::{select, select_for_campaign};

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub pacing_interval: Duration,
    pub write_retries: u32,
    pub write_retry_backoff: Duration,
    pub network_suffix: String,
}

impl EngineSettings {
    pub fn from_config(config: &CourierConfig) -> Self {
        Self {
            pacing_interval: Duration::from_millis(config.engine.pacing_interval_ms),
            write_retries: config.engine.write_retries,
            write_retry_backoff: Duration::from_millis(config.engine.write_retry_backoff_ms),
            network_suffix: config.sender.network_suffix.clone(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&CourierConfig::default())
    }
}

/// Decides which campaigns are due and runs them.
///
/// Safe to call [`run_tick`](Self::run_tick) concurrently from several tasks
/// (scheduler, CLI, API): a campaign is dispatched by at most one of them at
/// a time, and pacing is shared across all of them.
pub struct CampaignEngine {
    directory: Arc<dyn DirectoryAdapter>,
    templates: Arc<dyn TemplateStore>,
    pool: SenderPool,
    writer: StatusWriter,
    pacer: Mutex<Pacer>,
    in_flight: InFlight,
    settings: EngineSettings,
}

impl CampaignEngine {
    pub fn new(
        directory: Arc<dyn DirectoryAdapter>,
        templates: Arc<dyn TemplateStore>,
        pool: SenderPool,
        settings: EngineSettings,
    ) -> Self {
        let writer = StatusWriter::new(
            Arc::clone(&directory),
            settings.write_retries,
            settings.write_retry_backoff,
        );
        Self {
            directory,
            templates,
            pool,
            writer,
            pacer: Mutex::new(Pacer::new(settings.pacing_interval)),
            in_flight: InFlight::new(),
            settings,
        }
    }

    pub fn pool(&self) -> &SenderPool {
        &self.pool
    }

    pub fn directory(&self) -> &Arc<dyn DirectoryAdapter> {
        &self.directory
    }

    pub fn templates(&self) -> &Arc<dyn TemplateStore> {
        &self.templates
    }

    /// Run every campaign due at `now` (local wall-clock time).
    ///
    /// Fails only if the campaign list or the templates cannot be read at the
    /// start of the tick; in that case nothing has been written. Problems with
    /// a single campaign or contact are recorded in the report instead.
    pub async fn run_tick(&self, now: NaiveDateTime) -> Result<TickReport, CourierError> {
        let campaigns = self.directory.list_campaigns().await?;
        let due: Vec<Campaign> = campaigns.into_iter().filter(|c| c.is_due(now)).collect();
        if due.is_empty() {
            return Ok(TickReport::empty(now));
        }
        info!(due = due.len(), now = %now, "campaigns due");

        let templates = self.templates.load_templates().await?;
        let mut report = TickReport {
            now,
            due: due.len(),
            campaigns: Vec::with_capacity(due.len()),
        };
        for campaign in &due {
            report
                .campaigns
                .push(self.run_campaign(campaign, &templates).await);
        }

        info!(
            due = report.due,
            sent = report.sent(),
            errored = report.errored(),
            "tick complete"
        );
        Ok(report)
    }

    async fn run_campaign(
        &self,
        campaign: &Campaign,
        templates: &HashMap<String, Template>,
    ) -> CampaignReport {
        let mut report = CampaignReport::new(Some(campaign.id), &campaign.name);

        let Some(_claim) = self.in_flight.claim(campaign.id) else {
            info!(campaign = %campaign.name, row = %campaign.id, "campaign already in flight, skipping");
            return report.with_outcome(CampaignOutcome::Skipped("already in flight".into()));
        };
        if let Err(reason) = self.confirm_pending(campaign.id).await {
            info!(campaign = %campaign.name, row = %campaign.id, reason = %reason, "campaign skipped");
            return report.with_outcome(CampaignOutcome::Skipped(reason));
        }

        info!(campaign = %campaign.name, row = %campaign.id, "starting campaign");
        if self
            .writer
            .write_campaign(campaign.id, CampaignStatus::Pending, CampaignStatus::InProgress)
            .await
            .is_err()
        {
            report.write_failures += 1;
            return report.with_outcome(CampaignOutcome::Skipped(
                "could not mark campaign in progress".into(),
            ));
        }

        let sessions = self.acquire_sessions(&campaign.senders).await;

        let Some(template) = templates.get(&campaign.template_id) else {
            error!(campaign = %campaign.name, template = %campaign.template_id, "template not found");
            let reason = CourierError::TemplateNotFound {
                id: campaign.template_id.clone(),
            }
            .to_string();
            return self.fail_campaign(campaign.id, report, reason).await;
        };

        let contacts = match self.directory.list_contacts().await {
            Ok(contacts) => contacts,
            Err(e) => {
                error!(campaign = %campaign.name, error = %e, "could not load contacts");
                return self.fail_campaign(campaign.id, report, e.to_string()).await;
            }
        };
        let selected = select_for_campaign(&contacts, campaign);
        info!(campaign = %campaign.name, eligible = selected.len(), "dispatching");

        let stats = self.dispatch_loop().run(&selected, template, &sessions).await;
        report.attempted = stats.attempted;
        report.sent = stats.sent;
        report.errored = stats.errored;
        report.write_failures += stats.write_failures;

        if self
            .writer
            .write_campaign(campaign.id, CampaignStatus::InProgress, CampaignStatus::Finished)
            .await
            .is_err()
        {
            report.write_failures += 1;
        }
        info!(
            campaign = %campaign.name,
            attempted = report.attempted,
            sent = report.sent,
            errored = report.errored,
            "campaign finished"
        );
        report.with_outcome(CampaignOutcome::Finished)
    }

    /// One-shot dispatch outside the campaign state machine.
    ///
    /// Sends `template_id` to every eligible contact of `senders` using the
    /// same selection, pacing, and status recording as a scheduled campaign.
    pub async fn run_manual(
        &self,
        senders: &[SenderId],
        template_id: &str,
    ) -> Result<CampaignReport, CourierError> {
        let templates = self.templates.load_templates().await?;
        let template = templates
            .get(template_id)
            .ok_or_else(|| CourierError::TemplateNotFound {
                id: template_id.to_string(),
            })?;
        let contacts = self.directory.list_contacts().await?;
        let selected = select(&contacts, senders);
        info!(template = %template_id, eligible = selected.len(), "manual dispatch");

        let sessions = self.acquire_sessions(senders).await;
        let stats = self.dispatch_loop().run(&selected, template, &sessions).await;

        let mut report = CampaignReport::new(None, format!("manual: {template_id}"));
        report.attempted = stats.attempted;
        report.sent = stats.sent;
        report.errored = stats.errored;
        report.write_failures = stats.write_failures;
        Ok(report)
    }

    fn dispatch_loop(&self) -> DispatchLoop<'_> {
        DispatchLoop::new(
            &self.pool,
            &self.writer,
            &self.pacer,
            &self.settings.network_suffix,
        )
    }

    /// Re-read the campaign list and check the row is still pending.
    async fn confirm_pending(&self, id: RowId) -> Result<(), String> {
        let campaigns = self
            .directory
            .list_campaigns()
            .await
            .map_err(|e| format!("could not confirm status: {e}"))?;
        match campaigns.iter().find(|c| c.id == id) {
            Some(c) if c.status == CampaignStatus::Pending => Ok(()),
            Some(c) if c.status.is_terminal() => Err(format!("already {}", c.status)),
            Some(c) => {
                // Not claimed here, so another process or an interrupted run owns it.
                warn!(row = %id, status = %c.status, "campaign in progress outside this process");
                Err(format!("no longer pending ({})", c.status))
            }
            None => Err("campaign row disappeared".into()),
        }
    }

    async fn acquire_sessions(&self, senders: &[SenderId]) -> SessionTable {
        let mut sessions = SessionTable::new();
        for identity in senders {
            if sessions.contains_key(identity) {
                continue;
            }
            let result = self.pool.acquire(identity).await;
            if let Err(e) = &result {
                warn!(identity = %identity, error = %e, "sender unavailable, its contacts will fail");
            }
            sessions.insert(identity.clone(), result);
        }
        sessions
    }

    async fn fail_campaign(
        &self,
        id: RowId,
        mut report: CampaignReport,
        reason: String,
    ) -> CampaignReport {
        if self
            .writer
            .write_campaign(id, CampaignStatus::InProgress, CampaignStatus::Error)
            .await
            .is_err()
        {
            report.write_failures += 1;
        }
        report.with_outcome(CampaignOutcome::Error(reason))
    }
}
