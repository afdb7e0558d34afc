// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end engine tests.
//!
//! `TestHarness` wires a [`CampaignEngine`] to in-memory adapters and a
//! [`MockTransport`], with zero pacing and fast timeouts by default.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use courier_core::{Campaign, Contact, CourierError};
use courier_engine::{CampaignEngine, EngineSettings, TickReport};
use courier_sender::{Backoff, PoolSettings, SenderPool};

use crate::memory_directory::MemoryDirectory;
use crate::memory_templates::MemoryTemplates;
use crate::mock_transport::MockTransport;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    campaigns: Vec<Campaign>,
    contacts: Vec<Contact>,
    templates: Vec<(String, String)>,
    transport: MockTransport,
    engine: EngineSettings,
    pool: PoolSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            campaigns: Vec::new(),
            contacts: Vec::new(),
            templates: Vec::new(),
            transport: MockTransport::new(),
            engine: EngineSettings {
                pacing_interval: Duration::ZERO,
                write_retries: 2,
                write_retry_backoff: Duration::ZERO,
                network_suffix: "s.whatsapp.net".to_string(),
            },
            pool: PoolSettings {
                acquire_timeout: Duration::from_secs(5),
                send_timeout: Duration::from_secs(5),
                backoff: Backoff::new(Duration::from_millis(100), Duration::from_secs(1), 3)
                    .with_jitter(0.0),
            },
        }
    }

    pub fn with_campaign(mut self, campaign: Campaign) -> Self {
        self.campaigns.push(campaign);
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contacts.push(contact);
        self
    }

    pub fn with_template(mut self, id: &str, body: &str) -> Self {
        self.templates.push((id.to_string(), body.to_string()));
        self
    }

    /// Use a pre-scripted transport.
    pub fn with_transport(mut self, transport: MockTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_pacing(mut self, interval: Duration) -> Self {
        self.engine.pacing_interval = interval;
        self
    }

    pub fn with_pool_settings(mut self, settings: PoolSettings) -> Self {
        self.pool = settings;
        self
    }

    /// Build the harness. Must be called inside a Tokio runtime.
    pub async fn build(self) -> TestHarness {
        let directory = MemoryDirectory::new(self.campaigns, self.contacts);
        let templates = MemoryTemplates::new();
        for (id, body) in &self.templates {
            templates.insert(id, body).await;
        }
        let transport = self.transport;
        let pool = SenderPool::start(Arc::new(transport.clone()), self.pool);
        let engine = Arc::new(CampaignEngine::new(
            Arc::new(directory.clone()),
            Arc::new(templates.clone()),
            pool.clone(),
            self.engine,
        ));
        TestHarness {
            directory,
            templates,
            transport,
            pool,
            engine,
        }
    }
}

/// A complete engine with mock adapters.
///
/// The mock handles share state with the adapters the engine holds, so
/// assertions see every read and write the engine made.
pub struct TestHarness {
    pub directory: MemoryDirectory,
    pub templates: MemoryTemplates,
    pub transport: MockTransport,
    pub pool: SenderPool,
    pub engine: Arc<CampaignEngine>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub async fn tick(&self, now: NaiveDateTime) -> Result<TickReport, CourierError> {
        self.engine.run_tick(now).await
    }
}
