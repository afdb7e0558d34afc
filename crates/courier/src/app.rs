// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires adapters, the sender pool, and the engine from configuration.

use std::sync::Arc;

use courier_config::CourierConfig;
use courier_core::{CourierError, PluginAdapter, TemplateStore};
use courier_engine::{CampaignEngine, EngineSettings};
use courier_sender::{BridgeTransport, PoolSettings, SenderPool};
use courier_template::JsonTemplateStore;
use tracing::{debug, info};

/// The running pieces shared by every command.
pub struct App {
    pub engine: Arc<CampaignEngine>,
    pub pool: SenderPool,
}

impl App {
    /// Build from config. Must run inside the Tokio runtime.
    pub fn build(config: &CourierConfig) -> Result<Self, CourierError> {
        let directory = courier_directory::from_config(&config.directory)?;
        let templates: Arc<dyn TemplateStore> =
            Arc::new(JsonTemplateStore::new(&config.templates.path));
        let transport = Arc::new(BridgeTransport::from_config(&config.sender)?);
        debug!(
            directory = directory.name(),
            templates = templates.name(),
            transport = transport.name(),
            "adapters initialized"
        );

        let pool = SenderPool::start(
            transport,
            PoolSettings::from_config(&config.sender, &config.engine),
        );
        let engine = Arc::new(CampaignEngine::new(
            directory,
            templates,
            pool.clone(),
            EngineSettings::from_config(config),
        ));
        info!(
            backend = ?config.directory.backend,
            bridge = %config.sender.bridge_url,
            "courier initialized"
        );
        Ok(Self { engine, pool })
    }

    /// Close every sender session.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}
