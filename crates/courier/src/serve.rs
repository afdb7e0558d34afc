// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier serve`: the scheduler loop plus the optional HTTP gateway.

use std::time::Duration;

use courier_config::CourierConfig;
use courier_core::CourierError;
use courier_engine::Scheduler;
use courier_gateway::GatewayState;
use tracing::{error, info};

use crate::app::App;
use crate::shutdown;

pub async fn run_serve(config: CourierConfig) -> Result<(), CourierError> {
    info!("starting courier serve");
    let app = App::build(&config)?;
    let cancel = shutdown::install_signal_handler();

    let gateway = if config.gateway.enabled {
        let state = GatewayState::new(
            app.pool.clone(),
            config.sender.network_suffix.clone(),
            config.gateway.bearer_token.clone(),
        );
        let gateway_config = config.gateway.clone();
        let gateway_cancel = cancel.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = courier_gateway::serve(&gateway_config, state, gateway_cancel.clone()).await {
                error!(error = %e, "gateway stopped with an error");
                gateway_cancel.cancel();
            }
        }))
    } else {
        info!("gateway disabled");
        None
    };

    let scheduler = Scheduler::new(
        app.engine.clone(),
        Duration::from_secs(config.engine.tick_interval_secs),
    )
    .spawn(cancel.clone());

    if let Err(e) = scheduler.await {
        error!(error = %e, "scheduler task panicked");
    }
    if let Some(gateway) = gateway
        && let Err(e) = gateway.await
    {
        error!(error = %e, "gateway task panicked");
    }

    app.shutdown().await;
    info!("courier stopped");
    Ok(())
}
