// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic tick loop driving [`CampaignEngine::run_tick`].

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::engine::CampaignEngine;

type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Runs a tick every `interval` until cancelled.
///
/// Ticks never overlap: a tick that runs longer than the interval delays the
/// next one, and missed ticks are skipped rather than replayed.
pub struct Scheduler {
    engine: Arc<CampaignEngine>,
    interval: Duration,
    clock: Clock,
}

impl Scheduler {
    pub fn new(engine: Arc<CampaignEngine>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            clock: Arc::new(|| chrono::Local::now().naive_local()),
        }
    }

    /// Replace the wall clock used to decide which campaigns are due.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Spawn the loop onto the current runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Run the loop on the current task.
    ///
    /// Cancellation is observed between ticks; a tick in progress always
    /// completes so no campaign is left half-recorded.
    pub async fn run(self, cancel: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "scheduler started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let now = (self.clock)();
            match self.engine.run_tick(now).await {
                Ok(report) if report.due == 0 => {}
                Ok(report) => info!(
                    due = report.due,
                    sent = report.sent(),
                    errored = report.errored(),
                    "scheduled tick finished"
                ),
                Err(e) => error!(error = %e, "tick failed, will retry on next tick"),
            }
        }
        info!("scheduler stopped");
    }
}
