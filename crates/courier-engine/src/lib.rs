// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign dispatch engine for the Courier campaign dispatcher.
//!
//! On every tick [`CampaignEngine::run_tick`] finds pending campaigns whose
//! schedule has passed, marks them in progress, and walks their eligible
//! contacts one by one: render, send, record. Delivery is paced, failures
//! are isolated per contact, and every outcome is written back to the
//! directory.

pub mod dispatch;
pub mod engine;
pub mod guard;
pub mod pacer;
pub mod reconcile;
pub mod report;
pub mod scheduler;
pub mod selector;

pub use dispatch::{DispatchLoop, DispatchStats, SessionTable};
pub use engine::{CampaignEngine, EngineSettings};
pub use guard::{CampaignClaim, InFlight};
pub use pacer::Pacer;
pub use reconcile::StatusWriter;
pub use report::{CampaignOutcome, CampaignReport, TickReport};
pub use scheduler::Scheduler;
pub use selector::{select, select_for_campaign};
