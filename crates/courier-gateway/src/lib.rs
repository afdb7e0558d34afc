// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for ad-hoc sends.
//!
//! Exposes the sender pool over a small REST API so single messages can be
//! delivered outside any campaign. Sends here are not recorded in the
//! directory.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{GatewayState, build_router, serve};
