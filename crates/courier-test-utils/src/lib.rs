// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Courier integration tests.
//!
//! Provides mock adapters and a test harness for fast, deterministic tests
//! without a spreadsheet or a messaging bridge.
//!
//! # Components
//!
//! - [`MockTransport`] - Scripted transport that captures sent messages
//! - [`MemoryDirectory`] - Directory rows in memory with injectable failures
//! - [`MemoryTemplates`] - Template map with injectable failures
//! - [`TestHarness`] - Engine, pool, and mocks wired together

pub mod fixtures;
pub mod harness;
pub mod memory_directory;
pub mod memory_templates;
pub mod mock_transport;

pub use harness::TestHarness;
pub use memory_directory::{MemoryDirectory, StatusWrite};
pub use memory_templates::MemoryTemplates;
pub use mock_transport::{MockTransport, OpenBehavior, SentMessage};
