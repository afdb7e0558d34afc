// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators of the engine.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod directory;
pub mod template;
pub mod transport;

pub use adapter::PluginAdapter;
pub use directory::DirectoryAdapter;
pub use template::TemplateStore;
pub use transport::TransportAdapter;
