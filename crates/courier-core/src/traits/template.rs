// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template store trait.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::CourierError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Template;

/// Static mapping from template id to message template.
///
/// Callers reload once per run, so implementations should read their backing
/// source on every call rather than caching it for the process lifetime.
#[async_trait]
pub trait TemplateStore: PluginAdapter {
    async fn load_templates(&self) -> Result<HashMap<String, Template>, CourierError>;
}
