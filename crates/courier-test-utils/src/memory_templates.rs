// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory template store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use courier_core::{
    AdapterType, CourierError, HealthStatus, PluginAdapter, Template, TemplateStore,
};

#[derive(Default)]
struct State {
    templates: HashMap<String, Template>,
    fail: bool,
    loads: usize,
}

/// Template store backed by a map, with injectable load failures.
#[derive(Clone, Default)]
pub struct MemoryTemplates {
    state: Arc<Mutex<State>>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: &str, body: &str) {
        self.state.lock().await.templates.insert(
            id.to_string(),
            Template {
                id: id.to_string(),
                name: id.to_string(),
                body: body.to_string(),
            },
        );
    }

    pub async fn fail_loads(&self, fail: bool) {
        self.state.lock().await.fail = fail;
    }

    /// Number of `load_templates` calls served.
    pub async fn loads(&self) -> usize {
        self.state.lock().await.loads
    }
}

#[async_trait]
impl PluginAdapter for MemoryTemplates {
    fn name(&self) -> &str {
        "mock-templates"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Templates
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplates {
    async fn load_templates(&self) -> Result<HashMap<String, Template>, CourierError> {
        let mut state = self.state.lock().await;
        state.loads += 1;
        if state.fail {
            return Err(CourierError::TemplateStore {
                message: "injected load failure".into(),
                source: None,
            });
        }
        Ok(state.templates.clone())
    }
}
