// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template store backed by a JSON file.
//!
//! The file holds an array of objects:
//!
//! ```json
//! [{ "id": "welcome", "name": "Welcome", "body": "Hi {{ name }}" }]
//! ```
//!
//! `nome` and `mensagem` are accepted as aliases of `name` and `body`, and
//! numeric ids are read as their decimal string.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use courier_core::{
    AdapterType, CourierError, HealthStatus, PluginAdapter, Template, TemplateStore,
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s.trim().to_string(),
            RawId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTemplate {
    id: RawId,
    #[serde(default, alias = "nome")]
    name: String,
    #[serde(alias = "mensagem", alias = "message")]
    body: String,
}

/// Reads templates from a JSON file on every [`load_templates`](TemplateStore::load_templates) call.
#[derive(Debug, Clone)]
pub struct JsonTemplateStore {
    path: PathBuf,
}

impl JsonTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse template JSON. Later entries with a duplicate id replace earlier ones.
    pub fn parse(content: &str) -> Result<HashMap<String, Template>, CourierError> {
        let raw: Vec<RawTemplate> =
            serde_json::from_str(content).map_err(|e| CourierError::TemplateStore {
                message: format!("invalid template JSON: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut templates = HashMap::with_capacity(raw.len());
        for entry in raw {
            let id = entry.id.into_string();
            if id.is_empty() {
                warn!("skipping template with empty id");
                continue;
            }
            let template = Template {
                id: id.clone(),
                name: entry.name,
                body: entry.body,
            };
            if templates.insert(id.clone(), template).is_some() {
                warn!(template = %id, "duplicate template id, keeping the last definition");
            }
        }
        Ok(templates)
    }
}

#[async_trait]
impl PluginAdapter for JsonTemplateStore {
    fn name(&self) -> &str {
        "json-templates"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Templates
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a file",
                self.path.display()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for JsonTemplateStore {
    async fn load_templates(&self) -> Result<HashMap<String, Template>, CourierError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CourierError::TemplateStore {
                message: format!("cannot read {}: {e}", self.path.display()),
                source: Some(Box::new(e)),
            }
        })?;
        let templates = Self::parse(&content)?;
        debug!(
            path = %self.path.display(),
            count = templates.len(),
            "templates loaded"
        );
        Ok(templates)
    }
}
