// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks run after deserialization.
//!
//! All failures are collected; validation does not stop at the first one.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{CourierConfig, DirectoryBackend};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
pub fn validate_config(config: &CourierConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let engine = &config.engine;
    if engine.tick_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "engine.tick_interval_secs must be at least 1",
        ));
    }
    if engine.send_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "engine.send_timeout_secs must be at least 1",
        ));
    }
    if !LOG_LEVELS.contains(&engine.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "engine.log_level `{}` is not one of {}",
            engine.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let directory = &config.directory;
    let mut seen = HashSet::new();
    for field in &directory.contact_fields {
        if field.trim().is_empty() {
            errors.push(ConfigError::validation(
                "directory.contact_fields must not contain empty names",
            ));
        } else if !field.chars().all(|c| c.is_alphanumeric() || c == '_') {
            errors.push(ConfigError::validation(format!(
                "directory.contact_fields entry `{field}` must be a word (letters, digits, `_`) to be usable as a placeholder"
            )));
        } else if !seen.insert(field.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate contact field `{field}` in directory.contact_fields"
            )));
        }
    }

    match directory.backend {
        DirectoryBackend::Csv => {
            if directory.csv.contacts_path.trim().is_empty()
                || directory.csv.campaigns_path.trim().is_empty()
            {
                errors.push(ConfigError::validation(
                    "directory.csv.contacts_path and directory.csv.campaigns_path must not be empty",
                ));
            }
        }
        DirectoryBackend::Sheets => {
            if is_blank(&directory.sheets.spreadsheet_id) {
                errors.push(ConfigError::validation(
                    "directory.sheets.spreadsheet_id is required when directory.backend = \"sheets\"",
                ));
            }
            if is_blank(&directory.sheets.access_token)
                && directory.sheets.credentials_path.trim().is_empty()
            {
                errors.push(ConfigError::validation(
                    "directory.sheets.credentials_path (or access_token) is required when directory.backend = \"sheets\"",
                ));
            }
        }
    }

    let labels = &directory.labels;
    let campaign_labels = [
        &labels.pending,
        &labels.in_progress,
        &labels.finished,
        &labels.error,
    ];
    if campaign_labels.iter().any(|l| l.trim().is_empty()) || labels.sent.trim().is_empty() {
        errors.push(ConfigError::validation("directory.labels entries must not be empty"));
    }
    let distinct: HashSet<String> = campaign_labels
        .iter()
        .map(|l| l.trim().to_lowercase())
        .collect();
    if distinct.len() != campaign_labels.len() {
        errors.push(ConfigError::validation(
            "directory.labels campaign states must have distinct labels",
        ));
    }

    if config.templates.path.trim().is_empty() {
        errors.push(ConfigError::validation("templates.path must not be empty"));
    }

    let sender = &config.sender;
    if sender.network_suffix.trim().is_empty() || sender.network_suffix.contains('@') {
        errors.push(ConfigError::validation(format!(
            "sender.network_suffix `{}` must be a bare domain without `@`",
            sender.network_suffix
        )));
    }
    if sender.reconnect_base_ms == 0 || sender.reconnect_cap_ms < sender.reconnect_base_ms {
        errors.push(ConfigError::validation(format!(
            "sender.reconnect_base_ms ({}) must be positive and not exceed sender.reconnect_cap_ms ({})",
            sender.reconnect_base_ms, sender.reconnect_cap_ms
        )));
    }
    if sender.acquire_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "sender.acquire_timeout_secs must be at least 1",
        ));
    }
    if sender.status_poll_secs == 0 {
        errors.push(ConfigError::validation(
            "sender.status_poll_secs must be at least 1",
        ));
    }

    let gateway = &config.gateway;
    if gateway.enabled {
        if is_blank(&gateway.bearer_token) {
            errors.push(ConfigError::validation(
                "gateway.bearer_token is required when gateway.enabled = true",
            ));
        }
        if gateway.host.trim().parse::<std::net::IpAddr>().is_err() {
            errors.push(ConfigError::validation(format!(
                "gateway.host `{}` is not a valid IP address",
                gateway.host
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &CourierConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&CourierConfig::default()).is_ok());
    }

    #[test]
    fn gateway_requires_token_when_enabled() {
        let mut config = CourierConfig::default();
        config.gateway.enabled = true;
        let errors = messages(&config);
        assert!(errors.iter().any(|m| m.contains("bearer_token")));

        config.gateway.bearer_token = Some("secret".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn sheets_backend_requires_credentials() {
        let mut config = CourierConfig::default();
        config.directory.backend = DirectoryBackend::Sheets;
        let errors = messages(&config);
        assert!(errors.iter().any(|m| m.contains("spreadsheet_id")));
        assert!(!errors.iter().any(|m| m.contains("credentials_path")));

        config.directory.sheets.credentials_path = "  ".into();
        let errors = messages(&config);
        assert!(errors.iter().any(|m| m.contains("credentials_path")));

        config.directory.sheets.access_token = Some("ya29.token".into());
        config.directory.sheets.spreadsheet_id = Some("abc123".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_every_failure() {
        let mut config = CourierConfig::default();
        config.engine.tick_interval_secs = 0;
        config.engine.log_level = "loud".into();
        config.templates.path = " ".into();
        assert_eq!(messages(&config).len(), 3);
    }

    #[test]
    fn duplicate_contact_fields_rejected() {
        let mut config = CourierConfig::default();
        config.directory.contact_fields = vec!["name".into(), "name".into()];
        assert!(messages(&config).iter().any(|m| m.contains("duplicate")));
    }

    #[test]
    fn colliding_campaign_labels_rejected() {
        let mut config = CourierConfig::default();
        config.directory.labels.finished = "error".into();
        assert!(messages(&config).iter().any(|m| m.contains("distinct")));
    }

    #[test]
    fn reconnect_cap_below_base_rejected() {
        let mut config = CourierConfig::default();
        config.sender.reconnect_cap_ms = 100;
        assert!(messages(&config).iter().any(|m| m.contains("reconnect")));
    }
}
