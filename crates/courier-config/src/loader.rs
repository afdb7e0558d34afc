// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order, later wins: compiled defaults, `/etc/courier/courier.toml`,
//! `~/.config/courier/courier.toml`, `./courier.toml`, then `COURIER_*`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CourierConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/courier/courier.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "courier.toml";

/// Table prefixes recognized in environment variable names, most specific first.
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("directory_labels_", "directory.labels."),
    ("directory_sheets_", "directory.sheets."),
    ("directory_csv_", "directory.csv."),
    ("directory_", "directory."),
    ("engine_", "engine."),
    ("templates_", "templates."),
    ("sender_", "sender."),
    ("gateway_", "gateway."),
];

/// User config path under the XDG config directory, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("courier").join(LOCAL_CONFIG_FILE))
}

/// The full hierarchy before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment.merge(Toml::file(LOCAL_CONFIG_FILE)).merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<CourierConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from one explicit file, with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CourierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<CourierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// `COURIER_*` provider.
///
/// Keys are mapped with an explicit table list rather than `Env::split("_")`
/// because field names contain underscores: `COURIER_SENDER_AUTH_DIR` must
/// become `sender.auth_dir`, not `sender.auth.dir`.
fn env_provider() -> Env {
    Env::prefixed("COURIER_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
pub fn map_env_key(key: &str) -> String {
    ENV_SECTIONS
        .iter()
        .find_map(|(prefix, table)| {
            key.strip_prefix(prefix)
                .filter(|rest| !rest.is_empty())
                .map(|rest| format!("{table}{rest}"))
        })
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_nested_tables() {
        assert_eq!(map_env_key("sender_auth_dir"), "sender.auth_dir");
        assert_eq!(
            map_env_key("directory_sheets_access_token"),
            "directory.sheets.access_token"
        );
        assert_eq!(map_env_key("directory_labels_sent"), "directory.labels.sent");
        assert_eq!(map_env_key("directory_backend"), "directory.backend");
        assert_eq!(map_env_key("gateway_bearer_token"), "gateway.bearer_token");
    }

    #[test]
    fn unknown_section_passes_through() {
        assert_eq!(map_env_key("verbose"), "verbose");
    }
}
