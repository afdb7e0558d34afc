// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Courier campaign dispatcher.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Courier configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CourierConfig {
    /// Tick cadence, pacing, and status write behavior.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Source of record for contacts and campaigns.
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Template file location.
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Sender pool and transport bridge settings.
    #[serde(default)]
    pub sender: SenderConfig,

    /// Ad-hoc HTTP send API.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Dispatch engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Seconds between scheduler ticks.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Minimum delay between two consecutive messages, in milliseconds.
    #[serde(default = "default_pacing_interval_ms")]
    pub pacing_interval_ms: u64,

    /// Upper bound for a single send before it counts as failed.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    /// Extra attempts for a failed status write before giving up.
    #[serde(default = "default_write_retries")]
    pub write_retries: u32,

    /// Delay between status write attempts, multiplied by the attempt number.
    #[serde(default = "default_write_retry_backoff_ms")]
    pub write_retry_backoff_ms: u64,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            pacing_interval_ms: default_pacing_interval_ms(),
            send_timeout_secs: default_send_timeout_secs(),
            write_retries: default_write_retries(),
            write_retry_backoff_ms: default_write_retry_backoff_ms(),
            log_level: default_log_level(),
        }
    }
}

fn default_tick_interval_secs() -> u64 {
    60
}

fn default_pacing_interval_ms() -> u64 {
    2000
}

fn default_send_timeout_secs() -> u64 {
    30
}

fn default_write_retries() -> u32 {
    3
}

fn default_write_retry_backoff_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which directory adapter to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryBackend {
    /// Two local CSV files (contacts and campaigns).
    #[default]
    Csv,
    /// A Google Sheets spreadsheet with one tab per table.
    Sheets,
}

/// Directory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: DirectoryBackend,

    /// Names of the profile columns that precede the destination column in
    /// the contacts table, in column order. These are the placeholders
    /// templates can use.
    #[serde(default = "default_contact_fields")]
    pub contact_fields: Vec<String>,

    /// CSV backend settings.
    #[serde(default)]
    pub csv: CsvDirectoryConfig,

    /// Google Sheets backend settings.
    #[serde(default)]
    pub sheets: SheetsDirectoryConfig,

    /// Status labels written into the status columns.
    #[serde(default)]
    pub labels: StatusLabels,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            backend: DirectoryBackend::default(),
            contact_fields: default_contact_fields(),
            csv: CsvDirectoryConfig::default(),
            sheets: SheetsDirectoryConfig::default(),
            labels: StatusLabels::default(),
        }
    }
}

fn default_contact_fields() -> Vec<String> {
    vec![
        "name".to_string(),
        "company".to_string(),
        "tax_id".to_string(),
    ]
}

/// CSV directory backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CsvDirectoryConfig {
    /// Path to the contacts CSV (first line is a header).
    #[serde(default = "default_contacts_path")]
    pub contacts_path: String,

    /// Path to the campaigns CSV (first line is a header).
    #[serde(default = "default_campaigns_path")]
    pub campaigns_path: String,
}

impl Default for CsvDirectoryConfig {
    fn default() -> Self {
        Self {
            contacts_path: default_contacts_path(),
            campaigns_path: default_campaigns_path(),
        }
    }
}

fn default_contacts_path() -> String {
    "contacts.csv".to_string()
}

fn default_campaigns_path() -> String {
    "campaigns.csv".to_string()
}

/// Google Sheets directory backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SheetsDirectoryConfig {
    /// Spreadsheet id (the id only, not the full URL).
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// Google service-account key file (JSON) used to obtain access tokens.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,

    /// Fixed OAuth bearer token with the spreadsheets scope. When set, it is
    /// used instead of the service-account key.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Sheets API base URL.
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,

    /// Tab name of the contacts table.
    #[serde(default = "default_contacts_sheet")]
    pub contacts_sheet: String,

    /// Tab name of the campaigns table.
    #[serde(default = "default_campaigns_sheet")]
    pub campaigns_sheet: String,
}

impl Default for SheetsDirectoryConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            credentials_path: default_credentials_path(),
            access_token: None,
            base_url: default_sheets_base_url(),
            contacts_sheet: default_contacts_sheet(),
            campaigns_sheet: default_campaigns_sheet(),
        }
    }
}

fn default_credentials_path() -> String {
    "credentials.json".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_contacts_sheet() -> String {
    "Contacts".to_string()
}

fn default_campaigns_sheet() -> String {
    "Campaigns".to_string()
}

/// Text written into status cells for each state.
///
/// Parsing accepts either the configured label or the canonical English
/// state name, case-insensitively.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StatusLabels {
    #[serde(default = "default_label_pending")]
    pub pending: String,
    #[serde(default = "default_label_in_progress")]
    pub in_progress: String,
    #[serde(default = "default_label_finished")]
    pub finished: String,
    #[serde(default = "default_label_error")]
    pub error: String,
    #[serde(default = "default_label_sent")]
    pub sent: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            pending: default_label_pending(),
            in_progress: default_label_in_progress(),
            finished: default_label_finished(),
            error: default_label_error(),
            sent: default_label_sent(),
        }
    }
}

fn default_label_pending() -> String {
    "Pending".to_string()
}

fn default_label_in_progress() -> String {
    "In progress".to_string()
}

fn default_label_finished() -> String {
    "Finished".to_string()
}

fn default_label_error() -> String {
    "Error".to_string()
}

fn default_label_sent() -> String {
    "Sent".to_string()
}

/// Template store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Path to the JSON template file.
    #[serde(default = "default_templates_path")]
    pub path: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            path: default_templates_path(),
        }
    }
}

fn default_templates_path() -> String {
    "templates.json".to_string()
}

/// Sender pool and transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SenderConfig {
    /// Base URL of the messaging bridge that holds network sessions.
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,

    /// Directory holding one credential namespace per sender identity.
    #[serde(default = "default_auth_dir")]
    pub auth_dir: String,

    /// Suffix appended to normalized destinations (`<digits>@<suffix>`).
    #[serde(default = "default_network_suffix")]
    pub network_suffix: String,

    /// Maximum time `acquire` waits for a session to become ready.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// First reconnect delay after an unexpected drop.
    #[serde(default = "default_reconnect_base_ms")]
    pub reconnect_base_ms: u64,

    /// Upper bound on the reconnect delay.
    #[serde(default = "default_reconnect_cap_ms")]
    pub reconnect_cap_ms: u64,

    /// Reconnect attempts before a session is marked failed.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// How often the bridge transport polls session status.
    #[serde(default = "default_status_poll_secs")]
    pub status_poll_secs: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            bridge_url: default_bridge_url(),
            auth_dir: default_auth_dir(),
            network_suffix: default_network_suffix(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            reconnect_base_ms: default_reconnect_base_ms(),
            reconnect_cap_ms: default_reconnect_cap_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            status_poll_secs: default_status_poll_secs(),
        }
    }
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:8085".to_string()
}

fn default_auth_dir() -> String {
    "auth".to_string()
}

fn default_network_suffix() -> String {
    "s.whatsapp.net".to_string()
}

fn default_acquire_timeout_secs() -> u64 {
    120
}

fn default_reconnect_base_ms() -> u64 {
    3000
}

fn default_reconnect_cap_ms() -> u64 {
    60_000
}

fn default_max_reconnect_attempts() -> u32 {
    10
}

fn default_status_poll_secs() -> u64 {
    5
}

/// HTTP gateway configuration for ad-hoc sends.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Enable the gateway server.
    #[serde(default)]
    pub enabled: bool,

    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token required on authenticated routes.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}
