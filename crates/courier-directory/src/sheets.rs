// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory backed by a Google Sheets spreadsheet (Sheets API v4).
//!
//! Reads use `values.get` on `<Tab>!A2:<last column>`; status writes use
//! `values.update` on a single cell with `valueInputOption=RAW`.
//! Requests carry a bearer token from [`SheetsAuth`].

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use courier_config::model::SheetsDirectoryConfig;
use courier_core::{
    AdapterType, Campaign, CampaignStatus, Contact, ContactStatus, CourierError,
    DirectoryAdapter, HealthStatus, PluginAdapter, RowId,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::google_auth::{ServiceAccountAuth, SheetsAuth};
use crate::layout::{
    CAMPAIGN_COLUMNS, CAMPAIGN_STATUS_COLUMN, FIRST_DATA_ROW, RowLayout, column_letter,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: [[&'a str; 1]; 1],
}

/// Google Sheets directory.
#[derive(Debug, Clone)]
pub struct SheetsDirectory {
    client: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    auth: SheetsAuth,
    contacts_sheet: String,
    campaigns_sheet: String,
    layout: RowLayout,
}

impl SheetsDirectory {
    /// Build from config. A configured `access_token` is used as is;
    /// otherwise the service-account key at `credentials_path` is loaded.
    pub fn from_config(
        config: &SheetsDirectoryConfig,
        layout: RowLayout,
    ) -> Result<Self, CourierError> {
        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .ok_or_else(|| CourierError::Config("directory.sheets.spreadsheet_id is not set".into()))?;
        let auth = match config.access_token.clone() {
            Some(token) if !token.trim().is_empty() => SheetsAuth::Token(token),
            _ => {
                let account =
                    ServiceAccountAuth::from_file(Path::new(&config.credentials_path), http_client()?)?;
                info!(
                    client_email = account.client_email(),
                    "sheets directory authenticating as service account"
                );
                SheetsAuth::ServiceAccount(account)
            }
        };
        Self::new(
            &config.base_url,
            spreadsheet_id,
            auth,
            config.contacts_sheet.clone(),
            config.campaigns_sheet.clone(),
            layout,
        )
    }

    pub fn new(
        base_url: &str,
        spreadsheet_id: String,
        auth: SheetsAuth,
        contacts_sheet: String,
        campaigns_sheet: String,
        layout: RowLayout,
    ) -> Result<Self, CourierError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CourierError::Config(format!("invalid sheets base url `{base_url}`: {e}")))?;
        Ok(Self {
            client: http_client()?,
            base_url,
            spreadsheet_id,
            auth,
            contacts_sheet,
            campaigns_sheet,
            layout,
        })
    }

    fn values_url(&self, range: &str) -> Result<Url, CourierError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CourierError::Config(format!("sheets base url `{}` cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    async fn get_rows(&self, sheet: &str, columns: usize) -> Result<Vec<Vec<String>>, CourierError> {
        let range = format!(
            "{}!A{FIRST_DATA_ROW}:{}",
            quote_sheet(sheet),
            column_letter(columns - 1)
        );
        let url = self.values_url(&range)?;
        debug!(range = %range, "reading sheet range");
        let token = self.auth.bearer().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CourierError::DirectoryRead {
                message: format!("sheets request for {range} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CourierError::directory_read(format!(
                "sheets returned {status} for {range}: {body}"
            )));
        }

        let body: ValueRange = response.json().await.map_err(|e| CourierError::DirectoryRead {
            message: format!("invalid sheets response for {range}: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn put_cell(
        &self,
        sheet: &str,
        row: RowId,
        column: usize,
        value: &str,
    ) -> Result<(), CourierError> {
        let range = format!("{}!{}{row}", quote_sheet(sheet), column_letter(column));
        let mut url = self.values_url(&range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        debug!(range = %range, value, "writing sheet cell");
        let token = self.auth.bearer().await.map_err(|e| CourierError::DirectoryWrite {
            row,
            message: format!("no sheets token for {range}"),
            source: Some(Box::new(e)),
        })?;

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&ValueUpdate {
                range: &range,
                major_dimension: "ROWS",
                values: [[value]],
            })
            .send()
            .await
            .map_err(|e| CourierError::DirectoryWrite {
                row,
                message: format!("sheets update of {range} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(CourierError::directory_write(
                row,
                format!("sheets returned {status} for {range}: {body}"),
            ))
        }
    }
}

fn http_client() -> Result<reqwest::Client, CourierError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| CourierError::Internal(format!("failed to build HTTP client: {e}")))
}

/// Quote a tab name for A1 notation when it contains anything but word characters.
fn quote_sheet(name: &str) -> String {
    if name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl PluginAdapter for SheetsDirectory {
    fn name(&self) -> &str {
        "sheets-directory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Directory
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        match self.get_rows(&self.campaigns_sheet, CAMPAIGN_COLUMNS).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl DirectoryAdapter for SheetsDirectory {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, CourierError> {
        let rows = self.get_rows(&self.campaigns_sheet, CAMPAIGN_COLUMNS).await?;
        Ok(rows
            .iter()
            .enumerate()
            .filter_map(|(i, cells)| {
                self.layout
                    .parse_campaign(RowId(i as u32 + FIRST_DATA_ROW), cells)
            })
            .collect())
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, CourierError> {
        let rows = self
            .get_rows(&self.contacts_sheet, self.layout.contact_columns())
            .await?;
        Ok(rows
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                self.layout
                    .parse_contact(RowId(i as u32 + FIRST_DATA_ROW), cells)
            })
            .collect())
    }

    async fn update_campaign_status(
        &self,
        id: RowId,
        status: CampaignStatus,
    ) -> Result<(), CourierError> {
        let label = self.layout.codec().campaign_label(status);
        self.put_cell(&self.campaigns_sheet, id, CAMPAIGN_STATUS_COLUMN, label)
            .await
    }

    async fn update_contact_status(
        &self,
        id: RowId,
        status: ContactStatus,
    ) -> Result<(), CourierError> {
        let label = self.layout.codec().contact_label(status);
        self.put_cell(
            &self.contacts_sheet,
            id,
            self.layout.contact_status_column(),
            label,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_tab_names_with_spaces() {
        assert_eq!(quote_sheet("Contacts"), "Contacts");
        assert_eq!(quote_sheet("My Contacts"), "'My Contacts'");
        assert_eq!(quote_sheet("Ana's"), "'Ana''s'");
    }

    #[test]
    fn non_string_cells_become_text() {
        assert_eq!(cell_text(serde_json::json!(42)), "42");
        assert_eq!(cell_text(serde_json::json!(null)), "");
        assert_eq!(cell_text(serde_json::json!("x")), "x");
    }

    #[test]
    fn values_url_appends_segments() {
        let dir = SheetsDirectory::new(
            "http://localhost:1234/",
            "sheet-1".into(),
            SheetsAuth::Token("token".into()),
            "Contacts".into(),
            "Campaigns".into(),
            RowLayout::new(vec![], Default::default()),
        )
        .unwrap();
        let url = dir.values_url("Campaigns!A2:F").unwrap();
        assert_eq!(url.path(), "/v4/spreadsheets/sheet-1/values/Campaigns!A2:F");
    }
}
