// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory backed by two local CSV files.
//!
//! Status writes rewrite the whole file through a temporary sibling and an
//! atomic rename, serialized by an adapter-wide mutex.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use courier_core::{
    AdapterType, Campaign, CampaignStatus, Contact, ContactStatus, CourierError,
    DirectoryAdapter, HealthStatus, PluginAdapter, RowId,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::layout::{CAMPAIGN_STATUS_COLUMN, FIRST_DATA_ROW, RowLayout};

/// CSV-file directory. The first line of each file is a header.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    contacts_path: PathBuf,
    campaigns_path: PathBuf,
    layout: RowLayout,
    write_lock: Arc<Mutex<()>>,
}

impl CsvDirectory {
    pub fn new(
        contacts_path: impl Into<PathBuf>,
        campaigns_path: impl Into<PathBuf>,
        layout: RowLayout,
    ) -> Self {
        Self {
            contacts_path: contacts_path.into(),
            campaigns_path: campaigns_path.into(),
            layout,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn read_rows(&self, path: &Path) -> Result<Vec<Vec<String>>, CourierError> {
        let _guard = self.write_lock.lock().await;
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || read_data_rows(&path))
            .await
            .map_err(|e| CourierError::Internal(format!("csv read task failed: {e}")))?
    }

    async fn write_status(
        &self,
        path: &Path,
        row: RowId,
        column: usize,
        label: String,
    ) -> Result<(), CourierError> {
        let _guard = self.write_lock.lock().await;
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || write_cell(&path, row, column, &label))
            .await
            .map_err(|e| CourierError::Internal(format!("csv write task failed: {e}")))?
    }
}

fn read_data_rows(path: &Path) -> Result<Vec<Vec<String>>, CourierError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| read_error(path, e))?;

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| read_error(path, e))
        })
        .collect()
}

fn write_cell(path: &Path, row: RowId, column: usize, value: &str) -> Result<(), CourierError> {
    let write_err = |message: String, e: Option<::csv::Error>| CourierError::DirectoryWrite {
        row,
        message,
        source: e.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    };

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| write_err(format!("cannot read {}: {e}", path.display()), Some(e)))?;
    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| write_err(format!("cannot read {}: {e}", path.display()), Some(e)))?;
        records.push(record.iter().map(str::to_string).collect());
    }

    // Record 0 is the header, so sheet row N lives at index N - 1.
    let index = row.0.checked_sub(1).filter(|_| row.0 >= FIRST_DATA_ROW);
    let Some(record) = index.and_then(|i| records.get_mut(i as usize)) else {
        return Err(write_err(
            format!("row does not exist in {}", path.display()),
            None,
        ));
    };
    if record.len() <= column {
        record.resize(column + 1, String::new());
    }
    record[column] = value.to_string();

    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    {
        let mut writer = ::csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&tmp)
            .map_err(|e| write_err(format!("cannot create {}: {e}", tmp.display()), Some(e)))?;
        for record in &records {
            writer
                .write_record(record)
                .map_err(|e| write_err(format!("cannot write {}: {e}", tmp.display()), Some(e)))?;
        }
        writer.flush().map_err(|e| CourierError::DirectoryWrite {
            row,
            message: format!("cannot flush {}: {e}", tmp.display()),
            source: Some(Box::new(e)),
        })?;
    }
    std::fs::rename(&tmp, path).map_err(|e| CourierError::DirectoryWrite {
        row,
        message: format!("cannot replace {}: {e}", path.display()),
        source: Some(Box::new(e)),
    })
}

fn read_error(path: &Path, e: ::csv::Error) -> CourierError {
    CourierError::DirectoryRead {
        message: format!("cannot read {}: {e}", path.display()),
        source: Some(Box::new(e)),
    }
}

fn row_id(index: usize) -> RowId {
    RowId(index as u32 + FIRST_DATA_ROW)
}

#[async_trait]
impl PluginAdapter for CsvDirectory {
    fn name(&self) -> &str {
        "csv-directory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Directory
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        for path in [&self.contacts_path, &self.campaigns_path] {
            if let Err(e) = tokio::fs::metadata(path).await {
                return Ok(HealthStatus::Unhealthy(format!("{}: {e}", path.display())));
            }
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl DirectoryAdapter for CsvDirectory {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, CourierError> {
        let rows = self.read_rows(&self.campaigns_path).await?;
        Ok(rows
            .iter()
            .enumerate()
            .filter_map(|(i, cells)| self.layout.parse_campaign(row_id(i), cells))
            .collect())
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, CourierError> {
        let rows = self.read_rows(&self.contacts_path).await?;
        Ok(rows
            .iter()
            .enumerate()
            .map(|(i, cells)| self.layout.parse_contact(row_id(i), cells))
            .collect())
    }

    async fn update_campaign_status(
        &self,
        id: RowId,
        status: CampaignStatus,
    ) -> Result<(), CourierError> {
        let label = self.layout.codec().campaign_label(status).to_string();
        debug!(row = %id, status = %label, "writing campaign status");
        self.write_status(&self.campaigns_path, id, CAMPAIGN_STATUS_COLUMN, label)
            .await
    }

    async fn update_contact_status(
        &self,
        id: RowId,
        status: ContactStatus,
    ) -> Result<(), CourierError> {
        let label = self.layout.codec().contact_label(status).to_string();
        debug!(row = %id, status = %label, "writing contact status");
        self.write_status(
            &self.contacts_path,
            id,
            self.layout.contact_status_column(),
            label,
        )
        .await
    }
}
