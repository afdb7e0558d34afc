// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory adapters: the source of record for contacts and campaigns.
//!
//! Both adapters share the fixed column layout in [`layout`]:
//!
//! - contacts: profile fields (configurable), destination, sender, status
//! - campaigns: name, date `DD/MM/YYYY`, time `HH:MM`, senders, template id, status
//!
//! The first row of each table is a header, so data starts at row 2.

pub mod csv_file;
pub mod google_auth;
pub mod layout;
pub mod sheets;

use std::sync::Arc;

use courier_config::model::{DirectoryBackend, DirectoryConfig};
use courier_core::{CourierError, DirectoryAdapter};

pub use crate::csv_file::CsvDirectory;
pub use crate::google_auth::{ServiceAccountAuth, SheetsAuth};
pub use crate::layout::{RowLayout, StatusCodec};
pub use crate::sheets::SheetsDirectory;

/// Build the adapter selected by `config.backend`.
pub fn from_config(config: &DirectoryConfig) -> Result<Arc<dyn DirectoryAdapter>, CourierError> {
    let layout = RowLayout::new(
        config.contact_fields.clone(),
        StatusCodec::new(config.labels.clone()),
    );
    match config.backend {
        DirectoryBackend::Csv => Ok(Arc::new(CsvDirectory::new(
            &config.csv.contacts_path,
            &config.csv.campaigns_path,
            layout,
        ))),
        DirectoryBackend::Sheets => Ok(Arc::new(SheetsDirectory::from_config(
            &config.sheets,
            layout,
        )?)),
    }
}
