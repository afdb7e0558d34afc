// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status write-back to the directory.
//!
//! An unwritten `Sent` means a duplicate message on the next run, so writes
//! are retried before they are given up on, and every final failure is
//! logged at error level with the row and the status that was lost.

use std::sync::Arc;
use std::time::Duration;

use courier_core::{CampaignStatus, ContactStatus, CourierError, DirectoryAdapter, RowId};
use tracing::{error, warn};

/// Writes campaign and contact statuses through the directory, with retries.
#[derive(Clone)]
pub struct StatusWriter {
    directory: Arc<dyn DirectoryAdapter>,
    retries: u32,
    backoff: Duration,
}

impl StatusWriter {
    /// `retries` extra attempts, waiting `backoff * attempt` before each.
    pub fn new(directory: Arc<dyn DirectoryAdapter>, retries: u32, backoff: Duration) -> Self {
        Self {
            directory,
            retries,
            backoff,
        }
    }

    /// Move campaign `row` from `from` to `status`.
    ///
    /// Transitions the campaign state machine does not allow are refused
    /// without touching the directory.
    pub async fn write_campaign(
        &self,
        row: RowId,
        from: CampaignStatus,
        status: CampaignStatus,
    ) -> Result<(), CourierError> {
        if !from.can_transition_to(status) {
            error!(campaign = %row, from = %from, status = %status, "refusing illegal campaign transition");
            return Err(CourierError::Internal(format!(
                "illegal campaign transition {from} -> {status} for row {row}"
            )));
        }

        let mut attempt = 0;
        loop {
            match self.directory.update_campaign_status(row, status).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(campaign = %row, status = %status, attempt, error = %e, "campaign status write failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => {
                    error!(campaign = %row, status = %status, error = %e, "DirectoryWriteFailure: campaign status not persisted");
                    return Err(e);
                }
            }
        }
    }

    pub async fn write_contact(
        &self,
        row: RowId,
        status: ContactStatus,
    ) -> Result<(), CourierError> {
        let mut attempt = 0;
        loop {
            match self.directory.update_contact_status(row, status).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(contact = %row, status = %status, attempt, error = %e, "contact status write failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => {
                    error!(contact = %row, status = %status, error = %e, "DirectoryWriteFailure: contact status not persisted");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use courier_core::{AdapterType, Campaign, Contact, HealthStatus, PluginAdapter};
    use tracing_test::traced_test;

    use super::*;

    /// Fails the first `failures` writes, then succeeds.
    struct FlakyDirectory {
        failures: AtomicU32,
        calls: AtomicU32,
    }

    impl FlakyDirectory {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
            })
        }

        fn write(&self, row: RowId) -> Result<(), CourierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(CourierError::directory_write(row, "quota exceeded"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PluginAdapter for FlakyDirectory {
        fn name(&self) -> &str {
            "flaky"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Directory
        }
        async fn health_check(&self) -> Result<HealthStatus, CourierError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), CourierError> {
            Ok(())
        }
    }

    #[async_trait]
    impl DirectoryAdapter for FlakyDirectory {
        async fn list_campaigns(&self) -> Result<Vec<Campaign>, CourierError> {
            Ok(Vec::new())
        }
        async fn list_contacts(&self) -> Result<Vec<Contact>, CourierError> {
            Ok(Vec::new())
        }
        async fn update_campaign_status(
            &self,
            id: RowId,
            _status: CampaignStatus,
        ) -> Result<(), CourierError> {
            self.write(id)
        }
        async fn update_contact_status(
            &self,
            id: RowId,
            _status: ContactStatus,
        ) -> Result<(), CourierError> {
            self.write(id)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        let dir = FlakyDirectory::new(2);
        let writer = StatusWriter::new(dir.clone(), 3, Duration::from_millis(100));

        writer
            .write_contact(RowId(5), ContactStatus::Sent)
            .await
            .unwrap();
        assert_eq!(dir.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn exhausted_retries_surface_the_error() {
        let dir = FlakyDirectory::new(10);
        let writer = StatusWriter::new(dir.clone(), 2, Duration::from_millis(100));

        let err = writer
            .write_campaign(RowId(3), CampaignStatus::InProgress, CampaignStatus::Finished)
            .await
            .unwrap_err();
        assert!(matches!(err, CourierError::DirectoryWrite { row: RowId(3), .. }));
        assert_eq!(dir.calls.load(Ordering::SeqCst), 3);
        assert!(logs_contain("DirectoryWriteFailure"));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_one_attempt() {
        let dir = FlakyDirectory::new(1);
        let writer = StatusWriter::new(dir.clone(), 0, Duration::from_millis(100));

        assert!(writer.write_contact(RowId(2), ContactStatus::Error).await.is_err());
        assert_eq!(dir.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn illegal_campaign_transitions_never_reach_the_directory() {
        let dir = FlakyDirectory::new(0);
        let writer = StatusWriter::new(dir.clone(), 3, Duration::from_millis(100));

        for (from, to) in [
            (CampaignStatus::Finished, CampaignStatus::InProgress),
            (CampaignStatus::Error, CampaignStatus::Pending),
            (CampaignStatus::Pending, CampaignStatus::Finished),
            (CampaignStatus::InProgress, CampaignStatus::InProgress),
        ] {
            let err = writer.write_campaign(RowId(4), from, to).await.unwrap_err();
            assert!(matches!(err, CourierError::Internal(_)), "{from} -> {to}");
        }
        assert_eq!(dir.calls.load(Ordering::SeqCst), 0);
        assert!(logs_contain("refusing illegal campaign transition"));

        writer
            .write_campaign(RowId(4), CampaignStatus::Pending, CampaignStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(dir.calls.load(Ordering::SeqCst), 1);
    }
}
