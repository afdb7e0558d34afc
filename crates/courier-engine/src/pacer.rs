// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed pause between consecutive send attempts.

use std::time::Duration;

use tokio::time::Instant;

/// Keeps a full `interval` of idle time between the end of one attempt and
/// the start of the next.
///
/// An attempt ends once its status has been written, so time spent in the
/// transport or the directory never shortens the pause. The first attempt
/// goes out immediately, failed attempts count like successful ones, and
/// there is no trailing pause after the last attempt.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last_finished: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_finished: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until a full interval has passed since the previous attempt finished.
    pub async fn wait(&mut self) {
        if let Some(finished) = self.last_finished {
            tokio::time::sleep_until(finished + self.interval).await;
        }
    }

    /// Record that the current attempt is done; the next pause starts now.
    pub fn finish(&mut self) {
        self.last_finished = Some(Instant::now());
    }
}
