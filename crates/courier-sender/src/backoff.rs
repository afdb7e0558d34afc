// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconnect delay schedule.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff: `min(cap, base * 2^attempt)` plus up to
/// `jitter_ratio` of that value at random.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub base: Duration,
    pub cap: Duration,
    pub jitter_ratio: f64,
    /// Reconnect attempts allowed before giving up.
    pub max_attempts: u32,
}

impl Backoff {
    pub fn new(base: Duration, cap: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            cap,
            jitter_ratio: 0.2,
            max_attempts,
        }
    }

    pub fn with_jitter(mut self, ratio: f64) -> Self {
        self.jitter_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Delay before reconnect attempt `attempt` (zero-based), without jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.min(31));
        self.base.saturating_mul(factor).min(self.cap)
    }

    /// Delay before reconnect attempt `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        if self.jitter_ratio <= 0.0 {
            return base;
        }
        let jitter = rand::thread_rng().gen_range(0.0..=self.jitter_ratio);
        base + base.mul_f64(jitter)
    }

    /// Whether attempt number `attempt` (one-based) is still allowed.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(3), Duration::from_secs(60), 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_until_cap() {
        let b = Backoff::new(Duration::from_millis(100), Duration::from_millis(1000), 5);
        assert_eq!(b.base_delay(0), Duration::from_millis(100));
        assert_eq!(b.base_delay(1), Duration::from_millis(200));
        assert_eq!(b.base_delay(3), Duration::from_millis(800));
        assert_eq!(b.base_delay(4), Duration::from_millis(1000));
        assert_eq!(b.base_delay(200), Duration::from_millis(1000));
    }

    #[test]
    fn jitter_stays_within_ratio() {
        let b = Backoff::new(Duration::from_millis(1000), Duration::from_secs(60), 5).with_jitter(0.5);
        for attempt in 0..4 {
            let base = b.base_delay(attempt);
            for _ in 0..20 {
                let d = b.delay(attempt);
                assert!(d >= base && d <= base + base / 2, "{d:?} outside jitter for {base:?}");
            }
        }
    }

    #[test]
    fn zero_jitter_is_exact() {
        let b = Backoff::default().with_jitter(0.0);
        assert_eq!(b.delay(0), Duration::from_secs(3));
        assert_eq!(b.delay(1), Duration::from_secs(6));
    }

    #[test]
    fn attempt_budget() {
        let b = Backoff::new(Duration::from_secs(1), Duration::from_secs(2), 3);
        assert!(b.allows(1) && b.allows(3));
        assert!(!b.allows(4));
    }
}
