//! Relay counters for observability

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters of one relay
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Messages written and flushed
    sent_count: AtomicU64,
    /// Messages skipped because no sink was connected
    skipped_count: AtomicU64,
    /// Write/flush failures (each one drops the sink)
    failure_count: AtomicU64,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_sent(&self) {
        self.sent_count.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("telemetry_messages_total", "status" => "sent").increment(1);
    }

    pub fn inc_skipped(&self) {
        self.skipped_count.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("telemetry_messages_total", "status" => "skipped").increment(1);
    }

    pub fn inc_failed(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("telemetry_messages_total", "status" => "failed").increment(1);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> RelayMetricsSnapshot {
        RelayMetricsSnapshot {
            sent: self.sent_count.load(Ordering::Relaxed),
            skipped: self.skipped_count.load(Ordering::Relaxed),
            failed: self.failure_count.load(Ordering::Relaxed),
        }
    }
}

/// Serializable counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayMetricsSnapshot {
    pub sent: u64,
    pub skipped: u64,
    pub failed: u64,
}
