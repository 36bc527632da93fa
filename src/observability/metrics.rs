//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only when the store is opened
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of one store
///
/// All counters use Relaxed atomics; a snapshot is exact once concurrent
/// operations have returned.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    payments_created: AtomicU64,
    payments_updated: AtomicU64,
    payments_deleted: AtomicU64,
    /// get and find calls that returned
    reads: AtomicU64,
    /// Payments returned by reads
    rows_returned: AtomicU64,
    version_conflicts: AtomicU64,
    operations_aborted: AtomicU64,
    /// Every other failed operation
    operations_failed: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_created(&self) {
        self.payments_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_updated(&self) {
        self.payments_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deleted(&self) {
        self.payments_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a read returning `rows` payments
    pub fn record_read(&self, rows: u64) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.rows_returned.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn increment_version_conflicts(&self) {
        self.version_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_aborted(&self) {
        self.operations_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.operations_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current snapshot of all metrics as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            payments_created: self.payments_created.load(Ordering::Relaxed),
            payments_updated: self.payments_updated.load(Ordering::Relaxed),
            payments_deleted: self.payments_deleted.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            version_conflicts: self.version_conflicts.load(Ordering::Relaxed),
            operations_aborted: self.operations_aborted.load(Ordering::Relaxed),
            operations_failed: self.operations_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub payments_created: u64,
    pub payments_updated: u64,
    pub payments_deleted: u64,
    pub reads: u64,
    pub rows_returned: u64,
    pub version_conflicts: u64,
    pub operations_aborted: u64,
    pub operations_failed: u64,
}
