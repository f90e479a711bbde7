//! Lock-free counters for the synchronization engine.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Engine-wide counters, updated on the hot path without locks.
#[derive(Debug, Default)]
pub struct SyncMetrics {
    /// Messages handed to a device worker
    pub dispatched: AtomicU64,
    /// Messages dropped because the device is unknown in its tenant
    pub dropped_unknown_device: AtomicU64,
    /// Messages dropped because no registered suffix matched
    pub dropped_unmatched: AtomicU64,
    /// Messages dropped because the address or payload failed to parse
    pub dropped_malformed: AtomicU64,
    /// Confirmations rejected (unknown record, foreign tenant, illegal state)
    pub confirms_rejected: AtomicU64,
    /// Resync pushes performed on online transitions
    pub resync_pushes: AtomicU64,
}

impl SyncMetrics {
    #[inline]
    pub fn incr_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn incr_dropped_unknown_device(&self) {
        self.dropped_unknown_device.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn incr_dropped_unmatched(&self) {
        self.dropped_unmatched.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn incr_dropped_malformed(&self) {
        self.dropped_malformed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn incr_confirms_rejected(&self) {
        self.confirms_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn incr_resync_pushes(&self) {
        self.resync_pushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        SyncMetricsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            dropped_unknown_device: self.dropped_unknown_device.load(Ordering::Relaxed),
            dropped_unmatched: self.dropped_unmatched.load(Ordering::Relaxed),
            dropped_malformed: self.dropped_malformed.load(Ordering::Relaxed),
            confirms_rejected: self.confirms_rejected.load(Ordering::Relaxed),
            resync_pushes: self.resync_pushes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters, safe to serialize and ship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncMetricsSnapshot {
    pub dispatched: u64,
    pub dropped_unknown_device: u64,
    pub dropped_unmatched: u64,
    pub dropped_malformed: u64,
    pub confirms_rejected: u64,
    pub resync_pushes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_increments() {
        let metrics = SyncMetrics::default();
        metrics.incr_dispatched();
        metrics.incr_dispatched();
        metrics.incr_confirms_rejected();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.dispatched, 2);
        assert_eq!(snapshot.confirms_rejected, 1);
        assert_eq!(snapshot.dropped_unmatched, 0);
    }
}
