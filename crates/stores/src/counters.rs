use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Per-store message counters. All counters are monotonically non-decreasing
/// for the lifetime of the process; they are updated outside the record lock
/// and read with acquire ordering by the measurement task and the API.
#[derive(Debug, Default)]
pub struct Counters {
    received: AtomicU64,
    processed: AtomicU64,
    error: AtomicU64,
    duplicate: AtomicU64,
    outdated: AtomicU64,
    too_late: AtomicU64,
}

/// A consistent point-in-time copy of the counters, as exposed on the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountersSnapshot {
    pub received: u64,
    pub processed: u64,
    pub error: u64,
    pub duplicate: u64,
    pub outdated: u64,
    pub too_late: u64,
}

impl Counters {
    pub fn increment_received(&self) {
        self.received.fetch_add(1, Ordering::AcqRel);
    }

    pub fn increment_processed(&self) {
        self.processed.fetch_add(1, Ordering::AcqRel);
    }

    pub fn increment_error(&self) {
        self.error.fetch_add(1, Ordering::AcqRel);
    }

    pub fn increment_duplicate(&self) {
        self.duplicate.fetch_add(1, Ordering::AcqRel);
    }

    pub fn increment_outdated(&self) {
        self.outdated.fetch_add(1, Ordering::AcqRel);
    }

    pub fn increment_too_late(&self) {
        self.too_late.fetch_add(1, Ordering::AcqRel);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            received: self.received.load(Ordering::Acquire),
            processed: self.processed.load(Ordering::Acquire),
            error: self.error.load(Ordering::Acquire),
            duplicate: self.duplicate.load(Ordering::Acquire),
            outdated: self.outdated.load(Ordering::Acquire),
            too_late: self.too_late.load(Ordering::Acquire),
        }
    }

    /// Resets all counters to zero. Only used when (re)initializing a store.
    pub fn reset(&self) {
        self.received.store(0, Ordering::Release);
        self.processed.store(0, Ordering::Release);
        self.error.store(0, Ordering::Release);
        self.duplicate.store(0, Ordering::Release);
        self.outdated.store(0, Ordering::Release);
        self.too_late.store(0, Ordering::Release);
    }
}
