//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase, reset only on process start
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of the server
///
/// All counters use Relaxed atomics; exact ordering between counters is
/// not needed.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    connections_opened: AtomicU64,
    examples_accepted: AtomicU64,
    examples_rejected: AtomicU64,
    retrains: AtomicU64,
    predictions_served: AtomicU64,
    predictions_rejected: AtomicU64,
    resets: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_connections(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_examples_accepted(&self) {
        self.examples_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_examples_rejected(&self) {
        self.examples_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_retrains(&self) {
        self.retrains.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_predictions_served(&self) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_predictions_rejected(&self) {
        self.predictions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_resets(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            examples_accepted: self.examples_accepted.load(Ordering::Relaxed),
            examples_rejected: self.examples_rejected.load(Ordering::Relaxed),
            retrains: self.retrains.load(Ordering::Relaxed),
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            predictions_rejected: self.predictions_rejected.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub connections_opened: u64,
    pub examples_accepted: u64,
    pub examples_rejected: u64,
    pub retrains: u64,
    pub predictions_served: u64,
    pub predictions_rejected: u64,
    pub resets: u64,
}
