//! Time sources for sample timestamps
//!
//! Samples carry a monotonic timestamp in nanoseconds. The clock is a trait
//! so tests can pin timestamps while the scheduler keeps using real
//! `Instant`s for its deadlines.
//!
//! - `MonotonicClock`: nanoseconds since the clock was created
//! - `FixedTime`: manually advanced, for tests

use core::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Timestamp in nanoseconds since the clock's origin
pub type Timestamp = u64;

/// Source of sample timestamps
///
/// Shared between the producer thread and anything that inspects the
/// engine, so implementations must be `Send + Sync`.
pub trait TimeSource: Send + Sync {
    /// Current timestamp in nanoseconds
    fn now_ns(&self) -> Timestamp;
}

/// Monotonic clock anchored at its creation
///
/// Starts at 0, never goes backwards.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_ns(&self) -> Timestamp {
        // u64 nanoseconds overflow after ~584 years of uptime
        self.origin.elapsed().as_nanos() as Timestamp
    }
}

/// Fixed time source for testing
#[derive(Debug, Default)]
pub struct FixedTime {
    timestamp: AtomicU64,
}

impl FixedTime {
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: AtomicU64::new(timestamp),
        }
    }

    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.store(timestamp, Ordering::Relaxed);
    }

    pub fn advance(&self, ns: u64) {
        self.timestamp.fetch_add(ns, Ordering::Relaxed);
    }
}

impl TimeSource for FixedTime {
    fn now_ns(&self) -> Timestamp {
        self.timestamp.load(Ordering::Relaxed)
    }
}
