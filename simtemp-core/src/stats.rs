//! Running statistics and last-error state
//!
//! Counters only ever grow. They are reset when the engine starts and kept
//! until it is torn down.
//!
//! The block has its own lock, separate from the sample ring's, so the
//! producer updating counters never contends with readers draining samples.
//! The producer records the sample before the alert, which keeps
//! `counter >= alert_count` true at every instant a reader can observe.

use core::fmt;

use parking_lot::Mutex;

use crate::errors::ErrorKind;

/// Consistent copy of all statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsSnapshot {
    /// Samples produced since start
    pub counter: u64,
    /// Samples that crossed the alert threshold
    pub alert_count: u64,
    /// Samples evicted from a full ring before anyone read them
    pub dropped: u64,
    /// Most recent recorded failure
    pub last_error: Option<ErrorKind>,
}

impl StatsSnapshot {
    /// Name of the last error, `NO_ERROR` if none
    pub fn last_error_name(&self) -> &'static str {
        ErrorKind::name_of(self.last_error)
    }

    /// Text of the read-only statistics attribute
    pub fn report(&self) -> String {
        self.to_string()
    }
}

/// Formats the read-only statistics report:
///
/// ```text
///  Counter:	42
///  Alerts:	3
///  Last_error:	NO_ERROR
/// ```
impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " Counter:\t{}\n Alerts:\t{}\n Last_error:\t{}\n",
            self.counter,
            self.alert_count,
            self.last_error_name()
        )
    }
}

/// Shared statistics block
#[derive(Debug, Default)]
pub struct Statistics {
    inner: Mutex<StatsSnapshot>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sample(&self) {
        self.inner.lock().counter += 1;
    }

    pub fn record_alert(&self) {
        self.inner.lock().alert_count += 1;
    }

    pub fn record_drop(&self) {
        self.inner.lock().dropped += 1;
    }

    /// Overwrite the last error
    pub fn record_error(&self, kind: ErrorKind) {
        self.inner.lock().last_error = Some(kind);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        *self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_at_zero() {
        let stats = Statistics::new();
        let snap = stats.snapshot();
        assert_eq!(snap, StatsSnapshot::default());
        assert_eq!(snap.last_error_name(), "NO_ERROR");
    }

    #[test]
    fn last_error_is_overwritten() {
        let stats = Statistics::new();
        stats.record_error(ErrorKind::InvalidMode);
        stats.record_error(ErrorKind::OutOfRangePeriod);
        assert_eq!(stats.snapshot().last_error, Some(ErrorKind::OutOfRangePeriod));
    }

    #[test]
    fn report_format() {
        let snap = StatsSnapshot {
            counter: 12,
            alert_count: 3,
            dropped: 0,
            last_error: Some(ErrorKind::InvalidThreshold),
        };
        assert_eq!(
            snap.report(),
            " Counter:\t12\n Alerts:\t3\n Last_error:\tEINVAL_threshold_mC\n"
        );
    }

    #[test]
    fn counters_monotonic_under_concurrency() {
        let stats = Arc::new(Statistics::new());
        let done = Arc::new(AtomicBool::new(false));

        let producers: Vec<_> = (0..4)
            .map(|t| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for i in 0..10_000u32 {
                        stats.record_sample();
                        if (i + t) % 3 == 0 {
                            stats.record_alert();
                        }
                    }
                })
            })
            .collect();

        let observer = {
            let stats = Arc::clone(&stats);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut prev = StatsSnapshot::default();
                while !done.load(Ordering::Acquire) {
                    let snap = stats.snapshot();
                    assert!(snap.counter >= prev.counter);
                    assert!(snap.alert_count >= prev.alert_count);
                    assert!(snap.counter >= snap.alert_count);
                    prev = snap;
                }
            })
        };

        for p in producers {
            p.join().unwrap();
        }
        done.store(true, Ordering::Release);
        observer.join().unwrap();

        assert_eq!(stats.snapshot().counter, 40_000);
    }
}
