//! Wake-up channel for readers waiting on new samples
//!
//! Readiness is level-triggered: a waiter passes a predicate ("buffer not
//! empty") and `wait_for_data` returns `Ready` straight away if it already
//! holds, however many times it is asked. Only when it does not hold does the
//! waiter sleep until the producer signals or the timeout passes.
//!
//! ## No lost wake-ups
//!
//! The predicate is evaluated while holding the notifier's lock, and
//! `signal` takes the same lock before notifying. A push that lands between
//! the check and the sleep therefore cannot signal until the waiter is
//! parked on the condvar.
//!
//! Lock order is notifier → ring on the reader side. The producer releases
//! the ring lock before signalling, so the two never nest the other way.
//!
//! Wake-ups may be spurious; the predicate is re-checked on every wake.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Result of a bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The predicate held
    Ready,
    /// The timeout passed first; re-poll, this is not an error
    Timeout,
}

impl WaitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready)
    }
}

/// Condition-variable channel between the producer and waiting readers
#[derive(Debug, Default)]
pub struct Notifier {
    /// Bumped on every signal; lets tests and diagnostics count wake-ups
    generation: Mutex<u64>,
    cond: Condvar,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake every waiter
    ///
    /// Called after every push. Waking on non-transitions is harmless since
    /// waiters re-check their predicate.
    pub fn signal(&self) {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        self.cond.notify_all();
    }

    /// Block until `ready()` holds or `timeout` elapses
    ///
    /// No ordering guarantee between several waiters.
    pub fn wait_for_data<F>(&self, timeout: Duration, ready: F) -> WaitOutcome
    where
        F: Fn() -> bool,
    {
        // An unrepresentable deadline means wait forever
        let deadline = Instant::now().checked_add(timeout);
        let mut generation = self.generation.lock();

        loop {
            if ready() {
                return WaitOutcome::Ready;
            }

            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return WaitOutcome::Timeout;
                    }
                    self.cond.wait_until(&mut generation, deadline);
                }
                None => self.cond.wait(&mut generation),
            }
        }
    }

    /// Number of signals sent so far
    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn times_out_when_never_ready() {
        let notifier = Notifier::new();
        let start = Instant::now();
        let outcome = notifier.wait_for_data(Duration::from_millis(30), || false);
        assert_eq!(outcome, WaitOutcome::Timeout);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn level_triggered_when_already_ready() {
        let notifier = Notifier::new();
        // Repeated queries keep reporting ready without any signal
        for _ in 0..3 {
            assert_eq!(
                notifier.wait_for_data(Duration::from_millis(1), || true),
                WaitOutcome::Ready
            );
        }
        assert_eq!(notifier.generation(), 0);
    }

    #[test]
    fn signal_wakes_waiter() {
        let notifier = Arc::new(Notifier::new());
        let flag = Arc::new(AtomicBool::new(false));

        let waiter = {
            let notifier = Arc::clone(&notifier);
            let flag = Arc::clone(&flag);
            thread::spawn(move || {
                notifier.wait_for_data(Duration::from_secs(5), || flag.load(Ordering::Acquire))
            })
        };

        thread::sleep(Duration::from_millis(20));
        flag.store(true, Ordering::Release);
        notifier.signal();

        assert_eq!(waiter.join().unwrap(), WaitOutcome::Ready);
    }

    #[test]
    fn spurious_signal_keeps_waiting() {
        let notifier = Arc::new(Notifier::new());

        let waiter = {
            let notifier = Arc::clone(&notifier);
            thread::spawn(move || notifier.wait_for_data(Duration::from_millis(80), || false))
        };

        for _ in 0..5 {
            thread::sleep(Duration::from_millis(5));
            notifier.signal();
        }

        assert_eq!(waiter.join().unwrap(), WaitOutcome::Timeout);
        assert_eq!(notifier.generation(), 5);
    }

    #[test]
    fn wakes_all_waiters() {
        let notifier = Arc::new(Notifier::new());
        let flag = Arc::new(AtomicBool::new(false));

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let notifier = Arc::clone(&notifier);
                let flag = Arc::clone(&flag);
                thread::spawn(move || {
                    notifier.wait_for_data(Duration::from_secs(5), || flag.load(Ordering::Acquire))
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        flag.store(true, Ordering::Release);
        notifier.signal();

        for w in waiters {
            assert_eq!(w.join().unwrap(), WaitOutcome::Ready);
        }
    }
}
