//! Periodic scheduler driving sample production
//!
//! ## State machine
//!
//! ```text
//!            start(p)              deadline reached
//! Stopped ─────────────→ Armed ─────────────────────→ Firing
//!    ↑                    ↑  │                           │
//!    │      cancel()      │  └──── task done, re-arm ────┘
//!    └────────────────────┴───────────────────────────────
//! ```
//!
//! Each running scheduler owns one worker thread. The worker sleeps on a
//! condvar until its deadline or a stop request, runs the task
//! synchronously, then re-arms at `deadline + period`. The next deadline is
//! computed from the previous *deadline*, not from when the task finished,
//! so execution time and wake-up latency do not accumulate into drift. If
//! the worker falls more than a whole period behind, it skips forward past
//! `now` and counts the skipped firings as overruns instead of bursting to
//! catch up.
//!
//! ## Cancellation barrier
//!
//! `cancel` signals the worker and joins it. When `cancel` returns, no firing
//! is in progress and none is pending. `reconfigure_period` is cancel followed
//! by start under one control lock, so concurrent reconfigurations serialize
//! and at most one worker ever exists. Two firings can never overlap, and
//! nothing fires between the cancel and the restart.
//!
//! `cancel` is the only blocking operation, and it waits at most for one
//! in-flight firing. The task must never call back into its own scheduler's
//! `cancel`, since that would join the current thread.

use core::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, trace};
use parking_lot::{Condvar, Mutex};

use crate::errors::{EngineError, EngineResult};

/// Work run on every firing
///
/// Runs on the scheduler's worker thread; `deadline` is the instant the
/// firing was scheduled for.
pub trait PeriodicTask: Send + Sync + 'static {
    fn fire(&self, deadline: Instant);
}

impl<F> PeriodicTask for F
where
    F: Fn(Instant) + Send + Sync + 'static,
{
    fn fire(&self, deadline: Instant) {
        self(deadline)
    }
}

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SchedulerState {
    /// No worker, nothing pending
    Stopped = 0,
    /// Waiting for the next deadline
    Armed = 1,
    /// Task executing
    Firing = 2,
}

impl SchedulerState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => SchedulerState::Armed,
            2 => SchedulerState::Firing,
            _ => SchedulerState::Stopped,
        }
    }
}

/// Compute the deadline after `deadline`, skipping any that already passed
///
/// Returns the next deadline (strictly after `now` when behind) and the
/// number of skipped firings.
pub fn next_deadline(deadline: Instant, period: Duration, now: Instant) -> (Instant, u64) {
    let next = deadline + period;
    if next > now {
        return (next, 0);
    }

    let period_ns = period.as_nanos().max(1);
    let behind_ns = now.saturating_duration_since(deadline).as_nanos();
    let skipped = behind_ns / period_ns;
    let advance_ns = period_ns.saturating_mul(skipped + 1);
    let advance = Duration::from_nanos(u64::try_from(advance_ns).unwrap_or(u64::MAX));

    (deadline + advance, u64::try_from(skipped).unwrap_or(u64::MAX))
}

/// Counters and state shared between the handle and its workers
#[derive(Debug, Default)]
struct Status {
    state: AtomicU8,
    firings: AtomicU64,
    overruns: AtomicU64,
}

impl Status {
    fn set(&self, state: SchedulerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn get(&self) -> SchedulerState {
        SchedulerState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// Stop request for one worker
#[derive(Debug, Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    cond: Condvar,
}

impl StopSignal {
    fn request(&self) {
        *self.stopped.lock() = true;
        self.cond.notify_all();
    }

    fn is_requested(&self) -> bool {
        *self.stopped.lock()
    }

    /// Sleep until `deadline`; `false` if a stop was requested first
    fn wait_until(&self, deadline: Instant) -> bool {
        let mut stopped = self.stopped.lock();
        while !*stopped {
            if Instant::now() >= deadline {
                return true;
            }
            self.cond.wait_until(&mut stopped, deadline);
        }
        false
    }
}

#[derive(Debug)]
struct Worker {
    stop: Arc<StopSignal>,
    handle: JoinHandle<()>,
    period: Duration,
}

/// Periodic scheduler owning at most one worker thread
pub struct Scheduler<T: PeriodicTask> {
    task: Arc<T>,
    status: Arc<Status>,
    control: Mutex<Option<Worker>>,
}

impl<T: PeriodicTask> Scheduler<T> {
    /// New scheduler in `Stopped` state
    pub fn new(task: Arc<T>) -> Self {
        Self {
            task,
            status: Arc::new(Status::default()),
            control: Mutex::new(None),
        }
    }

    /// Arm with `period`; first firing at `now + period`
    ///
    /// Starting a running scheduler restarts it with the new period.
    pub fn start(&self, period: Duration) -> EngineResult<()> {
        let mut control = self.control.lock();
        if let Some(worker) = control.take() {
            debug!("Scheduler already running, restarting with period {:?}", period);
            self.stop_worker(worker);
        }
        *control = Some(self.spawn_worker(period)?);
        Ok(())
    }

    /// Stop firing; blocks until any in-flight firing has finished
    ///
    /// Returns whether the scheduler was running.
    pub fn cancel(&self) -> bool {
        let mut control = self.control.lock();
        let was_running = match control.take() {
            Some(worker) => {
                self.stop_worker(worker);
                true
            }
            None => false,
        };
        self.status.set(SchedulerState::Stopped);
        was_running
    }

    /// Cancel, then start with `period`, as one serialized step
    ///
    /// No firing happens between the two. The next firing is at
    /// `now + period` for the `now` at which this call re-arms.
    pub fn reconfigure_period(&self, period: Duration) -> EngineResult<()> {
        let mut control = self.control.lock();
        if let Some(worker) = control.take() {
            self.stop_worker(worker);
        }
        self.status.set(SchedulerState::Stopped);
        *control = Some(self.spawn_worker(period)?);
        Ok(())
    }

    pub fn state(&self) -> SchedulerState {
        self.status.get()
    }

    /// Period of the live worker, if any
    pub fn period(&self) -> Option<Duration> {
        self.control.lock().as_ref().map(|w| w.period)
    }

    /// Total completed firings over the scheduler's lifetime
    pub fn firings(&self) -> u64 {
        self.status.firings.load(Ordering::Relaxed)
    }

    /// Firings skipped because the worker fell a whole period behind
    pub fn overruns(&self) -> u64 {
        self.status.overruns.load(Ordering::Relaxed)
    }

    fn spawn_worker(&self, period: Duration) -> EngineResult<Worker> {
        let stop = Arc::new(StopSignal::default());
        let first_deadline = Instant::now() + period;

        // Armed before the thread exists so callers never see Stopped after start
        self.status.set(SchedulerState::Armed);

        let handle = {
            let task = Arc::clone(&self.task);
            let status = Arc::clone(&self.status);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("simtemp-sampler".into())
                .spawn(move || run_worker(task, status, stop, first_deadline, period))
        };

        match handle {
            Ok(handle) => {
                trace!("Scheduler armed, period {:?}", period);
                Ok(Worker {
                    stop,
                    handle,
                    period,
                })
            }
            Err(err) => {
                self.status.set(SchedulerState::Stopped);
                error!("Failed to spawn scheduler worker: {}", err);
                Err(EngineError::SchedulerSpawn(err.kind()))
            }
        }
    }

    fn stop_worker(&self, worker: Worker) {
        worker.stop.request();

        if worker.handle.thread().id() == thread::current().id() {
            // Called from inside the task; joining would deadlock
            error!("Scheduler cancelled from its own worker; firing stops after this task returns");
            return;
        }

        if worker.handle.join().is_err() {
            error!("Scheduler worker panicked while firing");
        }
    }
}

impl<T: PeriodicTask> Drop for Scheduler<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run_worker<T: PeriodicTask>(
    task: Arc<T>,
    status: Arc<Status>,
    stop: Arc<StopSignal>,
    first_deadline: Instant,
    period: Duration,
) {
    let mut deadline = first_deadline;

    while stop.wait_until(deadline) {
        status.set(SchedulerState::Firing);
        task.fire(deadline);
        status.firings.fetch_add(1, Ordering::Relaxed);

        let (next, skipped) = next_deadline(deadline, period, Instant::now());
        if skipped > 0 {
            status.overruns.fetch_add(skipped, Ordering::Relaxed);
            debug!("Scheduler overrun: skipped {} firing(s)", skipped);
        }
        deadline = next;
        // A cancel issued by the task itself has already stored Stopped
        if !stop.is_requested() {
            status.set(SchedulerState::Armed);
        }
    }
}
