//! The sampling engine
//!
//! Owns every piece of state: configuration, sample ring, statistics,
//! notifier, generator and scheduler. It is created once, and readers and
//! configurators share it through handles. There is no process-wide state.
//!
//! ## Production pipeline
//!
//! On every firing, on the scheduler's worker thread:
//!
//! ```text
//! config snapshot → generator → threshold test → ring push (evict oldest)
//!                                                    ↓
//!                        notifier.signal() ← statistics
//! ```
//!
//! The pipeline cannot fail and never blocks beyond short critical sections.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use simtemp_core::{Engine, EngineConfig, Mode};
//!
//! let engine = Engine::start(EngineConfig::default().with_mode(Mode::Noisy))?;
//! let reader = engine.reader();
//!
//! if let Some(sample) = reader.read_timeout(Duration::from_secs(1)) {
//!     println!("{} m°C, alert={}", sample.temperature_mc, sample.is_alert());
//! }
//!
//! engine.set_threshold(25_000)?;
//! engine.shutdown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use parking_lot::Mutex;

use crate::buffer::SharedRing;
use crate::config::{Config, ConfigStore, Mode, NoiseProfile};
use crate::constants::buffers::SAMPLE_RING_CAPACITY;
use crate::constants::sensor::{
    DEFAULT_THRESHOLD_MC, INITIAL_TEMP_MC, NOISY_STDDEV_MC, NORMAL_STDDEV_MC, RAMP_STEP_MC,
    TEMP_MEAN_MC,
};
use crate::constants::timing::DEFAULT_PERIOD_US;
use crate::errors::{BufferEmpty, ConfigError, ConfigResult, EngineResult};
use crate::generator::{GeneratorParams, SampleGenerator};
use crate::notify::{Notifier, WaitOutcome};
use crate::sample::Sample;
use crate::scheduler::{PeriodicTask, Scheduler, SchedulerState};
use crate::stats::{StatsSnapshot, Statistics};
use crate::time::{MonotonicClock, TimeSource};

/// Ring type used by the engine
pub type SampleRing = SharedRing<Sample, SAMPLE_RING_CAPACITY>;

/// Start-up parameters
///
/// Defaults mirror the reference sensor. Deserializable so front-ends can
/// load it from JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Initial sampling period (µs)
    pub period_us: u32,
    /// Initial alert threshold (m°C)
    pub threshold_mc: i32,
    /// Initial generation mode
    pub mode: Mode,
    /// Centre of the Gaussian modes (m°C)
    pub mean_mc: i32,
    /// Stddev installed by normal mode (m°C)
    pub normal_stddev_mc: i32,
    /// Stddev installed by noisy mode (m°C)
    pub noisy_stddev_mc: i32,
    /// Ramp increment per firing (m°C)
    pub ramp_step_mc: i32,
    /// Temperature before the first firing (m°C)
    pub initial_temperature_mc: i32,
    /// RNG seed; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            period_us: DEFAULT_PERIOD_US,
            threshold_mc: DEFAULT_THRESHOLD_MC,
            mode: Mode::Ramp,
            mean_mc: TEMP_MEAN_MC,
            normal_stddev_mc: NORMAL_STDDEV_MC,
            noisy_stddev_mc: NOISY_STDDEV_MC,
            ramp_step_mc: RAMP_STEP_MC,
            initial_temperature_mc: INITIAL_TEMP_MC,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_period_us(mut self, period_us: u32) -> Self {
        self.period_us = period_us;
        self
    }

    pub fn with_threshold_mc(mut self, threshold_mc: i32) -> Self {
        self.threshold_mc = threshold_mc;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_initial_temperature_mc(mut self, temperature_mc: i32) -> Self {
        self.initial_temperature_mc = temperature_mc;
        self
    }

    pub fn with_ramp_step_mc(mut self, step_mc: i32) -> Self {
        self.ramp_step_mc = step_mc;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn noise(&self) -> NoiseProfile {
        NoiseProfile {
            normal_stddev_mc: self.normal_stddev_mc,
            noisy_stddev_mc: self.noisy_stddev_mc,
        }
    }

    fn generator_params(&self) -> GeneratorParams {
        GeneratorParams {
            mean_mc: self.mean_mc,
            ramp_step_mc: self.ramp_step_mc,
        }
    }
}

/// State shared by the engine, its scheduler worker and all readers
pub(crate) struct Shared {
    pub(crate) config: ConfigStore,
    pub(crate) ring: SampleRing,
    pub(crate) stats: Statistics,
    pub(crate) notifier: Notifier,
    generator: Mutex<SampleGenerator>,
    clock: Arc<dyn TimeSource>,
}

impl Shared {
    /// One pass of the production pipeline
    fn produce(&self) -> Sample {
        let config = self.config.get();
        let generated = self.generator.lock().next(&config);
        let sample = Sample::new(self.clock.now_ns(), generated.temperature_mc, generated.crossed);

        self.stats.record_sample();
        if generated.crossed {
            self.stats.record_alert();
        }

        if let Some(evicted) = self.ring.push(sample) {
            self.stats.record_drop();
            trace!("Ring full, dropped sample {} mC @ {}ns", evicted.temperature_mc, evicted.timestamp_ns);
        }

        self.notifier.signal();
        trace!("Produced {} mC (alert={})", sample.temperature_mc, generated.crossed);
        sample
    }

    fn is_readable(&self) -> bool {
        !self.ring.is_empty()
    }
}

impl PeriodicTask for Shared {
    fn fire(&self, _deadline: Instant) {
        self.produce();
    }
}

/// Simulated temperature sensor engine
pub struct Engine {
    shared: Arc<Shared>,
    scheduler: Scheduler<Shared>,
    /// Serializes period changes so the stored value and the timer agree
    period_lock: Mutex<()>,
    shut_down: AtomicBool,
}

impl Engine {
    /// Validate `config`, reset statistics and start sampling
    pub fn start(config: EngineConfig) -> EngineResult<Self> {
        Self::start_with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// Same as [`Engine::start`] with a caller-supplied timestamp source
    pub fn start_with_clock(config: EngineConfig, clock: Arc<dyn TimeSource>) -> EngineResult<Self> {
        let store = ConfigStore::new(config.period_us, config.threshold_mc, config.mode, config.noise())?;
        let generator = SampleGenerator::new(
            config.generator_params(),
            config.initial_temperature_mc,
            config.seed,
        );

        let shared = Arc::new(Shared {
            config: store,
            ring: SampleRing::new(),
            stats: Statistics::new(),
            notifier: Notifier::new(),
            generator: Mutex::new(generator),
            clock,
        });

        let scheduler = Scheduler::new(Arc::clone(&shared));
        if let Err(err) = scheduler.start(shared.config.period()) {
            shared.stats.record_error(err.kind());
            return Err(err);
        }

        info!(
            "simtemp engine started: period={}us threshold={}mC mode={}",
            config.period_us, config.threshold_mc, config.mode
        );

        Ok(Self {
            shared,
            scheduler,
            period_lock: Mutex::new(()),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Config {
        self.shared.config.get()
    }

    /// Change the sampling period (µs) and restart the timer with it
    ///
    /// Blocks until any in-flight firing has finished. The next firing
    /// happens one new period after this call re-arms.
    pub fn set_period(&self, period_us: u64) -> EngineResult<()> {
        let _guard = self.period_lock.lock();

        let period_us = self.shared.config.set_period(period_us).map_err(|e| self.reject(e))?;

        if self.is_shut_down() {
            debug!("Period stored as {}us, engine stopped so timer not restarted", period_us);
            return Ok(());
        }

        if let Err(err) = self
            .scheduler
            .reconfigure_period(Duration::from_micros(period_us as u64))
        {
            self.shared.stats.record_error(err.kind());
            return Err(err);
        }

        info!("Sampling period set to {}us", period_us);
        Ok(())
    }

    /// Change the alert threshold (m°C)
    pub fn set_threshold(&self, threshold_mc: i64) -> ConfigResult<()> {
        let threshold_mc = self.shared.config.set_threshold(threshold_mc).map_err(|e| self.reject(e))?;
        info!("Threshold set to {}mC", threshold_mc);
        Ok(())
    }

    /// Change the generation mode; Gaussian modes also set their stddev
    pub fn set_mode(&self, mode: Mode) {
        self.shared.config.set_mode(mode);
        info!("Mode set to {} (stddev {}mC)", mode, self.shared.config.stddev_mc());
    }

    /// Record a rejected write and hand the error back
    pub(crate) fn reject(&self, err: ConfigError) -> ConfigError {
        self.shared.stats.record_error(err.kind());
        warn!("Rejected configuration write: {}", err);
        err
    }

    /// New consumer handle; any number may exist
    pub fn reader(&self) -> SampleReader {
        SampleReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Pop the oldest buffered sample
    pub fn pop(&self) -> Result<Sample, BufferEmpty> {
        self.shared.ring.pop()
    }

    /// Block until a sample is buffered or `timeout` passes
    pub fn wait_for_data(&self, timeout: Duration) -> WaitOutcome {
        let shared = &self.shared;
        shared.notifier.wait_for_data(timeout, || shared.is_readable())
    }

    /// Number of buffered samples
    pub fn buffered(&self) -> usize {
        self.shared.ring.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Firings skipped because production fell a whole period behind
    pub fn overruns(&self) -> u64 {
        self.scheduler.overruns()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Stop sampling and discard buffered samples
    ///
    /// Only the first call does anything; returns how many samples were
    /// drained (0 on repeated calls).
    pub fn shutdown(&self) -> usize {
        // Held across the flag and the cancel so a concurrent `set_period`
        // cannot re-arm the timer after it has been stopped
        let _guard = self.period_lock.lock();
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return 0;
        }

        if self.scheduler.cancel() {
            debug!("Scheduler was still active and cancelled");
        }

        let drained = self.shared.ring.drain_all();
        for (i, sample) in drained.iter().enumerate() {
            debug!("Drained {}: {} mC", i + 1, sample.temperature_mc);
        }

        // Wake readers blocked on an engine that will never produce again
        self.shared.notifier.signal();

        info!(
            "simtemp engine stopped: {} samples produced, {} drained",
            self.shared.stats.snapshot().counter,
            drained.len()
        );
        drained.len()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Consumer handle onto the engine's sample ring
///
/// Cheap to clone. Several readers share the stream: each sample goes to
/// exactly one of them.
#[derive(Clone)]
pub struct SampleReader {
    shared: Arc<Shared>,
}

impl SampleReader {
    /// Non-blocking read; `WouldBlock` when nothing is buffered
    pub fn try_read(&self) -> nb::Result<Sample, Infallible> {
        self.shared.ring.pop().map_err(|BufferEmpty| nb::Error::WouldBlock)
    }

    /// Level-triggered readiness: true whenever a sample is buffered
    pub fn poll_readable(&self) -> bool {
        self.shared.is_readable()
    }

    /// Block until readable or `timeout` passes
    pub fn wait_readable(&self, timeout: Duration) -> WaitOutcome {
        let shared = &self.shared;
        shared.notifier.wait_for_data(timeout, || shared.is_readable())
    }

    /// Read one sample, waiting up to `timeout`
    ///
    /// Another reader may take the sample between wake-up and pop, so this
    /// loops until it gets one or the deadline passes.
    /// A `timeout` too large to form a deadline waits without limit.
    pub fn read_timeout(&self, timeout: Duration) -> Option<Sample> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            match self.try_read() {
                Ok(sample) => return Some(sample),
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(never)) => match never {},
            }

            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => timeout,
            };
            if remaining.is_zero() || !self.wait_readable(remaining).is_ready() {
                return None;
            }
        }
    }

    /// Pop up to `M` samples without blocking
    pub fn read_batch<const M: usize>(&self) -> heapless::Vec<Sample, M> {
        let mut batch = heapless::Vec::new();
        while !batch.is_full() {
            match self.shared.ring.pop() {
                Ok(sample) => {
                    // Cannot fail: checked `is_full` above
                    let _ = batch.push(sample);
                }
                Err(BufferEmpty) => break,
            }
        }
        batch
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }
}
