//! Shared helpers for engine integration tests
//!
//! - `InstantClock`: timestamps relative to a known `Instant`, so tests can
//!   line samples up against wall-clock events
//! - `FiringRecorder`: periodic task that records firings and detects overlap
//! - collection helpers for readers

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use simtemp_core::{
    scheduler::PeriodicTask,
    time::{TimeSource, Timestamp},
    EngineConfig, Mode, Sample, SampleReader,
};

/// Time source whose origin the test knows
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Timestamp an instant would have on this clock
    pub fn offset_ns(&self, at: Instant) -> Timestamp {
        at.saturating_duration_since(self.origin).as_nanos() as Timestamp
    }
}

impl TimeSource for InstantClock {
    fn now_ns(&self) -> Timestamp {
        self.offset_ns(Instant::now())
    }
}

/// Deterministic ramp configuration starting from 20 °C
pub fn ramp_config(period_us: u32, threshold_mc: i32) -> EngineConfig {
    EngineConfig::default()
        .with_period_us(period_us)
        .with_threshold_mc(threshold_mc)
        .with_mode(Mode::Ramp)
        .with_initial_temperature_mc(20_000)
        .with_seed(7)
}

/// Read `count` samples, giving each at most `timeout`
pub fn collect(reader: &SampleReader, count: usize, timeout: Duration) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(count);
    while samples.len() < count {
        match reader.read_timeout(timeout) {
            Some(sample) => samples.push(sample),
            None => panic!("timed out after {} of {} samples", samples.len(), count),
        }
    }
    samples
}

/// Pop everything currently buffered without waiting
pub fn drain_now(reader: &SampleReader) -> Vec<Sample> {
    let mut samples = Vec::new();
    while let Ok(sample) = reader.try_read() {
        samples.push(sample);
    }
    samples
}

/// Periodic task that records firing instants and counts overlaps
#[derive(Debug, Default)]
pub struct FiringRecorder {
    in_flight: AtomicUsize,
    overlaps: AtomicUsize,
    firings: Mutex<Vec<Instant>>,
    busy: Duration,
}

impl FiringRecorder {
    /// Recorder whose firings take `busy` to complete
    pub fn with_busy(busy: Duration) -> Arc<Self> {
        Arc::new(Self {
            busy,
            ..Self::default()
        })
    }

    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    pub fn firings(&self) -> Vec<Instant> {
        self.firings.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.firings.lock().len()
    }
}

impl PeriodicTask for FiringRecorder {
    fn fire(&self, _deadline: Instant) {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.firings.lock().push(Instant::now());
        if !self.busy.is_zero() {
            thread::sleep(self.busy);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
