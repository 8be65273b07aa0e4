//! End-to-end tests for the sampling engine
//!
//! Covers:
//! - Ramp scenario with threshold alerts
//! - Reader blocking, timeouts and multi-reader delivery
//! - Ring overflow accounting
//! - Shutdown behaviour

mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use simtemp_core::{
    constants::SAMPLE_RING_CAPACITY, Engine, EngineConfig, Mode, SchedulerState, WaitOutcome,
};

use common::{collect, drain_now, ramp_config, InstantClock};

#[test]
fn test_ramp_scenario_end_to_end() {
    // 21000 and 22000 stay at or below the threshold, 23000 crosses it
    let clock = InstantClock::new();
    let engine = Engine::start_with_clock(ramp_config(100_000, 22_000), Arc::new(clock)).unwrap();
    let reader = engine.reader();

    let samples = collect(&reader, 3, Duration::from_secs(2));

    let temps: Vec<i32> = samples.iter().map(|s| s.temperature_mc).collect();
    assert_eq!(temps, vec![21_000, 22_000, 23_000]);

    let alerts: Vec<bool> = samples.iter().map(|s| s.is_alert()).collect();
    assert_eq!(alerts, vec![false, false, true]);

    for pair in samples.windows(2) {
        let gap_ns = pair[1].timestamp_ns - pair[0].timestamp_ns;
        assert!(gap_ns >= 80_000_000, "firings {}ns apart", gap_ns);
    }

    // Every sample after the second keeps climbing above 22 °C. Stop first
    // so the snapshot is not taken between a count and its alert.
    engine.shutdown();
    let stats = engine.stats();
    assert!(stats.counter >= 3);
    assert_eq!(stats.alert_count, stats.counter - 2);
    assert_eq!(stats.last_error, None);
}

#[test]
fn test_reader_times_out_without_data() {
    let engine = Engine::start(ramp_config(10_000_000, 20_000)).unwrap();
    let reader = engine.reader();

    let start = Instant::now();
    assert_eq!(reader.wait_readable(Duration::from_millis(50)), WaitOutcome::Timeout);
    assert!(start.elapsed() >= Duration::from_millis(50));

    assert!(reader.read_timeout(Duration::from_millis(20)).is_none());
    assert!(!reader.poll_readable());
}

#[test]
fn test_blocked_reader_wakes_on_new_sample() {
    let engine = Engine::start(ramp_config(200_000, 20_000)).unwrap();
    let reader = engine.reader();

    let waiter = thread::spawn(move || {
        let start = Instant::now();
        let sample = reader.read_timeout(Duration::from_secs(5));
        (sample, start.elapsed())
    });

    let (sample, waited) = waiter.join().unwrap();
    assert_eq!(sample.map(|s| s.temperature_mc), Some(21_000));
    assert!(waited < Duration::from_secs(2));
}

#[test]
fn test_each_sample_delivered_to_exactly_one_reader() {
    let engine = Engine::start(ramp_config(1_000, 100_000)).unwrap();
    let total = Arc::new(AtomicUsize::new(0));
    const TARGET: usize = 200;

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let reader = engine.reader();
            let total = Arc::clone(&total);
            thread::spawn(move || {
                let mut mine = Vec::new();
                while total.load(Ordering::Acquire) < TARGET {
                    if let Some(sample) = reader.read_timeout(Duration::from_millis(100)) {
                        mine.push(sample);
                        total.fetch_add(1, Ordering::AcqRel);
                    }
                }
                mine
            })
        })
        .collect();

    let mut read = Vec::new();
    for r in readers {
        read.extend(r.join().unwrap());
    }
    let drained = engine.shutdown();
    let stats = engine.stats();

    let unique: HashSet<u64> = read.iter().map(|s| s.timestamp_ns).collect();
    assert_eq!(unique.len(), read.len(), "a sample was delivered twice");
    assert!(read.len() >= TARGET);
    assert_eq!(read.len() as u64 + drained as u64 + stats.dropped, stats.counter);
}

#[test]
fn test_overflow_keeps_newest_and_counts_drops() {
    let engine = Engine::start(ramp_config(50, 100_000)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while engine.stats().counter < (SAMPLE_RING_CAPACITY as u64) * 2 {
        assert!(Instant::now() < deadline, "producer too slow");
        thread::sleep(Duration::from_millis(5));
    }

    let drained = engine.shutdown();
    let stats = engine.stats();

    assert_eq!(drained, SAMPLE_RING_CAPACITY);
    assert_eq!(stats.dropped, stats.counter - SAMPLE_RING_CAPACITY as u64);
}

#[test]
fn test_readers_see_samples_in_production_order() {
    let engine = Engine::start(ramp_config(500, 100_000)).unwrap();
    let reader = engine.reader();

    let samples = collect(&reader, 50, Duration::from_secs(2));
    for pair in samples.windows(2) {
        assert!(pair[0].timestamp_ns < pair[1].timestamp_ns);
    }
}

#[test]
fn test_shutdown_stops_production_and_drains() {
    let engine = Engine::start(ramp_config(1_000, 20_000)).unwrap();
    thread::sleep(Duration::from_millis(50));

    let drained = engine.shutdown();
    assert!(drained > 0);
    assert_eq!(engine.buffered(), 0);
    assert_eq!(engine.scheduler_state(), SchedulerState::Stopped);

    let counter = engine.stats().counter;
    thread::sleep(Duration::from_millis(20));
    assert_eq!(engine.stats().counter, counter);

    // Second call is a no-op, and dropping afterwards is fine
    assert_eq!(engine.shutdown(), 0);
    drop(engine);
}

#[test]
fn test_reader_outlives_engine() {
    let engine = Engine::start(ramp_config(1_000, 20_000)).unwrap();
    let reader = engine.reader();
    drop(engine);

    assert!(drain_now(&reader).is_empty());
    assert!(reader.read_timeout(Duration::from_millis(20)).is_none());
}

#[test]
fn test_mode_switch_changes_distribution() {
    let engine = Engine::start(
        EngineConfig::default()
            .with_period_us(200)
            .with_mode(Mode::Normal)
            .with_seed(11),
    )
    .unwrap();
    let reader = engine.reader();

    let normal = collect(&reader, 100, Duration::from_secs(2));
    assert!(normal.iter().all(|s| (s.temperature_mc - 20_000).abs() <= 1_000));

    engine.set_mode(Mode::Noisy);
    drain_now(&reader);
    let noisy = collect(&reader, 200, Duration::from_secs(2));
    let spread = noisy.iter().map(|s| s.temperature_mc).max().unwrap()
        - noisy.iter().map(|s| s.temperature_mc).min().unwrap();
    assert!(spread > 2_000, "noisy spread only {}mC", spread);
}
