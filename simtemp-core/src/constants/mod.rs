//! Constants for the simtemp sampling engine
//!
//! All numeric limits and defaults live here, with units in their names.
//! The defaults mirror the reference sensor: 100 ms sampling, 20 °C alert
//! threshold, ramp mode, 0.1 °C noise.
//!
//! ## Organization
//!
//! - **Sensor**: temperature range, generation mean, noise amplitudes, ramp step
//! - **Timing**: sampling period bounds and default, wait timeouts
//! - **Buffers**: ring capacity

/// Temperature range, generator parameters and alert threshold defaults.
pub mod sensor;

/// Sampling period bounds and timing defaults.
pub mod timing;

/// Buffer sizes.
pub mod buffers;

pub use sensor::{
    TEMP_MIN_MC, TEMP_MAX_MC, TEMP_MEAN_MC,
    NORMAL_STDDEV_MC, NOISY_STDDEV_MC, RAMP_STEP_MC,
    DEFAULT_THRESHOLD_MC,
};

pub use timing::{
    PERIOD_MIN_US, PERIOD_MAX_US, DEFAULT_PERIOD_US,
    NS_PER_US, US_PER_MS,
};

pub use buffers::SAMPLE_RING_CAPACITY;
