//! Live sampling configuration
//!
//! Holds the period, alert threshold and generation mode that every firing
//! reads, and validates every write against fixed bounds.
//!
//! ## Consistency model
//!
//! Each field is guarded on its own:
//!
//! | Field              | Guard        |
//! |--------------------|--------------|
//! | `period_us`        | `AtomicU32`  |
//! | `threshold_mc`     | `AtomicI32`  |
//! | `mode`+`stddev_mc` | one `Mutex`  |
//!
//! A reader never observes a torn field. A snapshot taken while a writer is
//! active may mix an old period with a new threshold; the producer accepts
//! that, because each firing uses whatever values are current when it reads
//! them. Mode and stddev share a lock because setting the mode rewrites the
//! stddev, and a firing must not see Noisy paired with Normal's amplitude.
//!
//! ## Rejections
//!
//! A write outside its bounds returns an error and leaves the field untouched.
//! There is no partial update. Recording the rejection as `last_error` is the
//! engine's job, since the statistics block lives there.

use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use core::time::Duration;

use parking_lot::Mutex;

use crate::constants::sensor::{
    DEFAULT_THRESHOLD_MC, NOISY_STDDEV_MC, NORMAL_STDDEV_MC, TEMP_MAX_MC, TEMP_MIN_MC,
};
use crate::constants::timing::{DEFAULT_PERIOD_US, PERIOD_MAX_US, PERIOD_MIN_US};
use crate::errors::{ConfigError, ConfigResult};

/// Temperature generation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Mode {
    /// Gaussian, small stddev
    Normal = 0,
    /// Gaussian, large stddev
    Noisy = 1,
    /// Deterministic wrapping ramp
    Ramp = 2,
}

impl Mode {
    /// All modes in index order
    pub const ALL: [Mode; 3] = [Mode::Normal, Mode::Noisy, Mode::Ramp];

    /// Mode for a numeric index `0|1|2`
    pub const fn from_index(index: u8) -> Option<Mode> {
        match index {
            0 => Some(Mode::Normal),
            1 => Some(Mode::Noisy),
            2 => Some(Mode::Ramp),
            _ => None,
        }
    }

    pub const fn index(&self) -> u8 {
        *self as u8
    }

    /// Lowercase name shown on the configuration surface
    pub const fn name(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Noisy => "noisy",
            Mode::Ramp => "ramp",
        }
    }
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Standard deviations applied when switching into a Gaussian mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseProfile {
    /// Stddev installed by `set_mode(Normal)` (m°C)
    pub normal_stddev_mc: i32,
    /// Stddev installed by `set_mode(Noisy)` (m°C)
    pub noisy_stddev_mc: i32,
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self {
            normal_stddev_mc: NORMAL_STDDEV_MC,
            noisy_stddev_mc: NOISY_STDDEV_MC,
        }
    }
}

/// Point-in-time copy of the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Sampling period (µs)
    pub period_us: u32,
    /// Alert threshold (m°C)
    pub threshold_mc: i32,
    /// Generation mode
    pub mode: Mode,
    /// Standard deviation derived from the last Gaussian mode set (m°C)
    pub stddev_mc: i32,
}

impl Config {
    /// Sampling period as a `Duration`
    pub fn period(&self) -> Duration {
        Duration::from_micros(self.period_us as u64)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            period_us: DEFAULT_PERIOD_US,
            threshold_mc: DEFAULT_THRESHOLD_MC,
            mode: Mode::Ramp,
            stddev_mc: NORMAL_STDDEV_MC,
        }
    }
}

/// Check a sampling period against `[PERIOD_MIN_US, PERIOD_MAX_US]`
pub fn validate_period(period_us: u64) -> ConfigResult<u32> {
    if period_us < PERIOD_MIN_US as u64 || period_us > PERIOD_MAX_US as u64 {
        return Err(ConfigError::OutOfRangePeriod {
            value_us: period_us,
            min_us: PERIOD_MIN_US,
            max_us: PERIOD_MAX_US,
        });
    }
    Ok(period_us as u32)
}

/// Check a threshold against `[TEMP_MIN_MC, TEMP_MAX_MC]`
pub fn validate_threshold(threshold_mc: i64) -> ConfigResult<i32> {
    if threshold_mc < TEMP_MIN_MC as i64 || threshold_mc > TEMP_MAX_MC as i64 {
        return Err(ConfigError::OutOfRangeThreshold {
            value_mc: threshold_mc,
            min_mc: TEMP_MIN_MC,
            max_mc: TEMP_MAX_MC,
        });
    }
    Ok(threshold_mc as i32)
}

#[derive(Debug, Clone, Copy)]
struct ModeState {
    mode: Mode,
    stddev_mc: i32,
}

/// Concurrently readable, validated configuration
#[derive(Debug)]
pub struct ConfigStore {
    period_us: AtomicU32,
    threshold_mc: AtomicI32,
    mode: Mutex<ModeState>,
    noise: NoiseProfile,
}

impl ConfigStore {
    /// Build a store from start-up values, validating each one
    pub fn new(
        period_us: u32,
        threshold_mc: i32,
        mode: Mode,
        noise: NoiseProfile,
    ) -> ConfigResult<Self> {
        let period_us = validate_period(period_us as u64)?;
        let threshold_mc = validate_threshold(threshold_mc as i64)?;
        let stddev_mc = match mode {
            Mode::Noisy => noise.noisy_stddev_mc,
            Mode::Normal | Mode::Ramp => noise.normal_stddev_mc,
        };

        Ok(Self {
            period_us: AtomicU32::new(period_us),
            threshold_mc: AtomicI32::new(threshold_mc),
            mode: Mutex::new(ModeState { mode, stddev_mc }),
            noise,
        })
    }

    /// Snapshot of all fields, each read atomically
    pub fn get(&self) -> Config {
        let mode = *self.mode.lock();
        Config {
            period_us: self.period_us(),
            threshold_mc: self.threshold_mc(),
            mode: mode.mode,
            stddev_mc: mode.stddev_mc,
        }
    }

    pub fn period_us(&self) -> u32 {
        self.period_us.load(Ordering::Acquire)
    }

    pub fn period(&self) -> Duration {
        Duration::from_micros(self.period_us() as u64)
    }

    pub fn threshold_mc(&self) -> i32 {
        self.threshold_mc.load(Ordering::Acquire)
    }

    pub fn mode(&self) -> Mode {
        self.mode.lock().mode
    }

    pub fn stddev_mc(&self) -> i32 {
        self.mode.lock().stddev_mc
    }

    /// Store a new sampling period
    ///
    /// Only updates the stored value; restarting the timer with it is the
    /// engine's responsibility.
    pub fn set_period(&self, period_us: u64) -> ConfigResult<u32> {
        let period_us = validate_period(period_us)?;
        self.period_us.store(period_us, Ordering::Release);
        Ok(period_us)
    }

    /// Store a new alert threshold
    pub fn set_threshold(&self, threshold_mc: i64) -> ConfigResult<i32> {
        let threshold_mc = validate_threshold(threshold_mc)?;
        self.threshold_mc.store(threshold_mc, Ordering::Release);
        Ok(threshold_mc)
    }

    /// Switch mode, deriving the stddev for Gaussian modes
    ///
    /// Normal and Noisy install their profile's stddev. Ramp keeps whatever
    /// stddev was last derived, so switching Noisy → Ramp → Normal still
    /// lands on Normal's amplitude.
    pub fn set_mode(&self, mode: Mode) {
        let mut state = self.mode.lock();
        state.mode = mode;
        match mode {
            Mode::Normal => state.stddev_mc = self.noise.normal_stddev_mc,
            Mode::Noisy => state.stddev_mc = self.noise.noisy_stddev_mc,
            Mode::Ramp => {}
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        let defaults = Config::default();
        Self {
            period_us: AtomicU32::new(defaults.period_us),
            threshold_mc: AtomicI32::new(defaults.threshold_mc),
            mode: Mutex::new(ModeState {
                mode: defaults.mode,
                stddev_mc: defaults.stddev_mc,
            }),
            noise: NoiseProfile::default(),
        }
    }
}
