//! Text configuration surface
//!
//! Attribute-style string endpoints: each write takes a line of text, each
//! read returns the value followed by a newline.
//!
//! | Attribute      | Write accepts                       | Read shows   |
//! |----------------|-------------------------------------|--------------|
//! | `sampling_us`  | unsigned decimal, 50..=10_000_000    | `100000\n`   |
//! | `threshold_mC` | signed decimal, -50_000..=100_000    | `20000\n`    |
//! | `mode`         | index `0`..`2` or a mode name       | `ramp\n`     |
//! | `stats`        | read-only                           | report       |
//!
//! Surrounding whitespace (including the trailing newline an `echo` adds)
//! is ignored. Text that does not parse is `Invalid*`; a number outside its
//! bounds is `OutOfRange*`, even when it overflows the integer type.

use core::num::IntErrorKind;

use crate::config::{validate_period, validate_threshold, Mode};
use crate::constants::sensor::{TEMP_MAX_MC, TEMP_MIN_MC};
use crate::constants::timing::{PERIOD_MAX_US, PERIOD_MIN_US};
use crate::engine::Engine;
use crate::errors::{ConfigError, ConfigResult, EngineResult};

/// Parse a sampling period in microseconds
pub fn parse_period_us(text: &str) -> ConfigResult<u32> {
    match text.trim().parse::<u64>() {
        Ok(value) => validate_period(value),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Err(ConfigError::OutOfRangePeriod {
            value_us: u64::MAX,
            min_us: PERIOD_MIN_US,
            max_us: PERIOD_MAX_US,
        }),
        Err(_) => Err(ConfigError::InvalidPeriod),
    }
}

/// Parse an alert threshold in milli-degrees
pub fn parse_threshold_mc(text: &str) -> ConfigResult<i32> {
    match text.trim().parse::<i64>() {
        Ok(value) => validate_threshold(value),
        Err(e) => {
            let value_mc = match e.kind() {
                IntErrorKind::PosOverflow => i64::MAX,
                IntErrorKind::NegOverflow => i64::MIN,
                _ => return Err(ConfigError::InvalidThreshold),
            };
            Err(ConfigError::OutOfRangeThreshold {
                value_mc,
                min_mc: TEMP_MIN_MC,
                max_mc: TEMP_MAX_MC,
            })
        }
    }
}

/// Parse a mode as its index or its name, case-insensitive
pub fn parse_mode(text: &str) -> ConfigResult<Mode> {
    let text = text.trim();

    if let Ok(index) = text.parse::<u8>() {
        return Mode::from_index(index).ok_or(ConfigError::InvalidMode);
    }

    Mode::ALL
        .into_iter()
        .find(|mode| mode.name().eq_ignore_ascii_case(text))
        .ok_or(ConfigError::InvalidMode)
}

impl Engine {
    /// Write the `sampling_us` attribute
    pub fn store_period(&self, text: &str) -> EngineResult<()> {
        let period_us = parse_period_us(text).map_err(|e| self.reject(e))?;
        self.set_period(period_us as u64)
    }

    /// Write the `threshold_mC` attribute
    pub fn store_threshold(&self, text: &str) -> ConfigResult<()> {
        let threshold_mc = parse_threshold_mc(text).map_err(|e| self.reject(e))?;
        self.set_threshold(threshold_mc as i64)
    }

    /// Write the `mode` attribute
    pub fn store_mode(&self, text: &str) -> ConfigResult<()> {
        let mode = parse_mode(text).map_err(|e| self.reject(e))?;
        self.set_mode(mode);
        Ok(())
    }

    pub fn show_period(&self) -> String {
        format!("{}\n", self.config().period_us)
    }

    pub fn show_threshold(&self) -> String {
        format!("{}\n", self.config().threshold_mc)
    }

    pub fn show_mode(&self) -> String {
        format!("{}\n", self.config().mode)
    }

    /// Read the `stats` attribute
    pub fn stats_report(&self) -> String {
        self.stats().report()
    }
}
