//! Temperature Limits and Generator Parameters
//!
//! Every temperature is an `i32` in milli-degrees Celsius (m°C).

// ===== TEMPERATURE RANGE =====

/// Lowest temperature the simulated sensor can report (m°C).
///
/// Also the lower bound accepted for the alert threshold and the lower
/// end of the ramp's wrap-around range.
pub const TEMP_MIN_MC: i32 = -50_000;

/// Highest temperature the simulated sensor can report (m°C).
pub const TEMP_MAX_MC: i32 = 100_000;

/// Number of distinct values in `[TEMP_MIN_MC, TEMP_MAX_MC]`.
pub const TEMP_SPAN_MC: i64 = TEMP_MAX_MC as i64 - TEMP_MIN_MC as i64 + 1;

// ===== GENERATION =====

/// Mean of the Gaussian modes (m°C), i.e. 20 °C room temperature.
pub const TEMP_MEAN_MC: i32 = 20_000;

/// Temperature the generator starts from before the first firing (m°C).
pub const INITIAL_TEMP_MC: i32 = TEMP_MEAN_MC;

/// Standard deviation used in normal mode (m°C).
///
/// 0.1 °C is typical for a calibrated consumer sensor.
pub const NORMAL_STDDEV_MC: i32 = 100;

/// Standard deviation used in noisy mode (m°C).
pub const NOISY_STDDEV_MC: i32 = 2_000;

/// Increment applied per firing in ramp mode (m°C).
pub const RAMP_STEP_MC: i32 = 1_000;

// ===== ALERTING =====

/// Default alert threshold (m°C). Samples strictly above it raise an alert.
pub const DEFAULT_THRESHOLD_MC: i32 = 20_000;
