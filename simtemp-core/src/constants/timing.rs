//! Timing Constants
//!
//! Sampling periods are carried in microseconds on every configuration
//! surface, and converted to `Duration` only at the scheduler boundary.

// ===== UNIT CONVERSIONS =====

/// Nanoseconds per microsecond.
pub const NS_PER_US: u64 = 1_000;

/// Microseconds per millisecond.
pub const US_PER_MS: u64 = 1_000;

/// Nanoseconds per second.
pub const NS_PER_SECOND: u64 = 1_000_000_000;

// ===== SAMPLING PERIOD =====

/// Shortest accepted sampling period (µs), i.e. 20 kHz.
pub const PERIOD_MIN_US: u32 = 50;

/// Longest accepted sampling period (µs), i.e. 10 s.
pub const PERIOD_MAX_US: u32 = 10_000_000;

/// Sampling period the engine starts with (µs), i.e. 100 ms.
pub const DEFAULT_PERIOD_US: u32 = 100_000;

// ===== CONSUMER WAITS =====

/// Default timeout for a consumer waiting on new samples (ms).
///
/// Matches the poll timeout of the reference command-line reader.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5_000;
