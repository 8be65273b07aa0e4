//! Error Types for the Sampling Engine
//!
//! ## Design Philosophy
//!
//! Errors are small `Copy` values with no heap data: they are returned from
//! configuration writes that may run concurrently with the producer, and the
//! last one is kept inside the statistics block.
//!
//! ## Error Categories
//!
//! ### Configuration rejections
//! - `InvalidPeriod` / `InvalidThreshold` / `InvalidMode`: input could not be parsed
//! - `OutOfRangePeriod` / `OutOfRangeThreshold`: parsed, but outside the accepted bounds
//!
//! A rejected write never touches the live configuration. The rejection is
//! recorded as the statistics' `last_error` and handed back to the caller,
//! who decides whether to resubmit.
//!
//! ### Buffer underflow
//! - `BufferEmpty`: `pop` on an empty ring. This is ordinary control flow for
//!   readers, so it is a separate type and is never recorded or logged.
//!
//! ### Engine lifecycle
//! - `SchedulerSpawn`: the periodic worker could not be created. Fatal for
//!   the engine; the caller decides whether to retry start-up.
//!
//! ## Error Names
//!
//! Every recordable failure maps to an [`ErrorKind`], whose [`ErrorKind::name`]
//! is what the statistics report prints:
//!
//! ```rust
//! use simtemp_core::errors::ErrorKind;
//!
//! assert_eq!(ErrorKind::OutOfRangePeriod.name(), "OUTOFRANGE_sampling_us");
//! assert_eq!(ErrorKind::name_of(None), "NO_ERROR");
//! ```

use thiserror_no_std::Error;

/// Result type for configuration writes
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for engine lifecycle operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Kind of the last recorded failure, as kept in the statistics block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Sampling period could not be parsed
    InvalidPeriod,
    /// Sampling period outside `[PERIOD_MIN_US, PERIOD_MAX_US]`
    OutOfRangePeriod,
    /// Threshold could not be parsed
    InvalidThreshold,
    /// Threshold outside `[TEMP_MIN_MC, TEMP_MAX_MC]`
    OutOfRangeThreshold,
    /// Mode is neither a known digit nor a known name
    InvalidMode,
    /// Memory for engine state could not be obtained
    AllocationFailure,
    /// A runtime resource (the scheduler worker) could not be created
    ResourceCreationFailure,
}

impl ErrorKind {
    /// Stable, human-readable name used by the statistics report
    pub const fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidPeriod => "EINVAL_sampling_us",
            ErrorKind::OutOfRangePeriod => "OUTOFRANGE_sampling_us",
            ErrorKind::InvalidThreshold => "EINVAL_threshold_mC",
            ErrorKind::OutOfRangeThreshold => "OUTOFRANGE_threshold_mC",
            ErrorKind::InvalidMode => "EINVAL_mode",
            ErrorKind::AllocationFailure => "ALLOC_failure",
            ErrorKind::ResourceCreationFailure => "CREATE_resource",
        }
    }

    /// Name for an optional last error; `None` reads as `NO_ERROR`
    pub const fn name_of(kind: Option<ErrorKind>) -> &'static str {
        match kind {
            Some(kind) => kind.name(),
            None => "NO_ERROR",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected configuration write
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Period text is not an unsigned decimal
    #[error("Invalid sampling period: not an unsigned decimal")]
    InvalidPeriod,

    /// Period outside accepted bounds
    #[error("Sampling period {value_us}us outside range [{min_us}, {max_us}]")]
    OutOfRangePeriod {
        /// Rejected period in microseconds
        value_us: u64,
        /// Shortest accepted period
        min_us: u32,
        /// Longest accepted period
        max_us: u32,
    },

    /// Threshold text is not a signed decimal
    #[error("Invalid threshold: not a signed decimal")]
    InvalidThreshold,

    /// Threshold outside accepted bounds
    #[error("Threshold {value_mc}mC outside range [{min_mc}, {max_mc}]")]
    OutOfRangeThreshold {
        /// Rejected threshold in milli-degrees
        value_mc: i64,
        /// Lowest accepted threshold
        min_mc: i32,
        /// Highest accepted threshold
        max_mc: i32,
    },

    /// Mode is not one of `0|1|2|normal|noisy|ramp`
    #[error("Invalid mode: expected 0, 1, 2, normal, noisy or ramp")]
    InvalidMode,
}

impl ConfigError {
    /// Kind recorded as `last_error` for this rejection
    pub const fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::InvalidPeriod => ErrorKind::InvalidPeriod,
            ConfigError::OutOfRangePeriod { .. } => ErrorKind::OutOfRangePeriod,
            ConfigError::InvalidThreshold => ErrorKind::InvalidThreshold,
            ConfigError::OutOfRangeThreshold { .. } => ErrorKind::OutOfRangeThreshold,
            ConfigError::InvalidMode => ErrorKind::InvalidMode,
        }
    }
}

/// `pop` on an empty ring
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Buffer empty")]
pub struct BufferEmpty;

/// Engine start-up or runtime failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Start-up or live configuration was rejected
    #[error("Configuration rejected: {0}")]
    Config(ConfigError),

    /// The periodic worker thread could not be spawned
    #[error("Failed to spawn scheduler worker: {0}")]
    SchedulerSpawn(std::io::ErrorKind),
}

impl EngineError {
    /// Kind recorded as `last_error` for this failure
    pub const fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Config(err) => err.kind(),
            EngineError::SchedulerSpawn(_) => ErrorKind::ResourceCreationFailure,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(err)
    }
}
