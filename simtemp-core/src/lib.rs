//! Sampling engine for a simulated temperature sensor
//!
//! Produces timestamped temperature samples on a fixed period, flags the
//! ones above a configurable threshold, and buffers them in a bounded ring
//! that drops the oldest sample when full. Readers block with a timeout
//! until data is available; configuration changes apply while sampling runs.
//!
//! Key constraints:
//! - Producer never blocks on readers; a full ring evicts the oldest sample
//! - Changing the period never lets two firings overlap
//! - Rejected configuration writes change nothing
//!
//! ```no_run
//! use std::time::Duration;
//! use simtemp_core::{Engine, EngineConfig};
//!
//! let engine = Engine::start(EngineConfig::default())?;
//! let reader = engine.reader();
//!
//! while let Some(sample) = reader.read_timeout(Duration::from_secs(5)) {
//!     if sample.is_alert() {
//!         // Above threshold
//!     }
//! }
//! # Ok::<(), simtemp_core::EngineError>(())
//! ```

#![deny(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod gaussian;
pub mod generator;
pub mod notify;
pub mod sample;
pub mod scheduler;
pub mod stats;
pub mod surface;
pub mod time;

// Public API
pub use buffer::{RingBuffer, SharedRing};
pub use config::{Config, ConfigStore, Mode, NoiseProfile};
pub use engine::{Engine, EngineConfig, SampleReader};
pub use errors::{BufferEmpty, ConfigError, ConfigResult, EngineError, EngineResult, ErrorKind};
pub use notify::WaitOutcome;
pub use sample::{Sample, SampleFlags, SAMPLE_WIRE_SIZE};
pub use scheduler::SchedulerState;
pub use stats::StatsSnapshot;
pub use surface::{parse_mode, parse_period_us, parse_threshold_mc};
pub use time::{MonotonicClock, TimeSource, Timestamp};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
