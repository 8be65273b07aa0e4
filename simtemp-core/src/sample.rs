//! Temperature samples and their export layout
//!
//! ## Wire layout
//!
//! A sample leaves the engine as exactly 16 bytes, no padding, in this order:
//!
//! ```text
//! ┌────────────────────┬──────────────────┬──────────────┐
//! │ timestamp_ns: u64  │ temperature: i32 │ flags: u32   │
//! │ bytes 0..8         │ bytes 8..12      │ bytes 12..16 │
//! └────────────────────┴──────────────────┴──────────────┘
//! ```
//!
//! All fields are little-endian. Any transport that hands raw samples to a
//! remote reader must keep this layout.

use crate::time::Timestamp;

/// Size of an exported sample in bytes
pub const SAMPLE_WIRE_SIZE: usize = 16;

const _: () = assert!(
    core::mem::size_of::<Sample>() == SAMPLE_WIRE_SIZE,
    "Sample must stay 16 bytes with no padding"
);

bitflags::bitflags! {
    /// Per-sample event flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SampleFlags: u32 {
        /// Set on every freshly produced sample
        const NEW = 1 << 0;
        /// Temperature was strictly above the alert threshold
        const THRESHOLD_CROSSED = 1 << 1;
    }
}

/// One timestamped temperature reading
///
/// Immutable once produced; readers receive their own copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Sample {
    /// Monotonic timestamp in nanoseconds
    pub timestamp_ns: Timestamp,
    /// Temperature in milli-degrees Celsius
    pub temperature_mc: i32,
    /// Event flags
    pub flags: SampleFlags,
}

impl Sample {
    /// New sample flagged `NEW`, plus `THRESHOLD_CROSSED` when `crossed`
    pub fn new(timestamp_ns: Timestamp, temperature_mc: i32, crossed: bool) -> Self {
        let mut flags = SampleFlags::NEW;
        flags.set(SampleFlags::THRESHOLD_CROSSED, crossed);
        Self {
            timestamp_ns,
            temperature_mc,
            flags,
        }
    }

    /// Whether the sample crossed the alert threshold
    pub fn is_alert(&self) -> bool {
        self.flags.contains(SampleFlags::THRESHOLD_CROSSED)
    }

    /// Encode into the 16-byte export layout
    pub fn to_bytes(&self) -> [u8; SAMPLE_WIRE_SIZE] {
        let mut out = [0u8; SAMPLE_WIRE_SIZE];
        out[0..8].copy_from_slice(&self.timestamp_ns.to_le_bytes());
        out[8..12].copy_from_slice(&self.temperature_mc.to_le_bytes());
        out[12..16].copy_from_slice(&self.flags.bits().to_le_bytes());
        out
    }

    /// Decode from the 16-byte export layout
    ///
    /// Unknown flag bits are kept as-is so nothing a newer producer sets is lost.
    pub fn from_bytes(bytes: &[u8; SAMPLE_WIRE_SIZE]) -> Self {
        let mut ts = [0u8; 8];
        let mut temp = [0u8; 4];
        let mut flags = [0u8; 4];
        ts.copy_from_slice(&bytes[0..8]);
        temp.copy_from_slice(&bytes[8..12]);
        flags.copy_from_slice(&bytes[12..16]);

        Self {
            timestamp_ns: u64::from_le_bytes(ts),
            temperature_mc: i32::from_le_bytes(temp),
            flags: SampleFlags::from_bits_retain(u32::from_le_bytes(flags)),
        }
    }
}
