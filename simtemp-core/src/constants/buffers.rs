//! Buffer Sizes

/// Capacity of the sample ring shared by the producer and all readers.
///
/// 256 samples × 16 bytes = 4 KiB. At the default 100 ms period this holds
/// about 25 seconds of history before the oldest samples are evicted.
/// Must be a power of two so index wrapping reduces to a mask.
pub const SAMPLE_RING_CAPACITY: usize = 256;

const _: () = assert!(
    SAMPLE_RING_CAPACITY.is_power_of_two(),
    "Sample ring capacity must be power of 2"
);
