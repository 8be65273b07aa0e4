//! Integer Gaussian approximation (Central Limit Theorem)
//!
//! ## Method
//!
//! Summing `N` independent uniform draws gives an approximately normal value.
//! Each `u32` draw spans `S = 2^32` values, so its variance is `S²/12`. With
//! `N = 12` the sum's variance is exactly `S²`, i.e. its standard deviation
//! is `S` itself, so normalising needs no square root:
//!
//! ```text
//! z      = (Σ draws − N·S/2) / S          ~ N(0, 1)
//! sample = mean + z · stddev
//! ```
//!
//! Division by `S` is done in 16.16 fixed point to stay in integers:
//!
//! ```text
//! scaled = (centered << 16) / S           // z in 16.16
//! sample = mean + (scaled · stddev) >> 16
//! ```
//!
//! Magnitudes: `|centered| ≤ 6·2^32 ≈ 2^34.6`, shifted ≈ `2^50.6`, well inside
//! `i64`. The result is saturated into `i32`; range clamping is the caller's
//! job.

use rand::RngCore;

/// Number of uniform draws summed per sample
pub const CLT_DRAWS: i64 = 12;

/// Number of distinct values of one uniform draw (`u32`)
pub const UNIFORM_SPAN: i64 = 1 << 32;

/// Fractional bits used for the fixed-point rescale
pub const FIXED_POINT_SHIFT: u32 = 16;

/// Draw one approximately normal integer with the given mean and stddev
///
/// Never fails. Values beyond ±6σ cannot occur (the sum is bounded), and
/// the tails are slightly lighter than a true Gaussian.
pub fn approximate_normal<R: RngCore + ?Sized>(rng: &mut R, mean: i32, stddev: i32) -> i32 {
    let sum: i64 = (0..CLT_DRAWS).map(|_| rng.next_u32() as i64).sum();
    let centered = sum - CLT_DRAWS * (UNIFORM_SPAN / 2);

    let scaled = (centered << FIXED_POINT_SHIFT) / UNIFORM_SPAN;
    let offset = (scaled * stddev as i64) >> FIXED_POINT_SHIFT;

    (mean as i64 + offset).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
