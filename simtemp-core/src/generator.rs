//! Synthetic temperature generation
//!
//! Three modes:
//! - **Normal**: Gaussian around the mean with the small stddev
//! - **Noisy**: same, with the large stddev
//! - **Ramp**: previous value plus a fixed step, wrapping over
//!   `[TEMP_MIN_MC, TEMP_MAX_MC]` so the ramp cycles forever
//!
//! Normal and Noisy differ only in `Config::stddev_mc`, which the
//! configuration store derives when the mode is set. The generator itself
//! just dispatches on the mode.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::config::{Config, Mode};
use crate::constants::sensor::{
    INITIAL_TEMP_MC, RAMP_STEP_MC, TEMP_MAX_MC, TEMP_MEAN_MC, TEMP_MIN_MC, TEMP_SPAN_MC,
};
use crate::gaussian::approximate_normal;

/// Mode-independent generator parameters, fixed at engine start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorParams {
    /// Centre of the Gaussian modes (m°C)
    pub mean_mc: i32,
    /// Per-firing increment in ramp mode (m°C), may be negative
    pub ramp_step_mc: i32,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            mean_mc: TEMP_MEAN_MC,
            ramp_step_mc: RAMP_STEP_MC,
        }
    }
}

/// Output of one generation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generated {
    /// New temperature (m°C), always within `[TEMP_MIN_MC, TEMP_MAX_MC]`
    pub temperature_mc: i32,
    /// Strictly above the configured threshold
    pub crossed: bool,
}

/// Next ramp value: `((previous + step - MIN) mod (MAX - MIN + 1)) + MIN`
///
/// Uses the Euclidean remainder so negative steps wrap downwards too.
pub fn ramp_next(previous_mc: i32, step_mc: i32) -> i32 {
    let offset = previous_mc as i64 + step_mc as i64 - TEMP_MIN_MC as i64;
    (offset.rem_euclid(TEMP_SPAN_MC) + TEMP_MIN_MC as i64) as i32
}

/// Compute the next temperature from the configuration and the previous value
///
/// Pure apart from the draws taken from `rng`; has no failure states.
pub fn next_sample<R: RngCore + ?Sized>(
    config: &Config,
    params: &GeneratorParams,
    previous_mc: i32,
    rng: &mut R,
) -> Generated {
    let temperature_mc = match config.mode {
        Mode::Normal | Mode::Noisy => {
            approximate_normal(rng, params.mean_mc, config.stddev_mc)
                .clamp(TEMP_MIN_MC, TEMP_MAX_MC)
        }
        Mode::Ramp => ramp_next(previous_mc, params.ramp_step_mc),
    };

    Generated {
        temperature_mc,
        crossed: temperature_mc > config.threshold_mc,
    }
}

/// Stateful generator: remembers the previous value and owns the RNG
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    params: GeneratorParams,
    previous_mc: i32,
    rng: StdRng,
}

impl SampleGenerator {
    /// Seeded generator; `None` seeds from OS entropy
    pub fn new(params: GeneratorParams, initial_mc: i32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            params,
            previous_mc: initial_mc.clamp(TEMP_MIN_MC, TEMP_MAX_MC),
            rng,
        }
    }

    /// Produce the next value and remember it
    pub fn next(&mut self, config: &Config) -> Generated {
        let generated = next_sample(config, &self.params, self.previous_mc, &mut self.rng);
        self.previous_mc = generated.temperature_mc;
        generated
    }

    /// Last produced temperature (or the initial one)
    pub fn previous_mc(&self) -> i32 {
        self.previous_mc
    }
}

impl Default for SampleGenerator {
    fn default() -> Self {
        Self::new(GeneratorParams::default(), INITIAL_TEMP_MC, None)
    }
}
