use std::path::PathBuf;

use clap::Parser;
use simtemp_core::constants::timing::{DEFAULT_READ_TIMEOUT_MS, PERIOD_MAX_US, PERIOD_MIN_US, US_PER_MS};
use simtemp_core::{parse_threshold_mc, Mode};

#[derive(Parser, Debug)]
#[command(
    name = "simtemp",
    version,
    about = "Simulated temperature sensor monitor",
    long_about = "Runs the simtemp sampling engine and prints every sample as it arrives.\n\
                  Simulates a sensor in a 20 °C room. Example: simtemp -s200 -mr -t20000"
)]
pub struct Cli {
    /// Sampling period in milliseconds, limits: [0.05, 10000]
    #[arg(short = 's', long = "sampling-ms", value_name = "MS", value_parser = parse_sampling_ms)]
    pub sampling_us: Option<u32>,

    /// Mode: d (default/normal), n (noisy), r (ramp)
    #[arg(short, long, value_name = "d|n|r", value_parser = parse_mode_flag)]
    pub mode: Option<Mode>,

    /// Alert threshold in m°C, limits: [-50000, 100000]
    #[arg(short, long = "threshold-mc", value_name = "MC", allow_hyphen_values = true, value_parser = parse_threshold)]
    pub threshold_mc: Option<i32>,

    /// Stop after this many samples
    #[arg(short, long)]
    pub count: Option<u64>,

    /// Engine configuration file (JSON); flags override its values
    #[arg(long, env = "SIMTEMP_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print one JSON object per sample
    #[arg(long)]
    pub json: bool,

    /// How long to wait for a sample before reporting a timeout
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT_MS, value_name = "MS")]
    pub timeout_ms: u64,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// True when no setting was given, so the defaults are shown instead
    pub fn uses_defaults(&self) -> bool {
        self.sampling_us.is_none()
            && self.mode.is_none()
            && self.threshold_mc.is_none()
            && self.config.is_none()
    }
}

/// Milliseconds (fractional) to whole microseconds
pub fn parse_sampling_ms(text: &str) -> Result<u32, String> {
    let ms: f64 = text
        .trim()
        .parse()
        .map_err(|e| format!("Invalid sampling_rate_ms: {}", e))?;

    let min_ms = PERIOD_MIN_US as f64 / US_PER_MS as f64;
    let max_ms = PERIOD_MAX_US as f64 / US_PER_MS as f64;
    if !ms.is_finite() || ms < min_ms || ms > max_ms {
        return Err(format!(
            "sampling_rate_ms out of range: limits: [{}, {}]",
            min_ms, max_ms
        ));
    }

    Ok((ms * US_PER_MS as f64).round() as u32)
}

pub fn parse_mode_flag(text: &str) -> Result<Mode, String> {
    match text {
        "d" => Ok(Mode::Normal),
        "n" => Ok(Mode::Noisy),
        "r" => Ok(Mode::Ramp),
        other => Err(format!("Invalid mode: {} (expected d, n or r)", other)),
    }
}

pub fn parse_threshold(text: &str) -> Result<i32, String> {
    parse_threshold_mc(text).map_err(|e| e.to_string())
}
