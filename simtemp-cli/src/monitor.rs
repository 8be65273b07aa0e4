//! Read loop: start the engine, print samples until the count is reached

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};
use simtemp_core::constants::timing::US_PER_MS;
use simtemp_core::{Engine, EngineConfig};

use crate::cli::Cli;
use crate::exit_codes;
use crate::output;

pub fn execute(cli: Cli) -> i32 {
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("{}", msg);
            return exit_codes::CONFIG;
        }
    };

    let engine = match Engine::start(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Failed to start engine: {}", e);
            return exit_codes::FAILURE;
        }
    };

    if cli.uses_defaults() {
        if let Err(e) = print_parameters(&engine) {
            warn!("Could not print parameters: {}", e);
        }
    }

    let code = read_loop(&engine, &cli);
    let drained = engine.shutdown();
    debug!("Discarded {} unread samples", drained);
    info!("{}", engine.stats_report().trim_end());
    code
}

/// Configuration file (or defaults) with command-line flags applied on top
fn build_config(cli: &Cli) -> Result<EngineConfig, String> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    if let Some(period_us) = cli.sampling_us {
        config.period_us = period_us;
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(threshold_mc) = cli.threshold_mc {
        config.threshold_mc = threshold_mc;
    }
    Ok(config)
}

fn load_config(path: &Path) -> Result<EngineConfig, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid config '{}': {}", path.display(), e))
}

fn print_parameters(engine: &Engine) -> std::io::Result<()> {
    let config = engine.config();
    output::write_line(&format!(
        "Sampling rate: {}ms | {}us",
        config.period_us as f64 / US_PER_MS as f64,
        config.period_us
    ))?;
    output::write_line(&format!("Mode: {}", config.mode))?;
    output::write_line(&format!("Temperature threshold: {} m°C", config.threshold_mc))
}

fn read_loop(engine: &Engine, cli: &Cli) -> i32 {
    let reader = engine.reader();
    let timeout = Duration::from_millis(cli.timeout_ms);
    let mut printed = 0u64;

    while cli.count.map_or(true, |count| printed < count) {
        let Some(sample) = reader.read_timeout(timeout) else {
            if let Err(e) = output::write_line("Timeout waiting for data.") {
                return write_failed(e);
            }
            continue;
        };

        let line = if cli.json {
            match output::format_json(&sample) {
                Ok(line) => line,
                Err(msg) => {
                    eprintln!("{}", msg);
                    return exit_codes::FAILURE;
                }
            }
        } else {
            output::format_text(&sample)
        };

        if let Err(e) = output::write_line(&line) {
            return write_failed(e);
        }
        printed += 1;
    }

    exit_codes::SUCCESS
}

fn write_failed(e: std::io::Error) -> i32 {
    if e.kind() == std::io::ErrorKind::BrokenPipe {
        // Downstream closed (e.g. `| head`), not an error
        return exit_codes::SUCCESS;
    }
    eprintln!("Failed to write to stdout: {}", e);
    exit_codes::FAILURE
}
