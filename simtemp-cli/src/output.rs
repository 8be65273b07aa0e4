use std::io::{self, Write};

use serde::Serialize;
use simtemp_core::constants::timing::NS_PER_SECOND;
use simtemp_core::Sample;

/// One sample as printed with `--json`
#[derive(Serialize, Debug, PartialEq)]
pub struct SampleLine {
    pub timestamp_ns: u64,
    pub temperature_mc: i32,
    pub alert: bool,
}

impl From<&Sample> for SampleLine {
    fn from(sample: &Sample) -> Self {
        Self {
            timestamp_ns: sample.timestamp_ns,
            temperature_mc: sample.temperature_mc,
            alert: sample.is_alert(),
        }
    }
}

/// `<secs>.<ms> temp=21.0C alert=0`, timestamp relative to engine start
pub fn format_text(sample: &Sample) -> String {
    let secs = sample.timestamp_ns / NS_PER_SECOND;
    let millis = (sample.timestamp_ns % NS_PER_SECOND) / 1_000_000;
    format!(
        "{}.{:03} temp={:.1}C alert={}",
        secs,
        millis,
        sample.temperature_mc as f64 / 1000.0,
        u8::from(sample.is_alert())
    )
}

pub fn format_json(sample: &Sample) -> Result<String, String> {
    serde_json::to_string(&SampleLine::from(sample))
        .map_err(|e| format!("JSON serialization failed: {}", e))
}

/// Write one line to stdout
pub fn write_line(line: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(line.as_bytes())?;
    handle.write_all(b"\n")?;
    handle.flush()
}
