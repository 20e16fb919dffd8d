//! CLI command implementations.

pub mod construct;
pub mod lookup;

use objcat_core::Custody;
use std::time::Duration;

/// Parses a custody name.
pub fn parse_custody(name: &str) -> Result<Custody, Box<dyn std::error::Error>> {
    match name {
        "strong" => Ok(Custody::Strong),
        "weak" => Ok(Custody::Weak),
        other => Err(format!("Unknown custody {other:?} (expected strong or weak)").into()),
    }
}

/// Converts a duration to fractional milliseconds.
pub fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
