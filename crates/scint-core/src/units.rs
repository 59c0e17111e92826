//! Unit conversion and numeric formatting for macro command values.
//!
//! The canonical internal length unit is the millimeter. Macro files carry
//! explicit unit tokens after every length value, so both directions of the
//! codec funnel through the conversions here.

use crate::errors::{ErrorInfo, SimError};

/// Millimeters per centimeter, for configuration fields stored in
/// centimeter units.
pub const MM_PER_CM: f64 = 10.0;

/// Converts a numeric magnitude with a macro length-unit token into
/// millimeters. Unit tokens are matched case-insensitively and accept the
/// short and long spellings used by the engine.
pub fn length_to_mm(value: f64, unit: &str) -> Result<f64, SimError> {
    let factor = match unit.trim().to_ascii_lowercase().as_str() {
        "nm" | "nanometer" | "nanometers" => 1.0e-6,
        "um" | "micrometer" | "micrometers" => 1.0e-3,
        "mm" | "millimeter" | "millimeters" => 1.0,
        "cm" | "centimeter" | "centimeters" => 10.0,
        "m" | "meter" | "meters" => 1000.0,
        _ => {
            return Err(SimError::Format(
                ErrorInfo::new("unit-unknown", "unsupported length unit")
                    .with_context("unit", unit.trim()),
            ))
        }
    };
    Ok(value * factor)
}

/// Converts a numeric magnitude with an energy-unit token into MeV.
pub fn energy_to_mev(value: f64, unit: &str) -> Result<f64, SimError> {
    let factor = match unit.trim().to_ascii_lowercase().as_str() {
        "ev" => 1.0e-6,
        "kev" => 1.0e-3,
        "mev" => 1.0,
        "gev" => 1.0e3,
        _ => {
            return Err(SimError::Format(
                ErrorInfo::new("unit-unknown", "unsupported energy unit")
                    .with_context("unit", unit.trim()),
            ))
        }
    };
    Ok(value * factor)
}

/// Formats a numeric command value in the general unpadded form the engine
/// expects: `18`, `60.55`, `-100`.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Quantizes a derived placement to micron precision so repeated
/// derivations emit byte-identical values.
pub fn quantize_mm(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
