//! Parsed per-surface prescription records.

use serde::{Deserialize, Serialize};

/// One parsed surface block from a sequential lens prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensSurface {
    /// Surface index as written in the prescription (`SURF n`).
    pub index: u32,
    /// Semi-diameter reported for this surface, in millimeters. Zero when
    /// the block carries no positive diameter token.
    pub semi_diameter_mm: f64,
    /// Finite axial spacing to the next surface, in millimeters. `None`
    /// when the prescription marks the spacing as infinite (object-space
    /// legs).
    pub space_to_next_mm: Option<f64>,
    /// Whether the surface block references a glass material.
    pub has_glass: bool,
}
