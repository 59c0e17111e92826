//! Immutable lens metadata derived from a parsed prescription.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::surface::LensSurface;

/// Aggregate lens geometry extracted from one prescription.
///
/// Instances are derived data: rebuilt from file content on every parse,
/// never mutated afterwards, and never cached across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensModel {
    /// Lens name (file stem unless overridden by the caller).
    pub name: String,
    /// Source prescription path when parsed from disk.
    pub source: Option<PathBuf>,
    /// Ordered surface records as they appear in the prescription.
    pub surfaces: Vec<LensSurface>,
    /// Largest positive semi-diameter across all surfaces, in millimeters.
    pub max_semi_diameter_mm: f64,
    /// Clear aperture diameter: twice the maximum semi-diameter.
    pub clear_diameter_mm: f64,
    /// Sum of finite spacings over all surfaces with index above zero.
    pub total_track_mm: f64,
    /// Sum of finite spacings restricted to the index range spanning the
    /// first through last glass-tagged surface. Isolates the physical lens
    /// assembly from long free-space object and image legs.
    pub group_length_mm: f64,
    /// Index of the image surface (highest surface index).
    pub image_surface_index: u32,
    /// Semi-diameter reported on the image surface, in millimeters.
    pub image_semi_diameter_mm: f64,
    /// Image-circle diameter: twice the image semi-diameter.
    pub image_circle_diameter_mm: f64,
    /// Width of the 3:2 sensor rectangle whose diagonal equals the image
    /// circle diameter.
    pub sensor_width_mm: f64,
    /// Height of the same 3:2 sensor rectangle.
    pub sensor_height_mm: f64,
}
