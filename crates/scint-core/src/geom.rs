//! Millimeter-space vector and extent primitives.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SimError};

/// 3D position in millimeters. Components may carry any sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Vec3Mm {
    /// X component in millimeters.
    pub x_mm: f64,
    /// Y component in millimeters.
    pub y_mm: f64,
    /// Z component in millimeters.
    pub z_mm: f64,
}

impl Vec3Mm {
    /// Creates a position from its components.
    pub const fn new(x_mm: f64, y_mm: f64, z_mm: f64) -> Self {
        Self { x_mm, y_mm, z_mm }
    }
}

/// 3D extents in millimeters. Every component must be strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Size3Mm {
    /// X extent in millimeters.
    pub x_mm: f64,
    /// Y extent in millimeters.
    pub y_mm: f64,
    /// Z extent in millimeters.
    pub z_mm: f64,
}

impl Size3Mm {
    /// Creates an extent from its components. Positivity is enforced by
    /// [`Size3Mm::validate`], not here, so deserialized values share one
    /// checking path with constructed ones.
    pub const fn new(x_mm: f64, y_mm: f64, z_mm: f64) -> Self {
        Self { x_mm, y_mm, z_mm }
    }

    /// Checks that every component is strictly positive. `field` names the
    /// owning configuration field in the error context.
    pub fn validate(&self, field: &str) -> Result<(), SimError> {
        for (axis, value) in [("x_mm", self.x_mm), ("y_mm", self.y_mm), ("z_mm", self.z_mm)] {
            if !(value > 0.0) {
                return Err(SimError::Validation(
                    ErrorInfo::new("extent-nonpositive", "extent component must be positive")
                        .with_context("field", format!("{field}.{axis}"))
                        .with_expected_actual("> 0", value.to_string()),
                ));
            }
        }
        Ok(())
    }
}

/// Unitless direction or rotation triple used by particle-gun commands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Axis3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Axis3 {
    /// Creates a triple from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
