//! Geometry resolution: detector sizing, aperture, and axial placement.

use scint_core::errors::{ErrorInfo, SimError};
use scint_core::units::{quantize_mm, MM_PER_CM};
use scint_optics::LensModel;

use crate::schema::{DetectorShape, OpticalEnvelope, SimConfig};

/// Named sizing rules accepted for the sensitive detector diameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiameterRule {
    /// Smaller of the entrance diameter and the sensor max width.
    MinEntranceSensor,
    /// Entrance (clear aperture) diameter.
    EntranceDiameter,
    /// Sensor max width.
    SensorMaxWidth,
}

impl DiameterRule {
    /// Parses the exact rule spelling; any other string is a conflict.
    pub fn parse(rule: &str) -> Result<Self, SimError> {
        match rule {
            "min(entranceDiameter,sensorMaxWidth)" => Ok(Self::MinEntranceSensor),
            "entranceDiameter" => Ok(Self::EntranceDiameter),
            "sensorMaxWidth" => Ok(Self::SensorMaxWidth),
            other => Err(SimError::Conflict(
                ErrorInfo::new("diameter-rule-unknown", "unsupported diameter rule")
                    .with_context("rule", other)
                    .with_hint(
                        "expected min(entranceDiameter,sensorMaxWidth), entranceDiameter, \
                         or sensorMaxWidth",
                    ),
            )),
        }
    }

    /// Evaluates the rule against the optical envelope.
    pub fn evaluate(&self, envelope: &OpticalEnvelope) -> f64 {
        match self {
            Self::MinEntranceSensor => envelope
                .entrance_diameter_mm
                .min(envelope.sensor_max_width_mm),
            Self::EntranceDiameter => envelope.entrance_diameter_mm,
            Self::SensorMaxWidth => envelope.sensor_max_width_mm,
        }
    }
}

/// Geometry values derived from a validated configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedGeometry {
    /// Interface plate width (`sizeX` == `sizeY`), in millimeters.
    pub interface_size_mm: f64,
    /// Sensitive detector diameter, in millimeters.
    pub detector_diameter_mm: f64,
    /// Aperture mask radius; `None` when the mask is disabled.
    pub aperture_radius_mm: Option<f64>,
    /// Interface center Z in millimeters, quantized to micron precision.
    pub interface_center_z_mm: f64,
}

/// Resolves detector sizing, aperture, and axial placement.
///
/// `lens` supplies the orientation-dependent default (clear diameter in
/// forward mount, image-circle diameter reversed) when the configuration
/// carries no explicit override; pass `None` to resolve from the envelope
/// alone. Derived values are recomputed on every call; nothing is cached.
pub fn resolve_geometry(
    config: &SimConfig,
    lens: Option<&LensModel>,
) -> Result<ResolvedGeometry, SimError> {
    let detector = &config.optical.sensitive_detector;
    let envelope = &config.optical.geometry;

    let lens_default = lens.map(|model| {
        if config.optical.primary_reversed() {
            model.image_circle_diameter_mm
        } else {
            model.clear_diameter_mm
        }
    });

    let detector_diameter_mm = match (detector.diameter_mm, lens_default) {
        (Some(explicit), _) => explicit,
        (None, Some(default)) => default,
        (None, None) => DiameterRule::parse(&detector.diameter_rule)?.evaluate(envelope),
    };

    let interface_size_mm = detector
        .diameter_mm
        .or(lens_default)
        .unwrap_or(envelope.entrance_diameter_mm);

    let aperture_radius_mm = match detector.shape {
        DetectorShape::Square => None,
        DetectorShape::Circle => Some(
            detector
                .aperture_radius_mm
                .unwrap_or(0.5 * detector_diameter_mm),
        ),
    };

    let scint = &config.scintillator;
    let back_face_z_mm = scint.back_face_z_mm();
    let standoff_mm = detector.standoff_cm * MM_PER_CM;
    let interface_center_z_mm =
        quantize_mm(back_face_z_mm + standoff_mm + 0.5 * detector.thickness_mm);

    if !(detector_diameter_mm > 0.0) {
        return Err(SimError::Validation(
            ErrorInfo::new("detector-diameter", "resolved detector diameter must be positive")
                .with_context("field", "optical.sensitiveDetectorConfig")
                .with_expected_actual("> 0", detector_diameter_mm.to_string()),
        ));
    }
    if !(interface_size_mm > 0.0) {
        return Err(SimError::Validation(
            ErrorInfo::new("interface-size", "resolved interface size must be positive")
                .with_context("field", "optical.geometry")
                .with_expected_actual("> 0", interface_size_mm.to_string()),
        ));
    }
    if let Some(radius) = aperture_radius_mm {
        let half_diagonal_mm =
            (0.5 * scint.dimension_mm.x_mm).hypot(0.5 * scint.dimension_mm.y_mm);
        if radius > half_diagonal_mm {
            return Err(SimError::Validation(
                ErrorInfo::new(
                    "aperture-radius-extent",
                    "aperture radius exceeds the scintillator face",
                )
                .with_context("field", "optical.sensitiveDetectorConfig.apertureRadiusMm")
                .with_expected_actual(format!("<= {half_diagonal_mm}"), radius.to_string()),
            ));
        }
    }
    if !(interface_center_z_mm > back_face_z_mm) {
        return Err(SimError::Validation(
            ErrorInfo::new(
                "interface-position",
                "interface center must sit beyond the scintillator back face",
            )
            .with_context("field", "optical.sensitiveDetectorConfig.standoffCm")
            .with_expected_actual(
                format!("> {back_face_z_mm}"),
                interface_center_z_mm.to_string(),
            ),
        ));
    }

    Ok(ResolvedGeometry {
        interface_size_mm,
        detector_diameter_mm,
        aperture_radius_mm,
        interface_center_z_mm,
    })
}
