//! Hierarchical simulation configuration schema.
//!
//! Internal field names are canonical snake_case; the external camelCase
//! spellings of the document format are declared once here as serde
//! rename/alias attributes, so the mapping never leaks past the boundary.
//! Every section rejects unknown keys; tolerance for unrecognized
//! *top-level* keys lives in [`crate::doc`].

use serde::{Deserialize, Serialize};

use scint_core::errors::{ErrorInfo, SimError};
use scint_core::geom::{Axis3, Size3Mm, Vec3Mm};

/// Scintillator block: placement, extents, optical material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScintillatorConfig {
    /// Scintillator center position.
    pub position_mm: Vec3Mm,
    /// Scintillator extents.
    pub dimension_mm: Size3Mm,
    /// Optical material definition.
    pub properties: ScintillatorProperties,
}

impl ScintillatorConfig {
    /// Z coordinate of the scintillator back face, in millimeters.
    pub fn back_face_z_mm(&self) -> f64 {
        self.position_mm.z_mm + 0.5 * self.dimension_mm.z_mm
    }
}

/// Optical material tables for the scintillator volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScintillatorProperties {
    /// Material name forwarded to the engine (for example `EJ200`).
    pub name: String,
    /// Photon energy sampling points in eV.
    #[serde(rename = "photonEnergy")]
    pub photon_energy: Vec<f64>,
    /// Refractive index at each photon energy sample.
    #[serde(rename = "rIndex")]
    pub r_index: Vec<f64>,
    /// Declared table entry count; both tables must match it.
    #[serde(rename = "nKEntries")]
    pub n_k_entries: usize,
    /// Scintillation decay time constant in nanoseconds.
    #[serde(rename = "timeConstant")]
    pub time_constant: f64,
}

impl ScintillatorProperties {
    fn validate(&self) -> Result<(), SimError> {
        if self.n_k_entries == 0 {
            return Err(SimError::Validation(
                ErrorInfo::new("material-table-empty", "material table entry count must be positive")
                    .with_context("field", "scintillator.properties.nKEntries")
                    .with_expected_actual("> 0", "0"),
            ));
        }
        for (field, len) in [
            ("scintillator.properties.photonEnergy", self.photon_energy.len()),
            ("scintillator.properties.rIndex", self.r_index.len()),
        ] {
            if len != self.n_k_entries {
                return Err(SimError::Validation(
                    ErrorInfo::new("material-table-length", "material table length must match nKEntries")
                        .with_context("field", field)
                        .with_expected_actual(self.n_k_entries.to_string(), len.to_string()),
                ));
            }
        }
        if !(self.time_constant > 0.0) {
            return Err(SimError::Validation(
                ErrorInfo::new("material-time-constant", "time constant must be positive")
                    .with_context("field", "scintillator.properties.timeConstant")
                    .with_expected_actual("> 0", self.time_constant.to_string()),
            ));
        }
        Ok(())
    }
}

/// Emission source block wrapping an explicit particle-gun specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Particle-gun specification.
    pub gps: ParticleGun,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), SimError> {
        if let Some(radius) = self.gps.position.radius_mm {
            if !(radius > 0.0) {
                return Err(SimError::Validation(
                    ErrorInfo::new("gun-radius", "gun position radius must be positive")
                        .with_context("field", "source.gps.position.radiusMm")
                        .with_expected_actual("> 0", radius.to_string()),
                ));
            }
        }
        if !(self.gps.energy.mono_mev > 0.0) {
            return Err(SimError::Validation(
                ErrorInfo::new("gun-energy", "gun energy must be positive")
                    .with_context("field", "source.gps.energy.monoMeV")
                    .with_expected_actual("> 0", self.gps.energy.mono_mev.to_string()),
            ));
        }
        Ok(())
    }
}

/// Particle-gun specification: species plus position, angular, and energy
/// distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParticleGun {
    /// Particle species (for example `neutron`).
    pub particle: String,
    /// Position distribution.
    pub position: GunPosition,
    /// Angular distribution; omitted for engine defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular: Option<GunAngular>,
    /// Energy distribution.
    pub energy: GunEnergy,
}

impl Default for ParticleGun {
    fn default() -> Self {
        Self {
            particle: "geantino".to_string(),
            position: GunPosition::default(),
            angular: None,
            energy: GunEnergy::default(),
        }
    }
}

/// Position distribution of the particle gun.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GunPosition {
    /// Distribution type (for example `Plane`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Planar shape when the type requires one (for example `Circle`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    /// Distribution center.
    #[serde(rename = "centerMm")]
    pub center_mm: Vec3Mm,
    /// Radius for circular shapes, in millimeters.
    #[serde(default, rename = "radiusMm", skip_serializing_if = "Option::is_none")]
    pub radius_mm: Option<f64>,
}

impl Default for GunPosition {
    fn default() -> Self {
        Self {
            kind: "Point".to_string(),
            shape: None,
            center_mm: Vec3Mm::default(),
            radius_mm: None,
        }
    }
}

/// Angular distribution of the particle gun.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GunAngular {
    /// Distribution type (for example `beam2d`).
    #[serde(rename = "type")]
    pub kind: String,
    /// First rotation axis of the angular reference frame.
    pub rot1: Axis3,
    /// Second rotation axis of the angular reference frame.
    pub rot2: Axis3,
    /// Mean emission direction.
    pub direction: Axis3,
}

/// Energy distribution of the particle gun.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GunEnergy {
    /// Distribution type (for example `Mono`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Monoenergetic line energy in MeV.
    #[serde(rename = "monoMeV")]
    pub mono_mev: f64,
}

impl Default for GunEnergy {
    fn default() -> Self {
        Self {
            kind: "Mono".to_string(),
            mono_mev: 1.0,
        }
    }
}

/// One lens entry in the optical stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LensDescriptor {
    /// Lens display name.
    pub name: String,
    /// Marks the reference lens used for default geometry derivation.
    pub primary: bool,
    /// Prescription file reference (path, filename, or stem).
    #[serde(rename = "zmxFile")]
    pub zmx_file: String,
}

/// Lens mount orientation: one shared flag or one flag per lens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrientationSpec {
    /// One flag applied to every lens in the stack.
    Shared(bool),
    /// One flag per lens, in stack order.
    PerLens(Vec<bool>),
}

impl Default for OrientationSpec {
    fn default() -> Self {
        Self::Shared(false)
    }
}

/// Envelope quantities the named diameter rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpticalEnvelope {
    /// Entrance (clear aperture) diameter of the primary lens, in
    /// millimeters.
    #[serde(rename = "entranceDiameter")]
    pub entrance_diameter_mm: f64,
    /// Maximum sensor width the image circle must cover, in millimeters.
    #[serde(rename = "sensorMaxWidth")]
    pub sensor_max_width_mm: f64,
}

/// Detector shapes understood by the geometry resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorShape {
    /// Circular sensitive area behind a circular aperture mask.
    Circle,
    /// Square sensitive area with no aperture mask.
    Square,
}

/// Sensitive detector placement, sizing rule, and overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensitiveDetectorConfig {
    /// Transverse center X, in millimeters.
    #[serde(default, rename = "posXMm")]
    pub pos_x_mm: f64,
    /// Transverse center Y, in millimeters.
    #[serde(default, rename = "posYMm")]
    pub pos_y_mm: f64,
    /// Axial gap between the scintillator back face and the detector front
    /// face. Stored in centimeters; normalized during resolution.
    #[serde(rename = "standoffCm")]
    pub standoff_cm: f64,
    /// Detector thickness in millimeters.
    #[serde(
        default = "SensitiveDetectorConfig::default_thickness_mm",
        rename = "thicknessMm"
    )]
    pub thickness_mm: f64,
    /// Detector shape; circular shapes enable the aperture mask.
    pub shape: DetectorShape,
    /// Named sizing rule evaluated against the optical envelope.
    #[serde(rename = "diameterRule")]
    pub diameter_rule: String,
    /// Explicit detector diameter override, in millimeters.
    #[serde(default, rename = "diameterMm", skip_serializing_if = "Option::is_none")]
    pub diameter_mm: Option<f64>,
    /// Explicit aperture radius override, in millimeters.
    #[serde(
        default,
        rename = "apertureRadiusMm",
        skip_serializing_if = "Option::is_none"
    )]
    pub aperture_radius_mm: Option<f64>,
}

impl SensitiveDetectorConfig {
    fn default_thickness_mm() -> f64 {
        0.1
    }

    fn validate(&self) -> Result<(), SimError> {
        if !(self.thickness_mm > 0.0) {
            return Err(SimError::Validation(
                ErrorInfo::new("detector-thickness", "detector thickness must be positive")
                    .with_context("field", "optical.sensitiveDetectorConfig.thicknessMm")
                    .with_expected_actual("> 0", self.thickness_mm.to_string()),
            ));
        }
        for (field, value) in [
            ("optical.sensitiveDetectorConfig.diameterMm", self.diameter_mm),
            (
                "optical.sensitiveDetectorConfig.apertureRadiusMm",
                self.aperture_radius_mm,
            ),
        ] {
            if let Some(value) = value {
                if !(value > 0.0) {
                    return Err(SimError::Validation(
                        ErrorInfo::new("detector-diameter-override", "override must be positive")
                            .with_context("field", field)
                            .with_expected_actual("> 0", value.to_string()),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Optical train: lens stack, envelope quantities, sensitive detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpticalConfig {
    /// Ordered lens descriptors; one or two entries, exactly one primary.
    pub lenses: Vec<LensDescriptor>,
    /// Mount orientation per lens.
    #[serde(default)]
    pub reversed: OrientationSpec,
    /// Envelope quantities derived from the lens datasheet.
    pub geometry: OpticalEnvelope,
    /// Sensitive detector placement and sizing.
    #[serde(rename = "sensitiveDetectorConfig")]
    pub sensitive_detector: SensitiveDetectorConfig,
}

impl OpticalConfig {
    fn validate(&self) -> Result<(), SimError> {
        let count = self.lenses.len();
        if !(1..=2).contains(&count) {
            return Err(SimError::Validation(
                ErrorInfo::new("lens-count", "lens stack must hold one or two lenses")
                    .with_context("field", "optical.lenses")
                    .with_expected_actual("1..=2", count.to_string()),
            ));
        }
        let primaries = self.lenses.iter().filter(|lens| lens.primary).count();
        if primaries != 1 {
            return Err(SimError::Validation(
                ErrorInfo::new("lens-primary", "exactly one lens must be marked primary")
                    .with_context("field", "optical.lenses")
                    .with_expected_actual("1", primaries.to_string()),
            ));
        }
        if let OrientationSpec::PerLens(flags) = &self.reversed {
            if flags.len() != count {
                return Err(SimError::Validation(
                    ErrorInfo::new(
                        "orientation-cardinality",
                        "orientation flag list length must match lens count",
                    )
                    .with_context("field", "optical.reversed")
                    .with_expected_actual(count.to_string(), flags.len().to_string()),
                ));
            }
        }
        for (field, value) in [
            ("optical.geometry.entranceDiameter", self.geometry.entrance_diameter_mm),
            ("optical.geometry.sensorMaxWidth", self.geometry.sensor_max_width_mm),
        ] {
            if !(value > 0.0) {
                return Err(SimError::Validation(
                    ErrorInfo::new("envelope-nonpositive", "envelope quantity must be positive")
                        .with_context("field", field)
                        .with_expected_actual("> 0", value.to_string()),
                ));
            }
        }
        self.sensitive_detector.validate()
    }

    /// Returns the primary lens descriptor. Validation guarantees exactly
    /// one exists.
    pub fn primary_lens(&self) -> Option<&LensDescriptor> {
        self.lenses.iter().find(|lens| lens.primary)
    }

    /// Whether the primary lens is mounted reversed.
    pub fn primary_reversed(&self) -> bool {
        match &self.reversed {
            OrientationSpec::Shared(flag) => *flag,
            OrientationSpec::PerLens(flags) => {
                let index = self
                    .lenses
                    .iter()
                    .position(|lens| lens.primary)
                    .unwrap_or(0);
                flags.get(index).copied().unwrap_or(false)
            }
        }
    }
}

/// Output routing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputInfo {
    /// Directory receiving output data files.
    #[serde(rename = "DataDirectory")]
    pub data_directory: String,
    /// Directory receiving log files.
    #[serde(rename = "LogDirectory")]
    pub log_directory: String,
    /// Output file format (for example `hdf5`).
    #[serde(rename = "OutputFormat")]
    pub output_format: String,
    /// Output file base name; the engine default is used when omitted.
    #[serde(default, rename = "Filename", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Simulation metadata block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataConfig {
    /// Document author.
    pub author: String,
    /// Document date stamp.
    pub date: String,
    /// Producing tool version string.
    pub version: String,
    /// Free-form run description.
    pub description: String,
    /// Working directory for the run.
    #[serde(rename = "WorkingDirectory")]
    pub working_directory: String,
    /// Output routing block.
    #[serde(rename = "OutputInfo")]
    pub output_info: OutputInfo,
    /// Run identifier used for output routing and stage folders.
    #[serde(rename = "SimulationRunID")]
    pub simulation_run_id: String,
}

/// Optional run-control block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of primary particles for the run-execution command.
    #[serde(
        default,
        rename = "numberOfParticles",
        skip_serializing_if = "Option::is_none"
    )]
    pub number_of_particles: Option<u64>,
    /// Engine verbosity and bookkeeping controls.
    #[serde(
        default,
        rename = "runtimeControls",
        skip_serializing_if = "Option::is_none"
    )]
    pub runtime_controls: Option<RuntimeControls>,
}

/// Engine verbosity and bookkeeping controls emitted before run
/// initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeControls {
    /// `/control/verbose` level.
    #[serde(default, rename = "controlVerbose", skip_serializing_if = "Option::is_none")]
    pub control_verbose: Option<u32>,
    /// `/run/verbose` level.
    #[serde(default, rename = "runVerbose", skip_serializing_if = "Option::is_none")]
    pub run_verbose: Option<u32>,
    /// `/event/verbose` level.
    #[serde(default, rename = "eventVerbose", skip_serializing_if = "Option::is_none")]
    pub event_verbose: Option<u32>,
    /// `/tracking/verbose` level.
    #[serde(default, rename = "trackingVerbose", skip_serializing_if = "Option::is_none")]
    pub tracking_verbose: Option<u32>,
    /// Progress report interval in events.
    #[serde(default, rename = "printProgress", skip_serializing_if = "Option::is_none")]
    pub print_progress: Option<u32>,
    /// Whether trajectories are stored during tracking.
    #[serde(default, rename = "storeTrajectory", skip_serializing_if = "Option::is_none")]
    pub store_trajectory: Option<bool>,
}

/// Top-level validated simulation configuration.
///
/// Field order here is the canonical section order of the written document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Scintillator block.
    pub scintillator: ScintillatorConfig,
    /// Emission source; omitted when the run carries no gun block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceConfig>,
    /// Optical train.
    pub optical: OpticalConfig,
    /// Metadata block.
    #[serde(rename = "Metadata", alias = "metadata")]
    pub metadata: MetadataConfig,
    /// Optional run-control block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationConfig>,
}

impl SimConfig {
    /// Checks every structural invariant. Runs identically at construction
    /// and after every bulk update; callers never observe a transiently
    /// invalid value.
    pub fn validate(&self) -> Result<(), SimError> {
        self.scintillator
            .dimension_mm
            .validate("scintillator.dimension_mm")?;
        self.scintillator.properties.validate()?;
        if let Some(source) = &self.source {
            source.validate()?;
        }
        self.optical.validate()
    }
}

/// Returns a small valid configuration for bootstrapping and tests.
pub fn default_sim_config() -> SimConfig {
    SimConfig {
        scintillator: ScintillatorConfig {
            position_mm: Vec3Mm::new(0.0, 0.0, 0.0),
            dimension_mm: Size3Mm::new(100.0, 100.0, 20.0),
            properties: ScintillatorProperties {
                name: "EJ200".to_string(),
                photon_energy: vec![2.8, 3.0, 3.2],
                r_index: vec![1.58, 1.59, 1.60],
                n_k_entries: 3,
                time_constant: 2.1,
            },
        },
        source: Some(SourceConfig {
            gps: ParticleGun {
                particle: "neutron".to_string(),
                position: GunPosition {
                    kind: "Plane".to_string(),
                    shape: Some("Circle".to_string()),
                    center_mm: Vec3Mm::new(0.0, 0.0, -100.0),
                    radius_mm: Some(10.0),
                },
                angular: Some(GunAngular {
                    kind: "beam2d".to_string(),
                    rot1: Axis3::new(1.0, 0.0, 0.0),
                    rot2: Axis3::new(0.0, 1.0, 0.0),
                    direction: Axis3::new(0.0, 0.0, 1.0),
                }),
                energy: GunEnergy {
                    kind: "Mono".to_string(),
                    mono_mev: 6.0,
                },
            },
        }),
        optical: OpticalConfig {
            lenses: vec![LensDescriptor {
                name: "CanonEF50mmf1.0L".to_string(),
                primary: true,
                zmx_file: "CanonEF50mmf1.0L.zmx".to_string(),
            }],
            reversed: OrientationSpec::Shared(false),
            geometry: OpticalEnvelope {
                entrance_diameter_mm: 60.55,
                sensor_max_width_mm: 36.0,
            },
            sensitive_detector: SensitiveDetectorConfig {
                pos_x_mm: 0.0,
                pos_y_mm: 0.0,
                standoff_cm: 20.0,
                thickness_mm: 0.1,
                shape: DetectorShape::Circle,
                diameter_rule: "min(entranceDiameter,sensorMaxWidth)".to_string(),
                diameter_mm: None,
                aperture_radius_mm: None,
            },
        },
        metadata: MetadataConfig {
            author: "Your Name".to_string(),
            date: "1970-01-01".to_string(),
            version: "0.1.0".to_string(),
            description: "Scintillator and optical system simulation.".to_string(),
            working_directory: ".".to_string(),
            output_info: OutputInfo {
                data_directory: "data".to_string(),
                log_directory: "data/logs".to_string(),
                output_format: "hdf5".to_string(),
                filename: None,
            },
            simulation_run_id: "sim_001".to_string(),
        },
        simulation: None,
    }
}
