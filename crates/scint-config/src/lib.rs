#![deny(missing_docs)]
#![doc = "Strictly validated simulation configuration schema and derived geometry resolution."]

/// YAML document boundary helpers.
pub mod doc;
/// Stable configuration hashing for run provenance.
pub mod hash;
/// Detector sizing, aperture, and axial placement resolution.
pub mod resolve;
/// The hierarchical configuration record tree.
pub mod schema;
/// Whole-object update transactions.
pub mod update;

pub use resolve::{resolve_geometry, DiameterRule, ResolvedGeometry};
pub use schema::{
    default_sim_config, DetectorShape, GunAngular, GunEnergy, GunPosition, LensDescriptor,
    MetadataConfig, OpticalConfig, OpticalEnvelope, OrientationSpec, OutputInfo, ParticleGun,
    RuntimeControls, ScintillatorConfig, ScintillatorProperties, SensitiveDetectorConfig,
    SimConfig, SimulationConfig, SourceConfig,
};
pub use update::ConfigUpdate;
