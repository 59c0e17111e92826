//! Deterministic macro command emission.
//!
//! The emitted order is a stable contract: output routing, scintillator
//! geometry, optional aperture, interface geometry, optional run-control
//! preamble, `/run/initialize`, optional emission block, optional
//! `/run/beamOn`. Geometry resolution runs before the first line is
//! generated, so a sizing conflict aborts with no partial sequence.

use std::fs;
use std::path::Path;

use scint_config::resolve::{resolve_geometry, ResolvedGeometry};
use scint_config::schema::SimConfig;
use scint_core::errors::{ErrorInfo, SimError};
use scint_core::units::format_number;
use scint_optics::LensModel;

/// Engine-side default output file base name.
pub const DEFAULT_OUTPUT_FILENAME: &str = "photon_optical_interface_hits";

/// Generates the output routing command lines.
pub fn output_commands(config: &SimConfig) -> Vec<String> {
    let output = &config.metadata.output_info;
    let filename = output.filename.as_deref().unwrap_or(DEFAULT_OUTPUT_FILENAME);
    vec![
        format!("/output/format {}", output.output_format),
        format!("/output/path {}", output.data_directory),
        format!("/output/filename {filename}"),
        format!("/output/runname {}", config.metadata.simulation_run_id),
    ]
}

/// Generates the scintillator, aperture, and interface geometry lines from
/// already-resolved geometry.
pub fn geometry_commands(config: &SimConfig, resolved: &ResolvedGeometry) -> Vec<String> {
    let scint = &config.scintillator;
    let detector = &config.optical.sensitive_detector;
    let mut commands = vec![
        format!("/scintillator/geom/material {}", scint.properties.name),
        format!(
            "/scintillator/geom/scintX {} mm",
            format_number(scint.dimension_mm.x_mm)
        ),
        format!(
            "/scintillator/geom/scintY {} mm",
            format_number(scint.dimension_mm.y_mm)
        ),
        format!(
            "/scintillator/geom/scintZ {} mm",
            format_number(scint.dimension_mm.z_mm)
        ),
        format!(
            "/scintillator/geom/posX {} mm",
            format_number(scint.position_mm.x_mm)
        ),
        format!(
            "/scintillator/geom/posY {} mm",
            format_number(scint.position_mm.y_mm)
        ),
        format!(
            "/scintillator/geom/posZ {} mm",
            format_number(scint.position_mm.z_mm)
        ),
    ];
    if let Some(radius) = resolved.aperture_radius_mm {
        commands.push(format!(
            "/scintillator/geom/apertureRadius {} mm",
            format_number(radius)
        ));
    }
    commands.push(format!(
        "/optical_interface/geom/sizeX {} mm",
        format_number(resolved.interface_size_mm)
    ));
    commands.push(format!(
        "/optical_interface/geom/sizeY {} mm",
        format_number(resolved.interface_size_mm)
    ));
    commands.push(format!(
        "/optical_interface/geom/thickness {} mm",
        format_number(detector.thickness_mm)
    ));
    commands.push(format!(
        "/optical_interface/geom/posX {} mm",
        format_number(detector.pos_x_mm)
    ));
    commands.push(format!(
        "/optical_interface/geom/posY {} mm",
        format_number(detector.pos_y_mm)
    ));
    commands.push(format!(
        "/optical_interface/geom/posZ {} mm",
        format_number(resolved.interface_center_z_mm)
    ));
    commands
}

/// Resolves geometry and generates the geometry lines in one step. This is
/// the replacement set used by the in-place patcher.
pub fn geometry_commands_for(config: &SimConfig) -> Result<Vec<String>, SimError> {
    let resolved = resolve_geometry(config, None)?;
    Ok(geometry_commands(config, &resolved))
}

fn runtime_control_commands(config: &SimConfig) -> Vec<String> {
    let Some(controls) = config
        .simulation
        .as_ref()
        .and_then(|simulation| simulation.runtime_controls.as_ref())
    else {
        return Vec::new();
    };
    let mut commands = Vec::new();
    if let Some(level) = controls.control_verbose {
        commands.push(format!("/control/verbose {level}"));
    }
    if let Some(level) = controls.run_verbose {
        commands.push(format!("/run/verbose {level}"));
    }
    if let Some(level) = controls.event_verbose {
        commands.push(format!("/event/verbose {level}"));
    }
    if let Some(level) = controls.tracking_verbose {
        commands.push(format!("/tracking/verbose {level}"));
    }
    if let Some(interval) = controls.print_progress {
        commands.push(format!("/run/printProgress {interval}"));
    }
    if let Some(store) = controls.store_trajectory {
        commands.push(format!("/tracking/storeTrajectory {}", u8::from(store)));
    }
    commands
}

fn gun_commands(config: &SimConfig) -> Vec<String> {
    let Some(source) = &config.source else {
        return Vec::new();
    };
    let gun = &source.gps;
    let mut commands = vec![
        format!("/gps/particle {}", gun.particle),
        format!("/gps/pos/type {}", gun.position.kind),
    ];
    if let Some(shape) = &gun.position.shape {
        commands.push(format!("/gps/pos/shape {shape}"));
    }
    let center = gun.position.center_mm;
    commands.push(format!(
        "/gps/pos/centre {} {} {} mm",
        format_number(center.x_mm),
        format_number(center.y_mm),
        format_number(center.z_mm)
    ));
    if let Some(radius) = gun.position.radius_mm {
        commands.push(format!("/gps/pos/radius {} mm", format_number(radius)));
    }
    if let Some(angular) = &gun.angular {
        commands.push(format!("/gps/ang/type {}", angular.kind));
        commands.push(format!(
            "/gps/ang/rot1 {} {} {}",
            format_number(angular.rot1.x),
            format_number(angular.rot1.y),
            format_number(angular.rot1.z)
        ));
        commands.push(format!(
            "/gps/ang/rot2 {} {} {}",
            format_number(angular.rot2.x),
            format_number(angular.rot2.y),
            format_number(angular.rot2.z)
        ));
        commands.push(format!(
            "/gps/direction {} {} {}",
            format_number(angular.direction.x),
            format_number(angular.direction.y),
            format_number(angular.direction.z)
        ));
    }
    commands.push(format!("/gps/ene/type {}", gun.energy.kind));
    commands.push(format!(
        "/gps/ene/mono {} MeV",
        format_number(gun.energy.mono_mev)
    ));
    commands
}

/// Builds the complete ordered macro command sequence from a validated
/// configuration, resolving geometry from the envelope alone.
pub fn macro_commands(config: &SimConfig) -> Result<Vec<String>, SimError> {
    macro_commands_with_lens(config, None)
}

/// Builds the command sequence using a parsed primary-lens model for
/// orientation-dependent sizing defaults.
pub fn macro_commands_with_lens(
    config: &SimConfig,
    lens: Option<&LensModel>,
) -> Result<Vec<String>, SimError> {
    config.validate()?;
    let resolved = resolve_geometry(config, lens)?;

    let mut commands = output_commands(config);
    commands.extend(geometry_commands(config, &resolved));
    commands.extend(runtime_control_commands(config));
    commands.push("/run/initialize".to_string());
    commands.extend(gun_commands(config));
    if let Some(count) = config
        .simulation
        .as_ref()
        .and_then(|simulation| simulation.number_of_particles)
    {
        commands.push(format!("/run/beamOn {count}"));
    }
    Ok(commands)
}

/// Writes the full command sequence to a macro file. Content is staged in
/// memory first, so a generation failure leaves no partially written file.
pub fn write_macro(config: &SimConfig, path: &Path) -> Result<(), SimError> {
    let mut payload = macro_commands(config)?.join("\n");
    payload.push('\n');
    fs::write(path, payload).map_err(|err| {
        SimError::Serde(
            ErrorInfo::new("macro-write", "failed to write macro file")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}
