//! Macro decoding: flat command lines back into a validated configuration.
//!
//! The flat form cannot express the full schema (lens descriptors, material
//! tables, run metadata), so decoding overlays the observed commands onto a
//! caller-supplied template and only overwrites what it actually saw.
//! Derivations that depend on several commands (standoff, size conflict
//! checks) run after the full scan, so decoding is all-or-nothing.

use std::fs;
use std::path::Path;

use scint_config::schema::{
    DetectorShape, GunAngular, RuntimeControls, SimConfig, SimulationConfig, SourceConfig,
};
use scint_config::update::ConfigUpdate;
use scint_core::errors::{ErrorInfo, SimError};
use scint_core::geom::{Axis3, Vec3Mm};
use scint_core::units::{energy_to_mev, length_to_mm, MM_PER_CM};

/// Earlier-generation command spellings accepted on read and mapped onto
/// the current interface vocabulary.
const COMMAND_ALIASES: &[(&str, &str)] = &[
    ("/sensor/geom/sizeX", "/optical_interface/geom/sizeX"),
    ("/sensor/geom/sizeY", "/optical_interface/geom/sizeY"),
    ("/sensor/geom/thickness", "/optical_interface/geom/thickness"),
    ("/sensor/geom/posX", "/optical_interface/geom/posX"),
    ("/sensor/geom/posY", "/optical_interface/geom/posY"),
    ("/sensor/geom/posZ", "/optical_interface/geom/posZ"),
];

fn canonical_command(command: &str) -> &str {
    COMMAND_ALIASES
        .iter()
        .find(|(alias, _)| *alias == command)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(command)
}

/// Splits a macro line into whitespace-separated tokens, keeping quoted
/// path-like values intact and stripping the quote layer.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for ch in line.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn command_error(code: &str, message: &str, command: &str) -> SimError {
    SimError::Format(ErrorInfo::new(code, message).with_context("command", command))
}

fn parse_f64(raw: &str, command: &str) -> Result<f64, SimError> {
    raw.parse::<f64>().map_err(|_| {
        command_error("command-value", "non-numeric value token", command)
            .with_context("value", raw)
    })
}

/// Parses a `<value> <unit>` pair into millimeters. Trailing tokens are
/// ignored; the fixed-format geometry commands carry the full payload in
/// the first three tokens.
fn parse_length(tokens: &[String], command: &str) -> Result<f64, SimError> {
    if tokens.len() < 3 {
        return Err(command_error(
            "command-arity",
            "command requires <value> <unit> tokens",
            command,
        ));
    }
    let value = parse_f64(&tokens[1], command)?;
    length_to_mm(value, &tokens[2]).map_err(|err| err.with_context("command", command))
}

fn parse_vec3_length(tokens: &[String], command: &str) -> Result<Vec3Mm, SimError> {
    if tokens.len() < 5 {
        return Err(command_error(
            "command-arity",
            "command requires <x> <y> <z> <unit> tokens",
            command,
        ));
    }
    let unit = &tokens[4];
    Ok(Vec3Mm::new(
        length_to_mm(parse_f64(&tokens[1], command)?, unit)
            .map_err(|err| err.with_context("command", command))?,
        length_to_mm(parse_f64(&tokens[2], command)?, unit)
            .map_err(|err| err.with_context("command", command))?,
        length_to_mm(parse_f64(&tokens[3], command)?, unit)
            .map_err(|err| err.with_context("command", command))?,
    ))
}

fn parse_axis(tokens: &[String], command: &str) -> Result<Axis3, SimError> {
    if tokens.len() < 4 {
        return Err(command_error(
            "command-arity",
            "command requires <x> <y> <z> tokens",
            command,
        ));
    }
    Ok(Axis3::new(
        parse_f64(&tokens[1], command)?,
        parse_f64(&tokens[2], command)?,
        parse_f64(&tokens[3], command)?,
    ))
}

fn parse_energy(tokens: &[String], command: &str) -> Result<f64, SimError> {
    if tokens.len() < 3 {
        return Err(command_error(
            "command-arity",
            "command requires <value> <unit> tokens",
            command,
        ));
    }
    let value = parse_f64(&tokens[1], command)?;
    energy_to_mev(value, &tokens[2]).map_err(|err| err.with_context("command", command))
}

fn parse_u32(tokens: &[String], command: &str) -> Result<u32, SimError> {
    let raw = tokens.get(1).ok_or_else(|| {
        command_error("command-arity", "command requires a value token", command)
    })?;
    raw.parse::<u32>().map_err(|_| {
        command_error("command-value", "non-integer value token", command)
            .with_context("value", raw.as_str())
    })
}

fn parse_u64(tokens: &[String], command: &str) -> Result<u64, SimError> {
    let raw = tokens.get(1).ok_or_else(|| {
        command_error("command-arity", "command requires a value token", command)
    })?;
    raw.parse::<u64>().map_err(|_| {
        command_error("command-value", "non-integer value token", command)
            .with_context("value", raw.as_str())
    })
}

fn parse_flag(tokens: &[String], command: &str) -> Result<bool, SimError> {
    let raw = tokens.get(1).ok_or_else(|| {
        command_error("command-arity", "command requires a value token", command)
    })?;
    match raw.as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(command_error("command-value", "non-boolean value token", command)
            .with_context("value", other)),
    }
}

/// Everything a single scan of the macro text can observe. Fields stay
/// `None` unless the corresponding command was present.
#[derive(Debug, Default)]
struct Observed {
    output_format: Option<String>,
    output_path: Option<String>,
    output_filename: Option<String>,
    output_runname: Option<String>,
    material: Option<String>,
    scint_dim_mm: [Option<f64>; 3],
    scint_pos_mm: [Option<f64>; 3],
    aperture_radius_mm: Option<f64>,
    size_x_mm: Option<f64>,
    size_y_mm: Option<f64>,
    thickness_mm: Option<f64>,
    detector_pos_x_mm: Option<f64>,
    detector_pos_y_mm: Option<f64>,
    detector_pos_z_mm: Option<f64>,
    control_verbose: Option<u32>,
    run_verbose: Option<u32>,
    event_verbose: Option<u32>,
    tracking_verbose: Option<u32>,
    print_progress: Option<u32>,
    store_trajectory: Option<bool>,
    beam_on: Option<u64>,
    gun_particle: Option<String>,
    gun_pos_type: Option<String>,
    gun_pos_shape: Option<String>,
    gun_center_mm: Option<Vec3Mm>,
    gun_radius_mm: Option<f64>,
    gun_ang_type: Option<String>,
    gun_rot1: Option<Axis3>,
    gun_rot2: Option<Axis3>,
    gun_direction: Option<Axis3>,
    gun_ene_type: Option<String>,
    gun_mono_mev: Option<f64>,
}

impl Observed {
    fn any_runtime_control(&self) -> bool {
        self.control_verbose.is_some()
            || self.run_verbose.is_some()
            || self.event_verbose.is_some()
            || self.tracking_verbose.is_some()
            || self.print_progress.is_some()
            || self.store_trajectory.is_some()
    }

    fn any_gun(&self) -> bool {
        self.gun_particle.is_some()
            || self.gun_pos_type.is_some()
            || self.gun_pos_shape.is_some()
            || self.gun_center_mm.is_some()
            || self.gun_radius_mm.is_some()
            || self.gun_ang_type.is_some()
            || self.gun_rot1.is_some()
            || self.gun_rot2.is_some()
            || self.gun_direction.is_some()
            || self.gun_ene_type.is_some()
            || self.gun_mono_mev.is_some()
    }

    fn any_angular(&self) -> bool {
        self.gun_ang_type.is_some()
            || self.gun_rot1.is_some()
            || self.gun_rot2.is_some()
            || self.gun_direction.is_some()
    }
}

fn scan(text: &str) -> Result<Observed, SimError> {
    let mut observed = Observed::default();
    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens = tokenize(line);
        let Some(first) = tokens.first() else { continue };
        let command = canonical_command(first);
        match command {
            "/output/format" if tokens.len() >= 2 => {
                observed.output_format = Some(tokens[1].clone());
            }
            "/output/path" if tokens.len() >= 2 => {
                observed.output_path = Some(tokens[1].clone());
            }
            "/output/filename" if tokens.len() >= 2 => {
                observed.output_filename = Some(tokens[1].clone());
            }
            "/output/runname" if tokens.len() >= 2 => {
                observed.output_runname = Some(tokens[1].clone());
            }
            "/scintillator/geom/material" if tokens.len() >= 2 => {
                observed.material = Some(tokens[1].clone());
            }
            "/scintillator/geom/scintX" => {
                observed.scint_dim_mm[0] = Some(parse_length(&tokens, command)?);
            }
            "/scintillator/geom/scintY" => {
                observed.scint_dim_mm[1] = Some(parse_length(&tokens, command)?);
            }
            "/scintillator/geom/scintZ" => {
                observed.scint_dim_mm[2] = Some(parse_length(&tokens, command)?);
            }
            "/scintillator/geom/posX" => {
                observed.scint_pos_mm[0] = Some(parse_length(&tokens, command)?);
            }
            "/scintillator/geom/posY" => {
                observed.scint_pos_mm[1] = Some(parse_length(&tokens, command)?);
            }
            "/scintillator/geom/posZ" => {
                observed.scint_pos_mm[2] = Some(parse_length(&tokens, command)?);
            }
            "/scintillator/geom/apertureRadius" => {
                observed.aperture_radius_mm = Some(parse_length(&tokens, command)?);
            }
            "/optical_interface/geom/sizeX" => {
                observed.size_x_mm = Some(parse_length(&tokens, command)?);
            }
            "/optical_interface/geom/sizeY" => {
                observed.size_y_mm = Some(parse_length(&tokens, command)?);
            }
            "/optical_interface/geom/thickness" => {
                observed.thickness_mm = Some(parse_length(&tokens, command)?);
            }
            "/optical_interface/geom/posX" => {
                observed.detector_pos_x_mm = Some(parse_length(&tokens, command)?);
            }
            "/optical_interface/geom/posY" => {
                observed.detector_pos_y_mm = Some(parse_length(&tokens, command)?);
            }
            "/optical_interface/geom/posZ" => {
                observed.detector_pos_z_mm = Some(parse_length(&tokens, command)?);
            }
            "/control/verbose" => observed.control_verbose = Some(parse_u32(&tokens, command)?),
            "/run/verbose" => observed.run_verbose = Some(parse_u32(&tokens, command)?),
            "/event/verbose" => observed.event_verbose = Some(parse_u32(&tokens, command)?),
            "/tracking/verbose" => observed.tracking_verbose = Some(parse_u32(&tokens, command)?),
            "/run/printProgress" => observed.print_progress = Some(parse_u32(&tokens, command)?),
            "/tracking/storeTrajectory" => {
                observed.store_trajectory = Some(parse_flag(&tokens, command)?);
            }
            "/run/beamOn" => observed.beam_on = Some(parse_u64(&tokens, command)?),
            "/gps/particle" if tokens.len() >= 2 => {
                observed.gun_particle = Some(tokens[1].clone());
            }
            "/gps/pos/type" if tokens.len() >= 2 => {
                observed.gun_pos_type = Some(tokens[1].clone());
            }
            "/gps/pos/shape" if tokens.len() >= 2 => {
                observed.gun_pos_shape = Some(tokens[1].clone());
            }
            "/gps/pos/centre" => {
                observed.gun_center_mm = Some(parse_vec3_length(&tokens, command)?);
            }
            "/gps/pos/radius" => observed.gun_radius_mm = Some(parse_length(&tokens, command)?),
            "/gps/ang/type" if tokens.len() >= 2 => {
                observed.gun_ang_type = Some(tokens[1].clone());
            }
            "/gps/ang/rot1" => observed.gun_rot1 = Some(parse_axis(&tokens, command)?),
            "/gps/ang/rot2" => observed.gun_rot2 = Some(parse_axis(&tokens, command)?),
            "/gps/direction" => observed.gun_direction = Some(parse_axis(&tokens, command)?),
            "/gps/ene/type" if tokens.len() >= 2 => {
                observed.gun_ene_type = Some(tokens[1].clone());
            }
            "/gps/ene/mono" => observed.gun_mono_mev = Some(parse_energy(&tokens, command)?),
            "/run/initialize" => {}
            // Forward compatibility: unrecognized commands are ignored.
            _ => {}
        }
    }
    Ok(observed)
}

/// Reconstructs a configuration from macro text over the given template.
///
/// Only fields the scan actually observed are overwritten; everything the
/// flat form cannot express is sourced from `template`. The result is
/// revalidated as a whole before it is returned.
pub fn decode_macro(text: &str, template: &SimConfig) -> Result<SimConfig, SimError> {
    let observed = scan(text)?;

    // Two independently specified sizes for one circular interface must
    // agree within floating tolerance.
    if let (Some(size_x), Some(size_y)) = (observed.size_x_mm, observed.size_y_mm) {
        if (size_x - size_y).abs() > 1.0e-9 {
            return Err(SimError::Conflict(
                ErrorInfo::new(
                    "interface-size-mismatch",
                    "non-circular optical interface size",
                )
                .with_context("sizeX_mm", format!("{size_x:.6}"))
                .with_context("sizeY_mm", format!("{size_y:.6}")),
            ));
        }
    }

    ConfigUpdate::new(template)
        .apply(|config| overlay(config, &observed))
        .commit()
}

fn overlay(config: &mut SimConfig, observed: &Observed) {
    if let Some(format) = &observed.output_format {
        config.metadata.output_info.output_format = format.clone();
    }
    if let Some(path) = &observed.output_path {
        config.metadata.output_info.data_directory = path.clone();
    }
    if let Some(filename) = &observed.output_filename {
        config.metadata.output_info.filename = Some(filename.clone());
    }
    if let Some(runname) = &observed.output_runname {
        config.metadata.simulation_run_id = runname.clone();
    }

    if let Some(material) = &observed.material {
        config.scintillator.properties.name = material.clone();
    }
    let dim = &mut config.scintillator.dimension_mm;
    for (target, value) in [&mut dim.x_mm, &mut dim.y_mm, &mut dim.z_mm]
        .into_iter()
        .zip(observed.scint_dim_mm)
    {
        if let Some(value) = value {
            *target = value;
        }
    }
    let pos = &mut config.scintillator.position_mm;
    for (target, value) in [&mut pos.x_mm, &mut pos.y_mm, &mut pos.z_mm]
        .into_iter()
        .zip(observed.scint_pos_mm)
    {
        if let Some(value) = value {
            *target = value;
        }
    }

    let detector = &mut config.optical.sensitive_detector;
    if let Some(size) = observed.size_x_mm.or(observed.size_y_mm) {
        detector.diameter_mm = Some(size);
    }
    if let Some(thickness) = observed.thickness_mm {
        detector.thickness_mm = thickness;
    }
    if let Some(x) = observed.detector_pos_x_mm {
        detector.pos_x_mm = x;
    }
    if let Some(y) = observed.detector_pos_y_mm {
        detector.pos_y_mm = y;
    }
    // An absent aperture command means no mask; a present one pins the
    // radius explicitly.
    match observed.aperture_radius_mm {
        Some(radius) => {
            detector.shape = DetectorShape::Circle;
            detector.aperture_radius_mm = Some(radius);
        }
        None => {
            detector.shape = DetectorShape::Square;
            detector.aperture_radius_mm = None;
        }
    }
    // Back-derive the standoff from the absolute interface center:
    // standoff = (center - thickness/2) - scintillator back face.
    if let Some(center_z) = observed.detector_pos_z_mm {
        let back_face_z_mm = config.scintillator.back_face_z_mm();
        let detector = &mut config.optical.sensitive_detector;
        let front_face_z_mm = center_z - 0.5 * detector.thickness_mm;
        detector.standoff_cm = (front_face_z_mm - back_face_z_mm) / MM_PER_CM;
    }

    if observed.any_runtime_control() {
        let simulation = config.simulation.get_or_insert_with(SimulationConfig::default);
        let controls = simulation
            .runtime_controls
            .get_or_insert_with(RuntimeControls::default);
        if let Some(level) = observed.control_verbose {
            controls.control_verbose = Some(level);
        }
        if let Some(level) = observed.run_verbose {
            controls.run_verbose = Some(level);
        }
        if let Some(level) = observed.event_verbose {
            controls.event_verbose = Some(level);
        }
        if let Some(level) = observed.tracking_verbose {
            controls.tracking_verbose = Some(level);
        }
        if let Some(interval) = observed.print_progress {
            controls.print_progress = Some(interval);
        }
        if let Some(store) = observed.store_trajectory {
            controls.store_trajectory = Some(store);
        }
    }
    if let Some(count) = observed.beam_on {
        let simulation = config.simulation.get_or_insert_with(SimulationConfig::default);
        simulation.number_of_particles = Some(count);
    }

    if observed.any_gun() {
        let source = config.source.get_or_insert_with(|| SourceConfig {
            gps: Default::default(),
        });
        let gun = &mut source.gps;
        if let Some(particle) = &observed.gun_particle {
            gun.particle = particle.clone();
        }
        if let Some(kind) = &observed.gun_pos_type {
            gun.position.kind = kind.clone();
        }
        if let Some(shape) = &observed.gun_pos_shape {
            gun.position.shape = Some(shape.clone());
        }
        if let Some(center) = observed.gun_center_mm {
            gun.position.center_mm = center;
        }
        if let Some(radius) = observed.gun_radius_mm {
            gun.position.radius_mm = Some(radius);
        }
        if observed.any_angular() {
            let angular = gun.angular.get_or_insert_with(|| GunAngular {
                kind: "beam2d".to_string(),
                rot1: Axis3::new(1.0, 0.0, 0.0),
                rot2: Axis3::new(0.0, 1.0, 0.0),
                direction: Axis3::new(0.0, 0.0, 1.0),
            });
            if let Some(kind) = &observed.gun_ang_type {
                angular.kind = kind.clone();
            }
            if let Some(rot1) = observed.gun_rot1 {
                angular.rot1 = rot1;
            }
            if let Some(rot2) = observed.gun_rot2 {
                angular.rot2 = rot2;
            }
            if let Some(direction) = observed.gun_direction {
                angular.direction = direction;
            }
        }
        if let Some(kind) = &observed.gun_ene_type {
            gun.energy.kind = kind.clone();
        }
        if let Some(energy) = observed.gun_mono_mev {
            gun.energy.mono_mev = energy;
        }
    }
}

/// Reads a macro file and reconstructs a configuration over the template.
pub fn read_macro(path: &Path, template: &SimConfig) -> Result<SimConfig, SimError> {
    if !path.exists() {
        return Err(SimError::NotFound(
            ErrorInfo::new("macro-missing", "macro file not found")
                .with_context("path", path.display().to_string()),
        ));
    }
    let text = fs::read_to_string(path).map_err(|err| {
        SimError::Serde(
            ErrorInfo::new("macro-read", "failed to read macro file")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    decode_macro(&text, template)
}
