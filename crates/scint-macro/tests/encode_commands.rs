use std::fs;

use scint_config::schema::{
    default_sim_config, DetectorShape, RuntimeControls, SimulationConfig,
};
use scint_core::SimError;
use scint_macro::{macro_commands, macro_commands_with_lens, write_macro};
use scint_optics::parse_prescription;
use tempfile::tempdir;

const LENS_TEXT: &str = "\
UNIT MM
SURF 0
  DISZ INFINITY
SURF 1
  DIAM 30.275
  DISZ 4.5
  GLAS N-BK7
SURF 2
  DIAM 21.63
  DISZ 0
";

#[test]
fn command_sequence_matches_the_ordering_contract() {
    let config = default_sim_config();
    let commands = macro_commands(&config).unwrap();
    let expected = vec![
        "/output/format hdf5",
        "/output/path data",
        "/output/filename photon_optical_interface_hits",
        "/output/runname sim_001",
        "/scintillator/geom/material EJ200",
        "/scintillator/geom/scintX 100 mm",
        "/scintillator/geom/scintY 100 mm",
        "/scintillator/geom/scintZ 20 mm",
        "/scintillator/geom/posX 0 mm",
        "/scintillator/geom/posY 0 mm",
        "/scintillator/geom/posZ 0 mm",
        "/scintillator/geom/apertureRadius 18 mm",
        "/optical_interface/geom/sizeX 60.55 mm",
        "/optical_interface/geom/sizeY 60.55 mm",
        "/optical_interface/geom/thickness 0.1 mm",
        "/optical_interface/geom/posX 0 mm",
        "/optical_interface/geom/posY 0 mm",
        "/optical_interface/geom/posZ 210.05 mm",
        "/run/initialize",
        "/gps/particle neutron",
        "/gps/pos/type Plane",
        "/gps/pos/shape Circle",
        "/gps/pos/centre 0 0 -100 mm",
        "/gps/pos/radius 10 mm",
        "/gps/ang/type beam2d",
        "/gps/ang/rot1 1 0 0",
        "/gps/ang/rot2 0 1 0",
        "/gps/direction 0 0 1",
        "/gps/ene/type Mono",
        "/gps/ene/mono 6 MeV",
    ];
    assert_eq!(commands, expected);
}

#[test]
fn runtime_preamble_sits_between_geometry_and_initialize() {
    let mut config = default_sim_config();
    config.simulation = Some(SimulationConfig {
        number_of_particles: Some(10000),
        runtime_controls: Some(RuntimeControls {
            control_verbose: Some(0),
            run_verbose: Some(0),
            event_verbose: Some(0),
            tracking_verbose: Some(0),
            print_progress: Some(1000),
            store_trajectory: Some(true),
        }),
    });
    let commands = macro_commands(&config).unwrap();

    let pos_z_at = commands
        .iter()
        .position(|line| line.starts_with("/optical_interface/geom/posZ"))
        .unwrap();
    let init_at = commands
        .iter()
        .position(|line| line == "/run/initialize")
        .unwrap();
    let preamble: Vec<&str> = commands[pos_z_at + 1..init_at]
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(
        preamble,
        vec![
            "/control/verbose 0",
            "/run/verbose 0",
            "/event/verbose 0",
            "/tracking/verbose 0",
            "/run/printProgress 1000",
            "/tracking/storeTrajectory 1",
        ]
    );
    assert_eq!(commands.last().map(String::as_str), Some("/run/beamOn 10000"));
}

#[test]
fn partial_runtime_controls_keep_the_fixed_sub_order() {
    let mut config = default_sim_config();
    config.simulation = Some(SimulationConfig {
        number_of_particles: None,
        runtime_controls: Some(RuntimeControls {
            tracking_verbose: Some(2),
            print_progress: Some(50),
            ..RuntimeControls::default()
        }),
    });
    let commands = macro_commands(&config).unwrap();
    let tracking_at = commands
        .iter()
        .position(|line| line == "/tracking/verbose 2")
        .unwrap();
    let progress_at = commands
        .iter()
        .position(|line| line == "/run/printProgress 50")
        .unwrap();
    assert!(tracking_at < progress_at);
    assert!(!commands.iter().any(|line| line.starts_with("/run/beamOn")));
}

#[test]
fn square_detector_omits_the_aperture_line() {
    let mut config = default_sim_config();
    config.optical.sensitive_detector.shape = DetectorShape::Square;
    let commands = macro_commands(&config).unwrap();
    assert!(!commands
        .iter()
        .any(|line| line.starts_with("/scintillator/geom/apertureRadius")));
}

#[test]
fn config_without_source_emits_no_gun_lines() {
    let mut config = default_sim_config();
    config.source = None;
    let commands = macro_commands(&config).unwrap();
    assert!(!commands.iter().any(|line| line.starts_with("/gps/")));
    assert_eq!(commands.last().map(String::as_str), Some("/run/initialize"));
}

#[test]
fn unsupported_rule_yields_no_partial_sequence() {
    let mut config = default_sim_config();
    config.optical.sensitive_detector.diameter_rule = "twiceEntrance".to_string();
    let err = macro_commands(&config).unwrap_err();
    match err {
        SimError::Conflict(info) => assert_eq!(info.code, "diameter-rule-unknown"),
        other => panic!("expected conflict error, got {other:?}"),
    }
}

#[test]
fn lens_model_overrides_the_interface_size_default() {
    let lens = parse_prescription("sample", LENS_TEXT).unwrap();
    let mut config = default_sim_config();
    config.optical.geometry.entrance_diameter_mm = 55.0;
    let commands = macro_commands_with_lens(&config, Some(&lens)).unwrap();
    // Forward orientation uses the parsed clear diameter, not the envelope.
    assert!(commands.contains(&"/optical_interface/geom/sizeX 60.55 mm".to_string()));
    assert!(commands.contains(&"/scintillator/geom/apertureRadius 30.275 mm".to_string()));
}

#[test]
fn write_macro_persists_the_exact_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("generated.mac");
    let config = default_sim_config();
    write_macro(&config, &path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    let expected = macro_commands(&config).unwrap();
    assert_eq!(lines, expected);
    assert!(written.ends_with('\n'));
}
