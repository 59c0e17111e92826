use scint_config::resolve::{resolve_geometry, DiameterRule};
use scint_config::schema::{default_sim_config, DetectorShape, OrientationSpec};
use scint_core::SimError;
use scint_optics::parse_prescription;

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
fn min_rule_scenario_resolves_aperture_and_placement() {
    // 100x100x20 mm scintillator at the origin, envelope 60.55/36.0,
    // standoff 20 cm, thickness 0.1 mm.
    let config = default_sim_config();
    let resolved = resolve_geometry(&config, None).unwrap();
    assert_eq!(resolved.detector_diameter_mm, 36.0);
    assert_eq!(resolved.aperture_radius_mm, Some(18.0));
    assert_eq!(resolved.interface_size_mm, 60.55);
    assert_eq!(resolved.interface_center_z_mm, 210.05);
}

#[test]
fn named_rules_evaluate_against_the_envelope() {
    let mut config = default_sim_config();
    config.optical.sensitive_detector.diameter_rule = "entranceDiameter".to_string();
    assert_eq!(
        resolve_geometry(&config, None).unwrap().detector_diameter_mm,
        60.55
    );

    config.optical.sensitive_detector.diameter_rule = "sensorMaxWidth".to_string();
    assert_eq!(
        resolve_geometry(&config, None).unwrap().detector_diameter_mm,
        36.0
    );
}

#[test]
fn unsupported_rule_is_a_conflict() {
    let mut config = default_sim_config();
    config.optical.sensitive_detector.diameter_rule = "max(entranceDiameter)".to_string();
    let err = resolve_geometry(&config, None).unwrap_err();
    match err {
        SimError::Conflict(info) => {
            assert_eq!(info.code, "diameter-rule-unknown");
            assert_eq!(
                info.context.get("rule").map(String::as_str),
                Some("max(entranceDiameter)")
            );
        }
        other => panic!("expected conflict error, got {other:?}"),
    }
}

#[test]
fn rule_parse_accepts_only_exact_spellings() {
    assert!(DiameterRule::parse("min(entranceDiameter,sensorMaxWidth)").is_ok());
    assert!(DiameterRule::parse("entranceDiameter").is_ok());
    assert!(DiameterRule::parse("sensorMaxWidth").is_ok());
    assert!(DiameterRule::parse("min(entranceDiameter, sensorMaxWidth)").is_err());
    assert!(DiameterRule::parse("").is_err());
}

#[test]
fn explicit_override_wins_over_rule_and_lens() {
    let lens = parse_prescription("sample", LENS_TEXT).unwrap();
    let mut config = default_sim_config();
    config.optical.sensitive_detector.diameter_mm = Some(42.0);
    let resolved = resolve_geometry(&config, Some(&lens)).unwrap();
    assert_eq!(resolved.detector_diameter_mm, 42.0);
    assert_eq!(resolved.interface_size_mm, 42.0);
    assert_eq!(resolved.aperture_radius_mm, Some(21.0));
}

#[test]
fn forward_lens_default_uses_clear_diameter() {
    let lens = parse_prescription("sample", LENS_TEXT).unwrap();
    let config = default_sim_config();
    let resolved = resolve_geometry(&config, Some(&lens)).unwrap();
    assert_eq!(resolved.detector_diameter_mm, 60.55);
    assert_eq!(resolved.interface_size_mm, 60.55);
}

#[test]
fn reversed_lens_default_uses_image_circle() {
    let lens = parse_prescription("sample", LENS_TEXT).unwrap();
    let mut config = default_sim_config();
    config.optical.reversed = OrientationSpec::Shared(true);
    let resolved = resolve_geometry(&config, Some(&lens)).unwrap();
    assert_eq!(resolved.detector_diameter_mm, 43.26);
    assert_eq!(resolved.interface_size_mm, 43.26);
}

#[test]
fn square_shape_disables_the_aperture() {
    let mut config = default_sim_config();
    config.optical.sensitive_detector.shape = DetectorShape::Square;
    let resolved = resolve_geometry(&config, None).unwrap();
    assert_eq!(resolved.aperture_radius_mm, None);
}

#[test]
fn explicit_aperture_radius_is_used_verbatim() {
    let mut config = default_sim_config();
    config.optical.sensitive_detector.aperture_radius_mm = Some(12.5);
    let resolved = resolve_geometry(&config, None).unwrap();
    assert_eq!(resolved.aperture_radius_mm, Some(12.5));
}

#[test]
fn aperture_radius_is_bounded_by_the_face_diagonal() {
    let mut config = default_sim_config();
    // Half diagonal of 100x100 is ~70.7 mm.
    config.optical.sensitive_detector.aperture_radius_mm = Some(75.0);
    let err = resolve_geometry(&config, None).unwrap_err();
    match err {
        SimError::Validation(info) => {
            assert_eq!(info.code, "aperture-radius-extent");
            assert!(info.context.contains_key("expected"));
            assert_eq!(info.context.get("actual").map(String::as_str), Some("75"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn interface_must_sit_beyond_the_back_face() {
    let mut config = default_sim_config();
    config.optical.sensitive_detector.standoff_cm = -5.0;
    let err = resolve_geometry(&config, None).unwrap_err();
    assert_eq!(err.info().code, "interface-position");
}
