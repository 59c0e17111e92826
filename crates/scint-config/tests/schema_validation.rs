use scint_config::schema::{default_sim_config, LensDescriptor, OrientationSpec};
use scint_config::update::ConfigUpdate;
use scint_core::SimError;

#[test]
fn default_config_is_valid() {
    assert!(default_sim_config().validate().is_ok());
}

#[test]
fn orientation_list_must_match_lens_count() {
    let mut config = default_sim_config();
    config.optical.reversed = OrientationSpec::PerLens(vec![true, false]);
    let err = config.validate().unwrap_err();
    match err {
        SimError::Validation(info) => {
            assert_eq!(info.code, "orientation-cardinality");
            assert_eq!(info.context.get("expected").map(String::as_str), Some("1"));
            assert_eq!(info.context.get("actual").map(String::as_str), Some("2"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn lens_stack_is_limited_to_two_entries() {
    let mut config = default_sim_config();
    let extra = LensDescriptor {
        name: "relay".to_string(),
        primary: false,
        zmx_file: "relay.zmx".to_string(),
    };
    config.optical.lenses.push(extra.clone());
    assert!(config.validate().is_ok());

    config.optical.lenses.push(extra);
    let err = config.validate().unwrap_err();
    assert_eq!(err.info().code, "lens-count");

    let mut empty = default_sim_config();
    empty.optical.lenses.clear();
    assert_eq!(empty.validate().unwrap_err().info().code, "lens-count");
}

#[test]
fn exactly_one_lens_must_be_primary() {
    let mut config = default_sim_config();
    config.optical.lenses.push(LensDescriptor {
        name: "relay".to_string(),
        primary: true,
        zmx_file: "relay.zmx".to_string(),
    });
    let err = config.validate().unwrap_err();
    assert_eq!(err.info().code, "lens-primary");
    assert_eq!(err.info().context.get("actual").map(String::as_str), Some("2"));
}

#[test]
fn material_tables_must_match_declared_count() {
    let mut config = default_sim_config();
    config.scintillator.properties.r_index.pop();
    let err = config.validate().unwrap_err();
    match err {
        SimError::Validation(info) => {
            assert_eq!(info.code, "material-table-length");
            assert_eq!(info.context.get("expected").map(String::as_str), Some("3"));
            assert_eq!(info.context.get("actual").map(String::as_str), Some("2"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn extents_must_be_positive() {
    let mut config = default_sim_config();
    config.scintillator.dimension_mm.z_mm = 0.0;
    assert_eq!(config.validate().unwrap_err().info().code, "extent-nonpositive");
}

#[test]
fn per_lens_orientation_selects_the_primary_flag() {
    let mut config = default_sim_config();
    config.optical.lenses.insert(
        0,
        LensDescriptor {
            name: "relay".to_string(),
            primary: false,
            zmx_file: "relay.zmx".to_string(),
        },
    );
    config.optical.reversed = OrientationSpec::PerLens(vec![false, true]);
    assert!(config.validate().is_ok());
    assert!(config.optical.primary_reversed());
}

#[test]
fn update_transaction_revalidates_the_whole_object() {
    let base = default_sim_config();
    let updated = ConfigUpdate::new(&base)
        .apply(|config| config.metadata.simulation_run_id = "sim_002".to_string())
        .apply(|config| config.optical.sensitive_detector.standoff_cm = 25.0)
        .commit()
        .unwrap();
    assert_eq!(updated.metadata.simulation_run_id, "sim_002");
    // The base value is untouched by the transaction.
    assert_eq!(base.metadata.simulation_run_id, "sim_001");
}

#[test]
fn update_transaction_rejects_invalid_drafts() {
    let base = default_sim_config();
    let err = ConfigUpdate::new(&base)
        .apply(|config| config.optical.lenses.clear())
        .commit()
        .unwrap_err();
    assert_eq!(err.info().code, "lens-count");
    assert!(base.validate().is_ok());
}
