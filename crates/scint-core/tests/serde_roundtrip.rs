use scint_core::errors::{ErrorInfo, SimError};
use scint_core::geom::{Axis3, Size3Mm, Vec3Mm};

#[test]
fn error_round_trips_json() {
    let err = SimError::Validation(
        ErrorInfo::new("lens-count", "lens stack must hold one or two lenses")
            .with_context("field", "optical.lenses")
            .with_expected_actual("1..=2", "3")
            .with_hint("drop the extra lens entries"),
    );

    let json = serde_json::to_string_pretty(&err).expect("serialize");
    let decoded: SimError = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, err);
    assert!(json.contains("\"family\": \"Validation\""));
}

#[test]
fn geometry_primitives_round_trip_json() {
    let position = Vec3Mm::new(0.0, -2.5, 110.0);
    let extent = Size3Mm::new(100.0, 100.0, 20.0);
    let axis = Axis3::new(0.0, 0.0, 1.0);

    let decoded: Vec3Mm =
        serde_json::from_str(&serde_json::to_string(&position).expect("serialize")).expect("de");
    assert_eq!(decoded, position);
    let decoded: Size3Mm =
        serde_json::from_str(&serde_json::to_string(&extent).expect("serialize")).expect("de");
    assert_eq!(decoded, extent);
    let decoded: Axis3 =
        serde_json::from_str(&serde_json::to_string(&axis).expect("serialize")).expect("de");
    assert_eq!(decoded, axis);
}

#[test]
fn vector_keys_use_millimeter_suffixes() {
    let json = serde_json::to_string(&Vec3Mm::new(1.0, 2.0, 3.0)).expect("serialize");
    assert_eq!(json, "{\"x_mm\":1.0,\"y_mm\":2.0,\"z_mm\":3.0}");
}
