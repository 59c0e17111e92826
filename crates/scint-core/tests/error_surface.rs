use scint_core::errors::{ErrorInfo, SimError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("field", "optical.lenses")
        .with_hint("check the configuration document")
}

#[test]
fn not_found_surface() {
    let err = SimError::NotFound(sample_info("prescription-missing", "lens file not found"));
    assert_eq!(err.info().code, "prescription-missing");
    assert!(err.info().context.contains_key("field"));
}

#[test]
fn format_surface() {
    let err = SimError::Format(sample_info("unit-unknown", "unsupported length unit"));
    assert_eq!(err.info().code, "unit-unknown");
    assert!(err.to_string().contains("format error"));
}

#[test]
fn validation_carries_expected_and_actual() {
    let info = ErrorInfo::new("lens-count", "lens count out of range")
        .with_expected_actual("1..=2", "3");
    let err = SimError::Validation(info);
    assert_eq!(err.info().context.get("expected").map(String::as_str), Some("1..=2"));
    assert_eq!(err.info().context.get("actual").map(String::as_str), Some("3"));
}

#[test]
fn conflict_surface() {
    let err = SimError::Conflict(sample_info("diameter-rule-unknown", "unsupported diameter rule"));
    assert_eq!(err.info().code, "diameter-rule-unknown");
}

#[test]
fn with_context_augments_existing_error() {
    let err = SimError::Format(ErrorInfo::new("command-value", "non-numeric value token"))
        .with_context("command", "/scintillator/geom/scintX");
    assert_eq!(
        err.info().context.get("command").map(String::as_str),
        Some("/scintillator/geom/scintX")
    );
}

#[test]
fn display_includes_context_and_hint() {
    let err = SimError::Serde(sample_info("yaml-parse", "invalid document"));
    let rendered = err.to_string();
    assert!(rendered.contains("field=optical.lenses"));
    assert!(rendered.contains("hint: check the configuration document"));
}
