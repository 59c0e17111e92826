//! YAML document boundary for [`SimConfig`].
//!
//! The document root must be a mapping. Known section keys are parsed
//! strictly (unknown keys inside a section are rejected), while unknown
//! *top-level* keys are ignored so callers can co-locate script-level
//! settings in the same file. Writing emits sections in the schema's
//! canonical order with the external key spellings.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use scint_core::errors::{ErrorInfo, SimError};

use crate::schema::{
    MetadataConfig, OpticalConfig, ScintillatorConfig, SimConfig, SimulationConfig, SourceConfig,
};

fn serde_error(code: &str, err: impl ToString) -> SimError {
    SimError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn lookup<'a>(mapping: &'a Mapping, names: &[&str]) -> Option<&'a Value> {
    mapping.iter().find_map(|(key, value)| match key {
        Value::String(name) if names.contains(&name.as_str()) => Some(value),
        _ => None,
    })
}

fn parse_section<T: DeserializeOwned>(value: &Value, section: &str) -> Result<T, SimError> {
    serde_yaml::from_value(value.clone()).map_err(|err| {
        SimError::Serde(
            ErrorInfo::new("document-section", "failed to parse document section")
                .with_context("section", section)
                .with_hint(err.to_string()),
        )
    })
}

fn require_section<T: DeserializeOwned>(mapping: &Mapping, names: &[&str]) -> Result<T, SimError> {
    let value = lookup(mapping, names).ok_or_else(|| {
        SimError::Format(
            ErrorInfo::new("document-section-missing", "required document section is missing")
                .with_context("section", names[0]),
        )
    })?;
    parse_section(value, names[0])
}

fn optional_section<T: DeserializeOwned>(
    mapping: &Mapping,
    names: &[&str],
) -> Result<Option<T>, SimError> {
    match lookup(mapping, names) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_section(value, names[0]).map(Some),
    }
}

/// Parses and validates a configuration document from YAML text.
pub fn from_yaml_str(text: &str) -> Result<SimConfig, SimError> {
    let root: Value = serde_yaml::from_str(text).map_err(|err| serde_error("yaml-parse", err))?;
    let Value::Mapping(mapping) = root else {
        return Err(SimError::Format(ErrorInfo::new(
            "document-root",
            "configuration document root must be a mapping",
        )));
    };

    let scintillator: ScintillatorConfig = require_section(&mapping, &["scintillator"])?;
    let source: Option<SourceConfig> = optional_section(&mapping, &["source"])?;
    let optical: OpticalConfig = require_section(&mapping, &["optical"])?;
    let metadata: MetadataConfig = require_section(&mapping, &["Metadata", "metadata"])?;
    let simulation: Option<SimulationConfig> = optional_section(&mapping, &["simulation"])?;

    let config = SimConfig {
        scintillator,
        source,
        optical,
        metadata,
        simulation,
    };
    config.validate()?;
    Ok(config)
}

/// Reads and validates a configuration document from disk.
pub fn from_yaml_file(path: &Path) -> Result<SimConfig, SimError> {
    if !path.exists() {
        return Err(SimError::NotFound(
            ErrorInfo::new("document-missing", "configuration document not found")
                .with_context("path", path.display().to_string()),
        ));
    }
    let text = fs::read_to_string(path).map_err(|err| {
        SimError::Serde(
            ErrorInfo::new("document-read", "failed to read configuration document")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    from_yaml_str(&text)
}

/// Serializes a configuration in canonical section order.
pub fn to_yaml_string(config: &SimConfig) -> Result<String, SimError> {
    serde_yaml::to_string(config).map_err(|err| serde_error("yaml-serialize", err))
}

/// Writes a configuration document; content is staged fully in memory
/// before a single overwrite.
pub fn write_yaml(config: &SimConfig, path: &Path) -> Result<(), SimError> {
    let text = to_yaml_string(config)?;
    fs::write(path, text).map_err(|err| {
        SimError::Serde(
            ErrorInfo::new("document-write", "failed to write configuration document")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}
