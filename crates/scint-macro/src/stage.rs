//! Stage-directory resolution for simulation runs.
//!
//! The codec itself never creates directories or embeds path-fallback
//! policy; callers hand it a [`DirectoryResolver`] when staged paths are
//! needed.

use std::fs;
use std::path::{Path, PathBuf};

use scint_config::schema::SimConfig;
use scint_core::errors::{ErrorInfo, SimError};

use crate::encode::write_macro;

/// Stage folder receiving engine photon output under the run root.
pub const SIMULATED_PHOTONS_STAGE_DIR: &str = "simulatedPhotons";
/// Stage folder for optical-transport staging under the run root.
pub const TRANSPORT_PHOTONS_STAGE_DIR: &str = "transportPhotons";
/// Stage folder for generated macros under the run root.
pub const MACROS_STAGE_DIR: &str = "macros";
/// Macro filename used when the run identifier is blank.
pub const DEFAULT_GENERATED_MACRO_FILENAME: &str = "generated_from_config.mac";

/// Maps a configuration onto concrete output, log, transport, and macro
/// directories.
pub trait DirectoryResolver {
    /// Directory receiving engine output files.
    fn output_dir(&self, config: &SimConfig) -> PathBuf;
    /// Directory receiving log files.
    fn log_dir(&self, config: &SimConfig) -> PathBuf;
    /// Directory receiving optical-transport staging files.
    fn transport_dir(&self, config: &SimConfig) -> PathBuf;
    /// Directory receiving generated macro files.
    fn macro_dir(&self, config: &SimConfig) -> PathBuf;
}

/// Default stage layout: `<data-directory>[/<run-id>]/<stage>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageLayout;

impl StageLayout {
    fn run_root(&self, config: &SimConfig) -> PathBuf {
        let base = PathBuf::from(&config.metadata.output_info.data_directory);
        let run_id = config.metadata.simulation_run_id.trim();
        if run_id.is_empty() {
            base
        } else {
            base.join(run_id)
        }
    }
}

impl DirectoryResolver for StageLayout {
    fn output_dir(&self, config: &SimConfig) -> PathBuf {
        self.run_root(config).join(SIMULATED_PHOTONS_STAGE_DIR)
    }

    fn log_dir(&self, config: &SimConfig) -> PathBuf {
        PathBuf::from(&config.metadata.output_info.log_directory)
    }

    fn transport_dir(&self, config: &SimConfig) -> PathBuf {
        self.run_root(config).join(TRANSPORT_PHOTONS_STAGE_DIR)
    }

    fn macro_dir(&self, config: &SimConfig) -> PathBuf {
        self.run_root(config).join(MACROS_STAGE_DIR)
    }
}

fn create_dir(path: &Path) -> Result<(), SimError> {
    fs::create_dir_all(path).map_err(|err| {
        SimError::Serde(
            ErrorInfo::new("stage-create", "failed to create stage directory")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}

/// Default macro path under the resolver's macro directory:
/// `<run-id>.mac`, falling back to a generic name for blank identifiers.
pub fn default_macro_path(resolver: &dyn DirectoryResolver, config: &SimConfig) -> PathBuf {
    let run_id = config.metadata.simulation_run_id.trim();
    let filename = if run_id.is_empty() {
        DEFAULT_GENERATED_MACRO_FILENAME.to_string()
    } else {
        format!("{run_id}.mac")
    };
    resolver.macro_dir(config).join(filename)
}

/// Creates the output, log, transport, and macro stage directories and
/// returns the output directory.
pub fn ensure_stage_directories(
    resolver: &dyn DirectoryResolver,
    config: &SimConfig,
) -> Result<PathBuf, SimError> {
    let output_dir = resolver.output_dir(config);
    create_dir(&output_dir)?;
    create_dir(&resolver.log_dir(config))?;
    create_dir(&resolver.transport_dir(config))?;
    create_dir(&resolver.macro_dir(config))?;
    Ok(output_dir)
}

/// Ensures stage directories exist, writes the macro at its default path,
/// and returns that path.
pub fn write_macro_to_stage(
    config: &SimConfig,
    resolver: &dyn DirectoryResolver,
) -> Result<PathBuf, SimError> {
    ensure_stage_directories(resolver, config)?;
    let path = default_macro_path(resolver, config);
    write_macro(config, &path)?;
    Ok(path)
}
