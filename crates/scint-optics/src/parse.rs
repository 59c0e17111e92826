//! Streaming prescription parser.
//!
//! The prescription format is line oriented: `SURF n` opens a surface
//! block, `DIAM`/`DISZ`/`GLAS` lines inside the block carry the surface
//! payload, and the first `UNIT` line declares the file's length unit.

use std::fs;
use std::path::{Path, PathBuf};

use scint_core::errors::{ErrorInfo, SimError};

use crate::model::LensModel;
use crate::surface::LensSurface;

#[derive(Default)]
struct SurfaceAccumulator {
    index: Option<u32>,
    semi_diameter_mm: f64,
    space_to_next_mm: Option<f64>,
    has_glass: bool,
}

impl SurfaceAccumulator {
    /// Commits the current block, if any, and resets the accumulator.
    fn flush(&mut self, surfaces: &mut Vec<LensSurface>) {
        if let Some(index) = self.index.take() {
            surfaces.push(LensSurface {
                index,
                semi_diameter_mm: self.semi_diameter_mm,
                space_to_next_mm: self.space_to_next_mm,
                has_glass: self.has_glass,
            });
        }
        self.semi_diameter_mm = 0.0;
        self.space_to_next_mm = None;
        self.has_glass = false;
    }
}

/// Parses prescription text into an immutable [`LensModel`].
///
/// Pure function of its input: the same text always yields the same model.
pub fn parse_prescription(name: &str, text: &str) -> Result<LensModel, SimError> {
    let mut unit: Option<String> = None;
    let mut surfaces: Vec<LensSurface> = Vec::new();
    let mut current = SurfaceAccumulator::default();

    for line in text.lines() {
        let mut words = line.split_whitespace();
        let Some(token) = words.next() else { continue };
        match token {
            "UNIT" => {
                if unit.is_none() {
                    if let Some(declared) = words.next() {
                        unit = Some(declared.to_ascii_uppercase());
                    }
                }
            }
            "SURF" => {
                if let Some(index) = words.next().and_then(|raw| raw.parse::<u32>().ok()) {
                    current.flush(&mut surfaces);
                    current.index = Some(index);
                }
            }
            // Payload tokens only count inside an open surface block.
            "DIAM" if current.index.is_some() => {
                if let Some(value) = words.next().and_then(|raw| raw.parse::<f64>().ok()) {
                    if value > 0.0 {
                        current.semi_diameter_mm = value;
                    }
                }
            }
            "DISZ" if current.index.is_some() => {
                if let Some(raw) = words.next() {
                    if !raw.eq_ignore_ascii_case("INFINITY") {
                        if let Ok(value) = raw.parse::<f64>() {
                            current.space_to_next_mm = Some(value);
                        }
                    }
                }
            }
            "GLAS" if current.index.is_some() => current.has_glass = true,
            _ => {}
        }
    }
    current.flush(&mut surfaces);

    if let Some(declared) = &unit {
        if declared != "MM" {
            return Err(SimError::Format(
                ErrorInfo::new("prescription-unit", "prescription must be in millimeters")
                    .with_context("lens", name)
                    .with_context("unit", declared),
            ));
        }
    }
    if surfaces.is_empty() {
        return Err(SimError::Format(
            ErrorInfo::new("prescription-empty", "no surface blocks found")
                .with_context("lens", name),
        ));
    }

    let max_semi_diameter_mm = surfaces
        .iter()
        .map(|surface| surface.semi_diameter_mm)
        .filter(|value| *value > 0.0)
        .fold(0.0_f64, f64::max);
    if max_semi_diameter_mm <= 0.0 {
        return Err(SimError::Format(
            ErrorInfo::new("prescription-diameters", "no positive diameter values found")
                .with_context("lens", name),
        ));
    }

    let total_track_mm = surfaces
        .iter()
        .filter(|surface| surface.index > 0)
        .filter_map(|surface| surface.space_to_next_mm)
        .sum();

    let glass_indices: Vec<u32> = surfaces
        .iter()
        .filter(|surface| surface.has_glass)
        .map(|surface| surface.index)
        .collect();
    let group_length_mm = match (glass_indices.iter().min(), glass_indices.iter().max()) {
        (Some(&first), Some(&last)) => surfaces
            .iter()
            .filter(|surface| surface.index >= first && surface.index <= last)
            .filter_map(|surface| surface.space_to_next_mm)
            .sum(),
        _ => 0.0,
    };

    let image = surfaces
        .iter()
        .max_by_key(|surface| surface.index)
        .ok_or_else(|| {
            SimError::Format(
                ErrorInfo::new("prescription-empty", "no surface blocks found")
                    .with_context("lens", name),
            )
        })?;
    let image_semi_diameter_mm = image.semi_diameter_mm.max(0.0);
    let image_circle_diameter_mm = 2.0 * image_semi_diameter_mm;

    // 3:2 rectangle whose diagonal equals the image circle diameter.
    let diagonal_factor = 13.0_f64.sqrt();
    let sensor_width_mm = image_circle_diameter_mm * 3.0 / diagonal_factor;
    let sensor_height_mm = image_circle_diameter_mm * 2.0 / diagonal_factor;

    Ok(LensModel {
        name: name.to_string(),
        source: None,
        image_surface_index: image.index,
        image_semi_diameter_mm,
        image_circle_diameter_mm,
        sensor_width_mm,
        sensor_height_mm,
        max_semi_diameter_mm,
        clear_diameter_mm: 2.0 * max_semi_diameter_mm,
        total_track_mm,
        group_length_mm,
        surfaces,
    })
}

/// Reads and parses a prescription file. The file is never mutated and the
/// result is recomputed from disk on every call.
pub fn parse_prescription_file(path: &Path) -> Result<LensModel, SimError> {
    if !path.exists() {
        return Err(SimError::NotFound(
            ErrorInfo::new("prescription-missing", "prescription file not found")
                .with_context("path", path.display().to_string()),
        ));
    }
    let text = fs::read_to_string(path).map_err(|err| {
        SimError::Serde(
            ErrorInfo::new("prescription-read", "failed to read prescription file")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("lens");
    let mut model = parse_prescription(name, &text)?;
    model.source = Some(path.to_path_buf());
    Ok(model)
}

/// Resolves a lens reference into a concrete prescription path.
///
/// Resolution order: exact filesystem path, file under `base_dir`, then
/// file stem under `base_dir` with a `.zmx` suffix appended.
pub fn resolve_prescription_path(base_dir: &Path, reference: &str) -> Result<PathBuf, SimError> {
    let candidate = PathBuf::from(reference);
    if candidate.exists() {
        return Ok(candidate);
    }
    let in_dir = base_dir.join(&candidate);
    if in_dir.exists() {
        return Ok(in_dir);
    }
    let has_zmx_suffix = candidate
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("zmx"))
        .unwrap_or(false);
    if !has_zmx_suffix {
        let with_ext = base_dir.join(format!("{reference}.zmx"));
        if with_ext.exists() {
            return Ok(with_ext);
        }
    }
    Err(SimError::NotFound(
        ErrorInfo::new("prescription-unresolved", "unable to resolve lens reference")
            .with_context("reference", reference)
            .with_context("base_dir", base_dir.display().to_string()),
    ))
}

/// Parses an ordered list of lens references. The returned order matches
/// the input order, so callers can treat it as optical stacking order.
pub fn load_lens_models(base_dir: &Path, references: &[String]) -> Result<Vec<LensModel>, SimError> {
    let mut models = Vec::with_capacity(references.len());
    for reference in references {
        let path = resolve_prescription_path(base_dir, reference)?;
        models.push(parse_prescription_file(&path)?);
    }
    Ok(models)
}
