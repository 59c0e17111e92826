//! In-place geometry patching of existing macro files.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use scint_config::schema::SimConfig;
use scint_core::errors::{ErrorInfo, SimError};

use crate::encode::geometry_commands_for;

/// Replaces geometry command lines in an existing macro with freshly
/// generated ones.
///
/// Every line whose leading command path matches a generated geometry
/// command is replaced; comments, blank lines, and unrelated commands are
/// preserved verbatim and in their original order. Geometry commands with
/// no match anywhere in the file are inserted immediately before
/// `/run/initialize`, or appended at end of file when that line is absent.
/// The new content is staged fully in memory and written in a single
/// overwrite, so a failure before that point leaves the file untouched.
pub fn apply_geometry(config: &SimConfig, path: &Path) -> Result<(), SimError> {
    if !path.exists() {
        return Err(SimError::NotFound(
            ErrorInfo::new("macro-missing", "macro file not found")
                .with_context("path", path.display().to_string()),
        ));
    }
    let original = fs::read_to_string(path).map_err(|err| {
        SimError::Serde(
            ErrorInfo::new("macro-read", "failed to read macro file")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;

    let replacements: Vec<(String, String)> = geometry_commands_for(config)?
        .into_iter()
        .map(|line| {
            let prefix = line
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            (prefix, line)
        })
        .collect();

    let mut replaced: BTreeSet<&str> = BTreeSet::new();
    let mut out_lines: Vec<String> = Vec::new();
    for line in original.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            out_lines.push(line.to_string());
            continue;
        }
        let prefix = stripped.split_whitespace().next().unwrap_or_default();
        match replacements.iter().find(|(known, _)| known == prefix) {
            Some((known, replacement)) => {
                out_lines.push(replacement.clone());
                replaced.insert(known.as_str());
            }
            None => out_lines.push(line.to_string()),
        }
    }

    let missing: Vec<&String> = replacements
        .iter()
        .filter(|(prefix, _)| !replaced.contains(prefix.as_str()))
        .map(|(_, line)| line)
        .collect();
    if !missing.is_empty() {
        let insert_at = out_lines
            .iter()
            .position(|line| line.trim() == "/run/initialize")
            .unwrap_or(out_lines.len());
        for (offset, line) in missing.into_iter().enumerate() {
            out_lines.insert(insert_at + offset, line.clone());
        }
    }

    let mut staged = out_lines.join("\n");
    staged.push('\n');
    fs::write(path, staged).map_err(|err| {
        SimError::Serde(
            ErrorInfo::new("macro-write", "failed to write macro file")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}
