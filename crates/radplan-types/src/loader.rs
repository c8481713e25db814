// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Case Loader
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Reads a planning case directory.
//!
//! Layout:
//! - `specs.txt`: five lines; every non-digit character is dropped and the
//!   remainder parsed (beams, rows, columns, max critical dose, min tumor dose).
//! - `critical_raw.txt`, `tumor_raw.txt`: whitespace separated `rows × cols`.
//! - `beam_raw.txt`: one `rows × cols` block per beam; block `i` starts at
//!   line `i * (rows + 1)`, so consecutive blocks are one line apart.

use std::path::Path;

use ndarray::Array2;
use tracing::{debug, info};

use crate::error::{PlanError, PlanResult};
use crate::state::{BeamLibrary, PlanCase, PlanSpecs, TissueMasks};

pub const SPECS_FILE: &str = "specs.txt";
pub const CRITICAL_FILE: &str = "critical_raw.txt";
pub const TUMOR_FILE: &str = "tumor_raw.txt";
pub const BEAM_FILE: &str = "beam_raw.txt";

fn parse_err(path: &str, line: usize, message: impl Into<String>) -> PlanError {
    PlanError::Parse {
        path: path.to_string(),
        line,
        message: message.into(),
    }
}

/// Parse the five spec lines.
pub fn parse_specs(text: &str, path: &str) -> PlanResult<PlanSpecs> {
    let mut values = [0i64; 5];
    let mut lines = text.lines();
    for (i, slot) in values.iter_mut().enumerate() {
        let line = lines
            .next()
            .ok_or_else(|| parse_err(path, i + 1, "expected 5 spec lines"))?;
        let digits: String = line.chars().filter(|c| c.is_ascii_digit()).collect();
        *slot = digits
            .parse()
            .map_err(|e| parse_err(path, i + 1, format!("no integer in '{line}': {e}")))?;
    }
    PlanSpecs::from_values(values)
}

fn parse_row(line: &str, lineno: usize, path: &str, cols: usize) -> PlanResult<Vec<f64>> {
    let row = line
        .split_whitespace()
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|e| parse_err(path, lineno, format!("bad number '{tok}': {e}")))
        })
        .collect::<PlanResult<Vec<f64>>>()?;
    if row.len() != cols {
        return Err(parse_err(
            path,
            lineno,
            format!("expected {cols} columns, found {}", row.len()),
        ));
    }
    Ok(row)
}

/// Parse the first `rows` non-blank lines starting at line index `skip`.
fn parse_block(
    lines: &[&str],
    skip: usize,
    path: &str,
    rows: usize,
    cols: usize,
) -> PlanResult<Array2<f64>> {
    let mut data = Vec::with_capacity(rows * cols);
    let mut taken = 0;
    for (idx, line) in lines.iter().enumerate().skip(skip) {
        if taken == rows {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        data.extend(parse_row(line, idx + 1, path, cols)?);
        taken += 1;
    }
    if taken != rows {
        return Err(parse_err(
            path,
            lines.len(),
            format!("expected {rows} rows from line {}, found {taken}", skip + 1),
        ));
    }
    Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| parse_err(path, skip + 1, format!("reshape failed: {e}")))
}

/// Parse a single `rows × cols` matrix.
pub fn parse_matrix(text: &str, path: &str, rows: usize, cols: usize) -> PlanResult<Array2<f64>> {
    let lines: Vec<&str> = text.lines().collect();
    parse_block(&lines, 0, path, rows, cols)
}

/// Parse the stacked beam file.
pub fn parse_beams(text: &str, path: &str, specs: &PlanSpecs) -> PlanResult<BeamLibrary> {
    let lines: Vec<&str> = text.lines().collect();
    let beams = (0..specs.n_beams)
        .map(|i| parse_block(&lines, i * (specs.rows + 1), path, specs.rows, specs.cols))
        .collect::<PlanResult<Vec<_>>>()?;
    BeamLibrary::from_matrices(&beams)
}

fn read(dir: &Path, file: &str) -> PlanResult<(String, String)> {
    let path = dir.join(file);
    let display = path.to_string_lossy().to_string();
    let text = std::fs::read_to_string(&path)?;
    Ok((text, display))
}

/// Load and cross-validate a whole case directory.
pub fn load_case(dir: impl AsRef<Path>) -> PlanResult<PlanCase> {
    let dir = dir.as_ref();

    let (text, path) = read(dir, SPECS_FILE)?;
    let specs = parse_specs(&text, &path)?;
    debug!(?specs, "specs loaded");

    let (text, path) = read(dir, CRITICAL_FILE)?;
    let critical = parse_matrix(&text, &path, specs.rows, specs.cols)?;
    let (text, path) = read(dir, TUMOR_FILE)?;
    let tumor = parse_matrix(&text, &path, specs.rows, specs.cols)?;
    let masks = TissueMasks::new(critical, tumor)?;

    let (text, path) = read(dir, BEAM_FILE)?;
    let beams = parse_beams(&text, &path, &specs)?;

    info!(
        case = %dir.display(),
        beams = beams.len(),
        rows = specs.rows,
        cols = specs.cols,
        critical = masks.critical_count(),
        tumor = masks.tumor_count(),
        "case loaded"
    );
    PlanCase::new(specs, masks, beams)
}
