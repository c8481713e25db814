// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::{concatenate, Array2, Array3, ArrayView2, Axis};
use tracing::warn;

use crate::error::{PlanError, PlanResult};

/// Aggregate dose per grid cell [rows, cols].
pub type DoseField = Array2<f64>;

/// The five integer case specs, in file order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanSpecs {
    pub n_beams: usize,
    pub rows: usize,
    pub cols: usize,
    pub max_critical_dose: f64, // D_max
    pub min_tumor_dose: f64,    // D_min
}

impl PlanSpecs {
    /// Build from `[beams, rows, cols, max critical dose, min tumor dose]`.
    pub fn from_values(values: [i64; 5]) -> PlanResult<Self> {
        if let Some(bad) = values.iter().position(|&v| v <= 0) {
            return Err(PlanError::ConfigError(format!(
                "spec #{} must be positive, got {}",
                bad + 1,
                values[bad]
            )));
        }
        let specs = PlanSpecs {
            n_beams: values[0] as usize,
            rows: values[1] as usize,
            cols: values[2] as usize,
            max_critical_dose: values[3] as f64,
            min_tumor_dose: values[4] as f64,
        };
        if specs.max_critical_dose >= specs.min_tumor_dose {
            warn!(
                d_max = specs.max_critical_dose,
                d_min = specs.min_tumor_dose,
                "critical ceiling is not below the tumor floor"
            );
        }
        Ok(specs)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn n_cells(&self) -> usize {
        self.rows * self.cols
    }
}

/// Critical and tumor classification of the grid, both 0/1 valued.
#[derive(Debug, Clone)]
pub struct TissueMasks {
    critical: Array2<f64>,
    tumor: Array2<f64>,
}

impl TissueMasks {
    pub fn new(critical: Array2<f64>, tumor: Array2<f64>) -> PlanResult<Self> {
        if critical.dim() != tumor.dim() {
            return Err(PlanError::ShapeMismatch {
                what: "tumor mask".to_string(),
                expected: critical.dim(),
                found: tumor.dim(),
            });
        }
        check_binary("critical", &critical)?;
        check_binary("tumor", &tumor)?;

        let masks = TissueMasks { critical, tumor };
        let overlap = masks.overlap();
        if !overlap.is_empty() {
            warn!(
                cells = overlap.len(),
                first = ?overlap[0],
                "cells flagged both critical and tumor carry conflicting constraints"
            );
        }
        Ok(masks)
    }

    pub fn critical(&self) -> &Array2<f64> {
        &self.critical
    }

    pub fn tumor(&self) -> &Array2<f64> {
        &self.tumor
    }

    pub fn shape(&self) -> (usize, usize) {
        self.critical.dim()
    }

    pub fn critical_count(&self) -> usize {
        self.critical.iter().filter(|&&v| v == 1.0).count()
    }

    pub fn tumor_count(&self) -> usize {
        self.tumor.iter().filter(|&&v| v == 1.0).count()
    }

    /// Cells flagged both critical and tumor, row-major.
    pub fn overlap(&self) -> Vec<(usize, usize)> {
        self.critical
            .indexed_iter()
            .filter(|&((r, c), &v)| v == 1.0 && self.tumor[[r, c]] == 1.0)
            .map(|(idx, _)| idx)
            .collect()
    }
}

fn check_binary(mask: &'static str, m: &Array2<f64>) -> PlanResult<()> {
    match m.indexed_iter().find(|(_, &v)| v != 0.0 && v != 1.0) {
        Some(((row, col), &value)) => Err(PlanError::InvalidMask {
            mask,
            row,
            col,
            value,
        }),
        None => Ok(()),
    }
}

/// Per-beam dose at unit intensity, stored as [beam, row, col].
#[derive(Debug, Clone, PartialEq)]
pub struct BeamLibrary {
    beams: Array3<f64>,
}

impl BeamLibrary {
    /// Validates that every entry is finite and non-negative.
    pub fn new(beams: Array3<f64>) -> PlanResult<Self> {
        if let Some(((beam, row, col), &value)) = beams
            .indexed_iter()
            .find(|(_, &v)| !v.is_finite() || v < 0.0)
        {
            return Err(PlanError::InvalidBeam {
                beam,
                row,
                col,
                value,
            });
        }
        Ok(BeamLibrary { beams })
    }

    /// Wraps data derived from an already validated library (e.g. a permutation
    /// of its entries) without re-scanning it.
    pub fn new_unchecked(beams: Array3<f64>) -> Self {
        BeamLibrary { beams }
    }

    pub fn from_matrices(matrices: &[Array2<f64>]) -> PlanResult<Self> {
        let Some(first) = matrices.first() else {
            return Err(PlanError::ConfigError(
                "beam library needs at least one beam".to_string(),
            ));
        };
        let shape = first.dim();
        let mut views = Vec::with_capacity(matrices.len());
        for m in matrices {
            if m.dim() != shape {
                return Err(PlanError::ShapeMismatch {
                    what: format!("beam {}", views.len()),
                    expected: shape,
                    found: m.dim(),
                });
            }
            views.push(m.view().insert_axis(Axis(0)));
        }
        let beams = concatenate(Axis(0), &views)
            .map_err(|e| PlanError::ConfigError(format!("cannot stack beams: {e}")))?;
        Self::new(beams)
    }

    pub fn len(&self) -> usize {
        self.beams.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grid shape (rows, cols) of every beam.
    pub fn shape(&self) -> (usize, usize) {
        let (_, r, c) = self.beams.dim();
        (r, c)
    }

    /// 0-based beam access.
    pub fn beam(&self, index: usize) -> ArrayView2<'_, f64> {
        self.beams.index_axis(Axis(0), index)
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.beams
    }

    /// Dose every cell receives when all beams fire at unit weight.
    pub fn coverage(&self) -> Array2<f64> {
        self.beams.sum_axis(Axis(0))
    }

    /// Stacks libraries beam-wise, preserving order.
    pub fn concat(parts: &[&BeamLibrary]) -> PlanResult<Self> {
        let Some(first) = parts.first() else {
            return Err(PlanError::ConfigError(
                "nothing to concatenate".to_string(),
            ));
        };
        let shape = first.shape();
        if let Some(bad) = parts.iter().find(|p| p.shape() != shape) {
            return Err(PlanError::ShapeMismatch {
                what: "concatenated beam library".to_string(),
                expected: shape,
                found: bad.shape(),
            });
        }
        let views: Vec<_> = parts.iter().map(|p| p.beams.view()).collect();
        let beams = concatenate(Axis(0), &views)
            .map_err(|e| PlanError::ConfigError(format!("cannot stack beams: {e}")))?;
        Ok(BeamLibrary { beams })
    }
}

/// A fully loaded and cross-validated planning case.
#[derive(Debug, Clone)]
pub struct PlanCase {
    pub specs: PlanSpecs,
    pub masks: TissueMasks,
    pub beams: BeamLibrary,
}

impl PlanCase {
    pub fn new(specs: PlanSpecs, masks: TissueMasks, beams: BeamLibrary) -> PlanResult<Self> {
        if masks.shape() != specs.shape() {
            return Err(PlanError::ShapeMismatch {
                what: "tissue masks".to_string(),
                expected: specs.shape(),
                found: masks.shape(),
            });
        }
        if beams.shape() != specs.shape() {
            return Err(PlanError::ShapeMismatch {
                what: "beam library".to_string(),
                expected: specs.shape(),
                found: beams.shape(),
            });
        }
        if beams.len() != specs.n_beams {
            return Err(PlanError::ConfigError(format!(
                "specs announce {} beams, library holds {}",
                specs.n_beams,
                beams.len()
            )));
        }
        Ok(PlanCase {
            specs,
            masks,
            beams,
        })
    }
}
