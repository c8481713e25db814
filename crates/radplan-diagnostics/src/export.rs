// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Renderer Export
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! `.npz` archives for an external visualiser.

use std::fs::File;
use std::path::Path;

use ndarray::{Array2, Axis};
use ndarray_npy::NpzWriter;
use radplan_core::deflection::deflect;
use radplan_types::error::{PlanError, PlanResult};
use radplan_types::state::{BeamLibrary, DoseField};
use tracing::info;

use crate::effectiveness::EffectivenessReport;

fn write_arrays(path: &Path, arrays: &[(&str, &Array2<f64>)]) -> PlanResult<()> {
    let file = File::create(path)?;
    let mut writer = NpzWriter::new(file);
    for (name, array) in arrays {
        writer
            .add_array(*name, *array)
            .map_err(|e| PlanError::Export(format!("{}: {name}: {e}", path.display())))?;
    }
    writer
        .finish()
        .map_err(|e| PlanError::Export(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), arrays = arrays.len(), "npz written");
    Ok(())
}

/// Arrays `dose`, `critical_dose`, `tumor_dose`, `critical`, `tumor`.
pub fn write_dose_npz(
    path: impl AsRef<Path>,
    dose: &DoseField,
    report: &EffectivenessReport,
    critical: &Array2<f64>,
    tumor: &Array2<f64>,
) -> PlanResult<()> {
    write_arrays(
        path.as_ref(),
        &[
            ("dose", dose),
            ("critical_dose", &report.critical_dose),
            ("tumor_dose", &report.tumor_dose),
            ("critical", critical),
            ("tumor", tumor),
        ],
    )
}

/// Summed library under no, right and left deflection: arrays `none`,
/// `right`, `left`.
pub fn write_shift_preview(
    path: impl AsRef<Path>,
    library: &BeamLibrary,
    exponent: f64,
) -> PlanResult<()> {
    let (left, right) = deflect(library, exponent);
    let none = library.coverage();
    let right = right.data().sum_axis(Axis(0));
    let left = left.data().sum_axis(Axis(0));
    write_arrays(
        path.as_ref(),
        &[("none", &none), ("right", &right), ("left", &left)],
    )
}
