// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Dose Reconstruction
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Weighted beam superposition.
//!
//! Weight variables are named `x<k>` with `k` 1-based; beam libraries are
//! indexed from 0, so `x<k>` scales `library.beam(k - 1)`.

use ndarray::Array2;
use radplan_lp::Solution;
use radplan_types::constants::WEIGHT_PREFIX;
use radplan_types::error::{PlanError, PlanResult};
use radplan_types::state::{BeamLibrary, DoseField};

/// Parse the 1-based beam index out of a weight variable name.
///
/// `Ok(None)` for names outside the weight namespace.
pub fn parse_weight_name(name: &str) -> PlanResult<Option<usize>> {
    let Some(rest) = name.strip_prefix(WEIGHT_PREFIX) else {
        return Ok(None);
    };
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PlanError::VariableName(name.to_string()));
    }
    rest.parse::<usize>()
        .map(Some)
        .map_err(|_| PlanError::VariableName(name.to_string()))
}

/// `(beam index, weight)` for every weight variable of `solution`, in model order.
pub fn beam_weights(solution: &Solution) -> PlanResult<Vec<(usize, f64)>> {
    let mut pairs = Vec::new();
    for (name, value) in solution.iter_var_values() {
        if let Some(index) = parse_weight_name(name)? {
            pairs.push((index, value));
        }
    }
    Ok(pairs)
}

/// `Σ weight · library[index - 1]` over `pairs`; zeros when `pairs` is empty.
///
/// Index 0 or an index past the library end is an error, never wrapped.
pub fn reconstruct_dose(pairs: &[(usize, f64)], library: &BeamLibrary) -> PlanResult<DoseField> {
    let mut dose = Array2::zeros(library.shape());
    for &(index, weight) in pairs {
        if index == 0 || index > library.len() {
            return Err(PlanError::BeamIndexOutOfRange {
                index,
                n_beams: library.len(),
            });
        }
        if weight != 0.0 {
            dose.scaled_add(weight, &library.beam(index - 1));
        }
    }
    Ok(dose)
}

/// Dose field of a solved model over its effective library.
pub fn solution_dose(solution: &Solution, library: &BeamLibrary) -> PlanResult<DoseField> {
    reconstruct_dose(&beam_weights(solution)?, library)
}
