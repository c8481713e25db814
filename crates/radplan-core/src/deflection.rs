// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Magnetic Beam Deflection
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Row-dependent lateral displacement of beam dose patterns.
//!
//! Row `r` of an `R`-row beam moves sideways by `floor(r^p)` cells in the
//! upper half and `floor((R - r)^p)` in the lower half: strongest towards the
//! middle rows, zero at the top edge. Right deflection rolls by `+shift`, left
//! by `-shift`.

use ndarray::{Array3, Axis};
use radplan_math::roll::roll_rows;
use radplan_types::error::PlanResult;
use radplan_types::state::BeamLibrary;

/// Lateral displacement of row `row` out of `rows`.
pub fn shift_magnitude(row: usize, rows: usize, exponent: f64) -> usize {
    // r < R/2 compared in integers: 2r < R.
    let depth = if 2 * row < rows { row } else { rows - row };
    (depth as f64).powf(exponent).floor() as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deflection {
    Left,
    Right,
}

impl Deflection {
    fn sign(self) -> isize {
        match self {
            Deflection::Left => -1,
            Deflection::Right => 1,
        }
    }
}

/// New library with every beam deflected in `direction`. The input is untouched.
pub fn deflect_library(library: &BeamLibrary, exponent: f64, direction: Deflection) -> BeamLibrary {
    let (rows, cols) = library.shape();
    let mut out = Array3::zeros((library.len(), rows, cols));
    for (i, mut slot) in out.axis_iter_mut(Axis(0)).enumerate() {
        let shifted = roll_rows(library.beam(i), |r| {
            direction.sign() * shift_magnitude(r, rows, exponent) as isize
        });
        slot.assign(&shifted);
    }
    // A row permutation keeps every entry finite and non-negative.
    BeamLibrary::new_unchecked(out)
}

/// `(left, right)` deflected copies of `library`.
pub fn deflect(library: &BeamLibrary, exponent: f64) -> (BeamLibrary, BeamLibrary) {
    (
        deflect_library(library, exponent, Deflection::Left),
        deflect_library(library, exponent, Deflection::Right),
    )
}

/// `[direct, left, right]`: the library indexed by a steering model's weights.
pub fn magnetic_library(library: &BeamLibrary, exponent: f64) -> PlanResult<BeamLibrary> {
    let (left, right) = deflect(library, exponent);
    BeamLibrary::concat(&[library, &left, &right])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_shift_magnitudes() {
        // 8 rows, p = 0.75: rows 0..3 use r, rows 4..7 use 8 - r.
        let shifts: Vec<usize> = (0..8).map(|r| shift_magnitude(r, 8, 0.75)).collect();
        assert_eq!(shifts, vec![0, 1, 1, 2, 2, 2, 1, 1]);
    }

    #[test]
    fn test_shift_magnitude_exponent_one() {
        let shifts: Vec<usize> = (0..5).map(|r| shift_magnitude(r, 5, 1.0)).collect();
        assert_eq!(shifts, vec![0, 1, 2, 2, 1]);
    }

    #[test]
    fn test_directions_are_opposite() {
        let beam = Array2::from_shape_fn((4, 5), |(r, c)| (r * 5 + c) as f64);
        let lib = BeamLibrary::from_matrices(&[beam]).unwrap();
        let (left, right) = deflect(&lib, 1.0);

        // Row 1 moves by one cell.
        assert_eq!(right.beam(0).row(1), array![9.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(left.beam(0).row(1), array![6.0, 7.0, 8.0, 9.0, 5.0]);
        // Row 0 stays put.
        assert_eq!(left.beam(0).row(0), lib.beam(0).row(0));
    }

    #[test]
    fn test_input_not_mutated() {
        let beam = Array2::from_shape_fn((6, 6), |(r, c)| (r + 2 * c) as f64);
        let lib = BeamLibrary::from_matrices(&[beam.clone()]).unwrap();
        let _ = deflect(&lib, 0.75);
        assert_eq!(lib.beam(0), beam.view());
    }

    #[test]
    fn test_magnetic_library_layout() {
        let lib = BeamLibrary::from_matrices(&[
            Array2::from_elem((3, 3), 1.0),
            Array2::from_elem((3, 3), 2.0),
        ])
        .unwrap();
        let mag = magnetic_library(&lib, 0.75).unwrap();
        assert_eq!(mag.len(), 6);
        // Constant beams are invariant under rolling.
        assert_eq!(mag.beam(3), lib.beam(1));
        assert_eq!(mag.beam(5), lib.beam(1));
    }
}
