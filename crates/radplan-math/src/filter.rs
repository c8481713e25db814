// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Window Filters
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Square moving-window filters over 2D grids.
//!
//! The window of an output cell `(r, c)` covers rows `r - size/2 ..= r - size/2 + size - 1`
//! (same for columns), so odd windows are centred and even windows reach one
//! cell further back than forward. Sums are evaluated with a summed-area table
//! over the padded grid, O(rows × cols) regardless of window size.

use ndarray::Array2;
use radplan_types::config::PaddingMode;

/// Pad `input` by the window reach on every side.
fn pad(input: &Array2<f64>, size: usize, padding: PaddingMode) -> Array2<f64> {
    let (rows, cols) = input.dim();
    let lo = size / 2;
    let (pr, pc) = (rows + size - 1, cols + size - 1);

    Array2::from_shape_fn((pr, pc), |(i, j)| {
        let r = i as isize - lo as isize;
        let c = j as isize - lo as isize;
        let inside = r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols;
        match padding {
            PaddingMode::Zero if !inside => 0.0,
            PaddingMode::Zero => input[[r as usize, c as usize]],
            PaddingMode::Nearest => {
                let rr = r.clamp(0, rows as isize - 1) as usize;
                let cc = c.clamp(0, cols as isize - 1) as usize;
                input[[rr, cc]]
            }
        }
    })
}

/// Summed-area table with a leading zero row and column.
fn summed_area(a: &Array2<f64>) -> Array2<f64> {
    let (rows, cols) = a.dim();
    let mut sat = Array2::zeros((rows + 1, cols + 1));
    for i in 0..rows {
        let mut row_acc = 0.0;
        for j in 0..cols {
            row_acc += a[[i, j]];
            sat[[i + 1, j + 1]] = sat[[i, j + 1]] + row_acc;
        }
    }
    sat
}

/// Sum of every `size × size` window.
///
/// Panics if `size == 0`.
pub fn window_sum(input: &Array2<f64>, size: usize, padding: PaddingMode) -> Array2<f64> {
    assert!(size > 0, "window size must be at least 1");
    let (rows, cols) = input.dim();
    if rows == 0 || cols == 0 {
        return Array2::zeros((rows, cols));
    }

    let sat = summed_area(&pad(input, size, padding));
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let (r1, c1) = (r + size, c + size);
        sat[[r1, c1]] - sat[[r, c1]] - sat[[r1, c]] + sat[[r, c]]
    })
}

/// Mean of every `size × size` window; padded cells count towards the mean.
pub fn window_mean(input: &Array2<f64>, size: usize, padding: PaddingMode) -> Array2<f64> {
    let area = (size * size) as f64;
    window_sum(input, size, padding).mapv(|v| v / area)
}

/// 1.0 where `v > 0`, else 0.0.
pub fn binarize_positive(input: &Array2<f64>) -> Array2<f64> {
    input.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
}
