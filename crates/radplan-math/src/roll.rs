//! Circular shifts of grid rows.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Rotate `row` by `shift` positions: element `k` lands at `(k + shift) mod n`.
/// Negative shifts rotate towards lower indices.
pub fn roll(row: ArrayView1<'_, f64>, shift: isize) -> Array1<f64> {
    let n = row.len();
    if n == 0 {
        return Array1::zeros(0);
    }
    let k = shift.rem_euclid(n as isize) as usize;
    let mut out = Array1::zeros(n);
    for (i, &v) in row.iter().enumerate() {
        out[(i + k) % n] = v;
    }
    out
}

/// Rotate every row of `matrix` independently; `shift_of(row_index)` gives the shift.
pub fn roll_rows<F>(matrix: ArrayView2<'_, f64>, shift_of: F) -> Array2<f64>
where
    F: Fn(usize) -> isize,
{
    let mut out = Array2::zeros(matrix.dim());
    for (r, row) in matrix.rows().into_iter().enumerate() {
        out.row_mut(r).assign(&roll(row, shift_of(r)));
    }
    out
}
