// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Property-Based Tests (proptest) for radplan-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for radplan-types using proptest.
//!
//! Covers: spec parsing, mask validation, beam library stacking and coverage.

use ndarray::{Array2, Array3};
use proptest::prelude::*;
use radplan_types::loader::{parse_beams, parse_specs};
use radplan_types::state::{BeamLibrary, PlanSpecs, TissueMasks};

// ── Specs ────────────────────────────────────────────────────────────

proptest! {
    /// Labels and punctuation around the numbers never change the parsed specs.
    #[test]
    fn specs_ignore_labels(
        beams in 1i64..500,
        rows in 1i64..200,
        cols in 1i64..200,
        d_max in 1i64..50,
        d_min in 1i64..50,
    ) {
        let text = format!(
            "beams: {beams}\nrows = {rows}\ncolumns - {cols}\nmax dose {d_max}.\nmin dose ({d_min})\n"
        );
        let specs = parse_specs(&text, "specs.txt").unwrap();
        prop_assert_eq!(specs.n_beams, beams as usize);
        prop_assert_eq!(specs.shape(), (rows as usize, cols as usize));
        prop_assert_eq!(specs.max_critical_dose, d_max as f64);
        prop_assert_eq!(specs.min_tumor_dose, d_min as f64);
    }
}

// ── Masks ────────────────────────────────────────────────────────────

proptest! {
    /// Any 0/1 pair of equal shape is accepted and counted exactly.
    #[test]
    fn binary_masks_accepted(
        rows in 1usize..12,
        cols in 1usize..12,
        seed in any::<u64>(),
    ) {
        let critical = Array2::from_shape_fn((rows, cols), |(r, c)| {
            ((seed >> ((r * cols + c) % 64)) & 1) as f64
        });
        let tumor = critical.mapv(|v| 1.0 - v);
        let expected_c = critical.sum() as usize;

        let masks = TissueMasks::new(critical, tumor).unwrap();
        prop_assert_eq!(masks.critical_count(), expected_c);
        prop_assert_eq!(masks.tumor_count(), rows * cols - expected_c);
        prop_assert!(masks.overlap().is_empty());
    }
}

// ── Beam library ─────────────────────────────────────────────────────

proptest! {
    /// Coverage equals the per-cell sum over every beam.
    #[test]
    fn coverage_is_beam_sum(
        n in 1usize..6,
        rows in 1usize..8,
        cols in 1usize..8,
    ) {
        let data = Array3::from_shape_fn((n, rows, cols), |(b, r, c)| {
            ((b + 1) * (r + 2) + c) as f64 * 0.25
        });
        let lib = BeamLibrary::new(data.clone()).unwrap();
        let cov = lib.coverage();
        for r in 0..rows {
            for c in 0..cols {
                let expected: f64 = (0..n).map(|b| data[[b, r, c]]).sum();
                prop_assert!((cov[[r, c]] - expected).abs() < 1e-12);
            }
        }
    }

    /// Concatenation keeps every beam in order.
    #[test]
    fn concat_preserves_order(a in 1usize..5, b in 1usize..5) {
        let left = BeamLibrary::new(Array3::from_elem((a, 2, 3), 1.0)).unwrap();
        let right = BeamLibrary::new(Array3::from_elem((b, 2, 3), 2.0)).unwrap();
        let joined = BeamLibrary::concat(&[&left, &right]).unwrap();
        prop_assert_eq!(joined.len(), a + b);
        prop_assert_eq!(joined.beam(a - 1)[[0, 0]], 1.0);
        prop_assert_eq!(joined.beam(a)[[0, 0]], 2.0);
    }

    /// Beam blocks separated by one line parse back to the written values.
    #[test]
    fn beam_file_blocks(n in 1usize..5, rows in 1usize..5, cols in 1usize..5) {
        let specs = PlanSpecs::from_values([n as i64, rows as i64, cols as i64, 2, 10]).unwrap();
        let mut text = String::new();
        for b in 0..n {
            for r in 0..rows {
                let line: Vec<String> = (0..cols).map(|c| format!("{}", b * 100 + r * 10 + c)).collect();
                text.push_str(&line.join(" "));
                text.push('\n');
            }
            text.push('\n');
        }
        let lib = parse_beams(&text, "beam_raw.txt", &specs).unwrap();
        prop_assert_eq!(lib.len(), n);
        for b in 0..n {
            for r in 0..rows {
                for c in 0..cols {
                    prop_assert_eq!(lib.beam(b)[[r, c]], (b * 100 + r * 10 + c) as f64);
                }
            }
        }
    }
}
