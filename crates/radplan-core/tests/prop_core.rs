// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Property-Based Tests (proptest) for radplan-core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for radplan-core using proptest.
//!
//! Covers: dose reconstruction, beam deflection, derived masks, model layout.

use ndarray::{Array2, Array3};
use proptest::prelude::*;
use radplan_core::builder::build_model;
use radplan_core::deflection::{deflect, magnetic_library};
use radplan_core::dose::reconstruct_dose;
use radplan_core::masks::{critical_neighbors, tumor_interior};
use radplan_types::config::{InteriorRule, ModelParams, ModelVariant};
use radplan_types::state::{BeamLibrary, PlanCase, PlanSpecs, TissueMasks};

fn library_strategy() -> impl Strategy<Value = BeamLibrary> {
    (1usize..5, 1usize..8, 1usize..8).prop_flat_map(|(n, rows, cols)| {
        prop::collection::vec(0.0f64..5.0, n * rows * cols).prop_map(move |data| {
            BeamLibrary::new(Array3::from_shape_vec((n, rows, cols), data).unwrap()).unwrap()
        })
    })
}

fn mask_strategy(rows: usize, cols: usize) -> impl Strategy<Value = Array2<f64>> {
    prop::collection::vec(prop::bool::weighted(0.3), rows * cols).prop_map(move |bits| {
        Array2::from_shape_vec(
            (rows, cols),
            bits.into_iter().map(|b| if b { 1.0 } else { 0.0 }).collect(),
        )
        .unwrap()
    })
}

fn sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap());
    v
}

// ── Dose reconstruction ──────────────────────────────────────────────

proptest! {
    /// Per-beam reconstructions sum to the joint reconstruction.
    #[test]
    fn reconstruction_is_additive(lib in library_strategy(), w in prop::collection::vec(0.0f64..3.0, 5)) {
        let pairs: Vec<(usize, f64)> = (1..=lib.len()).map(|k| (k, w[k - 1])).collect();
        let joint = reconstruct_dose(&pairs, &lib).unwrap();
        let mut summed = Array2::<f64>::zeros(lib.shape());
        for &p in &pairs {
            summed = summed + reconstruct_dose(&[p], &lib).unwrap();
        }
        for (a, b) in joint.iter().zip(summed.iter()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }

    /// Unit weights on every beam reproduce the coverage map.
    #[test]
    fn unit_weights_give_coverage(lib in library_strategy()) {
        let pairs: Vec<(usize, f64)> = (1..=lib.len()).map(|k| (k, 1.0)).collect();
        let dose = reconstruct_dose(&pairs, &lib).unwrap();
        for (a, b) in dose.iter().zip(lib.coverage().iter()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }
}

// ── Deflection ───────────────────────────────────────────────────────

proptest! {
    /// Every deflected row holds the same multiset of values as the source row.
    #[test]
    fn deflection_permutes_rows(lib in library_strategy(), p in 0.1f64..1.5) {
        let (left, right) = deflect(&lib, p);
        for i in 0..lib.len() {
            for r in 0..lib.shape().0 {
                let src = sorted(lib.beam(i).row(r).iter().copied());
                prop_assert_eq!(&sorted(left.beam(i).row(r).iter().copied()), &src);
                prop_assert_eq!(&sorted(right.beam(i).row(r).iter().copied()), &src);
            }
        }
    }

    /// Left and right deflection undo each other.
    #[test]
    fn left_then_right_restores(lib in library_strategy(), p in 0.1f64..1.5) {
        let (left, _) = deflect(&lib, p);
        let (_, back) = deflect(&left, p);
        prop_assert_eq!(back.data(), lib.data());
    }

    /// The magnetic library keeps the direct beams first.
    #[test]
    fn magnetic_library_prefix(lib in library_strategy()) {
        let mag = magnetic_library(&lib, 0.75).unwrap();
        prop_assert_eq!(mag.len(), 3 * lib.len());
        for i in 0..lib.len() {
            prop_assert_eq!(mag.beam(i), lib.beam(i));
        }
    }
}

// ── Derived masks ────────────────────────────────────────────────────

proptest! {
    /// Outside the tumor, critical cells are never neighbours and every
    /// neighbour touches critical tissue.
    #[test]
    fn neighbors_exclude_critical(
        (critical, tumor) in (2usize..10, 2usize..10)
            .prop_flat_map(|(r, c)| (mask_strategy(r, c), mask_strategy(r, c)))
    ) {
        let near = critical_neighbors(&critical, &tumor);
        let (rows, cols) = critical.dim();
        for ((r, c), &v) in near.indexed_iter() {
            if tumor[[r, c]] == 0.0 && critical[[r, c]] == 1.0 {
                prop_assert!(v <= 0.0);
            }
            if v > 0.0 {
                let touches = (r.saturating_sub(1)..=(r + 1).min(rows - 1)).any(|i| {
                    (c.saturating_sub(1)..=(c + 1).min(cols - 1)).any(|j| critical[[i, j]] == 1.0)
                });
                prop_assert!(touches);
            }
        }
    }

    /// The interior is always a subset of the tumor.
    #[test]
    fn interior_within_tumor(
        tumor in (1usize..16, 1usize..16).prop_flat_map(|(r, c)| mask_strategy(r, c)),
        full in any::<bool>(),
    ) {
        let rule = if full { InteriorRule::full_window() } else { InteriorRule::default() };
        let interior = tumor_interior(&tumor, &rule);
        for (&i, &t) in interior.iter().zip(tumor.iter()) {
            prop_assert!(i <= t);
        }
    }
}

// ── Model layout ─────────────────────────────────────────────────────

proptest! {
    /// Constraint counts follow the masks; variable counts follow the layout.
    #[test]
    fn constraint_counts_follow_masks(
        (critical, tumor) in (2usize..7, 2usize..7)
            .prop_flat_map(|(r, c)| (mask_strategy(r, c), mask_strategy(r, c))),
        variant_idx in 0usize..4,
    ) {
        let variant = ModelVariant::ALL[variant_idx];
        let (rows, cols) = critical.dim();
        let beams = BeamLibrary::from_matrices(&[Array2::ones((rows, cols)), Array2::ones((rows, cols))]).unwrap();
        let expected_rows = critical.sum() as usize + tumor.sum() as usize;
        let case = PlanCase::new(
            PlanSpecs::from_values([2, rows as i64, cols as i64, 2, 10]).unwrap(),
            TissueMasks::new(critical, tumor).unwrap(),
            beams,
        ).unwrap();
        let model = build_model(&case, variant, &ModelParams::default()).unwrap();
        prop_assert_eq!(model.lp.constraints().len(), expected_rows);
        prop_assert_eq!(model.lp.variables().len(), model.layout.n_vars());
        prop_assert!(model.diagnostics.is_empty());
    }
}
