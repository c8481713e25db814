// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Derived Tissue Masks
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Critical-neighbour and tumor-interior masks.

use ndarray::{Array2, Zip};
use radplan_math::filter::{binarize_positive, window_mean, window_sum};
use radplan_types::config::{InteriorRule, InteriorThreshold, PaddingMode};
use radplan_types::constants::NEIGHBOR_WINDOW;
use radplan_types::state::TissueMasks;
use tracing::debug;

/// Cells touching critical tissue that are neither critical nor tumor.
///
/// 3×3 zero-padded mean, binarised; outside the tumor the input critical
/// flag is subtracted so critical cells themselves end at 0. Tumor cells keep
/// their flag when they border critical tissue.
pub fn critical_neighbors(critical: &Array2<f64>, tumor: &Array2<f64>) -> Array2<f64> {
    let mut near = binarize_positive(&window_mean(critical, NEIGHBOR_WINDOW, PaddingMode::Zero));
    Zip::from(&mut near)
        .and(critical)
        .and(tumor)
        .for_each(|n, &c, &t| {
            if t == 0.0 {
                *n -= c;
            }
        });
    near
}

/// Tumor cells deep enough to be exempt from the strict dose floor.
///
/// The tumor mask is window-summed under `rule.padding`; cells whose sum
/// reaches the rule's threshold form the interior. The result is restricted to
/// tumor cells, so an empty tumor has an empty interior.
pub fn tumor_interior(tumor: &Array2<f64>, rule: &InteriorRule) -> Array2<f64> {
    if !tumor.iter().any(|&v| v > 0.0) {
        return Array2::zeros(tumor.dim());
    }
    let sums = window_sum(tumor, rule.window, rule.padding);
    let threshold = match rule.threshold {
        InteriorThreshold::ObservedMaximum => sums.iter().copied().fold(f64::MIN, f64::max),
        InteriorThreshold::FullWindow => (rule.window * rule.window) as f64,
    };
    // Sums of 0/1 entries are integers; half a unit absorbs rounding.
    Zip::from(&sums).and(tumor).map_collect(|&s, &t| {
        if t > 0.0 && s >= threshold - 0.5 {
            1.0
        } else {
            0.0
        }
    })
}

/// Masks derived once per model build.
#[derive(Debug, Clone)]
pub struct DerivedMasks {
    pub neighbor: Array2<f64>,
    pub interior: Array2<f64>,
    /// Tumor minus interior: the cells held to the strict floor.
    pub boundary: Array2<f64>,
}

impl DerivedMasks {
    pub fn compute(masks: &TissueMasks, rule: &InteriorRule) -> Self {
        let neighbor = critical_neighbors(masks.critical(), masks.tumor());
        let interior = tumor_interior(masks.tumor(), rule);
        let boundary = masks.tumor() - &interior;
        debug!(
            neighbor = neighbor.iter().filter(|&&v| v > 0.0).count(),
            interior = interior.sum() as usize,
            boundary = boundary.sum() as usize,
            "derived masks"
        );
        DerivedMasks {
            neighbor,
            interior,
            boundary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(rows: usize, cols: usize, r: usize, c: usize) -> Array2<f64> {
        let mut m = Array2::zeros((rows, cols));
        m[[r, c]] = 1.0;
        m
    }

    #[test]
    fn test_single_critical_cell_has_eight_neighbors() {
        let critical = single(5, 5, 2, 2);
        let tumor = Array2::zeros((5, 5));
        let near = critical_neighbors(&critical, &tumor);
        assert_eq!(near[[2, 2]], 0.0);
        assert_eq!(near.sum(), 8.0);
        for r in 1..=3 {
            for c in 1..=3 {
                if (r, c) != (2, 2) {
                    assert_eq!(near[[r, c]], 1.0);
                }
            }
        }
    }

    #[test]
    fn test_adjacent_critical_cells_not_flagged() {
        let mut critical = single(5, 5, 2, 1);
        critical[[2, 2]] = 1.0;
        let near = critical_neighbors(&critical, &Array2::zeros((5, 5)));
        assert_eq!(near[[2, 1]], 0.0);
        assert_eq!(near[[2, 2]], 0.0);
        assert_eq!(near.sum(), 10.0);
    }

    #[test]
    fn test_tumor_cells_keep_neighbor_flag() {
        let critical = single(5, 5, 2, 2);
        let tumor = single(5, 5, 2, 3);
        let near = critical_neighbors(&critical, &tumor);
        assert_eq!(near[[2, 3]], 1.0);
    }

    #[test]
    fn test_full_window_rule_all_tumor() {
        let tumor = Array2::ones((10, 10));
        let interior = tumor_interior(&tumor, &InteriorRule::full_window());
        assert_eq!(interior, tumor);
    }

    #[test]
    fn test_full_window_rule_small_tumor() {
        let mut tumor = Array2::zeros((20, 20));
        for r in 5..9 {
            for c in 5..9 {
                tumor[[r, c]] = 1.0;
            }
        }
        let interior = tumor_interior(&tumor, &InteriorRule::full_window());
        assert_eq!(interior.sum(), 0.0);
    }

    #[test]
    fn test_observed_maximum_rule_all_tumor() {
        // Zero padding: only cells whose window lies fully inside reach 100.
        // Window rows r-5..=r+4 fit in 0..10 only for r = 5.
        let tumor = Array2::ones((10, 10));
        let interior = tumor_interior(&tumor, &InteriorRule::default());
        assert_eq!(interior.sum(), 1.0);
        assert_eq!(interior[[5, 5]], 1.0);
    }

    #[test]
    fn test_observed_maximum_rule_small_tumor() {
        // A 3×3 tumor fits whole inside many windows; the maximising cells that
        // are themselves tumor form the interior.
        let mut tumor = Array2::zeros((20, 20));
        for r in 8..11 {
            for c in 8..11 {
                tumor[[r, c]] = 1.0;
            }
        }
        let interior = tumor_interior(&tumor, &InteriorRule::default());
        assert_eq!(interior.sum(), 9.0);
        assert!(interior.iter().zip(tumor.iter()).all(|(&i, &t)| i <= t));
    }

    #[test]
    fn test_empty_tumor_has_empty_interior() {
        let tumor = Array2::zeros((6, 6));
        assert_eq!(tumor_interior(&tumor, &InteriorRule::default()).sum(), 0.0);
        assert_eq!(tumor_interior(&tumor, &InteriorRule::full_window()).sum(), 0.0);
    }

    #[test]
    fn test_boundary_is_tumor_minus_interior() {
        let masks = TissueMasks::new(Array2::zeros((12, 12)), Array2::ones((12, 12))).unwrap();
        let derived = DerivedMasks::compute(&masks, &InteriorRule::full_window());
        assert_eq!(derived.boundary.sum(), 0.0);
        assert_eq!(derived.interior.sum(), 144.0);
    }
}
