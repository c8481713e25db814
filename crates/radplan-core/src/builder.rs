// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Model Builder
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! LP construction for the five planning formulations (plus 2.1).
//!
//! A build is one pass over the grid producing complete constraint and
//! objective values, handed to [`LpModel::new`] once:
//!
//! | Variant | Ceiling / floor | Slack, surplus bounds | Objective |
//! |---|---|---|---|
//! | 1   | hard                   | none          | `Σ dose·(c − t)` |
//! | 2   | relaxed                | [0,2], [0,10] | `Σ dose·c` |
//! | 2.1 | relaxed                | [0,10], [0,10]| `+ slack·c + surplus·t` |
//! | 3   | relaxed                | [0,1], [0,10] | `Σ dose·(c + pn·n) + slack·c + surplus·t` |
//! | 4   | floor on boundary only | [0,∞), [0,10] | surplus priced `boundary + interior·pr` |
//! | 5   | as 4, three weight sets| [0,2], [0,20] | as 4 over direct, left and right |

use std::fmt;

use ndarray::{Array1, Array2, Axis};
use radplan_lp::{Constraint, Direction, LinearExpr, LpModel, Relation, VarId, Variable};
use radplan_types::config::{ModelParams, ModelVariant, SlackBounds};
use radplan_types::constants::{SLACK_PREFIX, SURPLUS_PREFIX, WEIGHT_PREFIX};
use radplan_types::error::{PlanError, PlanResult};
use radplan_types::state::{BeamLibrary, PlanCase};
use tracing::{info, warn};

use crate::deflection::magnetic_library;
use crate::masks::DerivedMasks;

/// Slack/surplus upper bounds a variant starts from; `None` for hard constraints.
pub fn default_bounds(variant: ModelVariant) -> Option<SlackBounds> {
    let (slack_upper, surplus_upper) = match variant {
        ModelVariant::HardConstraints => return None,
        ModelVariant::Relaxed => (2.0, 10.0),
        ModelVariant::RelaxedCosted => (10.0, 10.0),
        ModelVariant::NeighborPenalty => (1.0, 10.0),
        ModelVariant::InteriorCarveOut => (f64::INFINITY, 10.0),
        ModelVariant::MagneticSteering => (2.0, 20.0),
    };
    Some(SlackBounds {
        slack_upper,
        surplus_upper,
    })
}

/// Deterministic variable indexing of one build.
///
/// Weights first (`x1..xW`, `W = n_beams · directions`), then one slack per
/// cell in row-major order, then one surplus per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLayout {
    pub n_beams: usize,
    /// 1, or 3 for direct/left/right steering.
    pub directions: usize,
    pub rows: usize,
    pub cols: usize,
    pub relaxed: bool,
}

impl VariableLayout {
    pub fn n_weights(&self) -> usize {
        self.n_beams * self.directions
    }

    fn n_cells(&self) -> usize {
        self.rows * self.cols
    }

    pub fn n_vars(&self) -> usize {
        if self.relaxed {
            self.n_weights() + 2 * self.n_cells()
        } else {
            self.n_weights()
        }
    }

    /// Weight of effective-library beam `k` (0-based); named `x{k+1}`.
    pub fn weight(&self, k: usize) -> VarId {
        VarId::new(k)
    }

    pub fn slack(&self, row: usize, col: usize) -> Option<VarId> {
        self.relaxed
            .then(|| VarId::new(self.n_weights() + row * self.cols + col))
    }

    pub fn surplus(&self, row: usize, col: usize) -> Option<VarId> {
        self.relaxed
            .then(|| VarId::new(self.n_weights() + self.n_cells() + row * self.cols + col))
    }

    fn variables(&self, bounds: Option<SlackBounds>) -> Vec<Variable> {
        let mut vars = Vec::with_capacity(self.n_vars());
        vars.extend((1..=self.n_weights()).map(|k| Variable::non_negative(format!("{WEIGHT_PREFIX}{k}"))));
        if let Some(b) = bounds {
            for (prefix, upper) in [(SLACK_PREFIX, b.slack_upper), (SURPLUS_PREFIX, b.surplus_upper)] {
                for r in 0..self.rows {
                    for c in 0..self.cols {
                        vars.push(Variable::bounded(format!("{prefix}_{r}_{c}"), 0.0, upper));
                    }
                }
            }
        }
        vars
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Critical,
    Tumor,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Region::Critical => "critical",
            Region::Tumor => "tumor",
        })
    }
}

/// A constrained cell that no beam of the effective library reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDiagnostic {
    pub row: usize,
    pub col: usize,
    pub region: Region,
}

impl fmt::Display for CellDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cell ({}, {}) receives no dose from any beam",
            self.region, self.row, self.col
        )
    }
}

/// A built model with everything needed to interpret its solution.
#[derive(Debug, Clone)]
pub struct PlanModel {
    pub variant: ModelVariant,
    pub lp: LpModel,
    pub layout: VariableLayout,
    pub diagnostics: Vec<CellDiagnostic>,
    pub derived: DerivedMasks,
    /// Cells held to the tumor floor: the tumor mask, or its boundary for 4-5.
    pub floor_mask: Array2<f64>,
    /// Library indexed by the weight variables.
    pub library: BeamLibrary,
}

/// `Σ_cells beam_k · mask` for every beam `k`.
fn masked_totals(library: &BeamLibrary, mask: &Array2<f64>) -> Array1<f64> {
    library
        .data()
        .axis_iter(Axis(0))
        .map(|beam| (&beam * mask).sum())
        .collect()
}

fn dose_expr(library: &BeamLibrary, layout: &VariableLayout, row: usize, col: usize) -> LinearExpr {
    let data = library.data();
    (0..layout.n_weights())
        .map(|k| (layout.weight(k), data[[k, row, col]]))
        .collect()
}

/// Build the LP of `variant` for `case`.
pub fn build_model(
    case: &PlanCase,
    variant: ModelVariant,
    params: &ModelParams,
) -> PlanResult<PlanModel> {
    params.validate()?;
    let specs = &case.specs;
    let critical = case.masks.critical();
    let tumor = case.masks.tumor();
    let (rows, cols) = specs.shape();
    params.interior.validate_for_grid(rows, cols)?;

    let derived = DerivedMasks::compute(&case.masks, &params.interior);
    let library = if variant.is_magnetic() {
        magnetic_library(&case.beams, params.steering_exponent)?
    } else {
        case.beams.clone()
    };
    let floor_mask = if variant.carves_interior() {
        derived.boundary.clone()
    } else {
        tumor.clone()
    };
    let interior_floor = variant.carves_interior() && params.constrain_interior;

    let bounds = default_bounds(variant).map(|d| match params.bounds {
        Some(o) => o.apply(d),
        None => d,
    });
    let layout = VariableLayout {
        n_beams: case.beams.len(),
        directions: if variant.is_magnetic() { 3 } else { 1 },
        rows,
        cols,
        relaxed: bounds.is_some(),
    };

    // Unreachable constrained cells.
    let coverage = library.coverage();
    let mut diagnostics = Vec::new();
    for ((r, c), &cov) in coverage.indexed_iter() {
        if cov > 0.0 {
            continue;
        }
        if critical[[r, c]] > 0.0 {
            diagnostics.push(CellDiagnostic { row: r, col: c, region: Region::Critical });
        }
        if floor_mask[[r, c]] > 0.0 || (interior_floor && derived.interior[[r, c]] > 0.0) {
            diagnostics.push(CellDiagnostic { row: r, col: c, region: Region::Tumor });
        }
    }
    for d in &diagnostics {
        warn!(variant = %variant, row = d.row, col = d.col, region = %d.region, "constrained cell unreachable by every beam");
    }

    // Per-cell constraints, row-major, ceiling before floor.
    let mut constraints = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            let is_critical = critical[[r, c]] > 0.0;
            let is_floor = floor_mask[[r, c]] > 0.0;
            let is_interior = interior_floor && derived.interior[[r, c]] > 0.0;
            if !(is_critical || is_floor || is_interior) {
                continue;
            }
            let dose = dose_expr(&library, &layout, r, c);
            if is_critical {
                let expr = match layout.slack(r, c) {
                    Some(s) => dose.clone().with_term(s, -1.0),
                    None => dose.clone(),
                };
                constraints.push(Constraint::new(
                    format!("critical_{r}_{c}"),
                    expr,
                    Relation::LessEq,
                    specs.max_critical_dose,
                ));
            }
            if is_floor || is_interior {
                let name = if is_floor {
                    format!("tumor_{r}_{c}")
                } else {
                    format!("interior_{r}_{c}")
                };
                let expr = match layout.surplus(r, c) {
                    Some(s) => dose.with_term(s, 1.0),
                    None => dose,
                };
                constraints.push(Constraint::new(
                    name,
                    expr,
                    Relation::GreaterEq,
                    specs.min_tumor_dose,
                ));
            }
        }
    }

    // Per-cell dose price; the weight cost is its total under each beam.
    let dose_price = if !variant.has_slack() {
        critical - tumor
    } else if variant.uses_neighbor_penalty() {
        critical + &(&derived.neighbor * params.p_neighbor)
    } else {
        critical.clone()
    };
    let weight_costs = masked_totals(&library, &dose_price);
    let mut objective: LinearExpr = weight_costs
        .iter()
        .enumerate()
        .map(|(k, &cost)| (layout.weight(k), cost))
        .collect();

    if variant.prices_relaxation() {
        let surplus_price = if variant.carves_interior() {
            &derived.boundary + &(&derived.interior * params.p_regrow)
        } else {
            tumor.clone()
        };
        let mut priced = Vec::new();
        for ((r, c), &price) in critical.indexed_iter() {
            if let Some(s) = layout.slack(r, c) {
                priced.push((s, price));
            }
        }
        for ((r, c), &price) in surplus_price.indexed_iter() {
            if let Some(s) = layout.surplus(r, c) {
                priced.push((s, price));
            }
        }
        objective = objective + priced.into_iter().collect::<LinearExpr>();
    }

    let lp = LpModel::new(
        variant.to_string(),
        layout.variables(bounds),
        constraints,
        objective,
        Direction::Minimize,
    )
    .map_err(|e| PlanError::Solver(e.to_string()))?;

    let summary = lp.summary();
    info!(
        variant = %variant,
        variables = summary.variables,
        constraints = summary.constraints,
        nonzeros = summary.nonzeros,
        unreachable = diagnostics.len(),
        "model built"
    );

    Ok(PlanModel {
        variant,
        lp,
        layout,
        diagnostics,
        derived,
        floor_mask,
        library,
    })
}
