// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Dense Simplex
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Two-phase tableau simplex.
//!
//! Reference backend for small and medium models. Lower bounds are shifted to
//! zero, finite upper bounds become rows, every row is normalised to a
//! non-negative right-hand side. Phase 1 minimises the artificial sum; phase 2
//! the objective. Dantzig pricing switches to Bland's rule after a run of
//! degenerate pivots, which rules out cycling.

// Indexed loops are clearer for tableau operations
#![allow(clippy::needless_range_loop)]

use ndarray::Array2;
use tracing::debug;

use crate::error::{LpError, LpResult};
use crate::model::{Direction, LpModel, Relation};
use crate::solver::{LpSolver, NoSolutionReason, Solution, SolveStatus};

/// Consecutive degenerate pivots before switching to Bland's rule.
const DEGENERATE_RUN: usize = 50;

/// Phase 1 optimum above which the model is declared infeasible.
const FEASIBILITY_TOL: f64 = 1e-7;

#[derive(Debug, Clone)]
pub struct DenseSimplex {
    /// Maximum pivots over both phases.
    pub max_iter: usize,
    /// Pivot and pricing tolerance.
    pub tol: f64,
}

impl Default for DenseSimplex {
    fn default() -> Self {
        DenseSimplex {
            max_iter: 50_000,
            tol: 1e-9,
        }
    }
}

impl DenseSimplex {
    pub fn new(max_iter: usize, tol: f64) -> Self {
        DenseSimplex { max_iter, tol }
    }
}

enum Phase {
    Optimal,
    Unbounded,
    IterationLimit,
}

/// Standard-form tableau. Columns: structural, then slack/surplus, then
/// artificial; the last column holds the right-hand side and the last row the
/// reduced costs (its rhs entry is minus the objective value).
struct Tableau {
    t: Array2<f64>,
    basis: Vec<usize>,
    first_artificial: usize,
    n_cols: usize,
}

impl Tableau {
    fn m(&self) -> usize {
        self.basis.len()
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let p = self.t[[row, col]];
        self.t.row_mut(row).mapv_inplace(|v| v / p);
        let pivot_row = self.t.row(row).to_owned();
        for i in 0..self.t.nrows() {
            if i == row {
                continue;
            }
            let f = self.t[[i, col]];
            if f != 0.0 {
                self.t.row_mut(i).scaled_add(-f, &pivot_row);
            }
        }
        self.basis[row] = col;
    }

    /// Load `cost` (one entry per column) into the objective row and price out
    /// the current basis.
    fn set_objective(&mut self, cost: &[f64]) {
        let m = self.m();
        let rhs = self.n_cols;
        for j in 0..self.n_cols {
            self.t[[m, j]] = cost[j];
        }
        self.t[[m, rhs]] = 0.0;
        for i in 0..m {
            let cb = cost[self.basis[i]];
            if cb != 0.0 {
                let row = self.t.row(i).to_owned();
                self.t.row_mut(m).scaled_add(-cb, &row);
            }
        }
    }

    fn objective_value(&self) -> f64 {
        -self.t[[self.m(), self.n_cols]]
    }

    /// Pivot until no eligible column (`j < eligible`) has a negative reduced cost.
    fn optimize(&mut self, eligible: usize, tol: f64, iters: &mut usize, max_iter: usize) -> Phase {
        let m = self.m();
        let rhs = self.n_cols;
        let mut degenerate = 0usize;

        loop {
            let bland = degenerate >= DEGENERATE_RUN;
            let entering = if bland {
                (0..eligible).find(|&j| self.t[[m, j]] < -tol)
            } else {
                (0..eligible)
                    .filter(|&j| self.t[[m, j]] < -tol)
                    .min_by(|&a, &b| self.t[[m, a]].total_cmp(&self.t[[m, b]]))
            };
            let Some(col) = entering else {
                return Phase::Optimal;
            };

            if *iters >= max_iter {
                return Phase::IterationLimit;
            }

            let mut leaving: Option<(usize, f64)> = None;
            for i in 0..m {
                let a = self.t[[i, col]];
                if a <= tol {
                    continue;
                }
                let ratio = self.t[[i, rhs]].max(0.0) / a;
                leaving = match leaving {
                    None => Some((i, ratio)),
                    Some((bi, br)) => {
                        let better = ratio < br - tol
                            || (ratio <= br + tol && self.basis[i] < self.basis[bi]);
                        if better {
                            Some((i, ratio))
                        } else {
                            Some((bi, br))
                        }
                    }
                };
            }
            let Some((row, ratio)) = leaving else {
                return Phase::Unbounded;
            };

            if ratio <= tol {
                degenerate += 1;
            } else {
                degenerate = 0;
            }
            self.pivot(row, col);
            *iters += 1;
        }
    }

    /// After phase 1, pivot basic artificials onto any non-artificial column.
    /// Rows where that is impossible are redundant and keep a zero artificial.
    fn drive_out_artificials(&mut self, tol: f64) {
        for i in 0..self.m() {
            if self.basis[i] < self.first_artificial {
                continue;
            }
            if let Some(j) = (0..self.first_artificial).find(|&j| self.t[[i, j]].abs() > tol) {
                self.pivot(i, j);
            }
        }
    }
}

/// One standard-form row before slack columns are assigned.
struct Row {
    coefs: Vec<(usize, f64)>,
    relation: Relation,
    rhs: f64,
}

impl LpSolver for DenseSimplex {
    fn name(&self) -> &str {
        "dense-simplex"
    }

    fn solve(&self, model: &LpModel) -> LpResult<SolveStatus> {
        let vars = model.variables();
        let n = vars.len();
        for v in vars {
            if !v.lower.is_finite() {
                return Err(LpError::InvalidBound {
                    variable: v.name.clone(),
                    lower: v.lower,
                    upper: v.upper,
                });
            }
        }

        let sign = match model.direction() {
            Direction::Minimize => 1.0,
            Direction::Maximize => -1.0,
        };
        let mut cost = vec![0.0; n];
        for &(v, c) in model.objective().terms() {
            cost[v.index()] += sign * c;
        }

        // Presolve: variables outside every constraint go to their cheapest bound.
        let mut used = vec![false; n];
        for c in model.constraints() {
            for &(v, _) in c.expr.terms() {
                used[v.index()] = true;
            }
        }
        let mut values: Vec<f64> = vars.iter().map(|v| v.lower).collect();
        for j in (0..n).filter(|&j| !used[j]) {
            if cost[j] < 0.0 {
                if vars[j].upper.is_infinite() {
                    debug!(variable = %vars[j].name, "free column with negative cost");
                    return Ok(SolveStatus::NoSolution(NoSolutionReason::Unbounded));
                }
                values[j] = vars[j].upper;
            }
        }

        let columns: Vec<usize> = (0..n).filter(|&j| used[j]).collect();
        let mut col_of = vec![usize::MAX; n];
        for (k, &j) in columns.iter().enumerate() {
            col_of[j] = k;
        }
        let n_struct = columns.len();

        // Rows in shifted variables x' = x - lower.
        let mut rows: Vec<Row> = Vec::with_capacity(model.constraints().len() + n_struct);
        for c in model.constraints() {
            let mut dense: Vec<f64> = vec![0.0; n_struct];
            let mut rhs = c.rhs - c.expr.constant();
            for &(v, a) in c.expr.terms() {
                dense[col_of[v.index()]] += a;
                rhs -= a * vars[v.index()].lower;
            }
            let coefs = dense
                .into_iter()
                .enumerate()
                .filter(|&(_, a)| a != 0.0)
                .collect();
            rows.push(Row {
                coefs,
                relation: c.relation,
                rhs,
            });
        }
        for (k, &j) in columns.iter().enumerate() {
            if vars[j].upper.is_finite() {
                rows.push(Row {
                    coefs: vec![(k, 1.0)],
                    relation: Relation::LessEq,
                    rhs: vars[j].upper - vars[j].lower,
                });
            }
        }

        // Normalise to rhs >= 0.
        for row in rows.iter_mut() {
            if row.rhs < 0.0 {
                row.rhs = -row.rhs;
                for (_, a) in row.coefs.iter_mut() {
                    *a = -*a;
                }
                row.relation = match row.relation {
                    Relation::LessEq => Relation::GreaterEq,
                    Relation::GreaterEq => Relation::LessEq,
                    Relation::Equal => Relation::Equal,
                };
            }
        }

        let m = rows.len();
        let n_slack = rows
            .iter()
            .filter(|r| r.relation != Relation::Equal)
            .count();
        let n_art = rows
            .iter()
            .filter(|r| r.relation != Relation::LessEq)
            .count();
        let first_slack = n_struct;
        let first_artificial = n_struct + n_slack;
        let n_cols = first_artificial + n_art;

        let mut tab = Tableau {
            t: Array2::zeros((m + 1, n_cols + 1)),
            basis: vec![0; m],
            first_artificial,
            n_cols,
        };
        let (mut next_slack, mut next_art) = (first_slack, first_artificial);
        for (i, row) in rows.iter().enumerate() {
            for &(k, a) in &row.coefs {
                tab.t[[i, k]] = a;
            }
            tab.t[[i, n_cols]] = row.rhs;
            match row.relation {
                Relation::LessEq => {
                    tab.t[[i, next_slack]] = 1.0;
                    tab.basis[i] = next_slack;
                    next_slack += 1;
                }
                Relation::GreaterEq => {
                    tab.t[[i, next_slack]] = -1.0;
                    next_slack += 1;
                    tab.t[[i, next_art]] = 1.0;
                    tab.basis[i] = next_art;
                    next_art += 1;
                }
                Relation::Equal => {
                    tab.t[[i, next_art]] = 1.0;
                    tab.basis[i] = next_art;
                    next_art += 1;
                }
            }
        }
        debug!(
            rows = m,
            columns = n_cols,
            artificials = n_art,
            "simplex tableau assembled"
        );

        let mut iters = 0usize;

        if n_art > 0 {
            let mut phase1 = vec![0.0; n_cols];
            for c in phase1.iter_mut().skip(first_artificial) {
                *c = 1.0;
            }
            tab.set_objective(&phase1);
            match tab.optimize(n_cols, self.tol, &mut iters, self.max_iter) {
                Phase::Optimal => {}
                Phase::IterationLimit => {
                    return Ok(SolveStatus::NoSolution(NoSolutionReason::IterationLimit))
                }
                // The artificial sum is bounded below by zero.
                Phase::Unbounded => {
                    return Ok(SolveStatus::NoSolution(NoSolutionReason::Infeasible))
                }
            }
            let infeasibility = tab.objective_value();
            if infeasibility > FEASIBILITY_TOL {
                debug!(infeasibility, iterations = iters, "phase 1 ended infeasible");
                return Ok(SolveStatus::NoSolution(NoSolutionReason::Infeasible));
            }
            tab.drive_out_artificials(self.tol);
        }

        let mut phase2 = vec![0.0; n_cols];
        for (k, &j) in columns.iter().enumerate() {
            phase2[k] = cost[j];
        }
        tab.set_objective(&phase2);
        match tab.optimize(first_artificial, self.tol, &mut iters, self.max_iter) {
            Phase::Optimal => {}
            Phase::Unbounded => return Ok(SolveStatus::NoSolution(NoSolutionReason::Unbounded)),
            Phase::IterationLimit => {
                return Ok(SolveStatus::NoSolution(NoSolutionReason::IterationLimit))
            }
        }

        for (i, &b) in tab.basis.iter().enumerate() {
            if b < n_struct {
                let j = columns[b];
                values[j] = vars[j].lower + tab.t[[i, n_cols]].max(0.0);
            }
        }
        for (j, v) in vars.iter().enumerate() {
            values[j] = values[j].clamp(v.lower, v.upper);
        }
        debug!(iterations = iters, "simplex optimal");

        Solution::for_model(model, values).map(SolveStatus::Optimal)
    }
}
