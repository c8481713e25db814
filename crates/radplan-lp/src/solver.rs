// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Solver Boundary
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::fmt;

use crate::error::{LpError, LpResult};
use crate::model::{LpModel, VarId};

/// Complete assignment returned by a solver. Never partial.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    names: Vec<String>,
    values: Vec<f64>,
    objective: f64,
}

impl Solution {
    pub fn new(names: Vec<String>, values: Vec<f64>, objective: f64) -> LpResult<Self> {
        if names.len() != values.len() {
            return Err(LpError::DimensionMismatch {
                expected: names.len(),
                found: values.len(),
            });
        }
        Ok(Solution {
            names,
            values,
            objective,
        })
    }

    /// Build from a value vector laid out like `model.variables()`.
    pub fn for_model(model: &LpModel, values: Vec<f64>) -> LpResult<Self> {
        let names = model.variables().iter().map(|v| v.name.clone()).collect();
        let objective = model.objective().evaluate(&values);
        Self::new(names, values, objective)
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.index()]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn value_by_name(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// `(name, value)` for every variable, in model order.
    pub fn iter_var_values(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoSolutionReason {
    Infeasible,
    Unbounded,
    IterationLimit,
}

impl fmt::Display for NoSolutionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NoSolutionReason::Infeasible => "infeasible",
            NoSolutionReason::Unbounded => "unbounded",
            NoSolutionReason::IterationLimit => "iteration limit reached",
        })
    }
}

/// Solver verdict: a full assignment or an explicit absence of one.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    Optimal(Solution),
    NoSolution(NoSolutionReason),
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveStatus::Optimal(s) => Some(s),
            SolveStatus::NoSolution(_) => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SolveStatus::Optimal(s) => Some(s),
            SolveStatus::NoSolution(_) => None,
        }
    }
}

/// Anything that can solve an [`LpModel`].
///
/// `Err` is reserved for models the backend cannot accept; infeasibility and
/// unboundedness are ordinary [`SolveStatus::NoSolution`] results.
pub trait LpSolver {
    fn name(&self) -> &str;

    fn solve(&self, model: &LpModel) -> LpResult<SolveStatus>;
}
