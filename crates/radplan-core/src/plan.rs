// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Plan Pipeline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Solve a built model and turn the assignment back into a dose field.

use std::fmt;

use radplan_lp::{LpSolver, NoSolutionReason, Solution, SolveStatus};
use radplan_types::config::{ModelParams, ModelVariant};
use radplan_types::error::{PlanError, PlanResult};
use radplan_types::state::{DoseField, PlanCase};
use tracing::{info, warn};

use crate::builder::{build_model, PlanModel};
use crate::dose::{beam_weights, reconstruct_dose};

/// Solved plan: the raw assignment plus its reconstructed dose field.
#[derive(Debug, Clone)]
pub struct PlanSolution {
    pub solution: Solution,
    /// `(1-based beam index, weight)` over the effective library.
    pub weights: Vec<(usize, f64)>,
    pub dose: DoseField,
}

impl PlanSolution {
    pub fn objective(&self) -> f64 {
        self.solution.objective()
    }

    /// Beams with a positive weight.
    pub fn active_beams(&self) -> usize {
        self.weights.iter().filter(|(_, w)| *w > 0.0).count()
    }
}

#[derive(Debug, Clone)]
pub enum PlanOutcome {
    Solved(PlanSolution),
    NoSolution(NoSolutionReason),
}

impl PlanOutcome {
    pub fn solved(&self) -> Option<&PlanSolution> {
        match self {
            PlanOutcome::Solved(s) => Some(s),
            PlanOutcome::NoSolution(_) => None,
        }
    }
}

impl fmt::Display for PlanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanOutcome::Solved(s) => write!(
                f,
                "optimal, objective {:.4}, {} active beams",
                s.objective(),
                s.active_beams()
            ),
            PlanOutcome::NoSolution(reason) => write!(f, "no solution ({reason})"),
        }
    }
}

/// Solve `model` with `solver` and reconstruct the dose field from the
/// model's effective library.
pub fn solve_plan(model: &PlanModel, solver: &dyn LpSolver) -> PlanResult<PlanOutcome> {
    let status = solver
        .solve(&model.lp)
        .map_err(|e| PlanError::Solver(format!("{}: {e}", solver.name())))?;

    match status {
        SolveStatus::NoSolution(reason) => {
            warn!(variant = %model.variant, solver = solver.name(), %reason, "no solution");
            Ok(PlanOutcome::NoSolution(reason))
        }
        SolveStatus::Optimal(solution) => {
            let weights = beam_weights(&solution)?;
            let dose = reconstruct_dose(&weights, &model.library)?;
            info!(
                variant = %model.variant,
                solver = solver.name(),
                objective = solution.objective(),
                "model solved"
            );
            Ok(PlanOutcome::Solved(PlanSolution {
                solution,
                weights,
                dose,
            }))
        }
    }
}

/// Scalar model parameter varied by [`sweep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepParameter {
    PNeighbor,
    PRegrow,
    SteeringExponent,
}

impl SweepParameter {
    pub fn apply(self, base: &ModelParams, value: f64) -> ModelParams {
        let mut params = *base;
        match self {
            SweepParameter::PNeighbor => params.p_neighbor = value,
            SweepParameter::PRegrow => params.p_regrow = value,
            SweepParameter::SteeringExponent => params.steering_exponent = value,
        }
        params
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SweepParameter::PNeighbor => "p_neighbor",
            SweepParameter::PRegrow => "p_regrow",
            SweepParameter::SteeringExponent => "steering_exponent",
        })
    }
}

#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub value: f64,
    pub unreachable: usize,
    pub outcome: PlanOutcome,
}

/// One independent build and solve per value.
pub fn sweep(
    case: &PlanCase,
    variant: ModelVariant,
    base: &ModelParams,
    parameter: SweepParameter,
    values: &[f64],
    solver: &dyn LpSolver,
) -> PlanResult<Vec<SweepPoint>> {
    values
        .iter()
        .map(|&value| {
            let params = parameter.apply(base, value);
            let model = build_model(case, variant, &params)?;
            let outcome = solve_plan(&model, solver)?;
            info!(%parameter, value, %outcome, "sweep point");
            Ok(SweepPoint {
                value,
                unreachable: model.diagnostics.len(),
                outcome,
            })
        })
        .collect()
}
