// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Linear Programming
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linear program description and the solver boundary.
//!
//! Models are assembled as complete values ([`model::LpModel`]) and handed
//! once to an [`solver::LpSolver`]. [`simplex::DenseSimplex`] is the bundled
//! reference backend.

pub mod error;
pub mod lp_format;
pub mod model;
pub mod simplex;
pub mod solver;

pub use error::{LpError, LpResult};
pub use model::{Constraint, Direction, LinearExpr, LpModel, Relation, VarId, Variable};
pub use simplex::DenseSimplex;
pub use solver::{LpSolver, NoSolutionReason, Solution, SolveStatus};
