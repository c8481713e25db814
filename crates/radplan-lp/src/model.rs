// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — LP Model
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Immutable LP description: named bounded variables, linear constraints,
//! one linear objective and an optimisation direction.

use std::collections::HashSet;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::error::{LpError, LpResult};

/// Position of a variable in its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn new(index: usize) -> Self {
        VarId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// A continuous variable with `lower <= value <= upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

impl Variable {
    /// `0 <= value`.
    pub fn non_negative(name: impl Into<String>) -> Self {
        Variable {
            name: name.into(),
            lower: 0.0,
            upper: f64::INFINITY,
        }
    }

    pub fn bounded(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Variable {
            name: name.into(),
            lower,
            upper,
        }
    }
}

/// `Σ coef · var + constant`. Zero coefficients are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(var: VarId, coef: f64) -> Self {
        std::iter::once((var, coef)).collect()
    }

    pub fn with_term(mut self, var: VarId, coef: f64) -> Self {
        if coef != 0.0 {
            self.terms.push((var, coef));
        }
        self
    }

    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant += constant;
        self
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of the expression at `values` (indexed by [`VarId`]).
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * values[v.index()])
            .sum::<f64>()
            + self.constant
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        LinearExpr {
            terms: iter.into_iter().filter(|&(_, c)| c != 0.0).collect(),
            constant: 0.0,
        }
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: LinearExpr) -> LinearExpr {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl Sum for LinearExpr {
    fn sum<I: Iterator<Item = LinearExpr>>(iter: I) -> Self {
        iter.fold(LinearExpr::new(), |acc, e| acc + e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::LessEq => "<=",
            Relation::GreaterEq => ">=",
            Relation::Equal => "=",
        })
    }
}

/// `expr (relation) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(name: impl Into<String>, expr: LinearExpr, relation: Relation, rhs: f64) -> Self {
        Constraint {
            name: name.into(),
            expr,
            relation,
            rhs,
        }
    }

    /// Whether `values` satisfy the constraint within `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.relation {
            Relation::LessEq => lhs <= self.rhs + tol,
            Relation::GreaterEq => lhs >= self.rhs - tol,
            Relation::Equal => (lhs - self.rhs).abs() <= tol,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// Size statistics of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSummary {
    pub variables: usize,
    pub constraints: usize,
    pub nonzeros: usize,
    pub bounded_above: usize,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} variables ({} bounded above), {} constraints, {} nonzeros",
            self.variables, self.bounded_above, self.constraints, self.nonzeros
        )
    }
}

/// A validated linear program.
#[derive(Debug, Clone)]
pub struct LpModel {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    direction: Direction,
}

impl LpModel {
    /// Validates variable references, coefficients and bounds.
    pub fn new(
        name: impl Into<String>,
        variables: Vec<Variable>,
        constraints: Vec<Constraint>,
        objective: LinearExpr,
        direction: Direction,
    ) -> LpResult<Self> {
        let mut seen = HashSet::with_capacity(variables.len());
        for v in &variables {
            if !seen.insert(v.name.as_str()) {
                return Err(LpError::DuplicateVariable(v.name.clone()));
            }
            if v.lower.is_nan() || v.upper.is_nan() || v.lower > v.upper {
                return Err(LpError::InvalidBound {
                    variable: v.name.clone(),
                    lower: v.lower,
                    upper: v.upper,
                });
            }
        }

        let n_vars = variables.len();
        let check_expr = |location: &str, expr: &LinearExpr| -> LpResult<()> {
            for &(var, coef) in expr.terms() {
                if var.index() >= n_vars {
                    return Err(LpError::UnknownVariable {
                        constraint: location.to_string(),
                        index: var.index(),
                        n_vars,
                    });
                }
                if !coef.is_finite() {
                    return Err(LpError::NonFinite {
                        location: location.to_string(),
                        value: coef,
                    });
                }
            }
            if !expr.constant().is_finite() {
                return Err(LpError::NonFinite {
                    location: location.to_string(),
                    value: expr.constant(),
                });
            }
            Ok(())
        };

        check_expr("objective", &objective)?;
        for c in &constraints {
            check_expr(&c.name, &c.expr)?;
            if !c.rhs.is_finite() {
                return Err(LpError::NonFinite {
                    location: c.name.clone(),
                    value: c.rhs,
                });
            }
        }

        Ok(LpModel {
            name: name.into(),
            variables,
            constraints,
            objective,
            direction,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.index()]
    }

    pub fn find_variable(&self, name: &str) -> Option<VarId> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .map(VarId::new)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            variables: self.variables.len(),
            constraints: self.constraints.len(),
            nonzeros: self.constraints.iter().map(|c| c.expr.terms().len()).sum(),
            bounded_above: self.variables.iter().filter(|v| v.upper.is_finite()).count(),
        }
    }

    /// Constraints and bounds violated by `values`, by name.
    pub fn violations(&self, values: &[f64], tol: f64) -> LpResult<Vec<String>> {
        if values.len() != self.variables.len() {
            return Err(LpError::DimensionMismatch {
                expected: self.variables.len(),
                found: values.len(),
            });
        }
        let mut out: Vec<String> = self
            .variables
            .iter()
            .zip(values)
            .filter(|(v, &x)| x < v.lower - tol || x > v.upper + tol)
            .map(|(v, _)| v.name.clone())
            .collect();
        out.extend(
            self.constraints
                .iter()
                .filter(|c| !c.is_satisfied(values, tol))
                .map(|c| c.name.clone()),
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_vars() -> Vec<Variable> {
        vec![Variable::non_negative("x1"), Variable::bounded("y", 0.0, 3.0)]
    }

    #[test]
    fn test_expr_drops_zero_terms() {
        let e: LinearExpr = vec![(VarId::new(0), 0.0), (VarId::new(1), 2.0)]
            .into_iter()
            .collect();
        assert_eq!(e.terms().len(), 1);
        assert!((e.evaluate(&[5.0, 1.5]) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_expr_sum_and_constant() {
        let e: LinearExpr = [
            LinearExpr::term(VarId::new(0), 1.0),
            LinearExpr::term(VarId::new(1), -1.0).with_constant(4.0),
        ]
        .into_iter()
        .sum();
        assert!((e.evaluate(&[2.0, 1.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_model_rejects_unknown_variable() {
        let c = Constraint::new(
            "c1",
            LinearExpr::term(VarId::new(2), 1.0),
            Relation::LessEq,
            1.0,
        );
        let err = LpModel::new("m", two_vars(), vec![c], LinearExpr::new(), Direction::Minimize)
            .unwrap_err();
        assert!(matches!(err, LpError::UnknownVariable { index: 2, .. }));
    }

    #[test]
    fn test_model_rejects_duplicate_and_bad_bounds() {
        let dup = vec![Variable::non_negative("x1"), Variable::non_negative("x1")];
        assert!(matches!(
            LpModel::new("m", dup, vec![], LinearExpr::new(), Direction::Minimize),
            Err(LpError::DuplicateVariable(_))
        ));
        let bad = vec![Variable::bounded("s", 2.0, 1.0)];
        assert!(matches!(
            LpModel::new("m", bad, vec![], LinearExpr::new(), Direction::Minimize),
            Err(LpError::InvalidBound { .. })
        ));
    }

    #[test]
    fn test_model_rejects_nan_coefficient() {
        let obj = LinearExpr::term(VarId::new(0), f64::NAN);
        assert!(matches!(
            LpModel::new("m", two_vars(), vec![], obj, Direction::Minimize),
            Err(LpError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_violations_and_summary() {
        let c = Constraint::new(
            "cap",
            LinearExpr::term(VarId::new(0), 1.0).with_term(VarId::new(1), 1.0),
            Relation::LessEq,
            4.0,
        );
        let m = LpModel::new("m", two_vars(), vec![c], LinearExpr::new(), Direction::Minimize)
            .unwrap();
        assert!(m.violations(&[1.0, 2.0], 1e-9).unwrap().is_empty());
        assert_eq!(m.violations(&[2.0, 3.5], 1e-9).unwrap(), vec!["y", "cap"]);
        let s = m.summary();
        assert_eq!((s.variables, s.constraints, s.nonzeros, s.bounded_above), (2, 1, 2, 1));
        assert_eq!(m.find_variable("y"), Some(VarId::new(1)));
    }
}
