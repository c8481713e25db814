// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — Property-Based Tests (proptest) for radplan-lp
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for the dense simplex.

use proptest::prelude::*;
use radplan_lp::{
    Constraint, DenseSimplex, Direction, LinearExpr, LpModel, LpSolver, Relation, SolveStatus,
    VarId, Variable,
};

/// Packing problem: max c·x, A x <= b, 0 <= x <= u with A, b, c >= 0.
/// Always feasible (x = 0) and bounded.
fn packing(a: &[Vec<f64>], b: &[f64], c: &[f64], u: f64) -> LpModel {
    let n = c.len();
    let vars = (0..n)
        .map(|j| Variable::bounded(format!("x{}", j + 1), 0.0, u))
        .collect();
    let rows = a
        .iter()
        .zip(b)
        .enumerate()
        .map(|(i, (row, &rhs))| {
            let expr = row
                .iter()
                .enumerate()
                .map(|(j, &v)| (VarId::new(j), v))
                .collect();
            Constraint::new(format!("r{i}"), expr, Relation::LessEq, rhs)
        })
        .collect();
    let objective = c
        .iter()
        .enumerate()
        .map(|(j, &v)| (VarId::new(j), v))
        .collect::<LinearExpr>();
    LpModel::new("packing", vars, rows, objective, Direction::Maximize).unwrap()
}

fn instance() -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<f64>, Vec<f64>)> {
    (1usize..6, 1usize..6).prop_flat_map(|(m, n)| {
        (
            prop::collection::vec(prop::collection::vec(0.0f64..3.0, n), m),
            prop::collection::vec(0.5f64..10.0, m),
            prop::collection::vec(0.0f64..4.0, n),
        )
    })
}

proptest! {
    /// Optimal points satisfy every row and bound.
    #[test]
    fn optimum_is_feasible((a, b, c) in instance()) {
        let model = packing(&a, &b, &c, 5.0);
        let status = DenseSimplex::default().solve(&model).unwrap();
        let sol = status.into_solution().expect("packing LPs are feasible");
        prop_assert!(model.violations(sol.values(), 1e-6).unwrap().is_empty());
    }

    /// The optimum is no worse than any uniform feasible point.
    #[test]
    fn optimum_dominates_uniform_points((a, b, c) in instance(), t in 0.0f64..1.0) {
        let model = packing(&a, &b, &c, 5.0);
        let sol = DenseSimplex::default().solve(&model).unwrap().into_solution().unwrap();

        // Largest uniform x = s·1 that fits, scaled by t.
        let mut s: f64 = 5.0;
        for (row, &rhs) in a.iter().zip(&b) {
            let load: f64 = row.iter().sum();
            if load > 0.0 {
                s = s.min(rhs / load);
            }
        }
        let point = vec![s * t; c.len()];
        let value = model.objective().evaluate(&point);
        prop_assert!(sol.objective() >= value - 1e-6);
    }

    /// Minimising with a floor on a single row meets the floor exactly when
    /// every cost is positive.
    #[test]
    fn covering_row_is_tight(
        coefs in prop::collection::vec(0.5f64..3.0, 1..6),
        costs in prop::collection::vec(0.1f64..5.0, 1..6),
        floor in 0.5f64..20.0,
    ) {
        let n = coefs.len().min(costs.len());
        let vars = (0..n).map(|j| Variable::non_negative(format!("x{j}"))).collect();
        let expr = (0..n).map(|j| (VarId::new(j), coefs[j])).collect::<LinearExpr>();
        let row = Constraint::new("floor", expr.clone(), Relation::GreaterEq, floor);
        let objective = (0..n).map(|j| (VarId::new(j), costs[j])).collect();
        let model = LpModel::new("cover", vars, vec![row], objective, Direction::Minimize).unwrap();

        match DenseSimplex::default().solve(&model).unwrap() {
            SolveStatus::Optimal(sol) => {
                prop_assert!((expr.evaluate(sol.values()) - floor).abs() < 1e-6);
                let best = (0..n)
                    .map(|j| costs[j] / coefs[j])
                    .fold(f64::INFINITY, f64::min);
                prop_assert!((sol.objective() - best * floor).abs() < 1e-6 * (1.0 + best * floor));
            }
            other => prop_assert!(false, "unexpected status {:?}", other),
        }
    }
}
