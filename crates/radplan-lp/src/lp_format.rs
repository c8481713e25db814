// ─────────────────────────────────────────────────────────────────────
// SCPN RadPlan — CPLEX LP Export
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Plain-text CPLEX LP rendering, readable by external solvers (GLPK, HiGHS,
//! CBC) for cross-checking a model.

use std::fmt::Write;

use crate::model::{Direction, LinearExpr, LpModel, Relation};

/// Terms per output line before wrapping.
const TERMS_PER_LINE: usize = 8;

fn write_expr(out: &mut String, model: &LpModel, expr: &LinearExpr) {
    if expr.is_empty() {
        out.push_str(" 0");
        if let Some(first) = model.variables().first() {
            out.push(' ');
            out.push_str(&first.name);
        }
        return;
    }
    for (k, &(v, c)) in expr.terms().iter().enumerate() {
        if k > 0 && k % TERMS_PER_LINE == 0 {
            out.push_str("\n   ");
        }
        let sign = if c < 0.0 { '-' } else { '+' };
        let name = &model.variable(v).name;
        let _ = write!(out, " {sign} {} {name}", c.abs());
    }
}

fn write_bound(out: &mut String, name: &str, lower: f64, upper: f64) {
    match (lower.is_finite(), upper.is_finite()) {
        (true, true) if lower == upper => {
            let _ = writeln!(out, " {name} = {lower}");
        }
        (true, true) => {
            let _ = writeln!(out, " {lower} <= {name} <= {upper}");
        }
        (true, false) => {
            // Default LP-format bound is [0, inf).
            if lower != 0.0 {
                let _ = writeln!(out, " {name} >= {lower}");
            }
        }
        (false, true) => {
            let _ = writeln!(out, " -inf <= {name} <= {upper}");
        }
        (false, false) => {
            let _ = writeln!(out, " {name} free");
        }
    }
}

impl LpModel {
    /// Render in CPLEX LP format. Objective constants are dropped; constraint
    /// constants are moved to the right-hand side.
    pub fn to_lp_format(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\\ {}", self.name());
        out.push_str(match self.direction() {
            Direction::Minimize => "Minimize\n",
            Direction::Maximize => "Maximize\n",
        });
        out.push_str(" obj:");
        write_expr(&mut out, self, self.objective());
        out.push('\n');

        out.push_str("Subject To\n");
        for c in self.constraints() {
            let _ = write!(out, " {}:", c.name);
            write_expr(&mut out, self, &c.expr);
            let op = match c.relation {
                Relation::LessEq => "<=",
                Relation::GreaterEq => ">=",
                Relation::Equal => "=",
            };
            let _ = writeln!(out, " {op} {}", c.rhs - c.expr.constant());
        }

        out.push_str("Bounds\n");
        for v in self.variables() {
            write_bound(&mut out, &v.name, v.lower, v.upper);
        }
        out.push_str("End\n");
        out
    }
}
