//! Equation, inequality and system solving for [`SymbolicEngine`](crate::engine::SymbolicEngine).
//!
//! Polynomials are solved exactly where their roots are rational or quadratic surds.
//! Everything else falls back to a numeric scan over the configured interval.

mod equation;
mod inequality;
pub mod linear;
mod numeric;

use tracing::debug;

use crate::engine::{EngineOptions, Solution};
use crate::error::{MathError, Result};
use crate::expr::{self, Expr};

use linear::{solve_linear_system, SystemOutcome};

pub(crate) use numeric::tidy;

/// Solve a single equation or inequality. A bare expression is read as `expr = 0`.
pub fn solve(input: &Expr, options: &EngineOptions) -> Result<Solution<Expr>> {
    match input {
        Expr::Equation(lhs, rhs) => equation::solve_equation(lhs, rhs, options),
        Expr::Inequality(lhs, relation, rhs) => {
            inequality::solve_inequality(lhs, *relation, rhs, options)
        }
        Expr::Matrix(_) => Err(MathError::Unsupported(
            "a matrix is not an equation".to_string(),
        )),
        other => equation::solve_equation(other, &expr::zero(), options),
    }
}

/// Solve a system of linear equations in all of their free variables.
pub fn solve_system(equations: &[Expr]) -> Result<Solution<Expr>> {
    let mut pairs = Vec::with_capacity(equations.len());
    let mut variables = std::collections::BTreeSet::new();
    for equation in equations {
        variables.extend(equation.free_variables());
        match equation {
            Expr::Equation(lhs, rhs) => pairs.push(((**lhs).clone(), (**rhs).clone())),
            Expr::Inequality(..) => {
                return Err(MathError::Unsupported(
                    "systems of inequalities are not supported".to_string(),
                ))
            }
            other => pairs.push((other.clone(), expr::zero())),
        }
    }
    if variables.is_empty() {
        return Err(MathError::NoSolution(
            "the system has no unknowns".to_string(),
        ));
    }

    let variables: Vec<String> = variables.into_iter().collect();
    let system = solve_linear_system(variables, &pairs);
    debug!(
        rank = system.diagnostics.rank,
        unknowns = system.variables.len(),
        "eliminated linear system"
    );

    match system.outcome {
        SystemOutcome::Unique(values) => Ok(Solution::Assignments(
            system
                .variables
                .into_iter()
                .zip(values)
                .map(|(name, value)| (name, Expr::Constant(value)))
                .collect(),
        )),
        SystemOutcome::Family { pivots, .. } => Ok(Solution::Assignments(pivots)),
        SystemOutcome::Inconsistent => Err(MathError::NoSolution(
            "the system is inconsistent".to_string(),
        )),
        SystemOutcome::NonLinear(rows) => {
            let shown: Vec<String> = rows.iter().map(|i| (i + 1).to_string()).collect();
            Err(MathError::Unsupported(format!(
                "equation(s) {} are not linear",
                shown.join(", ")
            )))
        }
    }
}

/// Build a root value from a float, exact when it is an integer.
pub(crate) fn number_expr(x: f64) -> Expr {
    let x = tidy(x);
    if x.fract() == 0.0 && x.abs() < 1e15 {
        Expr::integer(x as i64)
    } else {
        Expr::Float(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    fn system(texts: &[&str]) -> Result<Solution<Expr>> {
        let parsed: Vec<Expr> = texts.iter().map(|t| parse_expr(t).unwrap()).collect();
        solve_system(&parsed)
    }

    #[test]
    fn solves_unique_system() {
        let solution = system(&["x + y = 3", "x - y = 1"]).unwrap();
        assert_eq!(solution.to_string(), "x = 2, y = 1");
    }

    #[test]
    fn reports_inconsistent_system() {
        let err = system(&["x + y = 1", "x + y = 2"]).unwrap_err();
        assert!(matches!(err, MathError::NoSolution(_)));
    }

    #[test]
    fn expresses_underdetermined_system_in_free_variables() {
        let solution = system(&["x + y = 3"]).unwrap();
        assert_eq!(solution.to_string(), "x = -y+3");
    }
}
