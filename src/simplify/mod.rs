//! Symbolic simplification, expansion and substitution.

mod collect;
mod rules;
mod substitute;

use crate::expr::{self, Expr};

use collect::Collector;

pub(crate) use rules::square_split;
pub use substitute::{substitute, substitute_all};

/// Collect like terms, fold constants and apply identity rules. Of the collected and the
/// fully expanded form, the shorter one wins. Equations come back as `lhs - rhs = 0`.
pub fn simplify(expr: &Expr) -> Expr {
    match expr {
        Expr::Equation(lhs, rhs) => Expr::Equation(
            simplify(&expr::sub((**lhs).clone(), (**rhs).clone())).boxed(),
            expr::zero().boxed(),
        ),
        Expr::Inequality(lhs, rel, rhs) => {
            Expr::Inequality(simplify(lhs).boxed(), *rel, simplify(rhs).boxed())
        }
        Expr::Matrix(rows) => Expr::Matrix(
            rows.iter()
                .map(|row| row.iter().map(simplify).collect())
                .collect(),
        ),
        _ => {
            let collected = Collector::reduce(expr, false);
            let expanded = Collector::reduce(expr, true);
            if expanded.to_string().len() < collected.to_string().len() {
                expanded
            } else {
                collected
            }
        }
    }
}

/// Distribute every product and integer power of sums, within a term cap.
pub fn expand(expr: &Expr) -> Expr {
    match expr {
        Expr::Equation(lhs, rhs) => Expr::Equation(expand(lhs).boxed(), expand(rhs).boxed()),
        Expr::Inequality(lhs, rel, rhs) => {
            Expr::Inequality(expand(lhs).boxed(), *rel, expand(rhs).boxed())
        }
        Expr::Matrix(rows) => Expr::Matrix(
            rows.iter()
                .map(|row| row.iter().map(expand).collect())
                .collect(),
        ),
        _ => Collector::reduce(expr, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    fn simp(text: &str) -> String {
        simplify(&parse_expr(text).unwrap()).to_string()
    }

    #[test]
    fn keeps_factored_square_when_shorter() {
        assert_eq!(simp("(x+1)*(x+1)"), "(x+1)^2");
    }

    #[test]
    fn cancels_common_polynomial_factor() {
        assert_eq!(simp("(x^2-1)/(x-1)"), "x+1");
    }
}
