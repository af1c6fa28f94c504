use num_traits::{One, Signed, ToPrimitive, Zero};
use tracing::trace;

use crate::engine::{EngineOptions, Scope, Solution, Value};
use crate::error::{MathError, Result};
use crate::eval::{evaluate, evaluate_at};
use crate::expr::{self, Expr, Function, Rational};
use crate::matrix;
use crate::polynomial::Poly;
use crate::simplify::{expand, simplify, square_split, substitute};

use super::numeric::scan_roots;
use super::number_expr;

/// Variables tried first when an equation has several unknowns.
const PREFERRED_VARIABLES: [&str; 4] = ["x", "y", "z", "t"];

pub(super) fn solve_equation(lhs: &Expr, rhs: &Expr, options: &EngineOptions) -> Result<Solution<Expr>> {
    if lhs.contains_matrix() || rhs.contains_matrix() {
        return solve_matrix_equation(lhs, rhs);
    }

    let mut free = lhs.free_variables();
    free.extend(rhs.free_variables());

    if let Expr::Variable(name) = lhs {
        if free.contains(name) && rhs.free_variables().is_empty() {
            return Ok(Solution::Assignments(vec![(name.clone(), simplify(rhs))]));
        }
    }

    let difference = simplify(&expr::sub(lhs.clone(), rhs.clone()));
    let Some(variable) = choose_variable(&free) else {
        let variable = "x".to_string();
        return Ok(if holds_identically(&difference) {
            Solution::All { variable }
        } else {
            Solution::Roots {
                variable,
                values: Vec::new(),
            }
        });
    };

    if let Some(poly) = Poly::from_expr(&expand(&difference), &variable) {
        trace!(%variable, degree = ?poly.degree(), "solving as a polynomial");
        return Ok(match poly.degree() {
            None => Solution::All { variable },
            Some(0) => Solution::Roots {
                variable,
                values: Vec::new(),
            },
            Some(_) => Solution::Roots {
                values: polynomial_roots(&poly),
                variable,
            },
        });
    }

    if let Some((slope, intercept)) = linear_coefficients(&difference, &variable) {
        let root = simplify(&expr::div(expr::neg(intercept), slope));
        return Ok(Solution::Roots {
            variable,
            values: vec![root],
        });
    }

    if free.len() > 1 {
        return Err(MathError::Unsupported(format!(
            "cannot solve a non-linear equation in several unknowns for {variable}"
        )));
    }

    trace!(%variable, "falling back to a numeric root scan");
    let roots = scan_roots(|x| evaluate_at(&difference, &variable, x).ok(), options);
    Ok(Solution::Roots {
        variable,
        values: roots.into_iter().map(number_expr).collect(),
    })
}

pub(super) fn choose_variable(free: &std::collections::BTreeSet<String>) -> Option<String> {
    PREFERRED_VARIABLES
        .iter()
        .find(|v| free.contains(**v))
        .map(|v| v.to_string())
        .or_else(|| free.iter().next().cloned())
}

fn holds_identically(difference: &Expr) -> bool {
    match evaluate(difference, &Scope::new()) {
        Ok(Value::Number(v)) => v.abs() < 1e-12,
        _ => difference.is_zero(),
    }
}

/// Real roots in ascending order. Rational roots and quadratic surds stay exact.
fn polynomial_roots(poly: &Poly) -> Vec<Expr> {
    let (rational, cofactor) = poly.rational_roots();
    let mut roots: Vec<(f64, Expr)> = rational
        .into_iter()
        .map(|(r, _)| (r.to_f64().unwrap_or(f64::NAN), Expr::Constant(r)))
        .collect();

    match cofactor.degree() {
        Some(1) => {
            let r = -cofactor.coeff(0) / cofactor.coeff(1);
            roots.push((r.to_f64().unwrap_or(f64::NAN), Expr::Constant(r)));
        }
        Some(2) => match quadratic_roots(&cofactor) {
            Some(exact) => roots.extend(exact),
            None => roots.extend(numeric_roots(&cofactor)),
        },
        Some(d) if d > 2 => roots.extend(numeric_roots(&cofactor)),
        _ => {}
    }

    roots.sort_by(|a, b| a.0.total_cmp(&b.0));
    roots.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-12);
    roots.into_iter().map(|(_, e)| e).collect()
}

fn numeric_roots(poly: &Poly) -> Vec<(f64, Expr)> {
    poly.real_roots()
        .into_iter()
        .map(|x| (x, number_expr(x)))
        .collect()
}

/// `-b/2a ± k/(2|a|q)·√m`, where `b² - 4ac = p/q` and `p·q = k²·m`.
fn quadratic_roots(poly: &Poly) -> Option<Vec<(f64, Expr)>> {
    let (a, b, c) = (poly.coeff(2), poly.coeff(1), poly.coeff(0));
    let discriminant = &b * &b - Rational::from_integer(4.into()) * &a * &c;
    if discriminant.is_negative() {
        return Some(Vec::new());
    }
    let two_a = Rational::from_integer(2.into()) * &a;
    let center = -&b / &two_a;
    let (p, q) = (discriminant.numer().clone(), discriminant.denom().clone());
    let (k, m) = square_split(&(&p * &q))?;
    let offset = Rational::new(k, q) / two_a.abs();

    if m.is_one() || offset.is_zero() {
        return Some(
            [&center - &offset, &center + &offset]
                .into_iter()
                .map(|r| (r.to_f64().unwrap_or(f64::NAN), Expr::Constant(r)))
                .collect(),
        );
    }

    let approx = offset.to_f64()? * m.to_f64()?.sqrt();
    let centre_f = center.to_f64()?;
    let radical = Expr::Call(Function::Sqrt, vec![Expr::Constant(Rational::from_integer(m))]);
    let term = if offset.is_one() {
        radical
    } else {
        expr::mul(Expr::Constant(offset), radical)
    };
    let (low, high) = if center.is_zero() {
        (expr::neg(term.clone()), term)
    } else {
        let centre = Expr::Constant(center);
        (
            expr::sub(centre.clone(), term.clone()),
            expr::add(centre, term),
        )
    };
    Some(vec![(centre_f - approx, low), (centre_f + approx, high)])
}

/// `(a, b)` with `difference = a·variable + b` and neither depending on `variable`.
fn linear_coefficients(difference: &Expr, variable: &str) -> Option<(Expr, Expr)> {
    let intercept = simplify(&substitute(difference, variable, &expr::zero()));
    let at_one = simplify(&substitute(difference, variable, &expr::one()));
    let slope = simplify(&expr::sub(at_one, intercept.clone()));
    if slope.is_zero() || slope.contains_var(variable) || intercept.contains_var(variable) {
        return None;
    }
    let rebuilt = expr::add(expr::mul(slope.clone(), Expr::var(variable)), intercept.clone());
    simplify(&expr::sub(difference.clone(), rebuilt))
        .is_zero()
        .then_some((slope, intercept))
}

/// `M·X = B` with `X` a variable or a column of variables.
fn solve_matrix_equation(lhs: &Expr, rhs: &Expr) -> Result<Solution<Expr>> {
    let (coefficients, unknown) = match lhs {
        Expr::Mul(m, x) if m.free_variables().is_empty() => (m.as_ref(), x.as_ref()),
        _ => {
            return Err(MathError::Unsupported(
                "matrix equations must have the form M*X = B".to_string(),
            ))
        }
    };
    let scope = Scope::new();
    let (Value::Matrix(m), Value::Matrix(b)) = (evaluate(coefficients, &scope)?, evaluate(rhs, &scope)?)
    else {
        return Err(MathError::Unsupported(
            "matrix equations need matrix coefficients".to_string(),
        ));
    };

    let b = if matrix::shape(&b).0 == 1 && matrix::shape(&m).0 != 1 {
        matrix::transpose(&b)
    } else {
        b
    };
    let solved = matrix::multiply(&matrix::inverse(&m)?, &b)?;
    let cells: Vec<Vec<Expr>> = solved
        .iter()
        .map(|row| row.iter().map(|v| number_expr(*v)).collect())
        .collect();

    match unknown {
        Expr::Variable(name) => Ok(Solution::Assignments(vec![(name.clone(), Expr::Matrix(cells))])),
        Expr::Matrix(names) => {
            let names: Vec<&Expr> = names.iter().flatten().collect();
            let values: Vec<Expr> = cells.into_iter().flatten().collect();
            if names.len() != values.len() {
                return Err(MathError::Evaluate(format!(
                    "expected {} unknowns, the system has {}",
                    values.len(),
                    names.len()
                )));
            }
            names
                .into_iter()
                .zip(values)
                .map(|(name, value)| match name {
                    Expr::Variable(name) => Ok((name.clone(), value)),
                    other => Err(MathError::Unsupported(format!(
                        "`{other}` is not an unknown"
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Solution::Assignments)
        }
        other => Err(MathError::Unsupported(format!(
            "cannot solve for `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    fn roots(text: &str) -> String {
        match parse_expr(text).unwrap() {
            Expr::Equation(l, r) => solve_equation(&l, &r, &EngineOptions::default())
                .unwrap()
                .to_string(),
            other => panic!("not an equation: {other}"),
        }
    }

    #[test]
    fn quadratic_with_irrational_roots_stays_exact() {
        assert_eq!(roots("x^2 - 2 = 0"), "x = -sqrt(2), x = sqrt(2)");
    }

    #[test]
    fn quadratic_without_real_roots() {
        assert_eq!(roots("x^2 + 1 = 0"), "no real solution");
    }

    #[test]
    fn symbolic_linear_coefficients() {
        assert_eq!(roots("2*x + a = 0"), "x = -0.5*a");
    }
}
