use std::collections::HashMap;

use num_traits::{One, Signed, Zero};

use crate::expr::{self, Expr, Rational};
use crate::simplify::simplify;

/// Outcome of exact Gaussian elimination on a system of equations.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    pub variables: Vec<String>,
    pub outcome: SystemOutcome,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SystemOutcome {
    /// One value per variable, in variable order.
    Unique(Vec<Rational>),
    /// Pivot variables written in terms of the free ones.
    Family {
        pivots: Vec<(String, Expr)>,
        free: Vec<String>,
    },
    Inconsistent,
    /// Indices of equations that are not linear in the unknowns.
    NonLinear(Vec<usize>),
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub rank: usize,
    /// Coefficient determinant, for square systems.
    pub determinant: Option<Rational>,
    /// Each equation moved to `lhs - rhs` form.
    pub normalized: Vec<Expr>,
}

/// Coefficients and constant of `Σ c_i x_i + k`, plus whatever did not fit that shape.
struct LinearRow {
    coeffs: Vec<Rational>,
    constant: Rational,
    residual: Vec<Expr>,
}

pub fn solve_linear_system(variables: Vec<String>, equations: &[(Expr, Expr)]) -> LinearSystem {
    let index: HashMap<&str, usize> = variables
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    let mut diagnostics = Diagnostics::default();
    let mut rows = Vec::with_capacity(equations.len());
    let mut nonlinear = Vec::new();
    for (i, (lhs, rhs)) in equations.iter().enumerate() {
        let normalized = simplify(&expr::sub(lhs.clone(), rhs.clone()));
        let mut row = LinearRow {
            coeffs: vec![Rational::zero(); variables.len()],
            constant: Rational::zero(),
            residual: Vec::new(),
        };
        split_linear(&normalized, Rational::one(), &index, &mut row);
        if !row.residual.is_empty() {
            nonlinear.push(i);
        }
        diagnostics.normalized.push(normalized);
        rows.push(row);
    }

    if !nonlinear.is_empty() {
        return LinearSystem {
            variables,
            outcome: SystemOutcome::NonLinear(nonlinear),
            diagnostics,
        };
    }

    let n = variables.len();
    let mut matrix = Augmented::from_rows(&rows, n);
    if matrix.rows == n {
        diagnostics.determinant = Some(Rational::one());
    }
    let pivots = matrix.reduce(n, &mut diagnostics);
    diagnostics.rank = pivots.len();

    let inconsistent = (pivots.len()..matrix.rows)
        .any(|r| (0..n).all(|c| matrix.get(r, c).is_zero()) && !matrix.get(r, n).is_zero());
    if inconsistent {
        return LinearSystem {
            variables,
            outcome: SystemOutcome::Inconsistent,
            diagnostics,
        };
    }

    if pivots.len() == n {
        let mut values = vec![Rational::zero(); n];
        for (row, col) in pivots.iter().enumerate() {
            values[*col] = matrix.get(row, n).clone();
        }
        return LinearSystem {
            variables,
            outcome: SystemOutcome::Unique(values),
            diagnostics,
        };
    }

    let free: Vec<usize> = (0..n).filter(|c| !pivots.contains(c)).collect();
    let pivot_exprs = pivots
        .iter()
        .enumerate()
        .map(|(row, col)| {
            let mut value = Expr::Constant(matrix.get(row, n).clone());
            for f in &free {
                let coeff = matrix.get(row, *f);
                if !coeff.is_zero() {
                    let term = expr::mul(Expr::Constant(coeff.clone()), Expr::var(variables[*f].as_str()));
                    value = expr::sub(value, term);
                }
            }
            (variables[*col].clone(), simplify(&value))
        })
        .collect();

    LinearSystem {
        outcome: SystemOutcome::Family {
            pivots: pivot_exprs,
            free: free.iter().map(|c| variables[*c].clone()).collect(),
        },
        variables,
        diagnostics,
    }
}

fn split_linear(e: &Expr, scale: Rational, index: &HashMap<&str, usize>, row: &mut LinearRow) {
    match e {
        Expr::Constant(c) => row.constant += scale * c,
        Expr::Variable(name) => match index.get(name.as_str()) {
            Some(i) => row.coeffs[*i] += scale,
            None => row.residual.push(e.clone()),
        },
        Expr::Add(a, b) => {
            split_linear(a, scale.clone(), index, row);
            split_linear(b, scale, index, row);
        }
        Expr::Sub(a, b) => {
            split_linear(a, scale.clone(), index, row);
            split_linear(b, -scale, index, row);
        }
        Expr::Neg(a) => split_linear(a, -scale, index, row),
        Expr::Mul(a, b) => match (a.as_rational(), b.as_rational()) {
            (Some(c), _) => split_linear(b, scale * c, index, row),
            (_, Some(c)) => split_linear(a, scale * c, index, row),
            _ => row.residual.push(e.clone()),
        },
        Expr::Div(a, b) => match b.as_rational().filter(|c| !c.is_zero()) {
            Some(c) => split_linear(a, scale / c, index, row),
            None => row.residual.push(e.clone()),
        },
        _ => row.residual.push(e.clone()),
    }
}

/// Row-major augmented matrix `[A | b]`.
struct Augmented {
    rows: usize,
    cols: usize,
    data: Vec<Rational>,
}

impl Augmented {
    fn from_rows(rows: &[LinearRow], n: usize) -> Self {
        let mut data = Vec::with_capacity(rows.len() * (n + 1));
        for row in rows {
            data.extend(row.coeffs.iter().cloned());
            data.push(-row.constant.clone());
        }
        Augmented {
            rows: rows.len(),
            cols: n + 1,
            data,
        }
    }

    fn get(&self, row: usize, col: usize) -> &Rational {
        &self.data[row * self.cols + col]
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        for c in 0..self.cols {
            self.data.swap(a * self.cols + c, b * self.cols + c);
        }
    }

    /// Reduced row echelon form over the first `n` columns. Returns the pivot column of
    /// each leading row and keeps the determinant up to date.
    fn reduce(&mut self, n: usize, diagnostics: &mut Diagnostics) -> Vec<usize> {
        let mut pivots = Vec::new();
        for col in 0..n {
            let row = pivots.len();
            if row >= self.rows {
                break;
            }
            let Some(pivot) = (row..self.rows)
                .filter(|r| !self.get(*r, col).is_zero())
                .max_by(|a, b| self.get(*a, col).abs().cmp(&self.get(*b, col).abs()))
            else {
                continue;
            };

            if pivot != row {
                self.swap_rows(row, pivot);
                if let Some(det) = diagnostics.determinant.as_mut() {
                    *det = -det.clone();
                }
            }
            let pivot_value = self.get(row, col).clone();
            if let Some(det) = diagnostics.determinant.as_mut() {
                *det *= &pivot_value;
            }

            for c in col..self.cols {
                self.data[row * self.cols + c] /= &pivot_value;
            }
            let pivot_row: Vec<Rational> = (0..self.cols).map(|c| self.get(row, c).clone()).collect();
            for r in (0..self.rows).filter(|r| *r != row) {
                let factor = self.get(r, col).clone();
                if factor.is_zero() {
                    continue;
                }
                for (c, value) in pivot_row.iter().enumerate().skip(col) {
                    self.data[r * self.cols + c] -= &factor * value;
                }
            }
            pivots.push(col);
        }

        if pivots.len() < n {
            if let Some(det) = diagnostics.determinant.as_mut() {
                *det = Rational::zero();
            }
        }
        pivots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    fn equations(texts: &[&str]) -> Vec<(Expr, Expr)> {
        texts
            .iter()
            .map(|t| match parse_expr(t).unwrap() {
                Expr::Equation(l, r) => (*l, *r),
                other => panic!("not an equation: {other}"),
            })
            .collect()
    }

    #[test]
    fn tracks_determinant_through_row_swaps() {
        let system = solve_linear_system(
            vec!["x".into(), "y".into()],
            &equations(&["y = 1", "x = 2"]),
        );
        assert_eq!(system.diagnostics.determinant, Some(-Rational::one()));
        assert_eq!(
            system.outcome,
            SystemOutcome::Unique(vec![Rational::from_integer(2.into()), Rational::one()])
        );
    }
}
