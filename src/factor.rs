use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::expr::{self, Expr, Rational};
use crate::polynomial::Poly;
use crate::simplify::{expand, simplify};

/// `constant * Π factor^multiplicity` over the rationals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Factorization {
    pub constant: Rational,
    pub factors: Vec<Factor>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Factor {
    pub poly: Poly,
    pub multiplicity: usize,
}

impl Factorization {
    pub fn to_expr(&self, var: &str) -> Expr {
        if self.constant.is_zero() {
            return expr::zero();
        }
        let product = self
            .factors
            .iter()
            .map(|factor| {
                let base = factor.poly.to_expr(var);
                if factor.multiplicity == 1 {
                    base
                } else {
                    expr::pow(base, Expr::integer(factor.multiplicity))
                }
            })
            .reduce(expr::mul);
        match product {
            None => Expr::Constant(self.constant.clone()),
            Some(product) if self.constant.is_one() => product,
            Some(product) if (-self.constant.clone()).is_one() => expr::neg(product),
            Some(product) => expr::mul(Expr::Constant(self.constant.clone()), product),
        }
    }
}

/// Factor a univariate polynomial into integer-coefficient pieces: content, square-free
/// decomposition, then linear factors from rational roots.
pub fn factor_polynomial(poly: &Poly) -> Factorization {
    if poly.is_constant() {
        return Factorization {
            constant: poly.coeff(0),
            factors: Vec::new(),
        };
    }

    let mut factors = Vec::new();
    for (part, multiplicity) in poly.square_free_decomposition() {
        let (roots, rest) = part.rational_roots();
        for (root, _) in roots {
            let linear = Poly::from_coeffs(&[
                -Rational::from_integer(root.numer().clone()),
                Rational::from_integer(root.denom().clone()),
            ]);
            factors.push(Factor {
                poly: linear,
                multiplicity,
            });
        }
        if !rest.is_constant() {
            let (_, primitive) = rest.content_and_primitive_part();
            factors.push(Factor {
                poly: primitive,
                multiplicity,
            });
        }
    }

    factors.sort_by(|a, b| {
        a.poly
            .degree()
            .cmp(&b.poly.degree())
            .then_with(|| a.poly.to_expr("x").to_string().cmp(&b.poly.to_expr("x").to_string()))
    });

    let leading = factors.iter().fold(Rational::one(), |acc, f| {
        (0..f.multiplicity).fold(acc, |acc, _| acc * f.poly.leading_coeff())
    });
    Factorization {
        constant: poly.leading_coeff() / leading,
        factors,
    }
}

/// Factor an expression. Univariate polynomials factor over the rationals, several
/// variables only pull out a common monomial and coefficient.
pub fn factor(input: &Expr) -> Expr {
    match input {
        Expr::Equation(lhs, rhs) => {
            Expr::Equation(factor(lhs).boxed(), factor(rhs).boxed())
        }
        Expr::Matrix(_) | Expr::Inequality(..) => simplify(input),
        _ => {
            let vars = input.free_variables();
            let expanded = expand(input);
            match vars.len() {
                0 => simplify(input),
                1 => {
                    let var = vars.iter().next().cloned().unwrap_or_default();
                    match Poly::from_expr(&expanded, &var) {
                        Some(poly) if !poly.is_zero() => factor_polynomial(&poly).to_expr(&var),
                        _ => factor_common(&expanded).unwrap_or_else(|| simplify(input)),
                    }
                }
                _ => factor_common(&expanded).unwrap_or_else(|| simplify(input)),
            }
        }
    }
}

/// A product term split into its rational coefficient and variable exponents.
type Term = (Rational, BTreeMap<String, i64>);

/// Pull `gcd(coefficients) * common monomial` out of a sum.
fn factor_common(expanded: &Expr) -> Option<Expr> {
    let mut terms = Vec::new();
    split_sum(expanded, false, &mut terms)?;
    if terms.len() < 2 {
        return None;
    }

    let (numer, denom) = terms.iter().fold((BigInt::zero(), BigInt::one()), |(n, d), (c, _)| {
        (n.gcd(c.numer()), d.lcm(c.denom()))
    });
    let mut content = Rational::new(numer, denom);
    if terms[0].0.is_negative() {
        content = -content;
    }

    let mut common: BTreeMap<String, i64> = terms[0].1.clone();
    for (_, monomial) in &terms[1..] {
        common = common
            .into_iter()
            .filter_map(|(var, exp)| {
                let other = *monomial.get(&var)?;
                let shared = exp.min(other);
                (shared > 0).then_some((var, shared))
            })
            .collect();
    }

    if common.is_empty() && content.is_one() {
        return None;
    }

    let mut outside = Expr::Constant(content);
    for (var, exp) in &common {
        let factor = if *exp == 1 {
            Expr::var(var.as_str())
        } else {
            expr::pow(Expr::var(var.as_str()), Expr::integer(*exp))
        };
        outside = expr::mul(outside, factor);
    }
    let outside = simplify(&outside);
    let inside = expand(&expr::div(expanded.clone(), outside.clone()));
    Some(if outside.is_one() {
        inside
    } else {
        expr::mul(outside, inside)
    })
}

fn split_sum(e: &Expr, negate: bool, out: &mut Vec<Term>) -> Option<()> {
    match e {
        Expr::Add(a, b) => {
            split_sum(a, negate, out)?;
            split_sum(b, negate, out)
        }
        Expr::Sub(a, b) => {
            split_sum(a, negate, out)?;
            split_sum(b, !negate, out)
        }
        _ => {
            let (coeff, monomial) = split_product(e)?;
            out.push((if negate { -coeff } else { coeff }, monomial));
            Some(())
        }
    }
}

fn split_product(e: &Expr) -> Option<Term> {
    match e {
        Expr::Constant(c) => Some((c.clone(), BTreeMap::new())),
        Expr::Variable(name) => Some((Rational::one(), BTreeMap::from([(name.clone(), 1)]))),
        Expr::Neg(inner) => split_product(inner).map(|(c, m)| (-c, m)),
        Expr::Mul(a, b) => {
            let (c_a, mut m_a) = split_product(a)?;
            let (c_b, m_b) = split_product(b)?;
            for (var, exp) in m_b {
                *m_a.entry(var).or_insert(0) += exp;
            }
            Some((c_a * c_b, m_a))
        }
        Expr::Div(a, b) => {
            let divisor = b.as_rational().filter(|d| !d.is_zero())?;
            split_product(a).map(|(c, m)| (c / divisor, m))
        }
        Expr::Pow(base, exp) => {
            let name = base.as_variable()?;
            let exp = exp.as_rational().filter(|r| r.is_integer() && r.is_positive())?;
            let exp = i64::try_from(exp.to_integer()).ok()?;
            Some((Rational::one(), BTreeMap::from([(name.to_string(), exp)])))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_linear_factors_before_quadratics() {
        // (x - 1)(x^2 + 1) = x^3 - x^2 + x - 1
        let int = |n: i64| Rational::from_integer(n.into());
        let poly = Poly::from_coeffs(&[int(-1), int(1), int(-1), int(1)]);
        let factored = factor_polynomial(&poly);
        assert_eq!(factored.factors.len(), 2);
        assert_eq!(factored.factors[0].poly.degree(), Some(1));
        assert_eq!(factored.to_expr("x").to_string(), "(x-1)*(x^2+1)");
    }
}
