use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::expr::{self, Expr, Function, Rational};

/// Highest exponent accepted when reading `p(x)^n` into a polynomial.
const MAX_EXPANDED_POWER: usize = 64;
/// Rational root candidates are only enumerated for coefficients below this bound.
const DIVISOR_SEARCH_LIMIT: u64 = 1_000_000;

/// Dense univariate polynomial with exact rational coefficients, keyed by exponent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    coeffs: BTreeMap<usize, Rational>,
}

impl Poly {
    pub fn zero() -> Self {
        Poly {
            coeffs: BTreeMap::new(),
        }
    }

    pub fn one() -> Self {
        Poly::constant(Rational::one())
    }

    pub fn constant(c: Rational) -> Self {
        Poly::monomial(c, 0)
    }

    pub fn monomial(c: Rational, power: usize) -> Self {
        let mut coeffs = BTreeMap::new();
        if !c.is_zero() {
            coeffs.insert(power, c);
        }
        Poly { coeffs }
    }

    /// The polynomial `x`.
    pub fn x() -> Self {
        Poly::monomial(Rational::one(), 1)
    }

    /// Build from coefficients listed lowest power first.
    pub fn from_coeffs(coeffs: &[Rational]) -> Self {
        let coeffs = coeffs
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_zero())
            .map(|(i, c)| (i, c.clone()))
            .collect();
        Poly { coeffs }
    }

    pub fn degree(&self) -> Option<usize> {
        self.coeffs.keys().next_back().copied()
    }

    pub fn leading_coeff(&self) -> Rational {
        self.coeffs
            .values()
            .next_back()
            .cloned()
            .unwrap_or_else(Rational::zero)
    }

    pub fn coeff(&self, power: usize) -> Rational {
        self.coeffs
            .get(&power)
            .cloned()
            .unwrap_or_else(Rational::zero)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs.get(&0).is_some_and(|c| c.is_one())
    }

    pub fn is_constant(&self) -> bool {
        self.degree().unwrap_or(0) == 0
    }

    pub fn pow(&self, exp: usize) -> Self {
        let mut result = Poly::one();
        let mut base = self.clone();
        let mut n = exp;
        while n > 0 {
            if n % 2 == 1 {
                result = &result * &base;
            }
            base = &base * &base;
            n /= 2;
        }
        result
    }

    pub fn scale(&self, k: &Rational) -> Self {
        if k.is_zero() {
            return Poly::zero();
        }
        let coeffs = self
            .coeffs
            .iter()
            .map(|(exp, c)| (*exp, c * k))
            .collect();
        Poly { coeffs }
    }

    pub fn derivative(&self) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .filter(|(exp, _)| **exp > 0)
            .map(|(exp, c)| (exp - 1, c * Rational::from_integer(BigInt::from(*exp))))
            .collect();
        Poly { coeffs }
    }

    pub fn monic(&self) -> Self {
        let lc = self.leading_coeff();
        if lc.is_zero() {
            return self.clone();
        }
        self.scale(&lc.recip())
    }

    pub fn evaluate(&self, x: &Rational) -> Rational {
        // Horner from the top exponent down.
        let Some(top) = self.degree() else {
            return Rational::zero();
        };
        let mut acc = Rational::zero();
        for exp in (0..=top).rev() {
            acc = acc * x + self.coeff(exp);
        }
        acc
    }

    pub fn evaluate_f64(&self, x: f64) -> f64 {
        let Some(top) = self.degree() else {
            return 0.0;
        };
        let mut acc = 0.0;
        for exp in (0..=top).rev() {
            acc = acc * x + self.coeff(exp).to_f64().unwrap_or(0.0);
        }
        acc
    }

    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        let Some(divisor_degree) = divisor.degree() else {
            return (Poly::zero(), self.clone());
        };
        let divisor_lc = divisor.leading_coeff();
        let mut quotient = Poly::zero();
        let mut remainder = self.clone();

        while let Some(r_deg) = remainder.degree() {
            if r_deg < divisor_degree {
                break;
            }
            let term = Poly::monomial(remainder.leading_coeff() / &divisor_lc, r_deg - divisor_degree);
            remainder = &remainder - &(&term * divisor);
            quotient = &quotient + &term;
        }

        (quotient, remainder)
    }

    pub fn div_exact(&self, divisor: &Self) -> Option<Self> {
        let (q, r) = self.div_rem(divisor);
        r.is_zero().then_some(q)
    }

    /// Monic greatest common divisor.
    pub fn gcd(a: &Poly, b: &Poly) -> Poly {
        let mut r0 = a.clone();
        let mut r1 = b.clone();
        while !r1.is_zero() {
            let (_, r) = r0.div_rem(&r1);
            r0 = r1;
            r1 = r;
        }
        r0.monic()
    }

    /// Split into a rational content and an integer primitive part with positive leading
    /// coefficient, so that `self == content * primitive`.
    pub fn content_and_primitive_part(&self) -> (Rational, Poly) {
        if self.is_zero() {
            return (Rational::zero(), Poly::zero());
        }
        let lcm = self
            .coeffs
            .values()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
        let scaled: BTreeMap<usize, BigInt> = self
            .coeffs
            .iter()
            .map(|(exp, c)| (*exp, (c * Rational::from_integer(lcm.clone())).to_integer()))
            .collect();
        let gcd = scaled
            .values()
            .fold(BigInt::zero(), |acc, n| acc.gcd(n));

        let mut content = Rational::new(gcd.clone(), lcm);
        let mut primitive = Poly {
            coeffs: scaled
                .into_iter()
                .map(|(exp, n)| (exp, Rational::from_integer(n / &gcd)))
                .collect(),
        };
        if primitive.leading_coeff().is_negative() {
            primitive = -primitive;
            content = -content;
        }
        (content, primitive)
    }

    pub fn square_free_decomposition(&self) -> Vec<(Poly, usize)> {
        if self.is_constant() {
            return Vec::new();
        }

        let mut result = Vec::new();
        let mut i = 1;
        let mut g = Poly::gcd(self, &self.derivative());
        let mut y = self.div_exact(&g).unwrap_or_else(Poly::zero);

        while !y.is_constant() {
            let z = Poly::gcd(&y, &g);
            let factor = y.div_exact(&z).unwrap_or_else(Poly::zero);
            if !factor.is_constant() {
                result.push((factor.monic(), i));
            }
            g = g.div_exact(&z).unwrap_or_else(Poly::zero);
            y = z;
            i += 1;
        }

        result
    }

    /// Product of the distinct irreducible factors.
    pub fn square_free_part(&self) -> Poly {
        if self.is_constant() {
            return self.clone();
        }
        let g = Poly::gcd(self, &self.derivative());
        self.div_exact(&g).unwrap_or_else(|| self.clone()).monic()
    }

    /// Distinct rational roots with multiplicity, plus the cofactor left after dividing
    /// every `(x - r)^m` out.
    pub fn rational_roots(&self) -> (Vec<(Rational, usize)>, Poly) {
        let mut rest = self.clone();
        let mut roots = Vec::new();
        if rest.is_zero() {
            return (roots, rest);
        }

        let mut zero_mult = 0;
        while rest.degree().unwrap_or(0) > 0 && rest.coeff(0).is_zero() {
            rest = rest.div_exact(&Poly::x()).unwrap_or(rest);
            zero_mult += 1;
        }
        if zero_mult > 0 {
            roots.push((Rational::zero(), zero_mult));
        }

        let (_, primitive) = rest.content_and_primitive_part();
        let (Some(lead), Some(tail)) = (
            abs_u64(&primitive.leading_coeff()),
            abs_u64(&primitive.coeff(0)),
        ) else {
            return (roots, rest);
        };
        if rest.is_constant() || lead > DIVISOR_SEARCH_LIMIT || tail > DIVISOR_SEARCH_LIMIT {
            return (roots, rest);
        }

        let mut candidates = Vec::new();
        for p in divisors(tail) {
            for q in divisors(lead) {
                let r = Rational::new(BigInt::from(p), BigInt::from(q));
                candidates.push(r.clone());
                candidates.push(-r);
            }
        }
        candidates.sort();
        candidates.dedup();

        for candidate in candidates {
            if rest.is_constant() {
                break;
            }
            let linear = Poly::from_coeffs(&[-candidate.clone(), Rational::one()]);
            let mut mult = 0;
            while let Some(q) = rest.div_exact(&linear) {
                rest = q;
                mult += 1;
                if rest.is_constant() {
                    break;
                }
            }
            if mult > 0 {
                roots.push((candidate, mult));
            }
        }

        roots.sort_by(|a, b| a.0.cmp(&b.0));
        (roots, rest)
    }

    /// Approximate real roots of the square-free part, ascending.
    pub fn real_roots(&self) -> Vec<f64> {
        let part = self.square_free_part();
        let coeffs: Vec<f64> = (0..=part.degree().unwrap_or(0))
            .map(|exp| part.coeff(exp).to_f64().unwrap_or(0.0))
            .collect();
        real_roots_f64(&coeffs)
    }

    /// Read `expr` as a polynomial in `var`. Symbols other than `var` and non-polynomial
    /// operations give `None`.
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Self> {
        match expr {
            Expr::Variable(name) if name == var => Some(Poly::x()),
            Expr::Constant(c) => Some(Poly::constant(c.clone())),
            Expr::Float(v) => Rational::from_float(*v).map(Poly::constant),
            Expr::Add(a, b) => Some(&Self::from_expr(a, var)? + &Self::from_expr(b, var)?),
            Expr::Sub(a, b) => Some(&Self::from_expr(a, var)? - &Self::from_expr(b, var)?),
            Expr::Mul(a, b) => Some(&Self::from_expr(a, var)? * &Self::from_expr(b, var)?),
            Expr::Neg(inner) => Some(-Self::from_expr(inner, var)?),
            Expr::Div(a, b) => {
                let denom = Self::from_expr(b, var)?;
                if !denom.is_constant() || denom.is_zero() {
                    return None;
                }
                Some(Self::from_expr(a, var)?.scale(&denom.coeff(0).recip()))
            }
            Expr::Pow(base, exp) => Self::power(base, exp, var),
            Expr::Call(Function::Pow, args) if args.len() == 2 => {
                Self::power(&args[0], &args[1], var)
            }
            _ => None,
        }
    }

    fn power(base: &Expr, exp: &Expr, var: &str) -> Option<Self> {
        let exponent = exp.as_rational()?;
        if !exponent.is_integer() {
            return None;
        }
        let power = exponent.to_integer().to_usize()?;
        if power > MAX_EXPANDED_POWER {
            return None;
        }
        Some(Self::from_expr(base, var)?.pow(power))
    }

    /// Render highest power first, e.g. `x^2-3*x+2`.
    pub fn to_expr(&self, var: &str) -> Expr {
        let mut result: Option<Expr> = None;
        for (exp, coeff) in self.coeffs.iter().rev() {
            let term = monomial_expr(&coeff.abs(), *exp, var);
            result = Some(match result {
                None if coeff.is_negative() => expr::neg(term),
                None => term,
                Some(acc) if coeff.is_negative() => expr::sub(acc, term),
                Some(acc) => expr::add(acc, term),
            });
        }
        result.unwrap_or_else(expr::zero)
    }
}

fn monomial_expr(magnitude: &Rational, exp: usize, var: &str) -> Expr {
    let base = match exp {
        0 => return Expr::Constant(magnitude.clone()),
        1 => Expr::var(var),
        _ => expr::pow(Expr::var(var), Expr::integer(exp)),
    };
    if magnitude.is_one() {
        base
    } else {
        expr::mul(Expr::Constant(magnitude.clone()), base)
    }
}

fn abs_u64(r: &Rational) -> Option<u64> {
    r.to_integer().abs().to_u64()
}

fn divisors(n: u64) -> Vec<u64> {
    if n == 0 {
        return vec![1];
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1;
    while d * d <= n {
        if n % d == 0 {
            small.push(d);
            if d * d != n {
                large.push(n / d);
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    small
}

/// Real roots of a square-free polynomial given lowest power first. Roots of the
/// derivative split the line into monotone pieces, each holding at most one root.
fn real_roots_f64(coeffs: &[f64]) -> Vec<f64> {
    let mut coeffs = coeffs.to_vec();
    while coeffs.last().is_some_and(|c| *c == 0.0) {
        coeffs.pop();
    }
    match coeffs.len() {
        0 | 1 => return Vec::new(),
        2 => return vec![-coeffs[0] / coeffs[1]],
        _ => {}
    }

    let lead = coeffs[coeffs.len() - 1];
    let bound = 1.0
        + coeffs[..coeffs.len() - 1]
            .iter()
            .map(|c| (c / lead).abs())
            .fold(0.0, f64::max);
    let eval = |x: f64| coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c);

    let derivative: Vec<f64> = coeffs
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, c)| c * i as f64)
        .collect();
    let mut points = vec![-bound];
    points.extend(
        real_roots_f64(&derivative)
            .into_iter()
            .filter(|p| p.abs() < bound),
    );
    points.push(bound);

    let mut roots: Vec<f64> = Vec::new();
    for pair in points.windows(2) {
        let (mut lo, mut hi) = (pair[0], pair[1]);
        let (mut f_lo, f_hi) = (eval(lo), eval(hi));
        if f_lo == 0.0 {
            roots.push(lo);
            continue;
        }
        if f_lo.signum() == f_hi.signum() {
            continue;
        }
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            let f_mid = eval(mid);
            if f_mid == 0.0 {
                lo = mid;
                hi = mid;
                break;
            }
            if f_mid.signum() == f_lo.signum() {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
        }
        roots.push(0.5 * (lo + hi));
    }
    if eval(bound) == 0.0 {
        roots.push(bound);
    }
    roots.dedup_by(|a, b| (*a - *b).abs() < 1e-12);
    roots
}

impl std::ops::Add for &Poly {
    type Output = Poly;
    fn add(self, rhs: &Poly) -> Poly {
        let mut coeffs = self.coeffs.clone();
        for (exp, coeff) in &rhs.coeffs {
            match coeffs.entry(*exp) {
                Entry::Vacant(entry) => {
                    entry.insert(coeff.clone());
                }
                Entry::Occupied(mut entry) => {
                    let updated = entry.get() + coeff;
                    if updated.is_zero() {
                        entry.remove();
                    } else {
                        *entry.get_mut() = updated;
                    }
                }
            }
        }
        Poly { coeffs }
    }
}

impl std::ops::Sub for &Poly {
    type Output = Poly;
    fn sub(self, rhs: &Poly) -> Poly {
        self + &(-rhs.clone())
    }
}

impl std::ops::Mul for &Poly {
    type Output = Poly;
    fn mul(self, rhs: &Poly) -> Poly {
        let mut out = Poly::zero();
        for (exp_a, a) in &self.coeffs {
            for (exp_b, b) in &rhs.coeffs {
                out = &out + &Poly::monomial(a * b, exp_a + exp_b);
            }
        }
        out
    }
}

impl std::ops::Neg for Poly {
    type Output = Poly;
    fn neg(self) -> Poly {
        Poly {
            coeffs: self.coeffs.into_iter().map(|(e, c)| (e, -c)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Rational {
        Rational::from_integer(n.into())
    }

    #[test]
    fn finds_divisors_in_order() {
        assert_eq!(divisors(12), vec![1, 2, 3, 4, 6, 12]);
        assert_eq!(divisors(9), vec![1, 3, 9]);
    }

    #[test]
    fn isolates_irrational_roots() {
        // x^3 - 2
        let roots = real_roots_f64(&[-2.0, 0.0, 0.0, 1.0]);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 2f64.cbrt()).abs() < 1e-9);
    }

    #[test]
    fn horner_matches_direct_evaluation() {
        let p = Poly::from_coeffs(&[int(1), int(-3), int(2)]);
        assert_eq!(p.evaluate(&int(2)), int(3));
    }
}
