use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::expr::{self, Expr, Function, Rational};

/// Exact factorials are produced up to this argument; larger ones stay symbolic.
const EXACT_FACTORIAL_LIMIT: u64 = 100;
/// Rational powers are only computed for exponents up to this magnitude.
const EXACT_POWER_LIMIT: i64 = 256;

/// Apply identity rules to a call whose arguments are already simplified.
pub(crate) fn fold_call(function: Function, args: Vec<Expr>) -> Expr {
    let arg = args.first();
    let is_zero = arg.is_some_and(Expr::is_zero);
    let is_one = arg.is_some_and(Expr::is_one);

    match function {
        Function::Pow if args.len() == 2 => {
            let mut args = args.into_iter();
            match (args.next(), args.next()) {
                (Some(base), Some(exp)) => return expr::pow(base, exp),
                _ => unreachable!("length checked above"),
            }
        }
        Function::Sin
        | Function::Tan
        | Function::Asin
        | Function::Atan
        | Function::Sinh
        | Function::Tanh
        | Function::Asinh
        | Function::Atanh
        | Function::Erf
            if is_zero =>
        {
            return expr::zero();
        }
        Function::Cos | Function::Cosh | Function::Exp | Function::Erfc if is_zero => {
            return expr::one();
        }
        Function::Acos | Function::Ln | Function::Log10 if is_one => return expr::zero(),
        Function::Log if args.len() == 1 && is_one => return expr::zero(),
        Function::Log if args.len() == 2 && args[0] == args[1] => return expr::one(),
        Function::Log10 if arg == Some(&Expr::integer(10)) => return expr::one(),
        Function::Ln | Function::Log if args.len() == 1 => match arg {
            Some(Expr::Variable(name)) if name == "e" => return expr::one(),
            Some(Expr::Call(Function::Exp, inner)) => return inner[0].clone(),
            Some(Expr::Pow(base, exp)) if base.as_variable() == Some("e") => {
                return (**exp).clone();
            }
            _ => {}
        },
        Function::Exp => {
            if let Some(Expr::Call(Function::Ln, inner)) = arg {
                return inner[0].clone();
            }
        }
        Function::Sqrt => {
            if let Some(r) = arg.and_then(Expr::as_rational) {
                if let Some(folded) = sqrt_rational(&r) {
                    return folded;
                }
            }
            if let Some(Expr::Pow(base, exp)) = arg {
                if exp.as_rational() == Some(Rational::from_integer(2.into())) {
                    return Expr::Call(Function::Abs, vec![(**base).clone()]);
                }
            }
        }
        Function::Abs => match arg {
            Some(Expr::Constant(c)) => return Expr::Constant(c.abs()),
            Some(Expr::Neg(inner)) => return Expr::Call(Function::Abs, vec![(**inner).clone()]),
            Some(inner @ Expr::Call(Function::Abs, _)) => return inner.clone(),
            _ => {}
        },
        Function::Factorial => {
            if let Some(n) = arg.and_then(small_natural) {
                return Expr::Constant(Rational::from_integer(factorial(n)));
            }
        }
        Function::Gamma => {
            if let Some(n) = arg.and_then(small_natural).filter(|n| *n >= 1) {
                return Expr::Constant(Rational::from_integer(factorial(n - 1)));
            }
        }
        Function::Binomial => {
            if let (Some(n), Some(k)) = (
                args.first().and_then(small_natural),
                args.get(1).and_then(small_natural),
            ) {
                let value = if k > n {
                    BigInt::zero()
                } else {
                    factorial(n) / (factorial(k) * factorial(n - k))
                };
                return Expr::Constant(Rational::from_integer(value));
            }
        }
        _ => {}
    }
    Expr::Call(function, args)
}

fn small_natural(expr: &Expr) -> Option<u64> {
    let r = expr.as_rational()?;
    if !r.is_integer() || r.is_negative() {
        return None;
    }
    r.to_integer().to_u64().filter(|n| *n <= EXACT_FACTORIAL_LIMIT)
}

fn factorial(n: u64) -> BigInt {
    (1..=n).fold(BigInt::one(), |acc, k| acc * BigInt::from(k))
}

/// `sqrt(8)` becomes `2*sqrt(2)`, `sqrt(9/4)` becomes `1.5`.
fn sqrt_rational(r: &Rational) -> Option<Expr> {
    if r.is_negative() {
        return None;
    }
    // sqrt(p/q) = sqrt(p*q)/q
    let (outside, inside) = square_split(&(r.numer() * r.denom()))?;
    let coeff = Rational::new(outside, r.denom().clone());
    if inside.is_one() {
        return Some(Expr::Constant(coeff));
    }
    if coeff.is_one() {
        return None;
    }
    let root = Expr::Call(Function::Sqrt, vec![Expr::Constant(Rational::from_integer(inside))]);
    Some(expr::mul(Expr::Constant(coeff), root))
}

/// Write `n = k^2 * m` with `m` square-free. `None` for negative or very large input.
pub(crate) fn square_split(n: &BigInt) -> Option<(BigInt, BigInt)> {
    if n.is_negative() {
        return None;
    }
    let root = n.sqrt();
    if &root * &root == *n {
        return Some((root, BigInt::one()));
    }
    let mut rest = n.to_u64()?;
    if rest > 1_000_000_000_000 {
        return None;
    }
    let mut outside = 1u64;
    let mut d = 2u64;
    while d * d <= rest {
        while rest % (d * d) == 0 {
            rest /= d * d;
            outside *= d;
        }
        d += 1;
    }
    Some((BigInt::from(outside), BigInt::from(rest)))
}

pub(crate) fn rational_pow(base: &Rational, n: i64) -> Option<Rational> {
    if n.abs() > EXACT_POWER_LIMIT {
        return None;
    }
    if n < 0 && base.is_zero() {
        return None;
    }
    let magnitude = (0..n.unsigned_abs()).fold(Rational::one(), |acc, _| acc * base);
    Some(if n < 0 { magnitude.recip() } else { magnitude })
}

/// Exact `index`-th root of a non-negative rational, if one exists.
pub(crate) fn rational_root(value: &Rational, index: &BigInt) -> Option<Rational> {
    if value.is_negative() {
        return None;
    }
    let index = index.to_u32()?;
    let exact = |n: &BigInt| {
        let root = n.nth_root(index);
        (root.pow(index) == *n).then_some(root)
    };
    Some(Rational::new(exact(value.numer())?, exact(value.denom())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_square_factors() {
        assert_eq!(
            square_split(&BigInt::from(72)),
            Some((BigInt::from(6), BigInt::from(2)))
        );
    }

    #[test]
    fn folds_log_of_exp() {
        let x = Expr::var("x");
        let folded = fold_call(Function::Ln, vec![Expr::Call(Function::Exp, vec![x.clone()])]);
        assert_eq!(folded, x);
    }
}
