//! Numeric evaluation of expression trees over `f64` numbers and matrices.

use std::f64::consts::{E, PI, TAU};

use num_traits::ToPrimitive;

use crate::engine::{Scope, Value};
use crate::error::{MathError, Result};
use crate::expr::{Expr, Function};
use crate::matrix;
use crate::special::{self, BesselKind};

const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Built-in constant values, `None` for names that are not constants.
pub fn constant_value(name: &str) -> Option<f64> {
    match name {
        "pi" | "π" => Some(PI),
        "e" => Some(E),
        "tau" => Some(TAU),
        "phi" => Some(GOLDEN_RATIO),
        "Infinity" | "∞" => Some(f64::INFINITY),
        _ => None,
    }
}

pub fn evaluate(expr: &Expr, scope: &Scope) -> Result<Value> {
    match expr {
        Expr::Constant(c) => Ok(Value::Number(c.to_f64().unwrap_or(f64::NAN))),
        Expr::Float(v) => Ok(Value::Number(*v)),
        Expr::Variable(name) => lookup(name, scope),
        Expr::Add(a, b) => arithmetic(evaluate(a, scope)?, evaluate(b, scope)?, '+'),
        Expr::Sub(a, b) => arithmetic(evaluate(a, scope)?, evaluate(b, scope)?, '-'),
        Expr::Mul(a, b) => multiply(evaluate(a, scope)?, evaluate(b, scope)?),
        Expr::Div(a, b) => divide(evaluate(a, scope)?, evaluate(b, scope)?),
        Expr::Pow(a, b) => power(evaluate(a, scope)?, evaluate(b, scope)?),
        Expr::Neg(a) => match evaluate(a, scope)? {
            Value::Number(v) => Ok(Value::Number(-v)),
            Value::Matrix(m) => Ok(Value::Matrix(matrix::map(&m, |v| -v))),
            Value::Bool(_) => Err(not_a_number("negation")),
        },
        Expr::Factorial(a) => {
            let v = number(evaluate(a, scope)?, "factorial")?;
            Ok(Value::Number(special::factorial(v)?))
        }
        Expr::Call(function, args) => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, scope))
                .collect::<Result<Vec<_>>>()?;
            call_value(*function, args)
        }
        Expr::Matrix(rows) => {
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                let mut cells = Vec::with_capacity(row.len());
                for cell in row {
                    cells.push(number(evaluate(cell, scope)?, "matrix entry")?);
                }
                out.push(cells);
            }
            let width = out.first().map_or(0, Vec::len);
            if out.iter().any(|row| row.len() != width) {
                return Err(MathError::Evaluate(
                    "matrix rows must have the same length".to_string(),
                ));
            }
            Ok(Value::Matrix(out))
        }
        Expr::Equation(a, b) => arithmetic(evaluate(a, scope)?, evaluate(b, scope)?, '-'),
        Expr::Inequality(a, rel, b) => {
            let lhs = number(evaluate(a, scope)?, "comparison")?;
            let rhs = number(evaluate(b, scope)?, "comparison")?;
            Ok(Value::Bool(rel.holds(lhs, rhs)))
        }
    }
}

/// Evaluate with a single real variable bound, for the numeric solvers.
pub fn evaluate_at(expr: &Expr, var: &str, x: f64) -> Result<f64> {
    let mut scope = Scope::new();
    scope.insert(var.to_string(), Value::Number(x));
    number(evaluate(expr, &scope)?, "result")
}

fn lookup(name: &str, scope: &Scope) -> Result<Value> {
    if let Some(value) = scope.get(name) {
        return Ok(value.clone());
    }
    if let Some(value) = constant_value(name) {
        return Ok(Value::Number(value));
    }
    if name == "i" {
        return Err(MathError::Unsupported(
            "complex numbers are not supported".to_string(),
        ));
    }
    Err(MathError::Evaluate(format!("undefined symbol `{name}`")))
}

fn not_a_number(context: &str) -> MathError {
    MathError::Evaluate(format!("{context} expects a number"))
}

fn number(value: Value, context: &str) -> Result<f64> {
    match value {
        Value::Number(v) => Ok(v),
        _ => Err(not_a_number(context)),
    }
}

fn arithmetic(a: Value, b: Value, op: char) -> Result<Value> {
    let apply = |x: f64, y: f64| if op == '+' { x + y } else { x - y };
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(Value::Number(apply(x, y))),
        (Value::Matrix(m), Value::Number(y)) => Ok(Value::Matrix(matrix::map(&m, |x| apply(x, y)))),
        (Value::Number(x), Value::Matrix(m)) => Ok(Value::Matrix(matrix::map(&m, |y| apply(x, y)))),
        (Value::Matrix(a), Value::Matrix(b)) => Ok(Value::Matrix(matrix::zip_with(&a, &b, apply)?)),
        _ => Err(not_a_number("arithmetic")),
    }
}

fn multiply(a: Value, b: Value) -> Result<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(Value::Number(x * y)),
        (Value::Matrix(m), Value::Number(k)) | (Value::Number(k), Value::Matrix(m)) => {
            Ok(Value::Matrix(matrix::map(&m, |x| x * k)))
        }
        (Value::Matrix(a), Value::Matrix(b)) => {
            // Two row vectors of equal length multiply to their dot product.
            let (ra, ca) = matrix::shape(&a);
            if ra == 1 && matrix::shape(&b) == (1, ca) && ca > 1 {
                return Ok(Value::Number(matrix::dot(&a[0], &b[0])?));
            }
            Ok(Value::Matrix(matrix::multiply(&a, &b)?))
        }
        _ => Err(not_a_number("multiplication")),
    }
}

fn divide(a: Value, b: Value) -> Result<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(Value::Number(x / y)),
        (Value::Matrix(m), Value::Number(k)) => Ok(Value::Matrix(matrix::map(&m, |x| x / k))),
        (Value::Number(k), Value::Matrix(m)) => Ok(Value::Matrix(matrix::map(
            &matrix::inverse(&m)?,
            |x| x * k,
        ))),
        (Value::Matrix(a), Value::Matrix(b)) => {
            Ok(Value::Matrix(matrix::multiply(&a, &matrix::inverse(&b)?)?))
        }
        _ => Err(not_a_number("division")),
    }
}

fn power(base: Value, exp: Value) -> Result<Value> {
    match (base, exp) {
        (Value::Number(x), Value::Number(y)) => Ok(Value::Number(real_pow(x, y))),
        (Value::Matrix(m), Value::Number(n)) if n.fract() == 0.0 => {
            Ok(Value::Matrix(matrix::power(&m, n as i64)?))
        }
        (Value::Matrix(_), Value::Number(_)) => Err(MathError::Unsupported(
            "matrix powers need an integer exponent".to_string(),
        )),
        _ => Err(not_a_number("exponentiation")),
    }
}

/// `powf`, except that odd roots of negative numbers stay real: `(-8)^(1/3) = -2`.
fn real_pow(x: f64, y: f64) -> f64 {
    if x < 0.0 && y.fract() != 0.0 {
        let inverse = 1.0 / y;
        let index = inverse.round();
        if (inverse - index).abs() < 1e-9 && (index as i64) % 2 != 0 {
            return -(-x).powf(y);
        }
    }
    x.powf(y)
}

fn call_value(function: Function, args: Vec<Value>) -> Result<Value> {
    if !function.arity().accepts(args.len()) {
        return Err(MathError::Evaluate(format!(
            "{function} does not take {} argument(s)",
            args.len()
        )));
    }
    match (function, args.as_slice()) {
        (Function::Det, [Value::Matrix(m)]) => Ok(Value::Number(matrix::det(m)?)),
        (Function::Inv, [Value::Matrix(m)]) => Ok(Value::Matrix(matrix::inverse(m)?)),
        (Function::Transpose, [Value::Matrix(m)]) => Ok(Value::Matrix(matrix::transpose(m))),
        (Function::Trace, [Value::Matrix(m)]) => Ok(Value::Number(matrix::trace(m)?)),
        (Function::Norm, [Value::Matrix(m)]) => Ok(Value::Number(matrix::norm(m))),
        (Function::Abs, [Value::Matrix(m)]) => Ok(Value::Matrix(matrix::map(m, f64::abs))),
        (Function::Dot, [Value::Matrix(a), Value::Matrix(b)]) => {
            let a = matrix::as_vector(a)?;
            let b = matrix::as_vector(b)?;
            Ok(Value::Number(matrix::dot(&a, &b)?))
        }
        (Function::Cross, [Value::Matrix(a), Value::Matrix(b)]) => {
            let a = matrix::as_vector(a)?;
            let b = matrix::as_vector(b)?;
            Ok(Value::Matrix(vec![matrix::cross(&a, &b)?]))
        }
        (Function::Dot | Function::Cross, _) => Err(MathError::Evaluate(format!(
            "{function} expects two vectors"
        ))),
        (Function::Mean | Function::Median | Function::Std | Function::Variance, _) => {
            let mut values = Vec::new();
            for arg in args {
                match arg {
                    Value::Number(v) => values.push(v),
                    Value::Matrix(m) => values.extend(m.into_iter().flatten()),
                    Value::Bool(_) => return Err(not_a_number(function.name())),
                }
            }
            let value = match function {
                Function::Mean => matrix::mean(&values)?,
                Function::Median => matrix::median(&values)?,
                Function::Std => matrix::std(&values)?,
                _ => matrix::variance(&values)?,
            };
            Ok(Value::Number(value))
        }
        _ => {
            let scalars = args
                .into_iter()
                .map(|v| number(v, function.name()))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Number(call_function(function, &scalars)?))
        }
    }
}

/// Apply a named function to real arguments. Results outside the reals are `NaN`.
pub fn call_function(function: Function, args: &[f64]) -> Result<f64> {
    if !function.arity().accepts(args.len()) {
        return Err(MathError::Evaluate(format!(
            "{function} does not take {} argument(s)",
            args.len()
        )));
    }
    let x = args[0];
    let y = args.get(1).copied().unwrap_or(f64::NAN);
    let value = match function {
        Function::Sin => x.sin(),
        Function::Cos => x.cos(),
        Function::Tan => x.tan(),
        Function::Sec => 1.0 / x.cos(),
        Function::Csc => 1.0 / x.sin(),
        Function::Cot => 1.0 / x.tan(),
        Function::Asin => x.asin(),
        Function::Acos => x.acos(),
        Function::Atan => x.atan(),
        Function::Acot => {
            if x == 0.0 {
                PI / 2.0
            } else {
                (1.0 / x).atan()
            }
        }
        Function::Asec => (1.0 / x).acos(),
        Function::Acsc => (1.0 / x).asin(),
        Function::Sinh => x.sinh(),
        Function::Cosh => x.cosh(),
        Function::Tanh => x.tanh(),
        Function::Coth => 1.0 / x.tanh(),
        Function::Sech => 1.0 / x.cosh(),
        Function::Csch => 1.0 / x.sinh(),
        Function::Asinh => x.asinh(),
        Function::Acosh => x.acosh(),
        Function::Atanh => x.atanh(),
        Function::Exp => x.exp(),
        Function::Ln => x.ln(),
        Function::Log if args.len() == 2 => x.ln() / y.ln(),
        Function::Log => x.ln(),
        Function::Log10 => x.log10(),
        Function::Sqrt => x.sqrt(),
        Function::Abs => x.abs(),
        Function::Pow => real_pow(x, y),
        Function::Gamma => special::gamma(x)?,
        Function::Erf => special::erf(x),
        Function::Erfc => special::erfc(x),
        Function::Zeta => special::zeta(x)?,
        Function::Beta => special::beta(x, y)?,
        Function::Factorial => special::factorial(x)?,
        Function::Binomial => special::binomial(x, y)?,
        Function::BesselJ => special::bessel(BesselKind::J, x, y)?,
        Function::BesselY => special::bessel(BesselKind::Y, x, y)?,
        Function::BesselI => special::bessel(BesselKind::I, x, y)?,
        Function::BesselK => special::bessel(BesselKind::K, x, y)?,
        Function::Det | Function::Transpose | Function::Trace => x,
        Function::Inv => 1.0 / x,
        Function::Norm => x.abs(),
        Function::Dot => x * y,
        Function::Cross => {
            return Err(MathError::Evaluate("cross expects two vectors".to_string()));
        }
        Function::Mean => matrix::mean(args)?,
        Function::Median => matrix::median(args)?,
        Function::Std => matrix::std(args)?,
        Function::Variance => matrix::variance(args)?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_roots_of_negatives_stay_real() {
        assert!((real_pow(-8.0, 1.0 / 3.0) + 2.0).abs() < 1e-12);
        assert!(real_pow(-8.0, 0.5).is_nan());
    }
}
