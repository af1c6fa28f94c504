use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::expr::{Expr, Rational};

fn collect_mul_factors(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Mul(a, b) => {
            collect_mul_factors(a, out);
            collect_mul_factors(b, out);
        }
        other => out.push(other.clone()),
    }
}

fn rebuild_mul_factors(factors: Vec<Expr>) -> Expr {
    let mut iter = factors.into_iter();
    let Some(first) = iter.next() else {
        return Expr::integer(1);
    };
    iter.fold(first, |acc, item| Expr::Mul(acc.boxed(), item.boxed()))
}

/// Render an expression in the ASCII notation accepted by the parser.
pub fn pretty(expr: &Expr) -> String {
    fn pp(ctx: u8, expr: &Expr) -> String {
        match expr {
            Expr::Variable(v) => v.clone(),
            Expr::Constant(r) => {
                let text = show_rational(r);
                if r.is_negative() && ctx > 1 {
                    format!("({text})")
                } else {
                    text
                }
            }
            Expr::Float(v) => {
                let text = show_float(*v);
                if *v < 0.0 && ctx > 1 {
                    format!("({text})")
                } else {
                    text
                }
            }

            Expr::Add(a, b) => {
                let s_a = pp(1, a);
                let (neg_b, b_inner) = split_neg(b);
                let s_b = pp(2, &b_inner);
                let body = format!("{s_a}{}{}", if neg_b { "-" } else { "+" }, s_b);
                bracket(ctx, 1, body)
            }

            Expr::Sub(a, b) => {
                let s_a = pp(1, a);
                let (neg_b, b_inner) = split_neg(b);
                let s_b = pp(2, &b_inner);
                let body = format!("{s_a}{}{}", if neg_b { "+" } else { "-" }, s_b);
                bracket(ctx, 1, body)
            }

            Expr::Mul(_, _) => {
                let mut factors = Vec::new();
                collect_mul_factors(expr, &mut factors);
                let mut neg = false;
                let mut parts = Vec::with_capacity(factors.len());
                for factor in factors {
                    let (is_neg, inner) = split_neg(&factor);
                    neg ^= is_neg;
                    if !inner.is_one() {
                        parts.push(pp(2, &inner));
                    }
                }
                if parts.is_empty() {
                    parts.push("1".to_string());
                }
                let body = parts.join("*");
                if neg {
                    bracket(ctx, 2, format!("-{body}"))
                } else {
                    bracket(ctx, 2, body)
                }
            }

            Expr::Div(a, b) => {
                let (na, a_inner) = split_neg(a);
                let (nb, b_inner) = split_neg(b);
                let body = format!("{} / {}", pp(2, &a_inner), pp(3, &b_inner));
                if na ^ nb {
                    bracket(ctx, 2, format!("-{body}"))
                } else {
                    bracket(ctx, 2, body)
                }
            }

            Expr::Pow(a, b) => bracket(ctx, 3, format!("{}^{}", pp(4, a), pp(4, b))),

            Expr::Neg(a) => {
                let (is_neg, inner) = split_neg(a);
                if is_neg {
                    pp(ctx, &inner)
                } else {
                    bracket(ctx, 2, format!("-{}", pp(3, &inner)))
                }
            }

            Expr::Factorial(a) => format!("{}!", pp(4, a)),

            Expr::Call(function, args) => {
                let args: Vec<String> = args.iter().map(|arg| pp(0, arg)).collect();
                format!("{}({})", function.name(), args.join(", "))
            }

            Expr::Matrix(rows) => show_matrix(rows, |cell| pp(0, cell)),

            Expr::Equation(a, b) => bracket(ctx, 0, format!("{} = {}", pp(0, a), pp(0, b))),

            Expr::Inequality(a, rel, b) => bracket(
                ctx,
                0,
                format!("{} {} {}", pp(0, a), rel.symbol(), pp(0, b)),
            ),
        }
    }

    pp(0, expr)
}

pub(crate) fn show_matrix(rows: &[Vec<Expr>], cell: impl Fn(&Expr) -> String) -> String {
    let render_row = |row: &Vec<Expr>| {
        let cells: Vec<String> = row.iter().map(&cell).collect();
        format!("[{}]", cells.join(", "))
    };
    if rows.len() == 1 {
        render_row(&rows[0])
    } else {
        let rendered: Vec<String> = rows.iter().map(render_row).collect();
        format!("[{}]", rendered.join(", "))
    }
}

pub(crate) fn split_neg(expr: &Expr) -> (bool, Expr) {
    match expr {
        Expr::Neg(inner) => (true, *inner.clone()),
        Expr::Constant(r) if r.is_negative() => (true, Expr::Constant(-r)),
        Expr::Float(v) if *v < 0.0 => (true, Expr::Float(-v)),
        Expr::Mul(_, _) => {
            let mut factors = Vec::new();
            collect_mul_factors(expr, &mut factors);
            let mut neg = false;
            let mut cleaned = Vec::with_capacity(factors.len());
            for factor in factors {
                let (is_neg, inner) = split_neg(&factor);
                neg ^= is_neg;
                cleaned.push(inner);
            }
            if neg {
                (true, rebuild_mul_factors(cleaned))
            } else {
                (false, expr.clone())
            }
        }
        other => (false, other.clone()),
    }
}

fn bracket(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("({body})")
    } else {
        body
    }
}

/// Terminating rationals print as decimals, everything else as `n/d`.
pub fn show_rational(r: &Rational) -> String {
    let n = r.numer().clone();
    let d = r.denom().clone();
    if d == BigInt::from(1) {
        return format!("{n}");
    }
    if let Some(places) = terminating_places(&d) {
        let scaled = (&n * BigInt::from(10).pow(places)) / &d;
        return decimal_string(&scaled, places as usize);
    }
    if n.is_negative() {
        format!("-{}/{}", -n, d)
    } else {
        format!("{}/{}", n, d)
    }
}

fn terminating_places(denom: &BigInt) -> Option<u32> {
    let two = BigInt::from(2);
    let five = BigInt::from(5);
    let mut rest = denom.clone();
    let (mut twos, mut fives) = (0u32, 0u32);
    while rest.is_even() && !rest.is_zero() {
        rest /= &two;
        twos += 1;
    }
    while (&rest % &five).is_zero() && !rest.is_zero() {
        rest /= &five;
        fives += 1;
    }
    let places = twos.max(fives);
    (rest == BigInt::from(1) && places <= 12).then_some(places)
}

fn decimal_string(scaled: &BigInt, places: usize) -> String {
    let negative = scaled.is_negative();
    let digits = scaled.abs().to_string();
    let padded = format!("{digits:0>width$}", width = places + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - places);
    let frac_part = frac_part.trim_end_matches('0');
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    }
}

/// Floats are shown with at most twelve decimals and without trailing zeros.
pub fn show_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        let int = value as i64;
        return format!("{int}");
    }
    if value.abs() >= 1e15 || value.abs() < 1e-9 {
        return format!("{value:e}");
    }
    let formatted = format!("{value:.12}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
