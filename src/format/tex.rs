use crate::expr::{Expr, Function, Relation};

use super::expr::{show_float, show_rational, split_neg};

/// Render an expression as LaTeX.
pub fn to_tex(expr: &Expr) -> String {
    tex(0, expr)
}

fn tex(ctx: u8, expr: &Expr) -> String {
    match expr {
        Expr::Variable(name) => variable(name),
        Expr::Constant(r) => {
            let text = show_rational(r);
            match text.split_once('/') {
                Some((n, d)) => {
                    let (sign, n) = n.strip_prefix('-').map_or(("", n), |n| ("-", n));
                    format!("{sign}\\frac{{{n}}}{{{d}}}")
                }
                None => text,
            }
        }
        Expr::Float(v) => show_float(*v),
        Expr::Add(a, b) => {
            let (neg_b, b_inner) = split_neg(b);
            let body = format!(
                "{} {} {}",
                tex(1, a),
                if neg_b { "-" } else { "+" },
                tex(2, &b_inner)
            );
            paren(ctx, 1, body)
        }
        Expr::Sub(a, b) => {
            let (neg_b, b_inner) = split_neg(b);
            let body = format!(
                "{} {} {}",
                tex(1, a),
                if neg_b { "+" } else { "-" },
                tex(2, &b_inner)
            );
            paren(ctx, 1, body)
        }
        Expr::Mul(a, b) => paren(ctx, 2, format!("{} \\cdot {}", tex(2, a), tex(2, b))),
        Expr::Div(a, b) => format!("\\frac{{{}}}{{{}}}", tex(0, a), tex(0, b)),
        Expr::Pow(a, b) => format!("{{{}}}^{{{}}}", tex(4, a), tex(0, b)),
        Expr::Neg(a) => paren(ctx, 2, format!("-{}", tex(3, a))),
        Expr::Factorial(a) => format!("{}!", tex(4, a)),
        Expr::Call(function, args) => call(*function, args),
        Expr::Matrix(rows) => {
            let body: Vec<String> = rows
                .iter()
                .map(|row| {
                    let cells: Vec<String> = row.iter().map(|cell| tex(0, cell)).collect();
                    cells.join(" & ")
                })
                .collect();
            format!("\\begin{{bmatrix}}{}\\end{{bmatrix}}", body.join(" \\\\ "))
        }
        Expr::Equation(a, b) => format!("{} = {}", tex(0, a), tex(0, b)),
        Expr::Inequality(a, rel, b) => format!("{} {} {}", tex(0, a), relation(*rel), tex(0, b)),
    }
}

fn call(function: Function, args: &[Expr]) -> String {
    let arg = |i: usize| args.get(i).map(|a| tex(0, a)).unwrap_or_default();
    match function {
        Function::Sqrt => format!("\\sqrt{{{}}}", arg(0)),
        Function::Abs => format!("\\left|{}\\right|", arg(0)),
        Function::Pow => format!("{{{}}}^{{{}}}", arg(0), arg(1)),
        Function::Exp => format!("e^{{{}}}", arg(0)),
        Function::Factorial => format!("{}!", args.first().map(|a| tex(4, a)).unwrap_or_default()),
        Function::Binomial => format!("\\binom{{{}}}{{{}}}", arg(0), arg(1)),
        Function::Gamma => format!("\\Gamma\\left({}\\right)", arg(0)),
        Function::Zeta => format!("\\zeta\\left({}\\right)", arg(0)),
        Function::Beta => format!("\\mathrm{{B}}\\left({}, {}\\right)", arg(0), arg(1)),
        Function::BesselJ => format!("J_{{{}}}\\left({}\\right)", arg(0), arg(1)),
        Function::BesselY => format!("Y_{{{}}}\\left({}\\right)", arg(0), arg(1)),
        Function::BesselI => format!("I_{{{}}}\\left({}\\right)", arg(0), arg(1)),
        Function::BesselK => format!("K_{{{}}}\\left({}\\right)", arg(0), arg(1)),
        Function::Log if args.len() == 2 => {
            format!("\\log_{{{}}}\\left({}\\right)", arg(1), arg(0))
        }
        Function::Log10 => format!("\\log_{{10}}\\left({}\\right)", arg(0)),
        Function::Transpose => format!("{{{}}}^{{T}}", arg(0)),
        Function::Inv => format!("{{{}}}^{{-1}}", arg(0)),
        Function::Norm => format!("\\left\\|{}\\right\\|", arg(0)),
        Function::Dot => format!("{} \\cdot {}", arg(0), arg(1)),
        Function::Cross => format!("{} \\times {}", arg(0), arg(1)),
        Function::Sin
        | Function::Cos
        | Function::Tan
        | Function::Sec
        | Function::Csc
        | Function::Cot
        | Function::Sinh
        | Function::Cosh
        | Function::Tanh
        | Function::Coth
        | Function::Ln
        | Function::Log
        | Function::Det => format!("\\{}\\left({}\\right)", function.name(), joined(args)),
        Function::Asin => format!("\\arcsin\\left({}\\right)", arg(0)),
        Function::Acos => format!("\\arccos\\left({}\\right)", arg(0)),
        Function::Atan => format!("\\arctan\\left({}\\right)", arg(0)),
        _ => format!(
            "\\mathrm{{{}}}\\left({}\\right)",
            function.name(),
            joined(args)
        ),
    }
}

fn joined(args: &[Expr]) -> String {
    let parts: Vec<String> = args.iter().map(|a| tex(0, a)).collect();
    parts.join(", ")
}

fn variable(name: &str) -> String {
    match name {
        "pi" | "π" => "\\pi".to_string(),
        "tau" => "\\tau".to_string(),
        "phi" => "\\phi".to_string(),
        "Infinity" | "∞" => "\\infty".to_string(),
        other => other.to_string(),
    }
}

fn relation(rel: Relation) -> &'static str {
    match rel {
        Relation::Less => "<",
        Relation::LessEqual => "\\leq",
        Relation::Greater => ">",
        Relation::GreaterEqual => "\\geq",
        Relation::NotEqual => "\\neq",
    }
}

fn paren(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("\\left({body}\\right)")
    } else {
        body
    }
}
