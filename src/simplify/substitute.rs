use crate::expr::Expr;

/// Substitute variable `var` with `replacement` throughout `expr`.
pub fn substitute(expr: &Expr, var: &str, replacement: &Expr) -> Expr {
    let sub = |e: &Expr| substitute(e, var, replacement).boxed();
    match expr {
        Expr::Variable(name) if name == var => replacement.clone(),
        Expr::Add(a, b) => Expr::Add(sub(a), sub(b)),
        Expr::Sub(a, b) => Expr::Sub(sub(a), sub(b)),
        Expr::Mul(a, b) => Expr::Mul(sub(a), sub(b)),
        Expr::Div(a, b) => Expr::Div(sub(a), sub(b)),
        Expr::Pow(a, b) => Expr::Pow(sub(a), sub(b)),
        Expr::Equation(a, b) => Expr::Equation(sub(a), sub(b)),
        Expr::Inequality(a, rel, b) => Expr::Inequality(sub(a), *rel, sub(b)),
        Expr::Neg(a) => Expr::Neg(sub(a)),
        Expr::Factorial(a) => Expr::Factorial(sub(a)),
        Expr::Call(function, args) => Expr::Call(
            *function,
            args.iter()
                .map(|arg| substitute(arg, var, replacement))
                .collect(),
        ),
        Expr::Matrix(rows) => Expr::Matrix(
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| substitute(cell, var, replacement))
                        .collect()
                })
                .collect(),
        ),
        Expr::Variable(_) | Expr::Constant(_) | Expr::Float(_) => expr.clone(),
    }
}

/// Substitute several variables at once.
pub fn substitute_all(expr: &Expr, bindings: &[(String, Expr)]) -> Expr {
    bindings
        .iter()
        .fold(expr.clone(), |acc, (var, value)| substitute(&acc, var, value))
}
