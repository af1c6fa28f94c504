use crate::error::Result;
use crate::eval;
use crate::expr::{Expr, Function};
use crate::factor;
use crate::format;
use crate::parser;
use crate::simplify;
use crate::solver;

use super::{EngineOptions, MathEngine, Scope, Solution, Value};

/// The built-in engine: exact rational algebra with numeric fallbacks.
#[derive(Clone, Debug, Default)]
pub struct SymbolicEngine {
    options: EngineOptions,
}

impl SymbolicEngine {
    pub fn new(options: EngineOptions) -> Self {
        SymbolicEngine { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

impl MathEngine for SymbolicEngine {
    type Node = Expr;

    fn parse(&self, text: &str) -> Result<Expr> {
        parser::parse_expr(text)
    }

    fn evaluate(&self, node: &Expr, scope: &Scope) -> Result<Value> {
        eval::evaluate(node, scope)
    }

    fn solve(&self, node: &Expr) -> Result<Solution<Expr>> {
        solver::solve(node, &self.options)
    }

    fn solve_system(&self, nodes: &[Expr]) -> Result<Solution<Expr>> {
        solver::solve_system(nodes)
    }

    fn simplify(&self, node: &Expr) -> Result<Expr> {
        Ok(simplify::simplify(node))
    }

    fn factor(&self, node: &Expr) -> Result<Expr> {
        Ok(factor::factor(node))
    }

    fn expand(&self, node: &Expr) -> Result<Expr> {
        Ok(simplify::expand(node))
    }

    fn substitute(&self, node: &Expr, variable: &str, value: &Expr) -> Result<Expr> {
        Ok(simplify::substitute(node, variable, value))
    }

    fn is_zero(&self, value: &Value) -> bool {
        let tolerance = self.options.zero_tolerance;
        match value {
            Value::Number(v) => v.abs() < tolerance,
            Value::Matrix(rows) => rows.iter().flatten().all(|v| v.abs() < tolerance),
            Value::Bool(b) => !b,
        }
    }

    fn to_tex(&self, node: &Expr) -> String {
        format::to_tex(node)
    }

    fn call(&self, function: Function, args: &[f64]) -> Result<f64> {
        eval::call_function(function, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_check_uses_configured_tolerance() {
        let engine = SymbolicEngine::new(EngineOptions {
            zero_tolerance: 1e-3,
            ..EngineOptions::default()
        });
        assert!(engine.is_zero(&Value::Number(5e-4)));
        assert!(!engine.is_zero(&Value::Matrix(vec![vec![0.0, 0.1]])));
    }
}
