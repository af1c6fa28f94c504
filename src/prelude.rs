//! String-in, string-out helpers over a default [`MathProcessor`] for quick experiments.
//!
//! ```
//! use mathproc::prelude::*;
//!
//! assert_eq!(simp("2·x + 3·x").unwrap(), "5*x");
//! assert_eq!(solve("x^2 - 4 = 0").unwrap(), "x = -2, x = 2");
//! ```

use crate::classify::EquationCategory;
use crate::engine::Scope;
use crate::error::Result;
use crate::processor::MathProcessor;

pub use crate::processor::MathProcessor as Processor;

/// Rewrite locale notation into engine syntax.
pub fn prep(input: &str) -> String {
    MathProcessor::new().preprocess_expression(input)
}

pub fn eval(input: &str) -> Result<String> {
    MathProcessor::new()
        .evaluate_expression(input, &Scope::new())
        .map(|value| value.to_string())
}

pub fn simp(input: &str) -> Result<String> {
    MathProcessor::new().simplify_expression(input)
}

pub fn fact(input: &str) -> Result<String> {
    MathProcessor::new().factor_expression(input)
}

pub fn expd(input: &str) -> Result<String> {
    MathProcessor::new().expand_expression(input)
}

pub fn tex(input: &str) -> Result<String> {
    MathProcessor::new().generate_latex(input)
}

/// Solve as an algebraic equation and render the solution.
pub fn solve(input: &str) -> Result<String> {
    MathProcessor::new()
        .solve_equation(input, EquationCategory::Algebraic)
        .map(|report| report.solution.to_string())
}

/// Solve a `;`-separated linear system.
pub fn solve_sys(input: &str) -> Result<String> {
    MathProcessor::new()
        .solve_equation(input, EquationCategory::System)
        .map(|report| report.solution.to_string())
}
