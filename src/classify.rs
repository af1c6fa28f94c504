//! Coarse equation classification by substring heuristics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MathError;

/// Shape of an equation, used to pick the explanation template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquationType {
    Linear,
    Quadratic,
    Polynomial,
    Trigonometric,
    Exponential,
    Logarithmic,
}

impl EquationType {
    pub fn as_str(self) -> &'static str {
        match self {
            EquationType::Linear => "linear",
            EquationType::Quadratic => "quadratic",
            EquationType::Polynomial => "polynomial",
            EquationType::Trigonometric => "trigonometric",
            EquationType::Exponential => "exponential",
            EquationType::Logarithmic => "logarithmic",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EquationType::Linear => "Linear Equation",
            EquationType::Quadratic => "Quadratic Equation",
            EquationType::Polynomial => "Polynomial Equation",
            EquationType::Trigonometric => "Trigonometric Equation",
            EquationType::Exponential => "Exponential Equation",
            EquationType::Logarithmic => "Logarithmic Equation",
        }
    }
}

impl fmt::Display for EquationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which solver and validation rules an equation goes through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquationCategory {
    #[default]
    Algebraic,
    Trigonometric,
    Exponential,
    Logarithmic,
    Differential,
    Integral,
    Matrix,
    Vector,
    Inequality,
    System,
}

impl EquationCategory {
    pub const ALL: [EquationCategory; 10] = [
        EquationCategory::Algebraic,
        EquationCategory::Trigonometric,
        EquationCategory::Exponential,
        EquationCategory::Logarithmic,
        EquationCategory::Differential,
        EquationCategory::Integral,
        EquationCategory::Matrix,
        EquationCategory::Vector,
        EquationCategory::Inequality,
        EquationCategory::System,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EquationCategory::Algebraic => "algebraic",
            EquationCategory::Trigonometric => "trigonometric",
            EquationCategory::Exponential => "exponential",
            EquationCategory::Logarithmic => "logarithmic",
            EquationCategory::Differential => "differential",
            EquationCategory::Integral => "integral",
            EquationCategory::Matrix => "matrix",
            EquationCategory::Vector => "vector",
            EquationCategory::Inequality => "inequality",
            EquationCategory::System => "system",
        }
    }
}

impl fmt::Display for EquationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquationCategory {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EquationCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| MathError::UnsupportedEquationType(s.to_string()))
    }
}

pub fn detect_equation_type(equation: &str) -> EquationType {
    if ["sin", "cos", "tan"].iter().any(|f| equation.contains(f)) {
        return EquationType::Trigonometric;
    }
    if equation.contains('^') || equation.contains("pow") {
        match polynomial_degree(equation) {
            Some(1) => return EquationType::Linear,
            Some(2) => return EquationType::Quadratic,
            Some(d) if d > 2 => return EquationType::Polynomial,
            _ => {}
        }
    }
    if equation.contains("log") || equation.contains("ln") {
        return EquationType::Logarithmic;
    }
    if equation.contains("e^") || equation.contains("exp") {
        return EquationType::Exponential;
    }
    EquationType::Linear
}

/// Highest literal exponent over the `+`/`-` separated terms. `None` when some exponent
/// does not start with a digit.
pub fn polynomial_degree(equation: &str) -> Option<u32> {
    let mut degree = 0;
    for term in equation.split(['+', '-']) {
        let Some((_, exponent)) = term.split_once('^') else {
            continue;
        };
        let digits: String = exponent
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        degree = degree.max(digits.parse::<u32>().ok()?);
    }
    Some(degree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbolic_exponent_has_no_degree() {
        assert_eq!(polynomial_degree("x^n + 1 = 0"), None);
        assert_eq!(detect_equation_type("e^x = 2"), EquationType::Exponential);
    }
}
