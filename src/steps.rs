//! Step-text generation for solved equations.

use crate::classify::EquationType;
use crate::notation::Notation;

/// Numbered step lines, `"1. Label: detail"`.
#[derive(Debug, Default)]
pub struct Steps {
    lines: Vec<String>,
}

impl Steps {
    pub fn push(&mut self, label: &str, detail: impl std::fmt::Display) {
        let n = self.lines.len() + 1;
        self.lines.push(format!("{n}. {label}: {detail}"));
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Explanation lines for an equation of the given type. `solution` is already rendered,
/// e.g. `x = 1, 2`; `count` is how many values it holds.
pub fn template_steps(
    notation: &Notation,
    equation: &str,
    equation_type: EquationType,
    solution: &str,
    count: usize,
) -> Vec<String> {
    let solution = notation.format_with_proper_notation(solution);
    let mut steps = vec![
        format!(
            "Original equation: ${}$",
            notation.format_with_proper_notation(equation)
        ),
        format!("Type: {}", equation_type.display_name()),
    ];

    let (hints, plural): (&[&str], bool) = match equation_type {
        EquationType::Linear => (
            &[
                "1. Isolate the variable term",
                "2. Divide both sides by the coefficient",
            ],
            false,
        ),
        EquationType::Quadratic => (
            &[
                "1. Write in standard form: $ax^2 + bx + c = 0$",
                "2. Apply the quadratic formula: $x = \\frac{-b \\pm \\sqrt{b^2 - 4ac}}{2a}$",
            ],
            true,
        ),
        EquationType::Polynomial => (
            &[
                "1. Write in standard form",
                "2. Factor the polynomial",
                "3. Set each factor equal to zero",
            ],
            true,
        ),
        EquationType::Trigonometric => (
            &[
                "1. Isolate the trigonometric function",
                "2. Apply inverse trigonometric function",
                "3. Consider periodicity",
            ],
            true,
        ),
        EquationType::Exponential => (
            &[
                "1. Isolate the exponential term",
                "2. Take the natural logarithm of both sides",
                "3. Solve for the variable",
            ],
            false,
        ),
        EquationType::Logarithmic => (&[], count > 1),
    };

    steps.extend(hints.iter().map(|h| h.to_string()));
    let label = if plural { "Solutions" } else { "Solution" };
    steps.push(format!("{label}: ${solution}$"));
    steps
}
