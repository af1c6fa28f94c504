//! Structural checks on equation text. Nothing here fails: problems are collected into a
//! [`Validation`] record.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::EquationCategory;

lazy_static! {
    static ref OPERATOR: Regex = Regex::new(r"[+\-*/^]|sqrt").expect("valid regex");
    static ref IDENTIFIER: Regex = Regex::new(r"[a-zA-Z][a-zA-Z0-9]*").expect("valid regex");
    static ref VARIABLE: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*$").expect("valid regex");
    static ref LOG_OF_ZERO: Regex = Regex::new(r"\b(?:log|ln|log10)\(\s*0+(?:\.0*)?\s*\)").expect("valid regex");
    static ref DERIVATIVE: Regex =
        Regex::new(r"d\w*/d[a-zA-Z]|\w'|\b(?:diff|derivative)\(").expect("valid regex");
    static ref INTEGRAL: Regex = Regex::new(r"∫|\b(?:integrate|integral|int)\(").expect("valid regex");
}

const VALID_OPERATORS: [&str; 6] = ["+", "-", "*", "/", "^", "sqrt"];
const TRIG_FUNCTIONS: [&str; 6] = ["sin", "cos", "tan", "sec", "csc", "cot"];
const RELATIONS: [&str; 8] = ["<=", ">=", "!=", "<", ">", "≤", "≥", "≠"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for Validation {
    fn default() -> Self {
        Validation {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl Validation {
    pub fn error(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

fn balanced(text: &str, open: char, close: char) -> bool {
    let mut depth: i64 = 0;
    for c in text.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

pub fn check_balanced_parentheses(text: &str) -> bool {
    balanced(text, '(', ')')
}

pub fn check_balanced_brackets(text: &str) -> bool {
    balanced(text, '[', ']')
}

pub fn is_valid_operator(operator: &str) -> bool {
    VALID_OPERATORS.contains(&operator)
}

pub fn is_valid_variable(variable: &str) -> bool {
    VARIABLE.is_match(variable)
}

/// Every identifier run, in order of appearance. Function names are included.
pub fn extract_variables(text: &str) -> Vec<String> {
    IDENTIFIER
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Checks specific to `category`, added to `validation`.
pub fn check_category(equation: &str, category: EquationCategory, validation: &mut Validation) {
    match category {
        EquationCategory::Algebraic => {
            if !check_balanced_parentheses(equation) {
                validation.error("Unbalanced parentheses");
            }
            for op in OPERATOR.find_iter(equation).map(|m| m.as_str()) {
                if !is_valid_operator(op) {
                    validation.error(format!("Invalid operator: {op}"));
                }
            }
            for variable in extract_variables(equation) {
                if !is_valid_variable(&variable) {
                    validation.error(format!("Invalid variable: {variable}"));
                }
            }
        }
        EquationCategory::Trigonometric => {
            if !check_balanced_parentheses(equation) {
                validation.error("Unbalanced parentheses");
            }
            if !TRIG_FUNCTIONS.iter().any(|f| equation.contains(f)) {
                validation.warn("No trigonometric function found");
            }
        }
        EquationCategory::Exponential => {
            if !equation.contains('^') && !equation.contains("exp") {
                validation.warn("No exponential term found");
            }
        }
        EquationCategory::Logarithmic => {
            if !equation.contains("log") && !equation.contains("ln") {
                validation.warn("No logarithm found");
            }
            if LOG_OF_ZERO.is_match(equation) {
                validation.error("Logarithm of zero is undefined");
            }
        }
        EquationCategory::Differential => {
            if !DERIVATIVE.is_match(equation) {
                validation.error("No derivative notation found");
            }
            validation.warn("Differential equations cannot be solved by the engine");
        }
        EquationCategory::Integral => {
            if !INTEGRAL.is_match(equation) {
                validation.warn("No integral notation found");
            }
        }
        EquationCategory::Matrix | EquationCategory::Vector => {
            if !check_balanced_brackets(equation) {
                validation.error("Unbalanced brackets");
            }
        }
        EquationCategory::Inequality => {
            if !RELATIONS.iter().any(|r| equation.contains(r)) {
                validation.error("No inequality symbol found");
            }
        }
        EquationCategory::System => {
            let equations: Vec<&str> = split_system(equation);
            if equations.len() < 2 {
                validation.error("A system needs at least two equations separated by `;`");
            }
            for (i, eq) in equations.iter().enumerate() {
                if !eq.contains('=') {
                    validation.error(format!("Equation {} has no `=`", i + 1));
                }
            }
        }
    }
}

/// The `;`-separated equations of a system, outside of brackets and parentheses.
pub fn split_system(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i64;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ';' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_split_ignores_matrix_rows() {
        assert_eq!(split_system("[1,2;3,4]*v = [5;6]; x = 1"), vec!["[1,2;3,4]*v = [5;6]", "x = 1"]);
    }

    #[test]
    fn log_of_zero_is_an_error() {
        let mut validation = Validation::default();
        check_category("ln(0) = x", EquationCategory::Logarithmic, &mut validation);
        assert!(!validation.is_valid);
    }
}
