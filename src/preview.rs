//! Live preview of an equation while it is being typed.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::EquationCategory;
use crate::validate::Validation;

lazy_static! {
    static ref TANGENT: Regex = Regex::new(r"\btan\(").expect("valid regex");
    static ref ARC_SINE_COSINE: Regex = Regex::new(r"\ba(?:sin|cos)\(").expect("valid regex");
    static ref LOGARITHM: Regex = Regex::new(r"\b(?:log|ln|log10)\(").expect("valid regex");
}

/// Where an expression is defined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub real: bool,
    pub complex: bool,
    pub restrictions: Vec<String>,
}

impl Default for Domain {
    fn default() -> Self {
        Domain {
            real: true,
            complex: false,
            restrictions: Vec::new(),
        }
    }
}

/// Domain restrictions read off the rendered expression.
pub fn get_domain(rendered: &str) -> Domain {
    let mut domain = Domain::default();
    let mut restrict = |condition: bool, text: &str| {
        if condition {
            domain.restrictions.push(text.to_string());
        }
    };
    restrict(rendered.contains('/'), "Denominator cannot be zero");
    restrict(rendered.contains("sqrt"), "Radicand must be non-negative");
    restrict(LOGARITHM.is_match(rendered), "Argument must be positive");
    restrict(
        TANGENT.is_match(rendered),
        "Tangent is undefined at odd multiples of π/2",
    );
    restrict(
        ARC_SINE_COSINE.is_match(rendered),
        "Argument of asin/acos must lie in [-1, 1]",
    );
    domain
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub latex: String,
    pub simplified: String,
    pub domain: Domain,
    pub category: EquationCategory,
    pub validation: Validation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PreviewOutcome {
    Ready(Preview),
    Failed { error: String },
}

impl PreviewOutcome {
    pub fn is_valid(&self) -> bool {
        match self {
            PreviewOutcome::Ready(preview) => preview.validation.is_valid,
            PreviewOutcome::Failed { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_restriction() {
        let domain = get_domain("sqrt(x) / ln(x) + tan(x)");
        assert_eq!(domain.restrictions.len(), 4);
        assert!(domain.real && !domain.complex);
    }
}
