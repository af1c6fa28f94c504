use mathproc::{EquationCategory, MathProcessor};

#[test]
fn balanced_parentheses() {
    let processor = MathProcessor::new();
    assert!(processor.check_balanced_parentheses("(1+(2·3))"));
    assert!(!processor.check_balanced_parentheses("(1+2))"));
    assert!(!processor.check_balanced_parentheses(")("));
    assert!(processor.check_balanced_parentheses(""));
}

#[test]
fn operators_and_variables() {
    let processor = MathProcessor::new();
    assert!(processor.is_valid_operator("^"));
    assert!(processor.is_valid_operator("sqrt"));
    assert!(!processor.is_valid_operator("%"));
    assert!(processor.is_valid_variable("x1"));
    assert!(!processor.is_valid_variable("1x"));
    assert!(!processor.is_valid_variable("x_1"));
    assert_eq!(
        processor.extract_variables("2*x + sin(y1)"),
        vec!["x", "sin", "y1"]
    );
}

#[test]
fn algebraic_equation_is_valid() {
    let processor = MathProcessor::new();
    let validation = processor.validate_equation("2x + 3 = 7", EquationCategory::Algebraic);
    assert!(validation.is_valid, "{:?}", validation.errors);
    assert!(validation.errors.is_empty());
}

#[test]
fn unbalanced_equation_collects_errors() {
    let processor = MathProcessor::new();
    let validation = processor.validate_equation("(x + 1 = 2", EquationCategory::Algebraic);
    assert!(!validation.is_valid);
    assert!(validation.errors.contains(&"Invalid syntax".to_string()));
    assert!(validation.errors.contains(&"Unbalanced parentheses".to_string()));
}

#[test]
fn category_specific_checks() {
    let processor = MathProcessor::new();

    let validation = processor.validate_equation("x = 2", EquationCategory::Inequality);
    assert_eq!(validation.errors, vec!["No inequality symbol found"]);

    let validation = processor.validate_equation("x + y = 2", EquationCategory::System);
    assert!(!validation.is_valid);

    let validation = processor.validate_equation("x + y = 2; x - y = 0", EquationCategory::System);
    assert!(validation.is_valid, "{:?}", validation.errors);

    let validation = processor.validate_equation("x^2 = 4", EquationCategory::Trigonometric);
    assert!(validation.is_valid);
    assert_eq!(validation.warnings, vec!["No trigonometric function found"]);

    let validation = processor.validate_equation("log(0) = x", EquationCategory::Logarithmic);
    assert!(validation.errors.contains(&"Logarithm of zero is undefined".to_string()));

    let validation = processor.validate_equation("[1, 2; 3, 4", EquationCategory::Matrix);
    assert!(validation.errors.contains(&"Unbalanced brackets".to_string()));
}

#[test]
fn syntax_check_covers_every_system_equation() {
    let processor = MathProcessor::new();
    assert!(processor.validate_syntax("x + y = 2; x - y = 0"));
    assert!(!processor.validate_syntax("x + y = 2; x - = 0"));
    assert!(!processor.validate_syntax(""));
}
