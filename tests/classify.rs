use mathproc::{EquationCategory, EquationType, MathProcessor};

#[test]
fn detects_equation_types() {
    let processor = MathProcessor::new();
    let cases = [
        ("sin(x) = 0", EquationType::Trigonometric),
        ("x^2 + 1 = 0", EquationType::Quadratic),
        ("x^3 - x = 0", EquationType::Polynomial),
        ("2*x + 1 = 5", EquationType::Linear),
        ("x^1 + 2 = 0", EquationType::Linear),
        ("log(x) = 2", EquationType::Logarithmic),
        ("e^x = 2", EquationType::Exponential),
        ("cos(x)^2 = 1", EquationType::Trigonometric),
    ];
    for (equation, expected) in cases {
        assert_eq!(processor.detect_equation_type(equation), expected, "{equation}");
    }
}

#[test]
fn polynomial_degree_reads_literal_exponents() {
    let processor = MathProcessor::new();
    assert_eq!(processor.polynomial_degree("x^4 + x^2 = 1"), Some(4));
    assert_eq!(processor.polynomial_degree("2*x + 1 = 0"), Some(0));
    assert_eq!(processor.polynomial_degree("x^n = 1"), None);
}

#[test]
fn type_display_names() {
    let processor = MathProcessor::new();
    assert_eq!(
        processor.format_equation_type(EquationType::Quadratic),
        "Quadratic Equation"
    );
    assert_eq!(EquationType::Logarithmic.to_string(), "logarithmic");
}

#[test]
fn categories_parse_from_names() {
    for category in EquationCategory::ALL {
        assert_eq!(category.as_str().parse::<EquationCategory>().unwrap(), category);
    }
    let err = "calculus".parse::<EquationCategory>().unwrap_err();
    assert_eq!(err.to_string(), "Unsupported equation type: calculus");
}
