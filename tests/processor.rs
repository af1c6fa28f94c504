use mathproc::prelude;
use mathproc::{
    EquationCategory, EquationType, Expr, MathProcessor, Operation, Poly, PreviewOutcome, Scope,
    Solution, Value, expand, parse_expr,
};

fn poly(input: &str) -> Poly {
    Poly::from_expr(&expand(&parse_expr(input).unwrap()), "x").unwrap()
}

#[test]
fn evaluates_with_scope() {
    let processor = MathProcessor::new();
    let mut scope = Scope::new();
    scope.insert("x".to_string(), Value::Number(3.0));
    let value = processor.evaluate_expression("x^2 + 1", &scope).unwrap();
    assert_eq!(value, Value::Number(10.0));

    let value = processor.evaluate_expression("2,5 · 4", &Scope::new()).unwrap();
    assert_eq!(value, Value::Number(10.0));

    let value = processor.evaluate_expression("3 < 4", &Scope::new()).unwrap();
    assert_eq!(value, Value::Bool(true));
}

#[test]
fn errors_are_prefixed_by_operation() {
    let processor = MathProcessor::new();

    let err = processor.evaluate_expression("2 +", &Scope::new()).unwrap_err();
    assert_eq!(err.operation(), Some(Operation::Evaluate));
    assert!(
        err.to_string()
            .starts_with("Failed to evaluate expression: Failed to parse expression:"),
        "{err}"
    );

    let err = processor
        .solve_equation("2*x + = 3", EquationCategory::Algebraic)
        .unwrap_err();
    assert!(
        err.to_string()
            .starts_with("Error solving equation: Failed to parse expression:"),
        "{err}"
    );

    let err = processor.simplify_expression("(x").unwrap_err();
    assert_eq!(err.operation(), Some(Operation::Simplify));
}

#[test]
fn algebraic_solve_with_steps() {
    let processor = MathProcessor::new();
    let report = processor
        .solve_equation("2x + 3 = 7", EquationCategory::Algebraic)
        .unwrap();
    assert_eq!(report.solution.to_string(), "x = 2");
    assert!(report.validation);
    assert_eq!(report.category, EquationCategory::Algebraic);
    assert_eq!(report.steps.len(), 4);
    assert_eq!(report.steps[0], "1. Original equation: 2x + 3 = 7");
    assert_eq!(report.steps[3], "4. Solution: x = 2");
}

#[test]
fn quadratic_roots_validate() {
    let processor = MathProcessor::new();
    let report = processor
        .solve_equation("x^2 - 5x + 6 = 0", EquationCategory::Algebraic)
        .unwrap();
    assert_eq!(report.solution.to_string(), "x = 2, x = 3");
    assert!(report.validation);

    let report = processor
        .solve_equation("x^2 + 1 = 0", EquationCategory::Algebraic)
        .unwrap();
    assert!(report.solution.is_empty());
    assert!(report.validation);
}

#[test]
fn trigonometric_solve_uses_identity_steps() {
    let processor = MathProcessor::new();
    let report = processor
        .solve_equation("sin(x) = 0", EquationCategory::Trigonometric)
        .unwrap();
    assert!(!report.solution.is_empty());
    assert!(report.validation);
    assert!(report.steps[0].starts_with("1. Original trigonometric equation:"));
    assert!(report.steps[1].starts_with("2. Standard form:"));
    assert!(report.steps[2].starts_with("3. After applying identities:"));
}

#[test]
fn inequality_solve() {
    let processor = MathProcessor::new();
    let report = processor
        .solve_equation("x^2 - 4 < 0", EquationCategory::Inequality)
        .unwrap();
    assert_eq!(report.solution.to_string(), "-2 < x < 2");
    assert!(report.validation);
    assert!(report.steps[1].starts_with("2. Boundary equation:"));
    assert_eq!(report.steps[2], "3. Critical points: -2, 2");
}

#[test]
fn system_solve() {
    let processor = MathProcessor::new();
    let report = processor
        .solve_equation("x + y = 3; x - y = 1", EquationCategory::System)
        .unwrap();
    assert_eq!(report.solution.to_string(), "x = 2, y = 1");
    assert!(report.validation);
    assert_eq!(report.steps[0], "1. System of equations: x + y = 3; x - y = 1");
}

#[test]
fn matrix_equation_reports_determinant() {
    let processor = MathProcessor::new();
    let report = processor
        .solve_equation("[2, 0; 0, 2]*X = [2; 4]", EquationCategory::Matrix)
        .unwrap();
    let bindings = report.solution.bindings();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].0, "X");
    assert!(report.steps.contains(&"2. Determinant: 4".to_string()), "{:?}", report.steps);
}

#[test]
fn vector_expression_is_evaluated() {
    let processor = MathProcessor::new();
    let report = processor
        .solve_equation("[1, 2] + [3, 4]", EquationCategory::Vector)
        .unwrap();
    match &report.solution {
        Solution::Assignments(pairs) => assert_eq!(pairs[0].0, "result"),
        other => panic!("unexpected solution {other}"),
    }
    assert!(report.validation);

    let report = processor
        .solve_equation("cross([1, 0, 0], [0, 1, 0])", EquationCategory::Vector)
        .unwrap();
    assert!(report.validation);
    assert_eq!(report.steps.len(), 2);

    let report = processor
        .solve_equation("[1, 2; 3, 4]", EquationCategory::Matrix)
        .unwrap();
    assert!(report.validation);
    assert!(report.steps[1].starts_with("2. Determinant:"), "{:?}", report.steps);
}

#[test]
fn calculus_categories_are_unsupported() {
    let processor = MathProcessor::new();
    for category in [EquationCategory::Differential, EquationCategory::Integral] {
        let err = processor.solve_equation("y = x", category).unwrap_err();
        assert_eq!(err.operation(), Some(Operation::Solve));
    }
}

#[test]
fn explains_by_detected_type() {
    let processor = MathProcessor::new();

    let explanation = processor.explain_equation("x^2 - 5x + 6 = 0").unwrap();
    assert_eq!(explanation.equation_type, EquationType::Quadratic);
    assert_eq!(explanation.steps[0], "Original equation: $x^2 - 5x + 6 = 0$");
    assert_eq!(explanation.steps[1], "Type: Quadratic Equation");
    assert_eq!(explanation.steps.last().unwrap(), "Solutions: $x = 2, 3$");

    let explanation = processor.explain_equation("2x + 3 = 7").unwrap();
    assert_eq!(explanation.equation_type, EquationType::Linear);
    assert_eq!(explanation.steps.last().unwrap(), "Solution: $x = 2$");

    let explanation = processor.explain_equation("e^x = 2").unwrap();
    assert_eq!(explanation.equation_type, EquationType::Exponential);
    assert!(explanation.steps.last().unwrap().starts_with("Solution: $x = 0.6931"));
}

#[test]
fn validate_solution_rejects_wrong_roots() {
    let processor = MathProcessor::new();
    let wrong = Solution::Roots {
        variable: "x".to_string(),
        values: vec![Expr::integer(3)],
    };
    assert!(!processor.validate_solution("x^2 = 4", &wrong));

    let right = Solution::Roots {
        variable: "x".to_string(),
        values: vec![Expr::integer(-2), Expr::integer(2)],
    };
    assert!(processor.validate_solution("x^2 = 4", &right));

    let everything = Solution::All {
        variable: "x".to_string(),
    };
    assert!(processor.validate_solution("x + x = 2x", &everything));
}

#[test]
fn simplify_factor_expand() {
    let processor = MathProcessor::new();
    assert_eq!(processor.simplify_expression("(x^2-1)/(x-1)").unwrap(), "x+1");
    assert_eq!(processor.factor_expression("x^2 - 1").unwrap(), "(x+1)*(x-1)");
    let expanded = processor.expand_expression("(x+1)^2").unwrap();
    assert_eq!(poly(&expanded), poly("x^2 + 2*x + 1"));
}

#[test]
fn preview_reports_domain() {
    let processor = MathProcessor::new();
    match processor.generate_preview("sqrt(x) = 2", EquationCategory::Algebraic) {
        PreviewOutcome::Ready(preview) => {
            assert!(!preview.latex.is_empty());
            assert!(preview
                .domain
                .restrictions
                .contains(&"Radicand must be non-negative".to_string()));
            assert!(preview.validation.is_valid);
        }
        other => panic!("unexpected preview {other:?}"),
    }

    let failed = processor.generate_preview("2*x + = 3", EquationCategory::Algebraic);
    assert!(!failed.is_valid());
    match failed {
        PreviewOutcome::Failed { error } => {
            assert!(error.starts_with("Failed to parse expression"), "{error}")
        }
        other => panic!("unexpected preview {other:?}"),
    }
}

#[test]
fn latex_rendering() {
    let processor = MathProcessor::new();
    let latex = processor.generate_latex("sqrt(x)").unwrap();
    assert!(latex.contains("\\sqrt"), "{latex}");
}

#[test]
fn prelude_helpers() {
    assert_eq!(prelude::prep("2x"), "2·x");
    assert_eq!(prelude::eval("1,5 + 1").unwrap(), "2.5");
    assert_eq!(prelude::solve("x^2 - 4 = 0").unwrap(), "x = -2, x = 2");
    assert_eq!(prelude::solve_sys("x + y = 3; x - y = 1").unwrap(), "x = 2, y = 1");
}
