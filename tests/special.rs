use std::f64::consts::PI;

use mathproc::{MathError, MathProcessor, Scope};

fn close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn special_groups() {
    let processor = MathProcessor::new();
    close(processor.special_function("special", "gamma", &[5.0]).unwrap(), 24.0);
    close(processor.special_function("special", "factorial", &[5.0]).unwrap(), 120.0);
    close(processor.special_function("special", "binomial", &[5.0, 2.0]).unwrap(), 10.0);
    close(processor.special_function("special", "erf", &[0.0]).unwrap(), 0.0);
    close(processor.special_function("hyperbolic", "cosh", &[0.0]).unwrap(), 1.0);
    close(processor.special_function("inverseTrig", "asin", &[1.0]).unwrap(), PI / 2.0);
    close(processor.special_function("inverse_trig", "acot", &[1.0]).unwrap(), PI / 4.0);
    close(processor.special_function("bessel", "J", &[0.0, 0.0]).unwrap(), 1.0);
}

#[test]
fn bessel_reference_values() {
    let processor = MathProcessor::new();
    let bessel = |kind: &str, n: f64, x: f64| processor.special_function("bessel", kind, &[n, x]).unwrap();
    close(bessel("J", 0.0, 10.0), -0.245_935_764_5);
    close(bessel("J", 1.0, 2.5), 0.497_094_102_5);
    close(bessel("Y", 0.0, 1.0), 0.088_256_964_2);
    close(bessel("K", 0.0, 1.0), 0.421_024_438_2);
    close(bessel("I", 1.0, 1.0), 0.565_159_104_0);
    close(bessel("J", 0.0, 1000.0), 0.024_786_686_2);
}

#[test]
fn bessel_at_huge_arguments() {
    let processor = MathProcessor::new();
    let j = processor.special_function("bessel", "J", &[0.0, 1e20]).unwrap();
    assert!(j.abs() < 1e-9, "{j}");
    let y = processor.special_function("bessel", "Y", &[2.0, 1e9]).unwrap();
    assert!(y.abs() < 1e-4, "{y}");
    let k = processor.special_function("bessel", "K", &[0.0, 1e4]).unwrap();
    assert_eq!(k, 0.0);

    let err = processor.special_function("bessel", "I", &[0.0, 1e4]).unwrap_err();
    assert!(matches!(err, MathError::Evaluate(_)), "{err}");
}

#[test]
fn bessel_rejects_non_finite_arguments() {
    let processor = MathProcessor::new();
    for kind in ["J", "Y", "I", "K"] {
        for x in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = processor.special_function("bessel", kind, &[0.0, x]).unwrap_err();
            assert!(matches!(err, MathError::Evaluate(_)), "{kind}({x}): {err}");
        }
    }
}

#[test]
fn unknown_special_function() {
    let processor = MathProcessor::new();
    let err = processor.special_function("bessel", "Z", &[0.0, 1.0]).unwrap_err();
    assert!(matches!(err, MathError::Unsupported(_)));
}

#[test]
fn wrong_arity_is_an_evaluation_error() {
    let processor = MathProcessor::new();
    let err = processor.special_function("special", "beta", &[1.0]).unwrap_err();
    assert!(matches!(err, MathError::Evaluate(_)));
}

#[test]
fn special_functions_in_expressions() {
    let processor = MathProcessor::new();
    let value = processor
        .evaluate_expression("gamma(4) + factorial(3)", &Scope::new())
        .unwrap();
    close(value.as_number().unwrap(), 12.0);
}
