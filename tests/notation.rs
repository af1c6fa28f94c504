use mathproc::config::Standards;
use mathproc::{MathProcessor, Notation, NumberFormat, Rational, Scope, Value, parse_expr};

#[test]
fn decimal_comma_becomes_point() {
    let processor = MathProcessor::new();
    assert_eq!(processor.preprocess_expression("12,34"), "12.34");
    assert_eq!(processor.preprocess_expression("x = 0,5"), "x = 0.5");
}

#[test]
fn thousands_groups_are_removed() {
    let processor = MathProcessor::new();
    assert_eq!(processor.preprocess_expression("1.234"), "1234");
    assert_eq!(processor.preprocess_expression("1.234.567"), "1234567");
    assert_eq!(processor.preprocess_expression("1.234,5"), "1234.5");
    assert_eq!(processor.preprocess_expression("12.34"), "12.34");
    assert_eq!(processor.preprocess_expression("1.234 + 5.678"), "1234 + 5678");
}

#[test]
fn thousands_group_before_a_variable() {
    let processor = MathProcessor::new();
    assert_eq!(processor.preprocess_expression("1.234x"), "1234·x");
    assert_eq!(processor.preprocess_expression("1.000x + 2"), "1000·x + 2");
}

#[test]
fn leading_zero_is_never_a_group() {
    let processor = MathProcessor::new();
    assert_eq!(processor.preprocess_expression("0.125"), "0.125");
    let value = processor
        .evaluate_expression("2·0.125", &Scope::new())
        .unwrap();
    assert_eq!(value, Value::Number(0.25));
}

#[test]
fn implicit_products_and_glyphs() {
    let processor = MathProcessor::new();
    assert_eq!(processor.preprocess_expression("2x + 3"), "2·x + 3");
    assert_eq!(processor.preprocess_expression("sin(2x)"), "sin(2·x)");
    assert_eq!(processor.preprocess_expression("3 × 4 ÷ 2"), "3 · 4 / 2");
    assert_eq!(processor.preprocess_expression("x ≤ 5"), "x <= 5");
    assert_eq!(processor.preprocess_expression("√2"), "sqrt(2)");
}

#[test]
fn eu_number_round_trips_through_preprocessing() {
    let processor = MathProcessor::new();
    let shown = processor.format_number(1234.5, NumberFormat::default());
    assert_eq!(shown, "1.234,50");
    let back = processor.preprocess_expression(&shown);
    assert_eq!(back, "1234.50");
    assert_eq!(
        parse_expr(&back).unwrap().as_rational(),
        Some(Rational::new(2469.into(), 2.into()))
    );
}

#[test]
fn plain_number_format() {
    let processor = MathProcessor::new();
    let format = NumberFormat {
        precision: 3,
        use_eu_format: false,
    };
    assert_eq!(processor.format_number(3.14159, format), "3.142");
    assert_eq!(processor.format_number(-0.5, NumberFormat::default()), "-0,50");
    assert_eq!(processor.format_number(999.0, NumberFormat::default()), "999,00");
}

#[test]
fn display_notation() {
    let processor = MathProcessor::new();
    assert_eq!(
        processor.format_with_proper_notation("x <= 2*pi"),
        "x ≤ 2·π"
    );
    assert_eq!(processor.format_with_proper_notation("sqrt(x)/2"), "√(x)÷2");
    assert_eq!(processor.format_with_proper_notation("x != Infinity"), "x ≠ ∞");
}

#[test]
fn custom_separators() {
    let standards = Standards {
        decimal: ".".to_string(),
        thousands: ",".to_string(),
        ..Standards::default()
    };
    let notation = Notation::new(&standards).unwrap();
    assert_eq!(notation.preprocess("1,234.5"), "1234.5");
    assert_eq!(
        notation.format_number(1234567.0, NumberFormat::default()),
        "1,234,567.00"
    );
}
