use mathproc::{MathError, MathProcessor};

fn close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn converts_each_kind() {
    let processor = MathProcessor::new();
    close(processor.convert_unit(100.0, "°C", "°F", "temperature").unwrap(), 212.0);
    close(processor.convert_unit(0.0, "K", "°C", "temperature").unwrap(), -273.15);
    close(processor.convert_unit(1.0, "km", "mi", "length").unwrap(), 0.621_371_192);
    close(processor.convert_unit(36.0, "km/h", "m/s", "speed").unwrap(), 10.0);
    close(processor.convert_unit(1.0, "lb", "g", "mass").unwrap(), 453.592_37);
}

#[test]
fn same_unit_is_identity() {
    let processor = MathProcessor::new();
    close(processor.convert_unit(42.5, "ft", "ft", "length").unwrap(), 42.5);
}

#[test]
fn unsupported_kind() {
    let processor = MathProcessor::new();
    let err = processor.convert_unit(1.0, "l", "ml", "volume").unwrap_err();
    assert!(matches!(err, MathError::UnsupportedUnitType(_)));
    assert_eq!(err.to_string(), "Unsupported unit type: volume");
}

#[test]
fn unknown_unit() {
    let processor = MathProcessor::new();
    let err = processor.convert_unit(1.0, "m", "parsec", "length").unwrap_err();
    assert_eq!(err.to_string(), "Unknown unit `parsec` for length");
}

#[test]
fn format_unit_uses_locale_numbers() {
    let processor = MathProcessor::new();
    assert_eq!(processor.format_unit(1234.5, "m", "length").unwrap(), "1.234,50 m");
    assert_eq!(processor.format_unit(-3.0, "°C", "temperature").unwrap(), "-3,00 °C");
    assert!(processor.format_unit(1.0, "parsec", "length").is_err());
}
