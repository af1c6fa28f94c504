use std::fs;

use mathproc::config::{self, ProcessorConfig};
use mathproc::{Function, MathError, MathProcessor};
use tempfile::tempdir;

#[test]
fn loads_custom_standards_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mathproc.toml");
    fs::write(
        &path,
        r#"
[standards]
decimal = "."
thousands = ","

[standards.notation]
multiplication = "×"

[engine]
scan_min = -5.0
scan_max = 5.0
"#,
    )
    .unwrap();

    let config = ProcessorConfig::load(&path).unwrap();
    assert_eq!(config.standards.decimal, ".");
    assert_eq!(config.standards.units.length, "m");
    assert_eq!(config.engine.scan_max, 5.0);
    assert_eq!(config.engine.scan_samples, 4000);

    let processor = MathProcessor::from_config(config).unwrap();
    assert_eq!(processor.preprocess_expression("1,234.5"), "1234.5");
    assert_eq!(processor.format_with_proper_notation("2*x"), "2×x");
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = ProcessorConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, MathError::Io(_)));
}

#[test]
fn rejects_invalid_documents() {
    let err = ProcessorConfig::from_toml_str("[standards\n").unwrap_err();
    assert!(matches!(err, MathError::Config(_)));

    let err = ProcessorConfig::from_toml_str("[engine]\nscan_min = 3.0\nscan_max = 1.0\n").unwrap_err();
    assert!(err.to_string().contains("scan range"), "{err}");

    let err = ProcessorConfig::from_toml_str("[standards]\ndecimal = \"ab\"\n").unwrap_err();
    assert!(matches!(err, MathError::Config(_)));
}

#[test]
fn serialized_config_reloads() {
    let text = ProcessorConfig::default().to_toml_string().unwrap();
    assert!(text.contains("[standards]"));
    assert_eq!(
        ProcessorConfig::from_toml_str(&text).unwrap(),
        ProcessorConfig::default()
    );
}

#[test]
fn static_tables() {
    assert_eq!(
        config::supported_operations("logarithmic"),
        Some(&["log", "ln"][..])
    );
    assert_eq!(config::notation_glyph("set", "union"), Some("∪"));
    assert_eq!(config::special_function("bessel", "K"), Some(Function::BesselK));
    assert_eq!(config::special_function("inverseTrig", "atan"), Some(Function::Atan));
    assert_eq!(config::special_function("bessel", "Q"), None);
}
