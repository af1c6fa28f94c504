use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn mathproc() -> Command {
    Command::cargo_bin("mathproc").unwrap()
}

#[test]
fn preprocess_prints_engine_syntax() {
    mathproc()
        .args(["preprocess", "12,34"])
        .assert()
        .success()
        .stdout("12.34\n");
}

#[test]
fn solve_prints_steps_and_verification() {
    mathproc()
        .args(["solve", "x^2 - 4 = 0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Solution: x = -2, x = 2"))
        .stdout(predicate::str::contains("Verified: true"));
}

#[test]
fn solve_system_category() {
    mathproc()
        .args(["solve", "x + y = 3; x - y = 1", "--category", "system"])
        .assert()
        .success()
        .stdout(predicate::str::contains("x = 2, y = 1"));
}

#[test]
fn explain_uses_templates() {
    mathproc()
        .args(["solve", "--explain", "2x + 3 = 7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Type: Linear Equation"))
        .stdout(predicate::str::contains("Solution: $x = 2$"));
}

#[test]
fn classify_as_json() {
    mathproc()
        .args(["--json", "classify", "sin(x) = 0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ok\": true"))
        .stdout(predicate::str::contains("\"type\": \"trigonometric\""));
}

#[test]
fn invalid_equation_exits_with_failure() {
    mathproc()
        .args(["validate", "(1+2))"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("error: Unbalanced parentheses"));
}

#[test]
fn unsupported_category_reports_error() {
    mathproc()
        .args(["solve", "y = x", "--category", "differential"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error solving equation"));

    mathproc()
        .args(["solve", "x = 1", "--category", "calculus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported equation type: calculus"));
}

#[test]
fn format_and_convert() {
    mathproc()
        .args(["format", "-1234567.891"])
        .assert()
        .success()
        .stdout("-1.234.567,89\n");

    mathproc()
        .args(["convert", "100", "°C", "°F", "--kind", "temperature"])
        .assert()
        .success()
        .stdout("212,00 °F\n");
}

#[test]
fn special_function_call() {
    mathproc()
        .args(["special", "special", "factorial", "5"])
        .assert()
        .success()
        .stdout("120\n");
}

#[test]
fn config_file_changes_separators() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mathproc.toml");
    std::fs::write(&path, "[standards]\ndecimal = \".\"\nthousands = \",\"\n").unwrap();

    mathproc()
        .arg("--config")
        .arg(&path)
        .args(["preprocess", "1,234.5"])
        .assert()
        .success()
        .stdout("1234.5\n");
}

#[test]
fn broken_config_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mathproc.toml");
    std::fs::write(&path, "[engine]\nscan_samples = 1\n").unwrap();

    mathproc()
        .arg("--config")
        .arg(&path)
        .args(["preprocess", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}
