use mathproc::factor::factor_polynomial;
use mathproc::{Poly, Rational, expand, factor, parse_expr, simplify, sub};

fn rational_const(num: i64) -> Rational {
    Rational::from_integer(num.into())
}

fn poly(input: &str) -> Poly {
    let expr = parse_expr(input).expect("parse polynomial");
    Poly::from_expr(&expand(&expr), "x").expect("build polynomial")
}

fn sorted(mut factors: Vec<(Poly, usize)>) -> Vec<(Poly, usize)> {
    factors.sort_by(|(p1, m1), (p2, m2)| {
        p1.degree()
            .cmp(&p2.degree())
            .then_with(|| p1.to_expr("x").to_string().cmp(&p2.to_expr("x").to_string()))
            .then_with(|| m1.cmp(m2))
    });
    factors
}

fn assert_factorization(input: &str, constant: Rational, expected: &[(&str, usize)]) {
    let original = poly(input);
    let factorization = factor_polynomial(&original);
    assert_eq!(
        factorization.constant, constant,
        "leading constant for {input}"
    );

    let expected = sorted(expected.iter().map(|(txt, m)| (poly(txt), *m)).collect());
    let actual = sorted(
        factorization
            .factors
            .iter()
            .map(|f| (f.poly.clone(), f.multiplicity))
            .collect(),
    );
    assert_eq!(actual, expected, "factors for {input}");

    let rebuilt = poly(&factorization.to_expr("x").to_string());
    assert_eq!(rebuilt, original, "factorization should reconstruct {input}");
}

#[test]
fn trivial_factorizations() {
    let cases: Vec<(&str, Rational, Vec<(&str, usize)>)> = vec![
        ("x^2 - 1", rational_const(1), vec![("x - 1", 1), ("x + 1", 1)]),
        ("x^2 + 2*x + 1", rational_const(1), vec![("x + 1", 2)]),
        ("x^2 - 3*x", rational_const(1), vec![("x", 1), ("x - 3", 1)]),
        (
            "x^3 - x",
            rational_const(1),
            vec![("x", 1), ("x - 1", 1), ("x + 1", 1)],
        ),
        ("2*x^2", rational_const(2), vec![("x", 2)]),
        ("x", rational_const(1), vec![("x", 1)]),
        ("5", rational_const(5), vec![]),
        (
            "x^3 - 4*x^2 + 4*x",
            rational_const(1),
            vec![("x", 1), ("x - 2", 2)],
        ),
        ("-2*x^2 + 2", rational_const(-2), vec![("x - 1", 1), ("x + 1", 1)]),
    ];
    for (input, constant, expected) in cases {
        assert_factorization(input, constant, &expected);
    }
}

#[test]
fn rational_roots_give_integer_linear_factors() {
    assert_factorization("4*x^2 + 4*x + 1", rational_const(1), &[("2*x + 1", 2)]);
    assert_factorization("6*x^2 - x - 1", rational_const(1), &[("2*x - 1", 1), ("3*x + 1", 1)]);
}

#[test]
fn irreducible_cofactor_is_kept() {
    assert_factorization(
        "x^3 - x^2 + x - 1",
        rational_const(1),
        &[("x - 1", 1), ("x^2 + 1", 1)],
    );
    assert_factorization("x^2 - 2", rational_const(1), &[("x^2 - 2", 1)]);
}

#[test]
fn factor_expression_renders_product() {
    let expr = parse_expr("x^3 - x^2 + x - 1").unwrap();
    assert_eq!(factor(&expr).to_string(), "(x-1)*(x^2+1)");
}

#[test]
fn factor_multivariate_is_equivalent() {
    for input in ["2*x*y + 4*x", "a^2*b - a*b^2", "3*x + 6"] {
        let expr = parse_expr(input).unwrap();
        let factored = factor(&expr);
        let difference = simplify(&expand(&sub(factored, expr.clone())));
        assert!(difference.is_zero(), "{input} factored to a different expression");
    }
}
