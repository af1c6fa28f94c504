use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, digit1, multispace0, satisfy};
use nom::combinator::{all_consuming, map, not, opt, peek, recognize};
use nom::error::VerboseError;
use nom::multi::{fold_many0, many0_count, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::IResult;
use num_bigint::BigInt;
use num_traits::Num;

use crate::error::{MathError, Result};
use crate::expr::{Expr, Function, Rational, Relation};

type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Deepest nesting the recursive descent accepts.
pub const MAX_DEPTH: usize = 100;

/// Parse a full statement: an expression, an equation or an inequality.
pub fn parse_expr(input: &str) -> Result<Expr> {
    if input.trim().is_empty() {
        return Err(MathError::Parse("empty expression".to_string()));
    }
    if nesting_depth(input) > MAX_DEPTH {
        return Err(MathError::Parse(format!(
            "expression nested deeper than {MAX_DEPTH} levels"
        )));
    }
    match all_consuming(ws(parse_statement))(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let message = match e.errors.first() {
                Some((rest, _)) => {
                    let column = input.len() - rest.len() + 1;
                    let near: String = rest.chars().take(12).collect();
                    if near.is_empty() {
                        format!("unexpected end of input at column {column}")
                    } else {
                        format!("unexpected input at column {column} near `{near}`")
                    }
                }
                None => "invalid expression".to_string(),
            };
            Err(MathError::Parse(message))
        }
        Err(nom::Err::Incomplete(_)) => Err(MathError::Parse("incomplete input".to_string())),
    }
}

/// Open brackets plus the `^`, `√` and prefix sign chains that each recurse one level.
fn nesting_depth(input: &str) -> usize {
    let mut chains = vec![0usize];
    let mut open = 0usize;
    let mut deepest = 0;
    let mut unary = true;
    for c in input.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '(' | '[' => {
                chains.push(0);
                open += 1;
                unary = true;
            }
            ')' | ']' if chains.len() > 1 => {
                let chain = chains.pop().unwrap_or_default();
                open -= chain + 1;
                unary = false;
            }
            '^' | '√' | '-' | '+' if unary || matches!(c, '^' | '√') => {
                if let Some(chain) = chains.last_mut() {
                    *chain += 1;
                    open += 1;
                }
                unary = true;
            }
            '+' | '-' | '*' | '/' | '·' | '×' | '÷' | ',' | ';' | '=' | '<' | '>' | '≤' | '≥'
            | '≠' => {
                if let Some(chain) = chains.last_mut() {
                    open -= *chain;
                    *chain = 0;
                }
                unary = true;
            }
            _ => unary = false,
        }
        deepest = deepest.max(open);
    }
    deepest
}

enum Rel {
    Eq,
    Ineq(Relation),
}

fn parse_statement(input: &str) -> PResult<'_, Expr> {
    let (rest, lhs) = parse_add_sub(input)?;
    let (rest, tail) = opt(pair(ws(parse_relation), parse_add_sub))(rest)?;
    let expr = match tail {
        None => lhs,
        Some((Rel::Eq, rhs)) => Expr::Equation(lhs.boxed(), rhs.boxed()),
        Some((Rel::Ineq(rel), rhs)) => Expr::Inequality(lhs.boxed(), rel, rhs.boxed()),
    };
    Ok((rest, expr))
}

fn parse_relation(input: &str) -> PResult<'_, Rel> {
    alt((
        map(alt((tag("<="), tag("≤"))), |_| Rel::Ineq(Relation::LessEqual)),
        map(alt((tag(">="), tag("≥"))), |_| Rel::Ineq(Relation::GreaterEqual)),
        map(alt((tag("!="), tag("≠"))), |_| Rel::Ineq(Relation::NotEqual)),
        map(char('<'), |_| Rel::Ineq(Relation::Less)),
        map(char('>'), |_| Rel::Ineq(Relation::Greater)),
        map(terminated(tag("="), not(char('='))), |_| Rel::Eq),
        map(tag("=="), |_| Rel::Eq),
    ))(input)
}

fn parse_add_sub(input: &str) -> PResult<'_, Expr> {
    let (rest, init) = parse_mul_div(input)?;
    fold_many0(
        pair(ws(alt((char('+'), char('-')))), parse_mul_div),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '+' => Expr::Add(acc.boxed(), rhs.boxed()),
            _ => Expr::Sub(acc.boxed(), rhs.boxed()),
        },
    )(rest)
}

fn parse_mul_div(input: &str) -> PResult<'_, Expr> {
    let (rest, init) = parse_unary(input)?;
    fold_many0(
        alt((
            pair(
                ws(alt((char('*'), char('·'), char('×'), char('/'), char('÷')))),
                parse_unary,
            ),
            // `2(x+1)`, `2x` and `(a)(b)` multiply implicitly
            pair(
                map(
                    peek(ws(satisfy(|c| {
                        c == '(' || c == '[' || c == '√' || c.is_alphabetic()
                    }))),
                    |_| '*',
                ),
                parse_unary,
            ),
        )),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '/' | '÷' => Expr::Div(acc.boxed(), rhs.boxed()),
            _ => Expr::Mul(acc.boxed(), rhs.boxed()),
        },
    )(rest)
}

fn parse_unary(input: &str) -> PResult<'_, Expr> {
    if let Ok((rest, expr)) = preceded(ws(char('-')), parse_unary)(input) {
        return Ok((rest, Expr::Neg(expr.boxed())));
    }
    if let Ok((rest, expr)) = preceded(ws(char('+')), parse_unary)(input) {
        return Ok((rest, expr));
    }
    parse_pow(input)
}

fn parse_pow(input: &str) -> PResult<'_, Expr> {
    let (rest, base) = parse_postfix(input)?;
    if let Ok((next, exp)) = preceded(ws(char('^')), parse_unary)(rest) {
        Ok((next, Expr::Pow(base.boxed(), exp.boxed())))
    } else {
        Ok((rest, base))
    }
}

fn parse_postfix(input: &str) -> PResult<'_, Expr> {
    let (rest, base) = parse_primary(input)?;
    let (rest, bangs) = many0_count(ws(terminated(char('!'), not(char('=')))))(rest)?;
    let expr = (0..bangs).fold(base, |acc, _| Expr::Factorial(acc.boxed()));
    Ok((rest, expr))
}

fn parse_primary(input: &str) -> PResult<'_, Expr> {
    alt((
        parse_parens,
        parse_matrix,
        parse_root,
        parse_number,
        parse_call,
        parse_identifier,
    ))(input)
}

fn parse_parens(input: &str) -> PResult<'_, Expr> {
    delimited(ws(char('(')), parse_add_sub, ws(char(')')))(input)
}

fn parse_root(input: &str) -> PResult<'_, Expr> {
    map(preceded(ws(char('√')), parse_postfix), |arg| {
        Expr::Call(Function::Sqrt, vec![arg])
    })(input)
}

enum Cell {
    Scalar(Expr),
    Row(Vec<Vec<Expr>>),
}

/// `[1, 2]`, `[[1, 2], [3, 4]]` and `[1, 2; 3, 4]`.
fn parse_matrix(input: &str) -> PResult<'_, Expr> {
    let cell = alt((map(parse_matrix_rows, Cell::Row), map(parse_add_sub, Cell::Scalar)));
    let row = separated_list1(ws(char(',')), cell);
    let (rest, groups) = delimited(
        ws(char('[')),
        separated_list1(ws(char(';')), row),
        ws(char(']')),
    )(input)?;

    let mut rows = Vec::new();
    for group in groups {
        let mut scalars = Vec::new();
        for cell in group {
            match cell {
                Cell::Scalar(expr) => scalars.push(expr),
                Cell::Row(nested) => rows.extend(nested),
            }
        }
        if !scalars.is_empty() {
            rows.push(scalars);
        }
    }
    Ok((rest, Expr::Matrix(rows)))
}

fn parse_matrix_rows(input: &str) -> PResult<'_, Vec<Vec<Expr>>> {
    let (rest, expr) = parse_matrix(input)?;
    match expr {
        Expr::Matrix(rows) => Ok((rest, rows)),
        _ => unreachable!("parse_matrix always yields a matrix"),
    }
}

fn parse_call(input: &str) -> PResult<'_, Expr> {
    let (rest, name) = ws(identifier)(input)?;
    let Some(function) = Function::from_name(name) else {
        return Err(nom::Err::Error(VerboseError {
            errors: vec![(input, nom::error::VerboseErrorKind::Context("unknown function"))],
        }));
    };
    let (rest, args) = delimited(
        ws(char('(')),
        separated_list1(ws(alt((char(','), char(';')))), parse_add_sub),
        ws(char(')')),
    )(rest)?;
    if !function.arity().accepts(args.len()) {
        return Err(nom::Err::Failure(VerboseError {
            errors: vec![(input, nom::error::VerboseErrorKind::Context("wrong argument count"))],
        }));
    }
    Ok((rest, Expr::Call(function, args)))
}

fn parse_identifier(input: &str) -> PResult<'_, Expr> {
    map(ws(identifier), |name: &str| match name {
        "π" => Expr::Variable("pi".to_string()),
        "∞" => Expr::Variable("Infinity".to_string()),
        other => Expr::Variable(other.to_string()),
    })(input)
}

fn identifier(input: &str) -> PResult<'_, &str> {
    alt((
        recognize(pair(
            satisfy(|c| c.is_alphabetic()),
            take_while(|c: char| c.is_alphanumeric() || c == '_'),
        )),
        tag("∞"),
    ))(input)
}

fn parse_number(input: &str) -> PResult<'_, Expr> {
    map(
        ws(recognize(pair(digit1, opt(pair(char('.'), digit1))))),
        |s: &str| Expr::Constant(parse_decimal(s)),
    )(input)
}

fn parse_decimal(text: &str) -> Rational {
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    let digits = format!("{int_part}{frac_part}");
    let numer = BigInt::from_str_radix(&digits, 10).unwrap_or_default();
    let denom = BigInt::from(10).pow(frac_part.len() as u32);
    Rational::new(numer, denom)
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_are_exact() {
        assert_eq!(parse_decimal("12.34"), Rational::new(1234.into(), 100.into()));
        assert_eq!(parse_decimal("7"), Rational::from_integer(7.into()));
    }

    #[test]
    fn unknown_function_names_are_variables() {
        assert_eq!(parse_expr("foo").unwrap(), Expr::var("foo"));
    }

    #[test]
    fn nesting_is_capped() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse_expr(&nested(40)).unwrap(), Expr::integer(1));

        for input in [
            nested(5000),
            format!("{}1", "-".repeat(5000)),
            vec!["2"; 5000].join("^"),
            format!("{}1{}", "[".repeat(5000), "]".repeat(5000)),
        ] {
            let err = parse_expr(&input).unwrap_err();
            assert!(matches!(err, MathError::Parse(_)), "{err}");
        }
    }

    #[test]
    fn flat_expressions_are_not_nesting() {
        let long = vec!["x^2"; 500].join(" + ");
        assert!(nesting_depth(&long) <= 2);
        assert_eq!(nesting_depth("((1))"), 2);
        assert_eq!(nesting_depth("2^-(3)"), 3);
        assert!(parse_expr(&long).is_ok());
    }

    #[test]
    fn errors_point_at_the_offending_column() {
        let err = parse_expr("2 +* 2").unwrap_err().to_string();
        assert!(err.contains("column"), "{err}");
    }
}
