use tracing::trace;

use crate::engine::{Bound, EngineOptions, Interval, Scope, Solution, Value};
use crate::error::{MathError, Result};
use crate::eval::{evaluate, evaluate_at};
use crate::expr::{self, Expr, Relation};
use crate::simplify::simplify;

use super::equation::{choose_variable, solve_equation};

/// A boundary of the sign chart: a root of `lhs - rhs`, or a pole where it is undefined.
struct Critical {
    at: f64,
    value: Expr,
    pole: bool,
}

pub(super) fn solve_inequality(
    lhs: &Expr,
    relation: Relation,
    rhs: &Expr,
    options: &EngineOptions,
) -> Result<Solution<Expr>> {
    let difference = simplify(&expr::sub(lhs.clone(), rhs.clone()));
    let mut free = lhs.free_variables();
    free.extend(rhs.free_variables());
    if free.len() > 1 {
        return Err(MathError::Unsupported(
            "inequalities in several unknowns are not supported".to_string(),
        ));
    }
    let variable = choose_variable(&free).unwrap_or_else(|| "x".to_string());
    let everywhere = Interval {
        lower: None,
        upper: None,
    };

    if free.is_empty() {
        let holds = match evaluate(&difference, &Scope::new())? {
            Value::Number(v) => relation.holds(v, 0.0),
            _ => false,
        };
        return Ok(Solution::Intervals {
            variable,
            intervals: if holds { vec![everywhere] } else { Vec::new() },
        });
    }

    let boundary = solve_equation(&difference, &expr::zero(), options)?;
    let roots = match boundary {
        Solution::All { .. } => {
            let intervals = if relation.holds(0.0, 0.0) {
                vec![everywhere]
            } else {
                Vec::new()
            };
            return Ok(Solution::Intervals {
                variable,
                intervals,
            });
        }
        other => boundary_values(other),
    };

    let mut points = Vec::new();
    for value in roots {
        if let Some(at) = numeric(&value) {
            points.push(Critical {
                at,
                value,
                pole: false,
            });
        }
    }
    for denominator in denominators(&difference, &variable) {
        if let Ok(poles) = solve_equation(&denominator, &expr::zero(), options) {
            for value in boundary_values(poles) {
                if let Some(at) = numeric(&value) {
                    points.push(Critical {
                        at,
                        value,
                        pole: true,
                    });
                }
            }
        }
    }
    points.sort_by(|a, b| a.at.total_cmp(&b.at).then(b.pole.cmp(&a.pole)));
    points.dedup_by(|later, earlier| (later.at - earlier.at).abs() < 1e-9);
    trace!(%variable, critical = points.len(), "built sign chart");

    let satisfied = |x: f64| {
        evaluate_at(&difference, &variable, x)
            .map(|v| v.is_finite() && relation.holds(v, 0.0))
            .unwrap_or(false)
    };

    // Alternating open pieces and critical points: piece 0, point 0, piece 1, ...
    let mut chart = Vec::with_capacity(2 * points.len() + 1);
    for (i, point) in points.iter().enumerate() {
        let inside = match i {
            0 => point.at - 1.0,
            _ => 0.5 * (points[i - 1].at + point.at),
        };
        chart.push(satisfied(inside));
        chart.push(!point.pole && relation.holds(0.0, 0.0));
    }
    chart.push(satisfied(points.last().map_or(0.0, |p| p.at + 1.0)));

    let bound = |segment: usize, lower: bool| -> Option<Bound<Expr>> {
        if segment % 2 == 1 {
            return Some(Bound {
                value: points[segment / 2].value.clone(),
                inclusive: true,
            });
        }
        let neighbour = if lower {
            (segment / 2).checked_sub(1)?
        } else {
            segment / 2
        };
        points.get(neighbour).map(|p| Bound {
            value: p.value.clone(),
            inclusive: false,
        })
    };

    let mut intervals = Vec::new();
    let mut start = None;
    for (segment, holds) in chart.iter().copied().chain(std::iter::once(false)).enumerate() {
        match (holds, start) {
            (true, None) => start = Some(segment),
            (false, Some(first)) => {
                intervals.push(Interval {
                    lower: bound(first, true),
                    upper: bound(segment - 1, false),
                });
                start = None;
            }
            _ => {}
        }
    }

    Ok(Solution::Intervals {
        variable,
        intervals,
    })
}

fn boundary_values(solution: Solution<Expr>) -> Vec<Expr> {
    match solution {
        Solution::Roots { values, .. } => values,
        other => other.bindings().into_iter().map(|(_, v)| v.clone()).collect(),
    }
}

fn numeric(value: &Expr) -> Option<f64> {
    evaluate(value, &Scope::new())
        .ok()
        .and_then(|v| v.as_number())
        .filter(|v| v.is_finite())
}

/// Denominators that depend on `variable`; their zeros are poles of the expression.
fn denominators(e: &Expr, variable: &str) -> Vec<Expr> {
    let mut found = Vec::new();
    e.visit(&mut |node: &Expr| {
        if let Expr::Div(_, denominator) = node {
            if denominator.contains_var(variable) {
                found.push((**denominator).clone());
            }
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    fn solve(text: &str) -> String {
        match parse_expr(text).unwrap() {
            Expr::Inequality(l, rel, r) => solve_inequality(&l, rel, &r, &EngineOptions::default())
                .unwrap()
                .to_string(),
            other => panic!("not an inequality: {other}"),
        }
    }

    #[test]
    fn quadratic_between_roots() {
        assert_eq!(solve("x^2 - 4 < 0"), "-2 < x < 2");
    }

    #[test]
    fn quadratic_outside_roots_inclusive() {
        assert_eq!(solve("x^2 >= 1"), "x <= -1 or x >= 1");
    }

    #[test]
    fn poles_are_never_included() {
        assert_eq!(solve("1/x > 0"), "x > 0");
    }
}
