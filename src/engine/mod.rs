//! The contract between the notation layer and a computer-algebra engine.
//!
//! [`MathProcessor`](crate::processor::MathProcessor) only talks to engines through
//! [`MathEngine`]. The crate ships [`SymbolicEngine`], an exact rational engine; any other
//! engine can be plugged in by implementing the trait.

mod symbolic;

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::Function;
use crate::format::show_float;

pub use symbolic::SymbolicEngine;

/// Variable bindings for evaluation.
pub type Scope = BTreeMap<String, Value>;

/// Result of a numeric evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Matrix(Vec<Vec<f64>>),
    Bool(bool),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => f.write_str(&show_float(*v)),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Matrix(rows) => {
                let render = |row: &Vec<f64>| {
                    let cells: Vec<String> = row.iter().map(|v| show_float(*v)).collect();
                    format!("[{}]", cells.join(", "))
                };
                if rows.len() == 1 {
                    f.write_str(&render(&rows[0]))
                } else {
                    let rendered: Vec<String> = rows.iter().map(render).collect();
                    write!(f, "[{}]", rendered.join(", "))
                }
            }
        }
    }
}

/// One end of a solution interval. `None` on an [`Interval`] means unbounded.
#[derive(Clone, Debug, PartialEq)]
pub struct Bound<N> {
    pub value: N,
    pub inclusive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Interval<N> {
    pub lower: Option<Bound<N>>,
    pub upper: Option<Bound<N>>,
}

impl<N> Interval<N> {
    /// A single point, e.g. the boundary of `x <= 2` touching `x >= 2`.
    pub fn point(value: N) -> Self
    where
        N: Clone,
    {
        Interval {
            lower: Some(Bound {
                value: value.clone(),
                inclusive: true,
            }),
            upper: Some(Bound {
                value,
                inclusive: true,
            }),
        }
    }
}

/// What an engine returns from `solve`.
#[derive(Clone, Debug, PartialEq)]
pub enum Solution<N> {
    /// Real roots of a single equation. Empty means no real solution.
    Roots { variable: String, values: Vec<N> },
    /// The equation holds for every real value.
    All { variable: String },
    /// Values bound to named unknowns: systems, matrix equations, assignments.
    Assignments(Vec<(String, N)>),
    /// Solution set of an inequality.
    Intervals {
        variable: String,
        intervals: Vec<Interval<N>>,
    },
}

impl<N> Solution<N> {
    /// Candidate values to substitute back, paired with their variable.
    pub fn bindings(&self) -> Vec<(String, &N)> {
        match self {
            Solution::Roots { variable, values } => {
                values.iter().map(|v| (variable.clone(), v)).collect()
            }
            Solution::Assignments(pairs) => pairs.iter().map(|(name, v)| (name.clone(), v)).collect(),
            Solution::All { .. } | Solution::Intervals { .. } => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Solution::Roots { values, .. } => values.is_empty(),
            Solution::Assignments(pairs) => pairs.is_empty(),
            Solution::Intervals { intervals, .. } => intervals.is_empty(),
            Solution::All { .. } => false,
        }
    }

    pub fn map<M>(self, mut f: impl FnMut(N) -> M) -> Solution<M> {
        match self {
            Solution::Roots { variable, values } => Solution::Roots {
                variable,
                values: values.into_iter().map(&mut f).collect(),
            },
            Solution::All { variable } => Solution::All { variable },
            Solution::Assignments(pairs) => {
                Solution::Assignments(pairs.into_iter().map(|(n, v)| (n, f(v))).collect())
            }
            Solution::Intervals {
                variable,
                intervals,
            } => {
                let mut bound = |b: Option<Bound<N>>| {
                    b.map(|b| Bound {
                        value: f(b.value),
                        inclusive: b.inclusive,
                    })
                };
                Solution::Intervals {
                    variable,
                    intervals: intervals
                        .into_iter()
                        .map(|i| Interval {
                            lower: bound(i.lower),
                            upper: bound(i.upper),
                        })
                        .collect(),
                }
            }
        }
    }
}

impl<N: Display> Display for Solution<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solution::Roots { values, .. } if values.is_empty() => f.write_str("no real solution"),
            Solution::Roots { variable, values } => {
                let parts: Vec<String> = values.iter().map(|v| format!("{variable} = {v}")).collect();
                f.write_str(&parts.join(", "))
            }
            Solution::All { .. } => f.write_str("all real numbers"),
            Solution::Assignments(pairs) if pairs.is_empty() => f.write_str("no solution"),
            Solution::Assignments(pairs) => {
                let parts: Vec<String> = pairs.iter().map(|(n, v)| format!("{n} = {v}")).collect();
                f.write_str(&parts.join(", "))
            }
            Solution::Intervals { intervals, .. } if intervals.is_empty() => {
                f.write_str("no real solution")
            }
            Solution::Intervals {
                variable,
                intervals,
            } => {
                let parts: Vec<String> = intervals
                    .iter()
                    .map(|interval| show_interval(variable, interval))
                    .collect();
                f.write_str(&parts.join(" or "))
            }
        }
    }
}

fn show_interval<N: Display>(variable: &str, interval: &Interval<N>) -> String {
    match (&interval.lower, &interval.upper) {
        (None, None) => "all real numbers".to_string(),
        (Some(lo), Some(hi)) if lo.inclusive && hi.inclusive && lo.value.to_string() == hi.value.to_string() => {
            format!("{variable} = {}", lo.value)
        }
        (Some(lo), None) => format!("{variable} {} {}", if lo.inclusive { ">=" } else { ">" }, lo.value),
        (None, Some(hi)) => format!("{variable} {} {}", if hi.inclusive { "<=" } else { "<" }, hi.value),
        (Some(lo), Some(hi)) => format!(
            "{} {} {variable} {} {}",
            lo.value,
            if lo.inclusive { "<=" } else { "<" },
            if hi.inclusive { "<=" } else { "<" },
            hi.value
        ),
    }
}

/// Tuning knobs for the built-in engine's numeric fallbacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Lower end of the interval scanned for roots of non-polynomial equations.
    pub scan_min: f64,
    pub scan_max: f64,
    /// Number of sample points across the scan interval.
    pub scan_samples: usize,
    /// Magnitude below which a residual counts as zero.
    pub zero_tolerance: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            scan_min: -10.0,
            scan_max: 10.0,
            scan_samples: 4000,
            zero_tolerance: 1e-8,
        }
    }
}

/// A computer-algebra engine.
pub trait MathEngine {
    type Node: Clone + Display + Debug;

    fn parse(&self, text: &str) -> Result<Self::Node>;
    fn evaluate(&self, node: &Self::Node, scope: &Scope) -> Result<Value>;
    fn solve(&self, node: &Self::Node) -> Result<Solution<Self::Node>>;
    fn solve_system(&self, nodes: &[Self::Node]) -> Result<Solution<Self::Node>>;
    fn simplify(&self, node: &Self::Node) -> Result<Self::Node>;
    fn factor(&self, node: &Self::Node) -> Result<Self::Node>;
    fn expand(&self, node: &Self::Node) -> Result<Self::Node>;
    /// Substitute `value` for `variable`.
    fn substitute(&self, node: &Self::Node, variable: &str, value: &Self::Node) -> Result<Self::Node>;
    fn is_zero(&self, value: &Value) -> bool;
    fn to_tex(&self, node: &Self::Node) -> String;
    /// Call a named scalar function, e.g. the special, hyperbolic or inverse trig ones.
    fn call(&self, function: Function, args: &[f64]) -> Result<f64>;
}
