//! Notation-aware math processing: locale-aware pre-processing, equation classification,
//! validation and step-by-step explanations over an exact symbolic engine.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod expr;
pub mod factor;
pub mod format;
pub mod matrix;
pub mod notation;
pub mod parser;
pub mod polynomial;
pub mod prelude;
pub mod preview;
pub mod processor;
pub mod simplify;
pub mod solver;
pub mod special;
pub mod steps;
pub mod units;
pub mod validate;

pub use classify::{EquationCategory, EquationType, detect_equation_type, polynomial_degree};
pub use config::ProcessorConfig;
pub use engine::{Bound, EngineOptions, Interval, MathEngine, Scope, Solution, SymbolicEngine, Value};
pub use error::{MathError, Operation, Result};
pub use eval::evaluate;
pub use expr::{Expr, Function, Rational, Relation, add, div, mul, neg, one, pow, rational, sub, zero};
pub use factor::factor;
pub use format::{pretty, to_tex};
pub use notation::{Notation, NumberFormat};
pub use parser::parse_expr;
pub use polynomial::Poly;
pub use preview::{Domain, Preview, PreviewOutcome};
pub use processor::{Explanation, MathProcessor, SolveReport};
pub use simplify::{expand, simplify, substitute};
pub use solver::{solve, solve_system};
pub use units::UnitKind;
pub use validate::Validation;
