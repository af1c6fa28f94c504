//! [`MathProcessor`], the notation-aware front end over a [`MathEngine`].
//!
//! Every public operation pre-processes its input with [`Notation`], delegates to the
//! engine and tags failures with the [`Operation`] they happened in.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::classify::{self, EquationCategory, EquationType};
use crate::config::{self, ProcessorConfig};
use crate::engine::{Bound, MathEngine, Scope, Solution, SymbolicEngine, Value};
use crate::error::{MathError, Operation, OperationExt, Result};
use crate::notation::{Notation, NumberFormat};
use crate::preview::{self, Domain, Preview, PreviewOutcome};
use crate::steps::{template_steps, Steps};
use crate::units::{self, UnitKind};
use crate::validate::{self, Validation};

lazy_static! {
    static ref RELATION: Regex = Regex::new(r"<=|>=|!=|<|>").expect("valid regex");
}

/// Outcome of [`MathProcessor::solve_equation`].
#[derive(Clone, Debug)]
pub struct SolveReport<N> {
    pub solution: Solution<N>,
    pub steps: Vec<String>,
    pub category: EquationCategory,
    /// Whether substituting the solution back satisfies the equation.
    pub validation: bool,
}

/// Outcome of [`MathProcessor::explain_equation`].
#[derive(Clone, Debug)]
pub struct Explanation<N> {
    pub equation_type: EquationType,
    pub solution: Solution<N>,
    pub steps: Vec<String>,
}

pub struct MathProcessor<E: MathEngine = SymbolicEngine> {
    engine: E,
    config: ProcessorConfig,
    notation: Notation,
}

impl MathProcessor<SymbolicEngine> {
    pub fn new() -> Self {
        MathProcessor {
            engine: SymbolicEngine::default(),
            config: ProcessorConfig::default(),
            notation: Notation::default(),
        }
    }

    pub fn from_config(config: ProcessorConfig) -> Result<Self> {
        let engine = SymbolicEngine::new(config.engine.clone());
        Self::with_engine(engine, config)
    }
}

impl Default for MathProcessor<SymbolicEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: MathEngine> MathProcessor<E> {
    pub fn with_engine(engine: E, config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        let notation = Notation::new(&config.standards)?;
        Ok(MathProcessor {
            engine,
            config,
            notation,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn notation(&self) -> &Notation {
        &self.notation
    }

    pub fn preprocess_expression(&self, text: &str) -> String {
        let processed = self.notation.preprocess(text);
        debug!(input = text, output = %processed, "preprocessed expression");
        processed
    }

    pub fn parse_expression(&self, text: &str) -> Result<E::Node> {
        let processed = self.preprocess_expression(text);
        self.engine.parse(&processed).during(Operation::Parse)
    }

    pub fn evaluate_expression(&self, text: &str, scope: &Scope) -> Result<Value> {
        let evaluate = || {
            let node = self.parse_expression(text)?;
            debug!(%node, bindings = scope.len(), "evaluating");
            self.engine.evaluate(&node, scope)
        };
        evaluate().during(Operation::Evaluate)
    }

    /// Solve through the step list of `category`.
    pub fn solve_equation(&self, equation: &str, category: EquationCategory) -> Result<SolveReport<E::Node>> {
        debug!(equation, %category, "solving equation");
        let mut steps = Steps::default();
        let solution = self
            .solve_by_category(equation, category, &mut steps)
            .during(Operation::Solve)?;
        // A bare matrix or vector expression is evaluated, so there is nothing to check.
        let evaluated = matches!(category, EquationCategory::Matrix | EquationCategory::Vector)
            && !self.notation.preprocess(equation).contains('=');
        let validation = evaluated || self.validate_solution(equation, &solution);
        if !validation {
            debug!(equation, %solution, "solution did not validate");
        }
        Ok(SolveReport {
            solution,
            steps: steps.into_lines(),
            category,
            validation,
        })
    }

    fn solve_by_category(
        &self,
        equation: &str,
        category: EquationCategory,
        steps: &mut Steps,
    ) -> Result<Solution<E::Node>> {
        match category {
            EquationCategory::Algebraic
            | EquationCategory::Exponential
            | EquationCategory::Logarithmic => {
                steps.push("Original equation", equation);
                let node = self.parse_expression(equation)?;
                steps.push("Parsed expression", &node);
                steps.push("Simplified expression", self.engine.simplify(&node)?);
                let solution = self.engine.solve(&node)?;
                steps.push("Solution", &solution);
                Ok(solution)
            }
            EquationCategory::Trigonometric => {
                steps.push("Original trigonometric equation", equation);
                let node = self.parse_expression(equation)?;
                let standard = self.engine.simplify(&node)?;
                steps.push("Standard form", &standard);
                let identities = self.engine.simplify(&self.engine.expand(&standard)?)?;
                steps.push("After applying identities", &identities);
                let solution = self.engine.solve(&identities)?;
                steps.push("Solution", &solution);
                Ok(solution)
            }
            EquationCategory::Inequality => {
                steps.push("Original inequality", equation);
                let node = self.parse_expression(equation)?;
                let processed = self.preprocess_expression(equation);
                let boundary = RELATION.replace(&processed, "=");
                if let Ok(boundary) = self.engine.parse(&boundary) {
                    steps.push("Boundary equation", boundary);
                }
                let solution = self.engine.solve(&node)?;
                steps.push("Critical points", critical_points(&solution));
                steps.push("Solution set", &solution);
                Ok(solution)
            }
            EquationCategory::System => {
                let parts = validate::split_system(equation);
                steps.push("System of equations", parts.join("; "));
                let nodes = parts
                    .iter()
                    .map(|part| self.parse_expression(part))
                    .collect::<Result<Vec<_>>>()?;
                steps.push(
                    "Elimination",
                    format!("Gaussian elimination on {} equations", nodes.len()),
                );
                let solution = self.engine.solve_system(&nodes)?;
                steps.push("Solution", &solution);
                Ok(solution)
            }
            EquationCategory::Matrix => {
                steps.push("Original matrix equation", equation);
                let processed = self.preprocess_expression(equation);
                if let Some(coefficients) = leading_matrix(&processed) {
                    let describe = |function: &str| {
                        self.engine
                            .parse(&format!("{function}({coefficients})"))
                            .and_then(|node| self.engine.evaluate(&node, &Scope::new()))
                            .map_or_else(|err| format!("undefined ({err})"), |v| v.to_string())
                    };
                    steps.push("Determinant", describe("det"));
                    steps.push("Inverse", describe("inv"));
                }
                let solution = self.solve_or_evaluate(&processed)?;
                steps.push("Solution", &solution);
                Ok(solution)
            }
            EquationCategory::Vector => {
                steps.push("Original vector expression", equation);
                let processed = self.preprocess_expression(equation);
                let solution = self.solve_or_evaluate(&processed)?;
                steps.push("Evaluated", &solution);
                Ok(solution)
            }
            EquationCategory::Differential | EquationCategory::Integral => {
                Err(MathError::Unsupported(format!(
                    "{category} equations cannot be solved"
                )))
            }
        }
    }

    /// Solve an equation, or evaluate a bare expression into `result`.
    fn solve_or_evaluate(&self, processed: &str) -> Result<Solution<E::Node>> {
        let node = self.engine.parse(processed).during(Operation::Parse)?;
        if processed.contains('=') {
            return self.engine.solve(&node);
        }
        let value = self.engine.evaluate(&node, &Scope::new())?;
        let result = self.engine.parse(&value.to_string())?;
        Ok(Solution::Assignments(vec![("result".to_string(), result)]))
    }

    pub fn detect_equation_type(&self, equation: &str) -> EquationType {
        classify::detect_equation_type(equation)
    }

    pub fn polynomial_degree(&self, equation: &str) -> Option<u32> {
        classify::polynomial_degree(equation)
    }

    fn solve_typed(&self, equation: &str, equation_type: EquationType) -> Result<Solution<E::Node>> {
        let solve = || {
            let node = self.parse_expression(equation)?;
            debug!(%node, %equation_type, "delegating to engine solve");
            self.engine.solve(&node)
        };
        solve().during(Operation::Solve)
    }

    pub fn solve_linear_equation(&self, equation: &str) -> Result<Solution<E::Node>> {
        self.solve_typed(equation, EquationType::Linear)
    }

    pub fn solve_quadratic_equation(&self, equation: &str) -> Result<Solution<E::Node>> {
        self.solve_typed(equation, EquationType::Quadratic)
    }

    pub fn solve_polynomial_equation(&self, equation: &str) -> Result<Solution<E::Node>> {
        self.solve_typed(equation, EquationType::Polynomial)
    }

    pub fn solve_trigonometric_equation(&self, equation: &str) -> Result<Solution<E::Node>> {
        self.solve_typed(equation, EquationType::Trigonometric)
    }

    pub fn solve_exponential_equation(&self, equation: &str) -> Result<Solution<E::Node>> {
        self.solve_typed(equation, EquationType::Exponential)
    }

    /// Detect the equation type, solve with the matching solver and explain the result.
    pub fn explain_equation(&self, equation: &str) -> Result<Explanation<E::Node>> {
        let equation_type = self.detect_equation_type(equation);
        let solution = match equation_type {
            EquationType::Linear => self.solve_linear_equation(equation)?,
            EquationType::Quadratic => self.solve_quadratic_equation(equation)?,
            EquationType::Polynomial => self.solve_polynomial_equation(equation)?,
            EquationType::Trigonometric => self.solve_trigonometric_equation(equation)?,
            EquationType::Exponential | EquationType::Logarithmic => {
                self.solve_exponential_equation(equation)?
            }
        };
        let steps = self.generate_solution_steps(equation, &solution, equation_type);
        Ok(Explanation {
            equation_type,
            solution,
            steps,
        })
    }

    pub fn generate_solution_steps(
        &self,
        equation: &str,
        solution: &Solution<E::Node>,
        equation_type: EquationType,
    ) -> Vec<String> {
        let (text, count) = match solution {
            Solution::Roots { variable, values } if !values.is_empty() => {
                let shown: Vec<String> = values.iter().map(ToString::to_string).collect();
                (format!("{variable} = {}", shown.join(", ")), values.len())
            }
            other => (other.to_string(), other.bindings().len().max(1)),
        };
        template_steps(&self.notation, equation, equation_type, &text, count)
    }

    pub fn format_with_proper_notation(&self, text: &str) -> String {
        self.notation.format_with_proper_notation(text)
    }

    pub fn format_equation_type(&self, equation_type: EquationType) -> &'static str {
        equation_type.display_name()
    }

    /// Substitute the solution back into every equation and check that the residuals
    /// vanish. Inequalities are checked at one point of each interval.
    pub fn validate_solution(&self, equation: &str, solution: &Solution<E::Node>) -> bool {
        let Ok(nodes) = validate::split_system(equation)
            .into_iter()
            .map(|part| self.parse_expression(part))
            .collect::<Result<Vec<_>>>()
        else {
            return false;
        };

        match solution {
            Solution::All { .. } => true,
            Solution::Roots { variable, values } => values.iter().all(|value| {
                nodes.iter().all(|node| {
                    self.engine
                        .substitute(node, variable, value)
                        .is_ok_and(|node| self.satisfied(&node))
                })
            }),
            Solution::Assignments(pairs) => nodes.iter().all(|node| {
                pairs
                    .iter()
                    .try_fold(node.clone(), |acc, (name, value)| {
                        self.engine.substitute(&acc, name, value)
                    })
                    .is_ok_and(|node| self.satisfied(&node))
            }),
            Solution::Intervals {
                variable,
                intervals,
            } => intervals.iter().all(|interval| {
                let number = |bound: &Option<Bound<E::Node>>| {
                    bound.as_ref().and_then(|b| {
                        self.engine
                            .evaluate(&b.value, &Scope::new())
                            .ok()
                            .and_then(|v| v.as_number())
                    })
                };
                let point = match (number(&interval.lower), number(&interval.upper)) {
                    (Some(lo), Some(hi)) => 0.5 * (lo + hi),
                    (Some(lo), None) => lo + 1.0,
                    (None, Some(hi)) => hi - 1.0,
                    (None, None) => 0.0,
                };
                let mut scope = Scope::new();
                scope.insert(variable.clone(), Value::Number(point));
                nodes.iter().all(|node| {
                    matches!(self.engine.evaluate(node, &scope), Ok(Value::Bool(true)))
                })
            }),
        }
    }

    fn satisfied(&self, node: &E::Node) -> bool {
        let scope = Scope::new();
        let value = match self.engine.evaluate(node, &scope) {
            Ok(value) => value,
            Err(_) => match self
                .engine
                .simplify(node)
                .and_then(|simplified| self.engine.evaluate(&simplified, &scope))
            {
                Ok(value) => value,
                Err(_) => return false,
            },
        };
        match value {
            Value::Bool(holds) => holds,
            other => self.engine.is_zero(&other),
        }
    }

    pub fn simplify_expression(&self, text: &str) -> Result<String> {
        let simplify = || {
            let node = self.parse_expression(text)?;
            self.engine.simplify(&node)
        };
        simplify().during(Operation::Simplify).map(|n| n.to_string())
    }

    pub fn factor_expression(&self, text: &str) -> Result<String> {
        let factor = || {
            let node = self.parse_expression(text)?;
            self.engine.factor(&node)
        };
        factor().during(Operation::Factor).map(|n| n.to_string())
    }

    pub fn expand_expression(&self, text: &str) -> Result<String> {
        let expand = || {
            let node = self.parse_expression(text)?;
            self.engine.expand(&node)
        };
        expand().during(Operation::Expand).map(|n| n.to_string())
    }

    pub fn format_number(&self, number: f64, format: NumberFormat) -> String {
        self.notation.format_number(number, format)
    }

    pub fn convert_unit(&self, value: f64, from: &str, to: &str, kind: &str) -> Result<f64> {
        let kind: UnitKind = kind.parse()?;
        units::convert_unit(value, from, to, kind, &self.config.standards.units)
    }

    pub fn format_unit(&self, value: f64, unit: &str, kind: &str) -> Result<String> {
        let kind: UnitKind = kind.parse()?;
        kind.check_unit(unit)?;
        Ok(format!(
            "{} {unit}",
            self.format_number(value, NumberFormat::default())
        ))
    }

    pub fn generate_preview(&self, equation: &str, category: EquationCategory) -> PreviewOutcome {
        match self.build_preview(equation, category) {
            Ok(preview) => PreviewOutcome::Ready(preview),
            Err(err) => {
                debug!(equation, error = %err, "preview failed");
                PreviewOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    fn build_preview(&self, equation: &str, category: EquationCategory) -> Result<Preview> {
        let node = self.parse_expression(equation)?;
        Ok(Preview {
            latex: self.engine.to_tex(&node),
            simplified: self.engine.simplify(&node).during(Operation::Simplify)?.to_string(),
            domain: self.get_domain(&node),
            category,
            validation: self.validate_equation(equation, category),
        })
    }

    pub fn generate_latex(&self, text: &str) -> Result<String> {
        let node = self.parse_expression(text)?;
        Ok(self.engine.to_tex(&node))
    }

    pub fn get_domain(&self, node: &E::Node) -> Domain {
        preview::get_domain(&node.to_string())
    }

    pub fn validate_equation(&self, equation: &str, category: EquationCategory) -> Validation {
        let mut validation = Validation::default();
        if !self.validate_syntax(equation) {
            validation.error("Invalid syntax");
        }
        validate::check_category(equation, category, &mut validation);
        if !validation.is_valid {
            warn!(
                equation,
                %category,
                errors = ?validation.errors,
                "equation failed validation"
            );
        }
        validation
    }

    /// Whether the engine can parse the pre-processed text. Systems are checked per equation.
    pub fn validate_syntax(&self, equation: &str) -> bool {
        let parts = validate::split_system(equation);
        !parts.is_empty() && parts.iter().all(|part| self.parse_expression(part).is_ok())
    }

    pub fn check_balanced_parentheses(&self, text: &str) -> bool {
        validate::check_balanced_parentheses(text)
    }

    pub fn is_valid_operator(&self, operator: &str) -> bool {
        validate::is_valid_operator(operator)
    }

    pub fn is_valid_variable(&self, variable: &str) -> bool {
        validate::is_valid_variable(variable)
    }

    pub fn extract_variables(&self, text: &str) -> Vec<String> {
        validate::extract_variables(text)
    }

    /// Call a function from one of the special-function groups, e.g. `("bessel", "J")`.
    pub fn special_function(&self, group: &str, name: &str, args: &[f64]) -> Result<f64> {
        let function = config::special_function(group, name).ok_or_else(|| {
            MathError::Unsupported(format!("unknown special function `{group}.{name}`"))
        })?;
        debug!(%function, ?args, "calling special function");
        self.engine.call(function, args)
    }
}

/// Interval endpoints of a solution, for the step list.
fn critical_points<N: std::fmt::Display>(solution: &Solution<N>) -> String {
    let mut points: Vec<String> = Vec::new();
    if let Solution::Intervals { intervals, .. } = solution {
        for interval in intervals {
            for bound in [&interval.lower, &interval.upper].into_iter().flatten() {
                let shown = bound.value.to_string();
                if !points.contains(&shown) {
                    points.push(shown);
                }
            }
        }
    }
    if points.is_empty() {
        "none".to_string()
    } else {
        points.join(", ")
    }
}

/// The bracketed matrix literal a text starts with, e.g. `[[2,0],[0,2]]` in
/// `[[2,0],[0,2]]*X = [2;4]`.
fn leading_matrix(text: &str) -> Option<&str> {
    let text = text.trim_start();
    if !text.starts_with('[') {
        return None;
    }
    let mut depth = 0;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
