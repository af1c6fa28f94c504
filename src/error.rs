use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MathError>;

#[derive(Debug, Error)]
pub enum MathError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("evaluation error: {0}")]
    Evaluate(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("Unsupported equation type: {0}")]
    UnsupportedEquationType(String),
    #[error("Unsupported unit type: {0}")]
    UnsupportedUnitType(String),
    #[error("Unknown unit `{unit}` for {kind}")]
    UnknownUnit { kind: String, unit: String },
    #[error("no solution: {0}")]
    NoSolution(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{operation}: {source}")]
    Operation {
        operation: Operation,
        source: Box<MathError>,
    },
}

/// Public processor operation, used to prefix errors surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Parse,
    Evaluate,
    Solve,
    Simplify,
    Factor,
    Expand,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::Parse => "Failed to parse expression",
            Operation::Evaluate => "Failed to evaluate expression",
            Operation::Solve => "Error solving equation",
            Operation::Simplify => "Failed to simplify expression",
            Operation::Factor => "Failed to factor expression",
            Operation::Expand => "Failed to expand expression",
        };
        f.write_str(text)
    }
}

impl MathError {
    pub fn during(self, operation: Operation) -> Self {
        MathError::Operation {
            operation,
            source: Box::new(self),
        }
    }

    /// The operation at the outermost layer, if this error was raised at a processor boundary.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            MathError::Operation { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for MathError {
    fn from(err: toml::de::Error) -> Self {
        MathError::Config(err.to_string())
    }
}

impl From<regex::Error> for MathError {
    fn from(err: regex::Error) -> Self {
        MathError::Config(err.to_string())
    }
}

/// Tag the error branch of a result with the operation that produced it.
pub trait OperationExt<T> {
    fn during(self, operation: Operation) -> Result<T>;
}

impl<T> OperationExt<T> for Result<T> {
    fn during(self, operation: Operation) -> Result<T> {
        self.map_err(|err| err.during(operation))
    }
}
