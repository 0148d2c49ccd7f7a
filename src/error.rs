use thiserror::Error;

/// Failure of the symbolic capability itself.
///
/// "No feature found" and "non-real value" are never errors; only an
/// expression the engine cannot solve, differentiate or take a limit of ends
/// up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CasError {
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Expression has more than one free symbol: {0}")]
    MultipleSymbols(String),
    #[error("Variable '{0}' not found")]
    UnknownVariable(String),
    #[error("Cannot differentiate: {0}")]
    NotDifferentiable(String),
}

impl CasError {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        CasError::Unsupported(msg.into())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    Syntax(String),
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
    #[error("Function '{0}' takes exactly one argument")]
    Arity(String),
    #[error("Unsupported operator '{0}'")]
    UnsupportedOperator(String),
    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),
    #[error("Empty expression")]
    Empty,
}

/// A sampling interval whose bounds are out of order.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid interval: lower bound {lower} must be less than upper bound {upper}")]
pub struct IntervalError {
    pub lower: f64,
    pub upper: f64,
}

/// A probing step that is not a positive finite number.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid probe step: eps must be a positive finite number, got {0}")]
pub struct InvalidEps(pub f64);

/// Anything that stops the command-line front end before a report is printed.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Interval(#[from] IntervalError),
    #[error(transparent)]
    Cas(#[from] CasError),
    #[error(transparent)]
    Probe(#[from] InvalidEps),
    #[error("Unknown output format '{0}' (expected 'pretty' or 'json')")]
    Format(String),
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}
