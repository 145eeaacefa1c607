//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Expression text is not valid syntax
    #[error("Parse error: {0}")]
    Parse(String),

    /// Expression is well-formed but cannot be evaluated (bad coercion, division by zero)
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Reference to invalid cell
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// A formula (transitively) references its own cell
    #[error("Circular reference at {0}")]
    CircularReference(String),

    /// Nested formula resolution went deeper than the configured cap
    #[error("Formula nesting deeper than {0} levels")]
    DepthExceeded(usize),

    /// JSON data could not be parsed
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<gridcalc_core::Error> for FormulaError {
    fn from(err: gridcalc_core::Error) -> Self {
        match err {
            gridcalc_core::Error::InvalidReference(msg) => FormulaError::InvalidReference(msg),
            other => FormulaError::Evaluation(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for FormulaError {
    fn from(err: serde_json::Error) -> Self {
        FormulaError::Json(err.to_string())
    }
}
