//! Error types for gridcalc

use gridcalc_formula::FormulaError;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridcalc
#[derive(Debug, Error)]
pub enum Error {
    /// Grid or addressing error
    #[error(transparent)]
    Core(#[from] gridcalc_core::Error),

    /// Formula resolution or evaluation error
    #[error(transparent)]
    Formula(#[from] FormulaError),

    /// A date criterion or cell value that is not a recognized date
    #[error("Invalid date: {0}")]
    DateParse(String),

    /// No rule with the given id
    #[error("Conditional rule not found: {0}")]
    UnknownRule(u64),

    /// An update was requested while no existing rule is loaded in the editor
    #[error("No conditional rule is being edited")]
    NotEditing,

    /// Malformed rule or options JSON
    #[error("JSON error: {0}")]
    Json(String),
}
