//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

// Addressing
pub use crate::{CellAddress, CellRange};

// Grid
pub use crate::{CellSink, CellSource, FormattingStore, Grid};

// Formatting
pub use crate::{CellFormatting, Color, FormatDelta};

// Conditional formatting
pub use crate::{
    ConditionInput, ConditionKind, ConditionalRule, RuleEditor, RuleEngine, RuleEngineOptions,
    RuleRange,
};

// Formula evaluation
pub use crate::{
    display_cell_value, evaluate_custom_expression, evaluate_formula, evaluate_formula_value,
    EvaluationOptions, FormulaEngine, FormulaValue, JsonData,
};

// Error types
pub use crate::{Error, FormulaError, Result};
