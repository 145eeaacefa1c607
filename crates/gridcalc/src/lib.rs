//! # gridcalc
//!
//! A spreadsheet formula engine with conditional formatting.
//!
//! ## Features
//!
//! - A1 addressing and an in-memory text grid
//! - Formula evaluation with cell and `data.*` JSON references, cycle
//!   detection and a depth cap
//! - Twenty conditional formatting condition kinds, including grid-wide
//!   custom formulas and a cell-relative predicate language
//! - Rule formatting tracked separately from user formatting, so reapplying
//!   rules never clobbers what the user set
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut grid = Grid::new(4, 2);
//! grid.set_cell("A1", "12").unwrap();
//! grid.set_cell("A2", "30").unwrap();
//! grid.set_cell("A3", "=A1+A2").unwrap();
//!
//! assert_eq!(display_cell_value(&grid, 2, 0), "42");
//!
//! let mut rules = RuleEngine::new();
//! rules.open_conditional_formatting(RuleRange::parse("A1:A3").unwrap());
//! rules.editor_mut().selected_kind = ConditionKind::GreaterThan;
//! rules.editor_mut().criterion1 = "20".into();
//! rules.add_conditional_rule();
//! rules.settle(&mut grid).unwrap();
//!
//! let fill = grid.formatting_at(2, 0).unwrap().background;
//! assert_eq!(fill, Color::rgb(0xD9, 0xEA, 0xD3));
//! ```

pub mod conditional;
pub mod error;
pub mod prelude;

// Re-export conditional formatting types
#[cfg(feature = "serde")]
pub use conditional::rules_from_json;
pub use conditional::{
    evaluate_condition, parse_date, ConditionInput, RuleEditor, RuleEngine, RuleEngineOptions,
    DEFAULT_EDITOR_FILL,
};

// Re-export error types
pub use error::{Error, Result};

// Re-export core types
pub use gridcalc_core::{
    // Addressing
    cell_reference,
    column_label_to_index,
    format_preset,
    // Rule data
    format_presets,
    index_to_column_label,
    is_formula,
    parse_cell_reference,
    CellAddress,
    // Formatting
    CellFormatting,
    CellRange,
    // Grid
    CellSink,
    CellSource,
    Color,
    ConditionKind,
    ConditionalRule,
    FormatDelta,
    FormatPreset,
    FormatProperty,
    FormattingStore,
    Grid,
    RuleRange,
    DEFAULT_COLS,
    DEFAULT_COLUMN_WIDTH,
    DEFAULT_ROWS,
    DEFAULT_ROW_HEIGHT,
    MIN_COLUMN_WIDTH,
};

// Re-export formula types
pub use gridcalc_formula::{
    display_cell_value, evaluate_custom_expression, evaluate_formula, evaluate_formula_value,
    extract_cell_references, extract_json_paths, parse_expression, try_display_cell_value,
    try_evaluate_formula, try_evaluate_formula_value, EvaluationContext, EvaluationOptions,
    Expr, FormulaEngine, FormulaError, FormulaResult, FormulaValue, JsonData, Resolution,
    DISPLAY_ERROR_MARKER, ERROR_MARKER,
};
