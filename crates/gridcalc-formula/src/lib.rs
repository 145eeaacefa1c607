//! # gridcalc-formula
//!
//! Formula resolution and evaluation for gridcalc.
//!
//! This crate provides:
//! - Reference extraction (`A1`, `data.a.b`)
//! - Evaluation context building: recursive reference resolution with cycle
//!   detection, then whole-token substitution into the formula text
//! - Expression parsing (text → AST) and tree-walking evaluation
//! - Predicate, value and display entry points that never fail
//! - The custom predicate mini-language used by conditional formatting
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::Grid;
//! use gridcalc_formula::{display_cell_value, evaluate_formula};
//!
//! let mut grid = Grid::new(3, 3);
//! grid.set_cell("A1", "10").unwrap();
//! grid.set_cell("B1", "=A1*2").unwrap();
//! grid.set_cell("C1", "=C1").unwrap();
//!
//! assert!(evaluate_formula("=B1>A1", &grid));
//! assert_eq!(display_cell_value(&grid, 0, 1), "20");
//! assert_eq!(display_cell_value(&grid, 0, 2), "Try Again!");
//! ```

pub mod ast;
pub mod context;
pub mod custom;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod json;
pub mod options;
pub mod parser;
pub mod references;

pub use ast::{BinaryOperator, Expr, UnaryOperator};
pub use context::{clean_formula, EvaluationContext, Resolution};
pub use custom::evaluate_custom_expression;
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{compare, evaluate, parse_number, Bindings, FormulaValue};
pub use formula::{
    display_cell_value, evaluate_formula, evaluate_formula_value, evaluate_literal, formula_body,
    try_display_cell_value, try_evaluate_formula, try_evaluate_formula_value, FormulaEngine,
};
pub use json::JsonData;
pub use options::{EvaluationOptions, DISPLAY_ERROR_MARKER, ERROR_MARKER};
pub use parser::parse_expression;
pub use references::{extract_cell_references, extract_json_paths};
