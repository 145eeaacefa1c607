//! # gridcalc-core
//!
//! Core data structures for the gridcalc formula engine.
//!
//! This crate provides the fundamental types used throughout gridcalc:
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and the A1 codec
//! - [`Grid`] - An in-memory grid of text cells, plus the [`CellSource`],
//!   [`CellSink`] and [`FormattingStore`] traits the engine reads through
//! - [`CellFormatting`] and [`FormatDelta`] - Per-cell formatting
//! - [`ConditionalRule`] - Conditional formatting rule data
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{Grid, CellSource};
//!
//! let mut grid = Grid::new(3, 3);
//!
//! // Using string addresses
//! grid.set_cell("A1", "10").unwrap();
//!
//! // Or using row/column indices (0-based)
//! grid.set_cell_at(0, 1, "=A1*2").unwrap();
//!
//! assert_eq!(grid.cell_text(0, 1), Some("=A1*2"));
//! ```

pub mod cell;
pub mod conditional_format;
pub mod error;
pub mod grid;
pub mod style;

// Re-exports for convenience
pub use cell::{
    cell_reference, column_label_to_index, index_to_column_label, is_formula,
    parse_cell_reference, CellAddress, CellRange,
};
pub use conditional_format::{
    format_preset, format_presets, ConditionKind, ConditionalRule, FormatPreset, RuleRange,
};
pub use error::{Error, Result};
pub use grid::{
    CellSink, CellSource, FormattingStore, Grid, DEFAULT_COLS, DEFAULT_COLUMN_WIDTH,
    DEFAULT_ROWS, DEFAULT_ROW_HEIGHT, MIN_COLUMN_WIDTH,
};
pub use style::{CellFormatting, Color, FormatDelta, FormatProperty};
