//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangular block of cells
//! - The reference codec functions used by the formula engine

mod address;

pub use address::{
    cell_reference, column_label_to_index, index_to_column_label, parse_cell_reference,
    CellAddress, CellRange,
};

/// Whether raw cell content is a formula (leading `=`)
pub fn is_formula(content: &str) -> bool {
    content.starts_with('=')
}
