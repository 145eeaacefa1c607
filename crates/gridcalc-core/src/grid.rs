//! The in-memory grid and the accessor traits the formula engine reads through

use crate::cell::CellAddress;
use crate::error::{Error, Result};
use crate::style::CellFormatting;

/// Default number of rows in a new grid
pub const DEFAULT_ROWS: usize = 20;
/// Default number of columns in a new grid
pub const DEFAULT_COLS: usize = 10;
/// Default column width in pixels
pub const DEFAULT_COLUMN_WIDTH: u32 = 100;
/// Minimum column width in pixels
pub const MIN_COLUMN_WIDTH: u32 = 50;
/// Default row height in pixels
pub const DEFAULT_ROW_HEIGHT: u32 = 24;

/// Read access to cell contents
///
/// Bounds are owned by the source: anything outside
/// `row_count() x col_count()` reads as `None`.
pub trait CellSource {
    fn row_count(&self) -> usize;
    fn col_count(&self) -> usize;
    /// Raw text of a cell (formulas keep their leading `=`)
    fn cell_text(&self, row: usize, col: usize) -> Option<&str>;

    fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.row_count() && col < self.col_count()
    }
}

/// Write access to cell contents
pub trait CellSink {
    fn set_cell_text(&mut self, row: usize, col: usize, text: String) -> Result<()>;
}

/// Per-cell formatting storage
pub trait FormattingStore {
    fn cell_formatting(&self, row: usize, col: usize) -> Option<&CellFormatting>;

    fn update_cell_formatting(
        &mut self,
        row: usize,
        col: usize,
        formatting: CellFormatting,
    ) -> Result<()>;

    /// Apply many updates at once
    ///
    /// Stops at the first failing update.
    fn update_formatting_batch(
        &mut self,
        updates: Vec<(CellAddress, CellFormatting)>,
    ) -> Result<()> {
        for (addr, formatting) in updates {
            self.update_cell_formatting(addr.row, addr.col, formatting)?;
        }
        Ok(())
    }
}

/// A rectangular grid of text cells with per-cell formatting
///
/// Every row holds exactly `col_count()` cells.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    cells: Vec<Vec<String>>,
    formatting: Vec<Vec<CellFormatting>>,
    column_widths: Vec<u32>,
    row_heights: Vec<u32>,
    cols: usize,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl Grid {
    /// Create an empty `rows x cols` grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![vec![String::new(); cols]; rows],
            formatting: vec![vec![CellFormatting::default(); cols]; rows],
            column_widths: vec![DEFAULT_COLUMN_WIDTH; cols],
            row_heights: vec![DEFAULT_ROW_HEIGHT; rows],
            cols,
        }
    }

    /// Build a grid from rows of text, padding short rows with empty cells
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let cols = cells.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut cells {
            row.resize(cols, String::new());
        }

        let rows = cells.len();
        Self {
            cells,
            formatting: vec![vec![CellFormatting::default(); cols]; rows],
            column_widths: vec![DEFAULT_COLUMN_WIDTH; cols],
            row_heights: vec![DEFAULT_ROW_HEIGHT; rows],
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<()> {
        if row < self.rows() && col < self.cols {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols,
            })
        }
    }

    // === Cell access ===

    /// Get a cell by A1 address
    pub fn cell(&self, address: &str) -> Result<Option<&str>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_at(addr.row, addr.col))
    }

    /// Get a cell by zero-based position
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }

    /// Set a cell by A1 address
    pub fn set_cell<S: Into<String>>(&mut self, address: &str, text: S) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_at(addr.row, addr.col, text)
    }

    /// Set a cell by zero-based position
    pub fn set_cell_at<S: Into<String>>(&mut self, row: usize, col: usize, text: S) -> Result<()> {
        self.check_bounds(row, col)?;
        self.cells[row][col] = text.into();
        Ok(())
    }

    /// Iterate over rows of cell text
    pub fn iter_rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.iter().map(Vec::as_slice)
    }

    // === Formatting ===

    pub fn formatting_at(&self, row: usize, col: usize) -> Option<&CellFormatting> {
        self.formatting.get(row)?.get(col)
    }

    /// Mutable formatting for direct (user) edits
    pub fn formatting_at_mut(&mut self, row: usize, col: usize) -> Option<&mut CellFormatting> {
        self.formatting.get_mut(row)?.get_mut(col)
    }

    // === Dimensions ===

    pub fn column_width(&self, col: usize) -> Option<u32> {
        self.column_widths.get(col).copied()
    }

    /// Set a column width, clamped to [`MIN_COLUMN_WIDTH`]
    pub fn set_column_width(&mut self, col: usize, width: u32) -> Result<()> {
        // Columns exist even when the grid has no rows
        match self.column_widths.get_mut(col) {
            Some(w) => {
                *w = width.max(MIN_COLUMN_WIDTH);
                Ok(())
            }
            None => Err(Error::OutOfBounds {
                row: 0,
                col,
                rows: self.rows(),
                cols: self.cols,
            }),
        }
    }

    pub fn column_widths(&self) -> &[u32] {
        &self.column_widths
    }

    pub fn row_height(&self, row: usize) -> Option<u32> {
        self.row_heights.get(row).copied()
    }

    pub fn set_row_height(&mut self, row: usize, height: u32) -> Result<()> {
        match self.row_heights.get_mut(row) {
            Some(h) => {
                *h = height;
                Ok(())
            }
            None => Err(Error::OutOfBounds {
                row,
                col: 0,
                rows: self.rows(),
                cols: self.cols,
            }),
        }
    }

    // === Growth ===

    /// Insert an empty row before `at` (`at == rows()` appends)
    pub fn insert_row(&mut self, at: usize) -> Result<()> {
        if at > self.rows() {
            return Err(Error::OutOfBounds {
                row: at,
                col: 0,
                rows: self.rows(),
                cols: self.cols,
            });
        }
        self.cells.insert(at, vec![String::new(); self.cols]);
        self.formatting
            .insert(at, vec![CellFormatting::default(); self.cols]);
        self.row_heights.insert(at, DEFAULT_ROW_HEIGHT);
        Ok(())
    }

    /// Insert an empty column before `at` (`at == cols()` appends)
    pub fn insert_column(&mut self, at: usize) -> Result<()> {
        if at > self.cols {
            return Err(Error::OutOfBounds {
                row: 0,
                col: at,
                rows: self.rows(),
                cols: self.cols,
            });
        }
        for row in &mut self.cells {
            row.insert(at, String::new());
        }
        for row in &mut self.formatting {
            row.insert(at, CellFormatting::default());
        }
        self.column_widths.insert(at, DEFAULT_COLUMN_WIDTH);
        self.cols += 1;
        Ok(())
    }

    /// Append an empty row
    pub fn add_row(&mut self) {
        self.cells.push(vec![String::new(); self.cols]);
        self.formatting
            .push(vec![CellFormatting::default(); self.cols]);
        self.row_heights.push(DEFAULT_ROW_HEIGHT);
    }

    /// Append an empty column
    pub fn add_column(&mut self) {
        for row in &mut self.cells {
            row.push(String::new());
        }
        for row in &mut self.formatting {
            row.push(CellFormatting::default());
        }
        self.column_widths.push(DEFAULT_COLUMN_WIDTH);
        self.cols += 1;
    }
}

impl CellSource for Grid {
    fn row_count(&self) -> usize {
        self.rows()
    }

    fn col_count(&self) -> usize {
        self.cols
    }

    fn cell_text(&self, row: usize, col: usize) -> Option<&str> {
        self.cell_at(row, col)
    }
}

impl CellSink for Grid {
    fn set_cell_text(&mut self, row: usize, col: usize, text: String) -> Result<()> {
        self.set_cell_at(row, col, text)
    }
}

impl FormattingStore for Grid {
    fn cell_formatting(&self, row: usize, col: usize) -> Option<&CellFormatting> {
        self.formatting_at(row, col)
    }

    fn update_cell_formatting(
        &mut self,
        row: usize,
        col: usize,
        formatting: CellFormatting,
    ) -> Result<()> {
        self.check_bounds(row, col)?;
        self.formatting[row][col] = formatting;
        Ok(())
    }
}
