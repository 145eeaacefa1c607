//! Cell address and range types
//!
//! Column labels use bijective base-26 numbering (A=1, ..., Z=26, AA=27, ...)
//! and are stored zero-based. Rows are 1-based in text and 0-based internally.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "BC23")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: usize,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26)
    pub col: usize,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// The whole input must match `[A-Z]+[0-9]+`; lowercase letters,
    /// `$` markers and surrounding text are rejected.
    ///
    /// # Examples
    /// ```
    /// use gridcalc_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr.row, 0);
    /// assert_eq!(addr.col, 0);
    ///
    /// let addr = CellAddress::parse("BC23").unwrap();
    /// assert_eq!(addr.row, 22);
    /// assert_eq!(addr.col, 54);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let split = bytes
            .iter()
            .position(|b| !b.is_ascii_uppercase())
            .unwrap_or(bytes.len());

        if split == 0 {
            return Err(Error::InvalidReference(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let row_str = &s[split..];
        if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidReference(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[..split])?;
        let row: usize = row_str
            .parse()
            .map_err(|_| Error::InvalidReference(format!("row number too large in '{}'", s)))?;

        // Rows are 1-based in text
        if row == 0 {
            return Err(Error::InvalidReference(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self { row: row - 1, col })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1; // 1-based for calculation

        while n > 0 {
            let remainder = (n - 1) % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            n = (n - 1) / 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<usize> {
        if letters.is_empty() {
            return Err(Error::InvalidReference("empty column letters".into()));
        }

        let mut col: usize = 0;
        for c in letters.bytes() {
            if !c.is_ascii_uppercase() {
                return Err(Error::InvalidReference(format!(
                    "invalid column letter '{}'",
                    c as char
                )));
            }
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add((c - b'A') as usize + 1))
                .ok_or_else(|| Error::InvalidReference(format!("column too large: {}", letters)))?;
        }

        Ok(col - 1)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!(
            "{}{}",
            Self::column_to_letters(self.col),
            self.row as u128 + 1
        )
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Decode a column label to its zero-based index ("A" -> 0, "AA" -> 26)
pub fn column_label_to_index(label: &str) -> Result<usize> {
    CellAddress::letters_to_column(label)
}

/// Encode a zero-based column index as a label (25 -> "Z", 26 -> "AA")
pub fn index_to_column_label(index: usize) -> String {
    CellAddress::column_to_letters(index)
}

/// A1-style text for zero-based (row, col)
pub fn cell_reference(row: usize, col: usize) -> String {
    CellAddress::new(row, col).to_a1_string()
}

/// Parse A1-style text into a zero-based address
pub fn parse_cell_reference(text: &str) -> Result<CellAddress> {
    CellAddress::parse(text)
}

/// A rectangular range of cells, normalized so `start` is top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range from two corners in any order
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Create a range from row/column indices
    pub fn from_indices(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Clip the range to a `rows` x `cols` grid, or `None` if nothing remains
    pub fn clip(&self, rows: usize, cols: usize) -> Option<CellRange> {
        if rows == 0 || cols == 0 || self.start.row >= rows || self.start.col >= cols {
            return None;
        }
        Some(CellRange {
            start: self.start,
            end: CellAddress::new(self.end.row.min(rows - 1), self.end.col.min(cols - 1)),
        })
    }

    /// Iterate over all cell addresses in the range (row by row)
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        (self.start.row..=self.end.row).flat_map(move |row| {
            (self.start.col..=self.end.col).map(move |col| CellAddress::new(row, col))
        })
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(1), "B");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(27), "AB");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(702), "AAA");
    }

    #[test]
    fn test_column_to_letters_handles_max_usize() {
        let letters = CellAddress::column_to_letters(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.bytes().all(|b| b.is_ascii_uppercase()));
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("Z").unwrap(), 25);
        assert_eq!(CellAddress::letters_to_column("AA").unwrap(), 26);
        assert_eq!(CellAddress::letters_to_column("ZZ").unwrap(), 701);
        assert_eq!(CellAddress::letters_to_column("AAA").unwrap(), 702);
    }

    #[test]
    fn test_letters_to_column_rejects_bad_input() {
        assert!(CellAddress::letters_to_column("").is_err());
        assert!(CellAddress::letters_to_column("a").is_err());
        assert!(CellAddress::letters_to_column("A1").is_err());
        assert!(CellAddress::letters_to_column(&"Z".repeat(40)).is_err());
    }

    #[test]
    fn test_cell_address_parse() {
        let addr = CellAddress::parse("A1").unwrap();
        assert_eq!(addr, CellAddress::new(0, 0));

        let addr = CellAddress::parse("BC23").unwrap();
        assert_eq!(addr, CellAddress::new(22, 54));
    }

    #[test]
    fn test_cell_address_parse_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("1").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("a1").is_err());
        assert!(CellAddress::parse("$A$1").is_err());
        assert!(CellAddress::parse("A1B").is_err());
        assert!(CellAddress::parse(" A1").is_err());
    }

    #[test]
    fn test_cell_reference_labels() {
        assert_eq!(cell_reference(0, 0), "A1");
        assert_eq!(cell_reference(0, 25), "Z1");
        assert_eq!(cell_reference(0, 26), "AA1");
        assert_eq!(cell_reference(99, 2), "C100");
    }

    #[test]
    fn test_cell_range_normalizes() {
        let range = CellRange::from_indices(4, 3, 1, 0);
        assert_eq!(range.start, CellAddress::new(1, 0));
        assert_eq!(range.end, CellAddress::new(4, 3));
        assert_eq!(range.to_a1_string(), "A2:D5");
    }

    #[test]
    fn test_cell_range_clip() {
        let range = CellRange::from_indices(0, 0, 10, 10);
        let clipped = range.clip(3, 2).unwrap();
        assert_eq!(clipped.end, CellAddress::new(2, 1));

        let outside = CellRange::from_indices(5, 5, 6, 6);
        assert_eq!(outside.clip(3, 3), None);
    }

    #[test]
    fn test_cell_range_iterator() {
        let range = CellRange::from_indices(0, 0, 1, 1);
        let cells: Vec<_> = range.cells().collect();

        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0], CellAddress::new(0, 0)); // A1
        assert_eq!(cells[1], CellAddress::new(0, 1)); // B1
        assert_eq!(cells[2], CellAddress::new(1, 0)); // A2
        assert_eq!(cells[3], CellAddress::new(1, 1)); // B2
    }
}
