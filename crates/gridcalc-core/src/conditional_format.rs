//! Conditional formatting rule types
//!
//! A [`ConditionalRule`] pairs a rectangular [`RuleRange`] with a
//! [`ConditionKind`], up to two criteria and the [`FormatDelta`] applied to
//! matching cells. Evaluation lives in the `gridcalc` crate; this module only
//! holds the data.
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{ConditionalRule, ConditionKind, RuleRange};
//! use gridcalc_core::style::{Color, FormatDelta};
//!
//! // Highlight cells in A1:A10 greater than 100
//! let rule = ConditionalRule::new(1, ConditionKind::GreaterThan)
//!     .with_range(RuleRange::parse("A1:A10").unwrap())
//!     .with_criterion1("100")
//!     .with_format(FormatDelta::fill(Color::rgb(0xF4, 0xCC, 0xCC), Color::BLACK));
//!
//! assert!(rule.range.contains(4, 0));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::cell::{CellAddress, CellRange};
use crate::error::{Error, Result};
use crate::style::{Color, FormatDelta};

/// Condition tested against each cell in a rule's range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ConditionKind {
    Empty,
    NotEmpty,
    TextContains,
    TextNotContains,
    TextStartsWith,
    TextEndsWith,
    TextExactly,
    DateIs,
    DateBefore,
    DateAfter,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    EqualTo,
    NotEqualTo,
    Between,
    NotBetween,
    /// Grid-level formula predicate (criterion1 is the formula)
    CustomFormula,
    /// Cell-relative mini-language (criterion1 is the expression)
    CustomExpression,
}

impl ConditionKind {
    /// Every kind, in menu order
    pub const ALL: [ConditionKind; 20] = [
        ConditionKind::Empty,
        ConditionKind::NotEmpty,
        ConditionKind::TextContains,
        ConditionKind::TextNotContains,
        ConditionKind::TextStartsWith,
        ConditionKind::TextEndsWith,
        ConditionKind::TextExactly,
        ConditionKind::DateIs,
        ConditionKind::DateBefore,
        ConditionKind::DateAfter,
        ConditionKind::GreaterThan,
        ConditionKind::GreaterThanOrEqual,
        ConditionKind::LessThan,
        ConditionKind::LessThanOrEqual,
        ConditionKind::EqualTo,
        ConditionKind::NotEqualTo,
        ConditionKind::Between,
        ConditionKind::NotBetween,
        ConditionKind::CustomFormula,
        ConditionKind::CustomExpression,
    ];

    /// Stable tag (as used in rule files)
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::Empty => "empty",
            ConditionKind::NotEmpty => "not_empty",
            ConditionKind::TextContains => "text_contains",
            ConditionKind::TextNotContains => "text_not_contains",
            ConditionKind::TextStartsWith => "text_starts_with",
            ConditionKind::TextEndsWith => "text_ends_with",
            ConditionKind::TextExactly => "text_exactly",
            ConditionKind::DateIs => "date_is",
            ConditionKind::DateBefore => "date_before",
            ConditionKind::DateAfter => "date_after",
            ConditionKind::GreaterThan => "greater_than",
            ConditionKind::GreaterThanOrEqual => "greater_than_or_equal",
            ConditionKind::LessThan => "less_than",
            ConditionKind::LessThanOrEqual => "less_than_or_equal",
            ConditionKind::EqualTo => "equal_to",
            ConditionKind::NotEqualTo => "not_equal_to",
            ConditionKind::Between => "between",
            ConditionKind::NotBetween => "not_between",
            ConditionKind::CustomFormula => "custom_formula",
            ConditionKind::CustomExpression => "custom_expression",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ConditionKind::Empty => "Is empty",
            ConditionKind::NotEmpty => "Is not empty",
            ConditionKind::TextContains => "Text contains",
            ConditionKind::TextNotContains => "Text does not contain",
            ConditionKind::TextStartsWith => "Text starts with",
            ConditionKind::TextEndsWith => "Text ends with",
            ConditionKind::TextExactly => "Text is exactly",
            ConditionKind::DateIs => "Date is",
            ConditionKind::DateBefore => "Date is before",
            ConditionKind::DateAfter => "Date is after",
            ConditionKind::GreaterThan => "Greater than",
            ConditionKind::GreaterThanOrEqual => "Greater than or equal to",
            ConditionKind::LessThan => "Less than",
            ConditionKind::LessThanOrEqual => "Less than or equal to",
            ConditionKind::EqualTo => "Is equal to",
            ConditionKind::NotEqualTo => "Is not equal to",
            ConditionKind::Between => "Is between",
            ConditionKind::NotBetween => "Is not between",
            ConditionKind::CustomFormula => "Custom formula is",
            ConditionKind::CustomExpression => "Custom expression",
        }
    }

    /// Number of criteria the kind reads (0, 1 or 2)
    pub fn criteria_count(&self) -> usize {
        match self {
            ConditionKind::Empty | ConditionKind::NotEmpty => 0,
            ConditionKind::Between | ConditionKind::NotBetween => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConditionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::other(format!("unknown condition kind '{}'", s)))
    }
}

/// Rectangular range a rule applies to
///
/// Corners may be given in any order; [`RuleRange::normalized`] orders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl RuleRange {
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            start_row,
            start_col,
            end_row,
            end_col,
        }
    }

    /// A single-cell range
    pub fn cell(row: usize, col: usize) -> Self {
        Self::new(row, col, row, col)
    }

    /// Parse "A1:B3" or a single "A1"
    pub fn parse(s: &str) -> Result<Self> {
        let (start, end) = match s.split_once(':') {
            Some((a, b)) => (CellAddress::parse(a.trim())?, CellAddress::parse(b.trim())?),
            None => {
                let addr = CellAddress::parse(s.trim())?;
                (addr, addr)
            }
        };
        Ok(Self::new(start.row, start.col, end.row, end.col))
    }

    /// The range with min/max corners
    pub fn normalized(&self) -> CellRange {
        CellRange::from_indices(self.start_row, self.start_col, self.end_row, self.end_col)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.normalized().contains(&CellAddress::new(row, col))
    }
}

impl fmt::Display for RuleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}

impl From<CellRange> for RuleRange {
    fn from(range: CellRange) -> Self {
        Self::new(range.start.row, range.start.col, range.end.row, range.end.col)
    }
}

/// A conditional formatting rule
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionalRule {
    /// Unique, strictly increasing id
    pub id: u64,
    pub range: RuleRange,
    pub kind: ConditionKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub criterion1: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub criterion2: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub format: FormatDelta,
}

impl ConditionalRule {
    /// Create a rule covering A1 with no criteria and an empty format
    pub fn new(id: u64, kind: ConditionKind) -> Self {
        Self {
            id,
            range: RuleRange::default(),
            kind,
            criterion1: String::new(),
            criterion2: String::new(),
            format: FormatDelta::default(),
        }
    }

    // === Shorthands ===

    pub fn greater_than(id: u64, value: impl Into<String>) -> Self {
        Self::new(id, ConditionKind::GreaterThan).with_criterion1(value)
    }

    pub fn less_than(id: u64, value: impl Into<String>) -> Self {
        Self::new(id, ConditionKind::LessThan).with_criterion1(value)
    }

    pub fn between(id: u64, low: impl Into<String>, high: impl Into<String>) -> Self {
        Self::new(id, ConditionKind::Between)
            .with_criterion1(low)
            .with_criterion2(high)
    }

    pub fn text_contains(id: u64, text: impl Into<String>) -> Self {
        Self::new(id, ConditionKind::TextContains).with_criterion1(text)
    }

    /// Highlight when a grid-level formula is true
    pub fn custom_formula(id: u64, formula: impl Into<String>) -> Self {
        Self::new(id, ConditionKind::CustomFormula).with_criterion1(formula)
    }

    /// Highlight when a cell-relative expression matches
    pub fn custom_expression(id: u64, expression: impl Into<String>) -> Self {
        Self::new(id, ConditionKind::CustomExpression).with_criterion1(expression)
    }

    // === Builders ===

    pub fn with_range(mut self, range: RuleRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_criterion1(mut self, value: impl Into<String>) -> Self {
        self.criterion1 = value.into();
        self
    }

    pub fn with_criterion2(mut self, value: impl Into<String>) -> Self {
        self.criterion2 = value.into();
        self
    }

    pub fn with_format(mut self, format: FormatDelta) -> Self {
        self.format = format;
        self
    }
}

/// A named fill preset offered by rule editors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPreset {
    pub name: &'static str,
    pub background: Color,
    pub text_color: Color,
}

impl FormatPreset {
    /// The preset as a full format delta (flags off)
    pub fn to_delta(&self) -> FormatDelta {
        FormatDelta::fill(self.background, self.text_color)
    }
}

const fn preset(name: &'static str, r: u8, g: u8, b: u8) -> FormatPreset {
    FormatPreset {
        name,
        background: Color::rgb(r, g, b),
        text_color: Color::BLACK,
    }
}

static FORMAT_PRESETS: [FormatPreset; 12] = [
    preset("Light Red Fill", 0xF4, 0xCC, 0xCC),
    preset("Light Orange Fill", 0xFC, 0xE5, 0xCD),
    preset("Light Yellow Fill", 0xFF, 0xF2, 0xCC),
    preset("Light Green Fill", 0xD9, 0xEA, 0xD3),
    preset("Light Blue Fill", 0xD0, 0xE0, 0xE3),
    preset("Light Purple Fill", 0xD9, 0xD2, 0xE9),
    preset("Dark Red Fill", 0xEA, 0x99, 0x99),
    preset("Dark Orange Fill", 0xF9, 0xCB, 0x9C),
    preset("Dark Yellow Fill", 0xFF, 0xE5, 0x99),
    preset("Dark Green Fill", 0xB6, 0xD7, 0xA8),
    preset("Dark Blue Fill", 0xA2, 0xC4, 0xC9),
    preset("Dark Purple Fill", 0xB4, 0xA7, 0xD6),
];

/// The twelve named fill presets
pub fn format_presets() -> &'static [FormatPreset] {
    &FORMAT_PRESETS
}

/// Look up a preset by name (case-insensitive)
pub fn format_preset(name: &str) -> Option<&'static FormatPreset> {
    FORMAT_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}
