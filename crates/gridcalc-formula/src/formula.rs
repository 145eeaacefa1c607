//! Formula entry points
//!
//! Three ways to evaluate a formula against a [`CellSource`]:
//! - predicate ([`evaluate_formula`]): `true`/`false`, failures are `false`
//! - value ([`evaluate_formula_value`]): the raw value, failures are `#ERROR!`
//! - display ([`display_cell_value`]): text for a cell, failures are `Try Again!`
//!
//! None of them return errors; the `try_*` variants expose the underlying
//! [`FormulaError`] instead.

use gridcalc_core::{is_formula, CellAddress, CellSource};
use lazy_regex::regex_captures;

use crate::ast::BinaryOperator;
use crate::context::{clean_formula, Resolution};
use crate::error::FormulaResult;
use crate::evaluator::{compare, evaluate, Bindings, FormulaValue};
use crate::json::JsonData;
use crate::options::EvaluationOptions;
use crate::parser::parse_expression;

/// Evaluate a reference-free expression
pub fn evaluate_literal(text: &str) -> FormulaResult<FormulaValue> {
    evaluate(&parse_expression(text)?, &Bindings::new())
}

/// Evaluates formulas against a cell source
///
/// ```rust
/// use gridcalc_core::Grid;
/// use gridcalc_formula::{FormulaEngine, FormulaValue};
///
/// let grid = Grid::from_rows(vec![vec!["10", "5", "=A1*B1"]]);
/// let engine = FormulaEngine::new(&grid);
///
/// assert!(engine.evaluate_predicate("=A1>B1"));
/// assert_eq!(engine.evaluate_value("=C1+1"), FormulaValue::Number(51.0));
/// assert_eq!(engine.display_value(0, 2), "50");
/// ```
pub struct FormulaEngine<'a, S: CellSource + ?Sized> {
    source: &'a S,
    json: Option<&'a JsonData>,
    options: EvaluationOptions,
}

impl<'a, S: CellSource + ?Sized> FormulaEngine<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            json: None,
            options: EvaluationOptions::default(),
        }
    }

    /// Resolve `data.*` tokens against `json`
    pub fn with_json(mut self, json: &'a JsonData) -> Self {
        self.json = Some(json);
        self
    }

    pub fn with_options(mut self, options: EvaluationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(&self) -> &'a S {
        self.source
    }

    pub fn json(&self) -> Option<&'a JsonData> {
        self.json
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    // === Fallible entry points ===

    /// Evaluate a formula not tied to any cell
    pub fn try_evaluate_value(&self, formula: &str) -> FormulaResult<FormulaValue> {
        let ctx = self.create_evaluation_context(formula, &mut Resolution::new())?;
        evaluate_literal(ctx.processed_formula())
    }

    /// Evaluate `formula` as if stored at `at`, so references back to `at`
    /// are circular
    pub fn try_evaluate_value_at(&self, formula: &str, at: CellAddress) -> FormulaResult<FormulaValue> {
        self.evaluate_cell_formula(at, formula, &mut Resolution::new())
    }

    /// Evaluate a formula as a predicate
    ///
    /// A single top-level comparison is evaluated side by side; anything else
    /// is evaluated whole and coerced to truthiness.
    pub fn try_evaluate_predicate(&self, formula: &str) -> FormulaResult<bool> {
        let ctx = self.create_evaluation_context(formula, &mut Resolution::new())?;
        let processed = ctx.processed_formula();

        if let Some(result) = comparison_fast_path(processed) {
            return Ok(result);
        }

        Ok(evaluate_literal(processed)?.is_truthy())
    }

    /// The value of cell (row, col): evaluated if it holds a formula
    pub fn try_cell_value(&self, row: usize, col: usize) -> FormulaResult<FormulaValue> {
        self.resolve_cell(CellAddress::new(row, col), &mut Resolution::new())
    }

    /// Display text for cell (row, col)
    ///
    /// Plain text is returned unchanged; out-of-bounds cells are empty.
    pub fn try_display_value(&self, row: usize, col: usize) -> FormulaResult<String> {
        match self.source.cell_text(row, col) {
            None => Ok(String::new()),
            Some(text) if !is_formula(text) => Ok(text.to_string()),
            Some(text) => Ok(self
                .evaluate_cell_formula(CellAddress::new(row, col), text, &mut Resolution::new())?
                .as_string()),
        }
    }

    // === Total entry points ===

    /// Predicate evaluation; any failure is `false`
    pub fn evaluate_predicate(&self, formula: &str) -> bool {
        self.try_evaluate_predicate(formula).unwrap_or_else(|e| {
            log::warn!("formula '{}' failed as predicate: {}", formula, e);
            false
        })
    }

    /// Value evaluation; any failure is the error marker string
    pub fn evaluate_value(&self, formula: &str) -> FormulaValue {
        self.try_evaluate_value(formula).unwrap_or_else(|e| {
            log::warn!("formula '{}' failed: {}", formula, e);
            FormulaValue::String(self.options.error_marker.clone())
        })
    }

    /// Display text; any failure is the display error marker
    pub fn display_value(&self, row: usize, col: usize) -> String {
        self.try_display_value(row, col).unwrap_or_else(|e| {
            log::warn!(
                "cell {} failed to evaluate: {}",
                CellAddress::new(row, col),
                e
            );
            self.options.display_error_marker.clone()
        })
    }
}

/// Compare the two sides of a single top-level comparison
///
/// Returns `None` when the text is not a lone comparison or a side fails to
/// evaluate, leaving the caller to evaluate the whole expression.
fn comparison_fast_path(processed: &str) -> Option<bool> {
    let (_, left, symbol, right) =
        regex_captures!(r"^([^<>=!]+?)\s*(<>|[<>=!]=?)\s*(.+)$", processed)?;
    let op = BinaryOperator::from_comparison_symbol(symbol)?;

    // Only a lone comparison: no second comparison or logical operator
    let right = right.trim();
    if right.contains(['<', '>', '=', '!'])
        || [left, right]
            .iter()
            .any(|side| side.contains("&&") || side.contains("||"))
    {
        return None;
    }

    match (evaluate_literal(left.trim()), evaluate_literal(right)) {
        (Ok(l), Ok(r)) => Some(compare(op, &l, &r)),
        (Err(e), _) | (_, Err(e)) => {
            log::debug!("comparison fast path fell back for '{}': {}", processed, e);
            None
        }
    }
}

// === Free-function entry points ===

/// Evaluate `formula` as a predicate over `source`; failures are `false`
///
/// ```rust
/// use gridcalc_core::Grid;
/// use gridcalc_formula::evaluate_formula;
///
/// let grid = Grid::from_rows(vec![vec!["10", "5"]]);
/// assert!(evaluate_formula("A1>B1", &grid));
/// assert!(!evaluate_formula("A1<B1", &grid));
/// ```
pub fn evaluate_formula<S: CellSource + ?Sized>(formula: &str, source: &S) -> bool {
    FormulaEngine::new(source).evaluate_predicate(formula)
}

/// Evaluate `formula` to a value over `source`; failures are `#ERROR!`
pub fn evaluate_formula_value<S: CellSource + ?Sized>(formula: &str, source: &S) -> FormulaValue {
    FormulaEngine::new(source).evaluate_value(formula)
}

/// Display text of cell (row, col); failures are `Try Again!`
pub fn display_cell_value<S: CellSource + ?Sized>(source: &S, row: usize, col: usize) -> String {
    FormulaEngine::new(source).display_value(row, col)
}

pub fn try_evaluate_formula<S: CellSource + ?Sized>(formula: &str, source: &S) -> FormulaResult<bool> {
    FormulaEngine::new(source).try_evaluate_predicate(formula)
}

pub fn try_evaluate_formula_value<S: CellSource + ?Sized>(
    formula: &str,
    source: &S,
) -> FormulaResult<FormulaValue> {
    FormulaEngine::new(source).try_evaluate_value(formula)
}

pub fn try_display_cell_value<S: CellSource + ?Sized>(
    source: &S,
    row: usize,
    col: usize,
) -> FormulaResult<String> {
    FormulaEngine::new(source).try_display_value(row, col)
}

/// The formula text without its leading `=`, if `text` is a formula
pub fn formula_body(text: &str) -> Option<&str> {
    is_formula(text.trim_start()).then(|| clean_formula(text))
}
