//! Evaluation context building
//!
//! Resolves every reference in a formula to a value (recursing into formula
//! cells) and substitutes the values into the formula text, producing a
//! literal expression with no references left.

use std::collections::HashMap;

use gridcalc_core::{is_formula, CellAddress, CellSource};
use regex::Regex;

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::FormulaValue;
use crate::formula::FormulaEngine;
use crate::references::{code_references, is_whole_token, split_literals, Segment};

/// Resolved references and the substituted formula text
///
/// Built fresh for every evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationContext {
    values: Vec<(String, FormulaValue)>,
    processed_formula: String,
}

impl EvaluationContext {
    /// Value resolved for a reference token as written in the formula
    pub fn get(&self, token: &str) -> Option<&FormulaValue> {
        self.values
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v)
    }

    /// Distinct tokens in order of first occurrence
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(t, _)| t.as_str())
    }

    /// The literal expression left after substitution
    pub fn processed_formula(&self) -> &str {
        &self.processed_formula
    }
}

/// Cells currently being resolved, outermost first, plus the formula cells
/// already resolved
///
/// Threaded through nested resolution so a formula that reaches its own
/// cell fails with [`FormulaError::CircularReference`]. A formula cell
/// reached more than once is evaluated the first time only.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    visiting: Vec<CellAddress>,
    resolved: HashMap<CellAddress, FormulaValue>,
}

impl Resolution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.visiting.len()
    }

    pub fn is_visiting(&self, addr: &CellAddress) -> bool {
        self.visiting.contains(addr)
    }

    pub(crate) fn enter(&mut self, addr: CellAddress, max_depth: usize) -> FormulaResult<()> {
        if self.is_visiting(&addr) {
            return Err(FormulaError::CircularReference(addr.to_a1_string()));
        }
        if self.visiting.len() >= max_depth {
            return Err(FormulaError::DepthExceeded(max_depth));
        }
        self.visiting.push(addr);
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.visiting.pop();
    }

    /// Value of a formula cell finished earlier in this resolution
    pub fn resolved(&self, addr: &CellAddress) -> Option<&FormulaValue> {
        self.resolved.get(addr)
    }

    pub(crate) fn remember(&mut self, addr: CellAddress, value: FormulaValue) {
        self.resolved.insert(addr, value);
    }
}

/// Strip a leading `=` and surrounding whitespace
pub fn clean_formula(formula: &str) -> &str {
    let trimmed = formula.trim();
    trimmed.strip_prefix('=').unwrap_or(trimmed).trim()
}

/// Replace whole-token occurrences of each token with its literal form
///
/// One pass over the text with the tokens tried longest first, so `A11`
/// is never rewritten through `A1`. Text inside string literals is copied
/// unchanged.
pub(crate) fn substitute(text: &str, values: &[(String, FormulaValue)]) -> FormulaResult<String> {
    if values.is_empty() {
        return Ok(text.to_string());
    }

    let mut tokens: Vec<&(String, FormulaValue)> = values.iter().collect();
    tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
    let pattern = tokens
        .iter()
        .map(|(t, _)| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    let re = Regex::new(&pattern)
        .map_err(|e| FormulaError::Parse(format!("bad substitution pattern: {}", e)))?;

    let mut out = String::with_capacity(text.len());
    for segment in split_literals(text) {
        let code = match segment {
            Segment::Literal(lit) => {
                out.push_str(lit);
                continue;
            }
            Segment::Code(code) => code,
        };

        let mut copied = 0;
        let mut pos = 0;
        while let Some(m) = re.find_at(code, pos) {
            if is_whole_token(code, m.start(), m.end()) {
                out.push_str(&code[copied..m.start()]);
                // The regex only matches tokens from `values`
                if let Some((_, value)) = tokens.iter().find(|(t, _)| t == m.as_str()) {
                    out.push_str(&value.to_literal());
                }
                copied = m.end();
                pos = m.end();
            } else {
                pos = m.start() + code[m.start()..].chars().next().map_or(1, char::len_utf8);
            }

            if pos > code.len() {
                break;
            }
        }
        out.push_str(&code[copied..]);
    }

    Ok(out)
}

impl<'a, S: CellSource + ?Sized> FormulaEngine<'a, S> {
    /// Resolve every reference in `formula` and substitute the values
    pub fn create_evaluation_context(
        &self,
        formula: &str,
        resolution: &mut Resolution,
    ) -> FormulaResult<EvaluationContext> {
        let clean = clean_formula(formula);

        let mut values: Vec<(String, FormulaValue)> = Vec::new();
        for token in code_references(clean, self.json().is_some()) {
            if values.iter().any(|(t, _)| *t == token) {
                continue;
            }
            let value = self.resolve_reference(&token, resolution)?;
            values.push((token, value));
        }

        let processed_formula = substitute(clean, &values)?;
        Ok(EvaluationContext {
            values,
            processed_formula,
        })
    }

    /// Resolve one reference token (cell or `data.*` path)
    fn resolve_reference(
        &self,
        token: &str,
        resolution: &mut Resolution,
    ) -> FormulaResult<FormulaValue> {
        if let Some(json) = self.json() {
            if token.starts_with(crate::json::JSON_ROOT) {
                return Ok(json.resolve_token(token));
            }
        }

        match CellAddress::parse(token) {
            Ok(addr) => self.resolve_cell(addr, resolution),
            Err(e) => {
                log::debug!("unresolvable reference {}: {}", token, e);
                Ok(FormulaValue::empty())
            }
        }
    }

    /// Value of a cell: empty when out of bounds, evaluated when a formula
    pub(crate) fn resolve_cell(
        &self,
        addr: CellAddress,
        resolution: &mut Resolution,
    ) -> FormulaResult<FormulaValue> {
        if resolution.is_visiting(&addr) {
            return Err(FormulaError::CircularReference(addr.to_a1_string()));
        }
        if let Some(value) = resolution.resolved(&addr) {
            return Ok(value.clone());
        }

        let text = match self.source().cell_text(addr.row, addr.col) {
            Some(text) => text,
            None => {
                log::debug!("reference {} is out of bounds", addr);
                return Ok(FormulaValue::empty());
            }
        };

        if is_formula(text) {
            let value = self.evaluate_cell_formula(addr, text, resolution)?;
            resolution.remember(addr, value.clone());
            Ok(value)
        } else {
            Ok(FormulaValue::from_cell_text(text))
        }
    }

    /// Evaluate the formula stored at `addr`, guarding against cycles
    pub(crate) fn evaluate_cell_formula(
        &self,
        addr: CellAddress,
        formula: &str,
        resolution: &mut Resolution,
    ) -> FormulaResult<FormulaValue> {
        resolution.enter(addr, self.options().max_depth)?;
        let result = self
            .create_evaluation_context(formula, resolution)
            .and_then(|ctx| crate::formula::evaluate_literal(ctx.processed_formula()));
        resolution.leave();
        result
    }
}
