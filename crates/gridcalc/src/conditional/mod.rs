//! Conditional formatting rule engine
//!
//! The engine owns an ordered list of [`ConditionalRule`]s and reapplies
//! them to a grid in one cycle:
//!
//! 1. **Reset** - every cell carrying rule formatting loses the properties
//!    a rule set on it, leaving user formatting alone
//! 2. **Apply** - each rule, in order, is tested against every in-bounds
//!    cell of its range; matches merge the rule's format into the cell
//! 3. **Commit** - all changed formatting is written back in one batch
//!
//! Nothing is recomputed implicitly. Callers report changes with
//! [`RuleEngine::notify_grid_changed`] (rule edits report themselves) and
//! call [`RuleEngine::settle`] to run at most one reapplication.
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut grid = Grid::new(3, 1);
//! grid.set_cell("A1", "5").unwrap();
//! grid.set_cell("A2", "50").unwrap();
//!
//! let mut engine = RuleEngine::new();
//! engine.push_rule(
//!     ConditionalRule::greater_than(1, "10")
//!         .with_range(RuleRange::parse("A1:A3").unwrap())
//!         .with_format(FormatDelta::new().with_bold(true)),
//! );
//! assert!(engine.settle(&mut grid).unwrap());
//!
//! assert!(!grid.formatting_at(0, 0).unwrap().bold);
//! assert!(grid.formatting_at(1, 0).unwrap().bold);
//! ```

mod condition;
mod editor;

pub use condition::{evaluate_condition, parse_date};
pub use editor::{RuleEditor, DEFAULT_EDITOR_FILL};

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Utc;
use gridcalc_core::{
    CellAddress, CellFormatting, CellSource, ConditionKind, ConditionalRule, FormattingStore,
    RuleRange,
};
use gridcalc_formula::{EvaluationOptions, FormulaEngine, JsonData};

use crate::error::{Error, Result};

/// Which text a condition is tested against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ConditionInput {
    /// The cell's display value (formulas evaluated)
    #[default]
    DisplayValue,
    /// The cell's raw text (formulas as written)
    RawText,
}

/// Options for the rule engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RuleEngineOptions {
    pub condition_input: ConditionInput,
    /// Options for display values and `custom_formula` rules
    pub evaluation: EvaluationOptions,
}

impl RuleEngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition_input(mut self, condition_input: ConditionInput) -> Self {
        self.condition_input = condition_input;
        self
    }

    pub fn with_evaluation(mut self, evaluation: EvaluationOptions) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Load options from JSON; missing fields take their defaults
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Json(e.to_string()))
    }
}

/// Parse a JSON array of rules
#[cfg(feature = "serde")]
pub fn rules_from_json(text: &str) -> Result<Vec<ConditionalRule>> {
    serde_json::from_str(text).map_err(|e| Error::Json(e.to_string()))
}

/// Conditional formatting state: rules, editor draft and tracked cells
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<ConditionalRule>,
    editor: RuleEditor,
    /// Cells that currently carry rule formatting
    tracked: BTreeSet<CellAddress>,
    grid_changed: bool,
    rules_changed: bool,
    last_id: u64,
    options: RuleEngineOptions,
    json: Option<JsonData>,
}

impl RuleEngine {
    /// Create an engine with no rules
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: RuleEngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Bind JSON data for `data.*` tokens in `custom_formula` rules and
    /// display values
    pub fn with_json(mut self, json: JsonData) -> Self {
        self.json = Some(json);
        self
    }

    pub fn options(&self) -> &RuleEngineOptions {
        &self.options
    }

    /// Replace the JSON data and mark the grid changed
    pub fn set_json(&mut self, json: Option<JsonData>) {
        self.json = json;
        self.notify_grid_changed();
    }

    pub fn json(&self) -> Option<&JsonData> {
        self.json.as_ref()
    }

    // === Rules ===

    /// Rules in application order
    pub fn rules(&self) -> &[ConditionalRule] {
        &self.rules
    }

    pub fn rule(&self, id: u64) -> Option<&ConditionalRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Cells currently carrying rule formatting
    pub fn tracked_cells(&self) -> impl Iterator<Item = &CellAddress> {
        self.tracked.iter()
    }

    fn next_id(&mut self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.last_id = now.max(self.last_id.saturating_add(1));
        self.last_id
    }

    /// Append a rule, returning its id
    ///
    /// A rule whose id is not above every id issued so far gets a fresh one.
    pub fn push_rule(&mut self, mut rule: ConditionalRule) -> u64 {
        if rule.id <= self.last_id {
            rule.id = self.next_id();
        } else {
            self.last_id = rule.id;
        }
        self.insert_rule(rule)
    }

    fn insert_rule(&mut self, rule: ConditionalRule) -> u64 {
        let id = rule.id;
        log::debug!("adding {} rule {} over {}", rule.kind, id, rule.range);
        self.rules.push(rule);
        self.notify_rules_changed();
        id
    }

    // === Editor ===

    pub fn editor(&self) -> &RuleEditor {
        &self.editor
    }

    /// Mutable draft, for setting kind, criteria and format
    pub fn editor_mut(&mut self) -> &mut RuleEditor {
        &mut self.editor
    }

    /// Open a blank draft over `range`
    pub fn open_conditional_formatting(&mut self, range: RuleRange) {
        self.editor.open(range);
    }

    pub fn close_conditional_formatting(&mut self) {
        self.editor.close();
    }

    /// Append the draft as a new rule and close the editor
    pub fn add_conditional_rule(&mut self) -> u64 {
        let id = self.next_id();
        let rule = self.editor.to_rule(id);
        self.editor.close();
        self.insert_rule(rule)
    }

    /// Load an existing rule into the editor
    pub fn edit_conditional_rule(&mut self, id: u64) -> Result<()> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.id == id)
            .ok_or(Error::UnknownRule(id))?;
        self.editor.load(rule);
        Ok(())
    }

    /// Replace the rule being edited with the draft, keeping its position
    pub fn update_conditional_rule(&mut self) -> Result<()> {
        let id = self.editor.editing_rule.ok_or(Error::NotEditing)?;
        let slot = self
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::UnknownRule(id))?;
        *slot = self.editor.to_rule(id);
        self.editor.close();
        self.notify_rules_changed();
        Ok(())
    }

    /// Remove a rule, returning it
    pub fn delete_conditional_rule(&mut self, id: u64) -> Result<ConditionalRule> {
        let index = self
            .rules
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::UnknownRule(id))?;
        let rule = self.rules.remove(index);
        if self.editor.editing_rule == Some(id) {
            self.editor.editing_rule = None;
            self.editor.close();
        }
        self.notify_rules_changed();
        Ok(rule)
    }

    // === Triggering ===

    /// Report that cell contents or grid dimensions changed
    pub fn notify_grid_changed(&mut self) {
        self.grid_changed = true;
    }

    /// Report that the rule list changed
    pub fn notify_rules_changed(&mut self) {
        self.rules_changed = true;
    }

    /// Whether a reapplication is pending
    pub fn is_pending(&self) -> bool {
        self.grid_changed || self.rules_changed
    }

    /// Run one reapplication if anything changed since the last one
    ///
    /// Returns whether a reapplication ran. Any number of notifications
    /// between two calls collapse into a single pass.
    pub fn settle<S>(&mut self, grid: &mut S) -> Result<bool>
    where
        S: CellSource + FormattingStore + ?Sized,
    {
        if !self.is_pending() {
            return Ok(false);
        }
        self.apply_conditional_formatting_to_grid(grid)?;
        Ok(true)
    }

    // === Application ===

    /// Reset, reapply every rule and commit the result to `grid`
    pub fn apply_conditional_formatting_to_grid<S>(&mut self, grid: &mut S) -> Result<()>
    where
        S: CellSource + FormattingStore + ?Sized,
    {
        self.grid_changed = false;
        self.rules_changed = false;

        let mut pending: BTreeMap<CellAddress, CellFormatting> = BTreeMap::new();

        // Reset
        for addr in std::mem::take(&mut self.tracked) {
            if !grid.in_bounds(addr.row, addr.col) {
                log::debug!("untracking {}: no longer in the grid", addr);
                continue;
            }
            let mut formatting = grid
                .cell_formatting(addr.row, addr.col)
                .cloned()
                .unwrap_or_default();
            formatting.clear_rule_formatting();
            pending.insert(addr, formatting);
        }
        // Rule formatting moved away from its tracked cell, e.g. by a row
        // or column insertion
        for row in 0..grid.row_count() {
            for col in 0..grid.col_count() {
                let addr = CellAddress::new(row, col);
                if pending.contains_key(&addr) {
                    continue;
                }
                if let Some(formatting) = grid.cell_formatting(row, col) {
                    if formatting.has_rule_formatting() {
                        log::debug!("clearing untracked rule formatting at {}", addr);
                        let mut formatting = formatting.clone();
                        formatting.clear_rule_formatting();
                        pending.insert(addr, formatting);
                    }
                }
            }
        }

        // Apply
        let matches = self.collect_matches(&*grid);
        for (addr, index) in matches {
            let formatting = pending.entry(addr).or_insert_with(|| {
                grid.cell_formatting(addr.row, addr.col)
                    .cloned()
                    .unwrap_or_default()
            });
            formatting.apply_rule_delta(&self.rules[index].format);
            self.tracked.insert(addr);
        }

        // Commit
        log::debug!(
            "committing formatting for {} cells ({} rule-formatted)",
            pending.len(),
            self.tracked.len()
        );
        grid.update_formatting_batch(pending.into_iter().collect())?;
        Ok(())
    }

    /// Every (cell, rule index) match, in rule order
    fn collect_matches<S: CellSource + ?Sized>(&self, source: &S) -> Vec<(CellAddress, usize)> {
        let mut engine =
            FormulaEngine::new(source).with_options(self.options.evaluation.clone());
        if let Some(json) = &self.json {
            engine = engine.with_json(json);
        }

        let rows = source.row_count();
        let cols = source.col_count();
        let mut values: HashMap<CellAddress, String> = HashMap::new();
        let mut matches = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            let range = match rule.range.normalized().clip(rows, cols) {
                Some(range) => range,
                None => continue,
            };

            // Independent of the cell, so evaluated once per pass
            let grid_wide = (rule.kind == ConditionKind::CustomFormula)
                .then(|| engine.evaluate_predicate(&rule.criterion1));

            for addr in range.cells() {
                let matched = match grid_wide {
                    Some(matched) => matched,
                    None => {
                        let value = values
                            .entry(addr)
                            .or_insert_with(|| self.condition_value(&engine, addr));
                        evaluate_condition(&engine, rule, value.as_str())
                    }
                };
                if matched {
                    matches.push((addr, index));
                }
            }
        }

        matches
    }

    fn condition_value<S: CellSource + ?Sized>(
        &self,
        engine: &FormulaEngine<'_, S>,
        addr: CellAddress,
    ) -> String {
        match self.options.condition_input {
            ConditionInput::DisplayValue => engine.display_value(addr.row, addr.col),
            ConditionInput::RawText => engine
                .source()
                .cell_text(addr.row, addr.col)
                .unwrap_or_default()
                .to_string(),
        }
    }
}
