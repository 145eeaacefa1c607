//! Draft state for creating or editing one conditional rule

use gridcalc_core::{Color, ConditionKind, ConditionalRule, FormatDelta, RuleRange};

/// Fill a freshly opened editor starts with (light green, black text)
pub const DEFAULT_EDITOR_FILL: Color = Color::rgb(0xD9, 0xEA, 0xD3);

/// The rule being drafted
///
/// Opening the editor resets it; editing an existing rule loads that rule
/// and remembers its id in `editing_rule`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEditor {
    pub is_open: bool,
    pub selected_range: RuleRange,
    /// Id of the rule being edited, `None` when drafting a new one
    pub editing_rule: Option<u64>,
    pub selected_kind: ConditionKind,
    pub criterion1: String,
    pub criterion2: String,
    pub selected_format: FormatDelta,
}

impl Default for RuleEditor {
    fn default() -> Self {
        Self {
            is_open: false,
            selected_range: RuleRange::default(),
            editing_rule: None,
            selected_kind: ConditionKind::NotEmpty,
            criterion1: String::new(),
            criterion2: String::new(),
            selected_format: FormatDelta::fill(DEFAULT_EDITOR_FILL, Color::BLACK),
        }
    }
}

impl RuleEditor {
    /// Open a blank draft over `range`
    pub fn open(&mut self, range: RuleRange) {
        *self = Self {
            is_open: true,
            selected_range: range,
            ..Self::default()
        };
    }

    /// Open the editor on an existing rule
    pub fn load(&mut self, rule: &ConditionalRule) {
        self.is_open = true;
        self.selected_range = rule.range;
        self.editing_rule = Some(rule.id);
        self.selected_kind = rule.kind;
        self.criterion1 = rule.criterion1.clone();
        self.criterion2 = rule.criterion2.clone();
        self.selected_format = rule.format.clone();
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// The draft as a rule with the given id
    pub fn to_rule(&self, id: u64) -> ConditionalRule {
        ConditionalRule::new(id, self.selected_kind)
            .with_range(self.selected_range)
            .with_criterion1(self.criterion1.clone())
            .with_criterion2(self.criterion2.clone())
            .with_format(self.selected_format.clone())
    }
}
