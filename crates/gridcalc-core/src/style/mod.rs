//! Cell formatting types
//!
//! [`CellFormatting`] is the stored per-cell formatting. [`FormatDelta`] is a
//! partial overlay (as carried by a conditional rule) where `None` means
//! "leave the property alone".

mod color;

pub use color::Color;

use std::collections::BTreeSet;

/// A single formatting property that a conditional rule can control
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum FormatProperty {
    Background,
    TextColor,
    Bold,
    Italic,
    Underline,
}

/// Formatting stored for one cell
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CellFormatting {
    /// Fill color (`Auto` = transparent)
    pub background: Color,
    /// Text color
    pub text_color: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Properties currently set by a conditional rule rather than the user
    pub rule_origin: BTreeSet<FormatProperty>,
}

impl Default for CellFormatting {
    fn default() -> Self {
        Self {
            background: Color::Auto,
            text_color: Color::BLACK,
            bold: false,
            italic: false,
            underline: false,
            rule_origin: BTreeSet::new(),
        }
    }
}

impl CellFormatting {
    /// Create default formatting
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any property is currently controlled by a rule
    pub fn has_rule_formatting(&self) -> bool {
        !self.rule_origin.is_empty()
    }

    /// Overlay a rule's delta, recording every property it sets
    pub fn apply_rule_delta(&mut self, delta: &FormatDelta) {
        if let Some(bg) = delta.background {
            self.background = bg;
            self.rule_origin.insert(FormatProperty::Background);
        }
        if let Some(color) = delta.text_color {
            self.text_color = color;
            self.rule_origin.insert(FormatProperty::TextColor);
        }
        if let Some(bold) = delta.bold {
            self.bold = bold;
            self.rule_origin.insert(FormatProperty::Bold);
        }
        if let Some(italic) = delta.italic {
            self.italic = italic;
            self.rule_origin.insert(FormatProperty::Italic);
        }
        if let Some(underline) = delta.underline {
            self.underline = underline;
            self.rule_origin.insert(FormatProperty::Underline);
        }
    }

    /// Restore defaults for exactly the rule-controlled properties
    ///
    /// Properties the user set directly are left untouched.
    pub fn clear_rule_formatting(&mut self) {
        let defaults = CellFormatting::default();
        for prop in std::mem::take(&mut self.rule_origin) {
            match prop {
                FormatProperty::Background => self.background = defaults.background,
                FormatProperty::TextColor => self.text_color = defaults.text_color,
                FormatProperty::Bold => self.bold = defaults.bold,
                FormatProperty::Italic => self.italic = defaults.italic,
                FormatProperty::Underline => self.underline = defaults.underline,
            }
        }
    }
}

/// Partial formatting applied by a conditional rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormatDelta {
    pub background: Option<Color>,
    pub text_color: Option<Color>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
}

impl FormatDelta {
    /// Create an empty delta
    pub fn new() -> Self {
        Self::default()
    }

    /// A fully-specified delta: the given colors with all flags off
    pub fn fill(background: Color, text_color: Color) -> Self {
        Self {
            background: Some(background),
            text_color: Some(text_color),
            bold: Some(false),
            italic: Some(false),
            underline: Some(false),
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = Some(color);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = Some(underline);
        self
    }

    /// Whether the delta sets nothing
    pub fn is_empty(&self) -> bool {
        self.background.is_none()
            && self.text_color.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
    }
}
