//! Evaluation options

/// Marker returned by the value path when evaluation fails
pub const ERROR_MARKER: &str = "#ERROR!";
/// Marker shown by the display path when evaluation fails
pub const DISPLAY_ERROR_MARKER: &str = "Try Again!";
/// Default cap on nested formula resolution
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options controlling formula evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvaluationOptions {
    /// Deepest chain of formula-in-formula resolution
    pub max_depth: usize,
    /// Value-path failure marker
    pub error_marker: String,
    /// Display-path failure marker
    pub display_error_marker: String,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            error_marker: ERROR_MARKER.to_string(),
            display_error_marker: DISPLAY_ERROR_MARKER.to_string(),
        }
    }
}

impl EvaluationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
