//! Expression evaluator
//!
//! Evaluates expression ASTs to produce values.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};

/// Value types during formula evaluation
///
/// Unset and out-of-bounds cells resolve to `String("")`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Boolean(bool),
}

/// Parse text as a finite number, ignoring surrounding whitespace
///
/// Empty text is not a number here; arithmetic coercion treats it as zero
/// separately.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl FormulaValue {
    /// The empty value used for unset cells
    pub fn empty() -> Self {
        FormulaValue::String(String::new())
    }

    /// Coerce raw cell text: empty stays empty, numeric text becomes a number
    pub fn from_cell_text(text: &str) -> Self {
        if text.is_empty() {
            return FormulaValue::empty();
        }
        match parse_number(text) {
            Some(n) => FormulaValue::Number(n),
            None => FormulaValue::String(text.to_string()),
        }
    }

    /// Convert to number, if possible
    ///
    /// Booleans are 0/1, empty or blank text is 0, numeric text parses.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Boolean(true) => Some(1.0),
            FormulaValue::Boolean(false) => Some(0.0),
            FormulaValue::String(s) if s.trim().is_empty() => Some(0.0),
            FormulaValue::String(s) => parse_number(s),
        }
    }

    /// Force conversion to number for arithmetic
    pub fn to_number(&self) -> FormulaResult<f64> {
        self.as_number().ok_or_else(|| {
            FormulaError::Evaluation(format!("Cannot convert {} to number", self.to_literal()))
        })
    }

    /// Truthiness: non-empty text, non-zero number, `true`
    pub fn is_truthy(&self) -> bool {
        match self {
            FormulaValue::Boolean(b) => *b,
            FormulaValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FormulaValue::String(s) => !s.is_empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FormulaValue::String(s) if s.is_empty())
    }

    /// Convert to display string
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::String(s) => s.clone(),
            FormulaValue::Boolean(true) => "true".to_string(),
            FormulaValue::Boolean(false) => "false".to_string(),
        }
    }

    /// Render as expression source text that parses back to this value
    ///
    /// Negative numbers are parenthesized so they stay atomic after
    /// substitution (`2-(-3)` rather than `2--3`).
    pub fn to_literal(&self) -> String {
        match self {
            FormulaValue::Number(n) if *n < 0.0 => format!("({})", format_number(*n)),
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::Boolean(b) => b.to_string(),
            FormulaValue::String(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
                out
            }
        }
    }
}

fn format_number(n: f64) -> String {
    // Integers print without a fractional part
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for FormulaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<f64> for FormulaValue {
    fn from(n: f64) -> Self {
        FormulaValue::Number(n)
    }
}

impl From<bool> for FormulaValue {
    fn from(b: bool) -> Self {
        FormulaValue::Boolean(b)
    }
}

impl From<&str> for FormulaValue {
    fn from(s: &str) -> Self {
        FormulaValue::String(s.to_string())
    }
}

impl From<String> for FormulaValue {
    fn from(s: String) -> Self {
        FormulaValue::String(s)
    }
}

/// Variables visible to an expression
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, FormulaValue>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any earlier binding
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FormulaValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FormulaValue> {
        self.values.get(name)
    }
}

/// Evaluate an expression AST
pub fn evaluate(expr: &Expr, bindings: &Bindings) -> FormulaResult<FormulaValue> {
    match expr {
        Expr::Number(n) => Ok(FormulaValue::Number(*n)),
        Expr::String(s) => Ok(FormulaValue::String(s.clone())),
        Expr::Boolean(b) => Ok(FormulaValue::Boolean(*b)),

        Expr::Variable(name) => bindings
            .get(name)
            .cloned()
            .ok_or_else(|| FormulaError::Evaluation(format!("Unknown identifier '{}'", name))),

        Expr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, bindings),

        Expr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand, bindings),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &Expr,
    right: &Expr,
    bindings: &Bindings,
) -> FormulaResult<FormulaValue> {
    // Logical operators short-circuit
    match op {
        BinaryOperator::Or => {
            if evaluate(left, bindings)?.is_truthy() {
                return Ok(FormulaValue::Boolean(true));
            }
            return Ok(FormulaValue::Boolean(evaluate(right, bindings)?.is_truthy()));
        }
        BinaryOperator::And => {
            if !evaluate(left, bindings)?.is_truthy() {
                return Ok(FormulaValue::Boolean(false));
            }
            return Ok(FormulaValue::Boolean(evaluate(right, bindings)?.is_truthy()));
        }
        _ => {}
    }

    let left_val = evaluate(left, bindings)?;
    let right_val = evaluate(right, bindings)?;

    if op.is_comparison() {
        return Ok(FormulaValue::Boolean(compare(op, &left_val, &right_val)));
    }

    let result = match op {
        BinaryOperator::Concat => {
            return Ok(FormulaValue::String(format!(
                "{}{}",
                left_val.as_string(),
                right_val.as_string()
            )))
        }
        BinaryOperator::Add => match (left_val.as_number(), right_val.as_number()) {
            (Some(l), Some(r)) => l + r,
            // Anything non-numeric turns `+` into concatenation
            _ => {
                return Ok(FormulaValue::String(format!(
                    "{}{}",
                    left_val.as_string(),
                    right_val.as_string()
                )))
            }
        },
        BinaryOperator::Subtract => left_val.to_number()? - right_val.to_number()?,
        BinaryOperator::Multiply => left_val.to_number()? * right_val.to_number()?,
        BinaryOperator::Divide => {
            let l = left_val.to_number()?;
            let r = right_val.to_number()?;
            if r == 0.0 {
                return Err(FormulaError::Evaluation("Division by zero".into()));
            }
            l / r
        }
        BinaryOperator::Modulo => {
            let l = left_val.to_number()?;
            let r = right_val.to_number()?;
            if r == 0.0 {
                return Err(FormulaError::Evaluation("Modulo by zero".into()));
            }
            l % r
        }
        BinaryOperator::Power => left_val.to_number()?.powf(right_val.to_number()?),
        other => {
            return Err(FormulaError::Evaluation(format!(
                "{:?} is not an arithmetic operator",
                other
            )))
        }
    };

    if !result.is_finite() {
        return Err(FormulaError::Evaluation(format!(
            "Result of {:?} is not a finite number",
            op
        )));
    }
    Ok(FormulaValue::Number(result))
}

/// Apply a comparison operator
///
/// `=`/`!=` use loose equality. Ordering compares two strings
/// lexicographically and everything else numerically; a side that is not
/// numeric makes the ordering false.
pub fn compare(op: BinaryOperator, left: &FormulaValue, right: &FormulaValue) -> bool {
    match op {
        BinaryOperator::Equal => loose_equals(left, right),
        BinaryOperator::NotEqual => !loose_equals(left, right),
        BinaryOperator::LessThan => order(left, right) == Some(Ordering::Less),
        BinaryOperator::LessEqual => matches!(
            order(left, right),
            Some(Ordering::Less) | Some(Ordering::Equal)
        ),
        BinaryOperator::GreaterThan => order(left, right) == Some(Ordering::Greater),
        BinaryOperator::GreaterEqual => matches!(
            order(left, right),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        ),
        _ => false,
    }
}

fn loose_equals(left: &FormulaValue, right: &FormulaValue) -> bool {
    match (left, right) {
        (FormulaValue::String(l), FormulaValue::String(r)) => l == r,
        _ => match (left.as_number(), right.as_number()) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
    }
}

fn order(left: &FormulaValue, right: &FormulaValue) -> Option<Ordering> {
    match (left, right) {
        (FormulaValue::String(l), FormulaValue::String(r)) => Some(l.cmp(r)),
        _ => left.as_number()?.partial_cmp(&right.as_number()?),
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(
    op: UnaryOperator,
    operand: &Expr,
    bindings: &Bindings,
) -> FormulaResult<FormulaValue> {
    let val = evaluate(operand, bindings)?;

    match op {
        UnaryOperator::Negate => Ok(FormulaValue::Number(-val.to_number()?)),
        UnaryOperator::Plus => Ok(FormulaValue::Number(val.to_number()?)),
        UnaryOperator::Not => Ok(FormulaValue::Boolean(!val.is_truthy())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;
    use pretty_assertions::assert_eq;

    fn eval(text: &str) -> FormulaResult<FormulaValue> {
        evaluate(&parse_expression(text)?, &Bindings::new())
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1+2*3").unwrap(), FormulaValue::Number(7.0));
        assert_eq!(eval("(1+2)*3").unwrap(), FormulaValue::Number(9.0));
        assert_eq!(eval("7 % 4").unwrap(), FormulaValue::Number(3.0));
        assert_eq!(eval("2^10").unwrap(), FormulaValue::Number(1024.0));
        assert_eq!(eval("2-(-3)").unwrap(), FormulaValue::Number(5.0));
        assert_eq!(eval("-2^2").unwrap(), FormulaValue::Number(4.0));
    }

    #[test]
    fn test_add_concatenates_text() {
        assert_eq!(eval("\"a\"+1").unwrap(), FormulaValue::String("a1".into()));
        assert_eq!(eval("\"\"+\"\"").unwrap(), FormulaValue::Number(0.0));
        assert_eq!(eval("\"2\"+3").unwrap(), FormulaValue::Number(5.0));
        assert_eq!(eval("\"x\" & 1 & true").unwrap(), FormulaValue::String("x1true".into()));
    }

    #[test]
    fn test_arithmetic_errors() {
        assert!(matches!(eval("1/0"), Err(FormulaError::Evaluation(_))));
        assert!(matches!(eval("1%0"), Err(FormulaError::Evaluation(_))));
        assert!(matches!(eval("\"a\"*2"), Err(FormulaError::Evaluation(_))));
        assert!(matches!(eval("10^400"), Err(FormulaError::Evaluation(_))));
        assert!(matches!(eval("unknown"), Err(FormulaError::Evaluation(_))));
    }

    #[test]
    fn test_loose_equality() {
        assert_eq!(eval("5 = 5").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("5 == \"5\"").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("1 == true").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("\"\" == 0").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("\"a\" != \"b\"").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("\"a\" <> \"a\"").unwrap(), FormulaValue::Boolean(false));
    }

    #[test]
    fn test_ordering() {
        assert_eq!(eval("10 > 5").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("\"10\" > \"5\"").unwrap(), FormulaValue::Boolean(false));
        assert_eq!(eval("\"10\" > 5").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("\"abc\" < 5").unwrap(), FormulaValue::Boolean(false));
        assert_eq!(eval("\"abc\" >= 5").unwrap(), FormulaValue::Boolean(false));
    }

    #[test]
    fn test_logical() {
        assert_eq!(eval("1 < 2 && 2 < 3").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("0 || \"\"").unwrap(), FormulaValue::Boolean(false));
        assert_eq!(eval("!0").unwrap(), FormulaValue::Boolean(true));
        // Right side is never evaluated
        assert_eq!(eval("false && 1/0").unwrap(), FormulaValue::Boolean(false));
        assert_eq!(eval("true || missing").unwrap(), FormulaValue::Boolean(true));
    }

    #[test]
    fn test_bindings() {
        let bindings = Bindings::new().with("value", 12.0);
        let expr = parse_expression("value > 10 && value < 20").unwrap();
        assert_eq!(evaluate(&expr, &bindings).unwrap(), FormulaValue::Boolean(true));
    }

    #[test]
    fn test_literal_round_trip() {
        for value in [
            FormulaValue::Number(-3.5),
            FormulaValue::Number(42.0),
            FormulaValue::Boolean(false),
            FormulaValue::String(r#"quote " and \ slash"#.into()),
        ] {
            assert_eq!(eval(&value.to_literal()).unwrap(), value);
        }
    }

    #[test]
    fn test_from_cell_text() {
        assert_eq!(FormulaValue::from_cell_text(""), FormulaValue::empty());
        assert_eq!(FormulaValue::from_cell_text(" 12.5 "), FormulaValue::Number(12.5));
        assert_eq!(FormulaValue::from_cell_text("12abc"), FormulaValue::String("12abc".into()));
        assert_eq!(FormulaValue::from_cell_text("inf"), FormulaValue::String("inf".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(FormulaValue::Number(7.0).to_string(), "7");
        assert_eq!(FormulaValue::Number(0.5).to_string(), "0.5");
        assert_eq!(FormulaValue::Boolean(true).to_string(), "true");
    }
}
