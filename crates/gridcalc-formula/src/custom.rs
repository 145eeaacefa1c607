//! Custom predicate mini-language for conditional formatting
//!
//! Expressions are tested against a single cell value, without grid access:
//!
//! | form | example |
//! |---|---|
//! | numeric comparison | `>= 10` |
//! | bounded range | `> 5 && < 10` |
//! | text containment | `contains "foo"` |
//! | text equality | `== "done"` |
//! | composition | `< 0 \|\| > 100`, `contains "a" && contains "b"` |
//! | anything else | an expression over the variable `value` |

use lazy_regex::regex_captures;

use crate::evaluator::{evaluate, parse_number, Bindings, FormulaValue};
use crate::parser::parse_expression;

/// Variable the fallback form binds to the cell value
pub const VALUE_VARIABLE: &str = "value";

/// Test `expression` against `cell_value`
///
/// Never fails: anything that cannot be evaluated is a non-match.
///
/// ```rust
/// use gridcalc_formula::evaluate_custom_expression;
///
/// assert!(evaluate_custom_expression("> 5 && < 10", "7"));
/// assert!(!evaluate_custom_expression("> 5 && < 10", "12"));
/// assert!(evaluate_custom_expression(r#"contains "foo""#, "foobar"));
/// ```
pub fn evaluate_custom_expression(expression: &str, cell_value: &str) -> bool {
    if cell_value.is_empty() {
        return false;
    }

    let number = parse_number(cell_value);

    // `>= 10`
    if let Some((_, op, bound)) = regex_captures!(
        r"^\s*(>=|<=|==|!=|>|<)\s*(-?\d+(?:\.\d+)?)\s*$",
        expression
    ) {
        if let (Some(n), Ok(bound)) = (number, bound.parse::<f64>()) {
            return compare_number(n, op, bound);
        }
    }

    // `> 5 && < 10`
    if let Some((_, low_op, low, high_op, high)) = regex_captures!(
        r"^\s*(>=|>)\s*(-?\d+(?:\.\d+)?)\s*&&\s*(<=|<)\s*(-?\d+(?:\.\d+)?)\s*$",
        expression
    ) {
        if let (Some(n), Ok(low), Ok(high)) = (number, low.parse::<f64>(), high.parse::<f64>()) {
            return compare_number(n, low_op, low) && compare_number(n, high_op, high);
        }
    }

    // `contains "text"`
    if let Some((_, needle)) = regex_captures!(r#"^\s*(?i:contains)\s*"(.*)"\s*$"#, expression) {
        return cell_value.contains(needle);
    }

    // `== "text"`
    if let Some((_, text)) = regex_captures!(r#"^\s*==\s*"(.*)"\s*$"#, expression) {
        return cell_value == text;
    }

    if expression.contains("||") {
        return expression
            .split("||")
            .any(|part| evaluate_custom_expression(part, cell_value));
    }

    if expression.contains("&&") {
        return expression
            .split("&&")
            .all(|part| evaluate_custom_expression(part, cell_value));
    }

    evaluate_with_value(expression, cell_value, number)
}

fn compare_number(value: f64, op: &str, bound: f64) -> bool {
    match op {
        ">" => value > bound,
        ">=" => value >= bound,
        "<" => value < bound,
        "<=" => value <= bound,
        "==" => value == bound,
        "!=" => value != bound,
        _ => false,
    }
}

fn evaluate_with_value(expression: &str, cell_value: &str, number: Option<f64>) -> bool {
    let value = match number {
        Some(n) => FormulaValue::Number(n),
        None => FormulaValue::String(cell_value.to_string()),
    };
    let bindings = Bindings::new().with(VALUE_VARIABLE, value);

    match parse_expression(expression).and_then(|expr| evaluate(&expr, &bindings)) {
        Ok(result) => result.is_truthy(),
        Err(e) => {
            log::debug!("custom expression '{}' did not evaluate: {}", expression, e);
            false
        }
    }
}
