//! Condition evaluation for the twenty rule kinds

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use gridcalc_core::{CellSource, ConditionKind, ConditionalRule};
use gridcalc_formula::{evaluate_custom_expression, parse_number, FormulaEngine};

use crate::error::{Error, Result};

/// Date-only layouts, tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%a %b %d %Y",
];

/// Date-time layouts without an offset, tried in order
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a cell value or criterion as a date
///
/// Accepts `2024-03-15`, `2024/03/15`, `03/15/2024`, `Mar 15 2024`,
/// `March 15, 2024`, `2024-03-15T10:30[:00]` and RFC 3339 timestamps.
/// Timestamps with an offset are converted to UTC. Date-only values are
/// taken at midnight.
pub fn parse_date(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_utc());
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::DateParse(text.to_string()))
}

/// Test one rule against one cell value
///
/// `cell_value` is the cell's display value or raw text, as configured on
/// the engine. Criteria that do not parse make the condition false.
/// `custom_formula` ignores the cell value and evaluates its formula against
/// the whole grid through `engine`.
pub fn evaluate_condition<S: CellSource + ?Sized>(
    engine: &FormulaEngine<'_, S>,
    rule: &ConditionalRule,
    cell_value: &str,
) -> bool {
    let value = cell_value.trim();
    let criterion1 = rule.criterion1.as_str();

    match rule.kind {
        ConditionKind::Empty => value.is_empty(),
        ConditionKind::NotEmpty => !value.is_empty(),

        ConditionKind::TextContains => value.contains(criterion1),
        ConditionKind::TextNotContains => !value.contains(criterion1),
        ConditionKind::TextStartsWith => value.starts_with(criterion1),
        ConditionKind::TextEndsWith => value.ends_with(criterion1),
        ConditionKind::TextExactly => value == criterion1,

        ConditionKind::DateIs => {
            compare_dates(value, criterion1, |cell, criterion| cell.date() == criterion.date())
        }
        ConditionKind::DateBefore => compare_dates(value, criterion1, |cell, criterion| cell < criterion),
        ConditionKind::DateAfter => compare_dates(value, criterion1, |cell, criterion| cell > criterion),

        ConditionKind::GreaterThan => compare_numbers(value, criterion1, |n, c| n > c),
        ConditionKind::GreaterThanOrEqual => compare_numbers(value, criterion1, |n, c| n >= c),
        ConditionKind::LessThan => compare_numbers(value, criterion1, |n, c| n < c),
        ConditionKind::LessThanOrEqual => compare_numbers(value, criterion1, |n, c| n <= c),
        ConditionKind::EqualTo => compare_numbers(value, criterion1, |n, c| n == c),
        ConditionKind::NotEqualTo => compare_numbers(value, criterion1, |n, c| n != c),

        ConditionKind::Between => match numeric_bounds(value, rule) {
            Some((n, low, high)) => n >= low && n <= high,
            None => false,
        },
        ConditionKind::NotBetween => match numeric_bounds(value, rule) {
            Some((n, low, high)) => n < low || n > high,
            None => false,
        },

        ConditionKind::CustomFormula => engine.evaluate_predicate(criterion1),
        ConditionKind::CustomExpression => evaluate_custom_expression(criterion1, value),
    }
}

fn compare_numbers(value: &str, criterion: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (parse_number(value), parse_number(criterion)) {
        (Some(n), Some(c)) => cmp(n, c),
        _ => false,
    }
}

fn numeric_bounds(value: &str, rule: &ConditionalRule) -> Option<(f64, f64, f64)> {
    Some((
        parse_number(value)?,
        parse_number(&rule.criterion1)?,
        parse_number(&rule.criterion2)?,
    ))
}

fn compare_dates(
    value: &str,
    criterion: &str,
    cmp: impl Fn(NaiveDateTime, NaiveDateTime) -> bool,
) -> bool {
    if value.is_empty() {
        return false;
    }
    match (parse_date(value), parse_date(criterion)) {
        (Ok(cell), Ok(criterion)) => cmp(cell, criterion),
        (Err(e), _) | (_, Err(e)) => {
            log::debug!("date condition skipped: {}", e);
            false
        }
    }
}
