//! JSON data bound to `data.*` formula tokens

use serde_json::Value;

use crate::error::FormulaResult;
use crate::evaluator::FormulaValue;

/// Prefix every JSON path token starts with
pub const JSON_ROOT: &str = "data";

/// A JSON document formulas can read through `data.a.b` tokens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonData {
    root: Value,
}

impl JsonData {
    /// Parse JSON text
    pub fn parse(text: &str) -> FormulaResult<Self> {
        Ok(Self {
            root: serde_json::from_str(text)?,
        })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Walk a dotted path from the root (`"user.age"`, `"items.0.price"`)
    ///
    /// Numeric segments index into arrays. Returns `None` when any segment
    /// is missing.
    pub fn value_at_path(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(&self.root);
        }
        path.split('.').try_fold(&self.root, |current, key| match current {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// Resolve a `data.*` token to a formula value
    ///
    /// Missing paths and `null` resolve to the empty value; objects and
    /// arrays resolve to their compact JSON text.
    pub fn resolve_token(&self, token: &str) -> FormulaValue {
        let path = token
            .strip_prefix(JSON_ROOT)
            .map(|rest| rest.strip_prefix('.').unwrap_or(rest))
            .unwrap_or(token);

        match self.value_at_path(path) {
            None | Some(Value::Null) => FormulaValue::empty(),
            Some(Value::Bool(b)) => FormulaValue::Boolean(*b),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(FormulaValue::Number)
                .unwrap_or_else(|| FormulaValue::String(n.to_string())),
            Some(Value::String(s)) => FormulaValue::String(s.clone()),
            Some(other) => FormulaValue::String(other.to_string()),
        }
    }
}

impl From<Value> for JsonData {
    fn from(root: Value) -> Self {
        Self::from_value(root)
    }
}
