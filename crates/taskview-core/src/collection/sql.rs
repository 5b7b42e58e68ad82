//! Positional parameter accumulator for dynamically assembled statements.

use rusqlite::types::Value;
use serde::Serialize;

/// Values bound to `?1..?n`, in placeholder order.
#[derive(Debug, Clone, Default)]
pub struct SqlParams {
    values: Vec<Value>,
}

impl SqlParams {
    /// Bind a value and return its 1-based placeholder index.
    pub fn push(&mut self, value: Value) -> usize {
        self.values.push(value);
        self.values.len()
    }

    /// Bind a sequence as one JSON array, for use with `json_each(?n)`.
    pub fn push_json_array<T: Serialize>(&mut self, items: &[T]) -> usize {
        let json = serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string());
        self.push(Value::Text(json))
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_one_based_and_sequential() {
        let mut params = SqlParams::default();
        assert!(params.is_empty());
        assert_eq!(params.push(Value::Integer(7)), 1);
        assert_eq!(params.push_json_array(&[1_i64, 2, 3]), 2);
        assert_eq!(params.len(), 2);
        assert_eq!(params.values()[1], Value::Text("[1,2,3]".into()));
    }
}
