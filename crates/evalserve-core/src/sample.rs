//! Dataset samples

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single dataset record
///
/// Samples are open-ended JSON objects. Evals pick the fields they grade on
/// (`input`, `ideal`, ...) and ignore the rest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample(Map<String, Value>);

impl Sample {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a sample from a JSON value, if it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Copy of this sample with `field` set to `value`, replacing any
    /// existing entry
    pub fn tagged(&self, field: &str, value: &str) -> Self {
        let mut copy = self.clone();
        copy.insert(field, Value::String(value.to_string()));
        copy
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Sample {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged_overrides_existing_field() {
        let sample = Sample::from_value(json!({"input": "x", "eval": "old"})).unwrap();
        let tagged = sample.tagged("eval", "test-match");

        assert_eq!(tagged.get("eval"), Some(&json!("test-match")));
        assert_eq!(tagged.get("input"), Some(&json!("x")));
        // source sample untouched
        assert_eq!(sample.get("eval"), Some(&json!("old")));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Sample::from_value(json!([1, 2])).is_none());
        assert!(Sample::from_value(json!("text")).is_none());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let sample = Sample::from_value(json!({"input": "hi", "ideal": "there"})).unwrap();
        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(value, json!({"input": "hi", "ideal": "there"}));
    }
}
