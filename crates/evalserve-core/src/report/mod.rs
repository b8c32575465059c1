//! Eval reports
//!
//! A [`Report`] is the final metric map an eval produces. Metric values may
//! be non-finite (accuracy over zero events is NaN), which the wire format
//! cannot carry; see [`sanitize`] and [`wire_response`].

mod sanitize;

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::Value;

use crate::error::{SessionError, SessionResult};

pub use sanitize::{sanitize, wire_response};

/// A single metric value
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<MetricValue>),
    Map(BTreeMap<String, MetricValue>),
}

impl MetricValue {
    /// True for a float that is NaN or infinite
    pub fn is_non_finite(&self) -> bool {
        matches!(self, MetricValue::Float(value) if !value.is_finite())
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, MetricValue::Float(value) if value.is_nan())
    }

    /// Numeric view of the value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Int(value) => Some(*value as f64),
            MetricValue::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricValue::Bool(value) => serializer.serialize_bool(*value),
            MetricValue::Int(value) => serializer.serialize_i64(*value),
            MetricValue::Float(value) if !value.is_finite() => Err(S::Error::custom(format!(
                "non-finite metric value {}",
                format_float(*value)
            ))),
            MetricValue::Float(value) => serializer.serialize_f64(*value),
            MetricValue::Text(value) => serializer.serialize_str(value),
            MetricValue::List(values) => values.serialize(serializer),
            MetricValue::Map(values) => values.serialize(serializer),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Bool(true) => write!(f, "True"),
            MetricValue::Bool(false) => write!(f, "False"),
            MetricValue::Int(value) => write!(f, "{value}"),
            MetricValue::Float(value) => write!(f, "{}", format_float(*value)),
            MetricValue::Text(value) => write!(f, "'{value}'"),
            MetricValue::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            MetricValue::Map(values) => write_map(f, values),
        }
    }
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{value:?}")
    }
}

fn write_map(f: &mut fmt::Formatter<'_>, values: &BTreeMap<String, MetricValue>) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "'{key}': {value}")?;
    }
    write!(f, "}}")
}

impl From<bool> for MetricValue {
    fn from(value: bool) -> Self {
        MetricValue::Bool(value)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Int(value)
    }
}

impl From<usize> for MetricValue {
    fn from(value: usize) -> Self {
        MetricValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Float(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

/// Final metrics of an eval run, keyed by metric name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report(BTreeMap<String, MetricValue>);

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetricValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetricValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to a JSON object
    ///
    /// Fails with [`SessionError::Serialization`] when any value, nested or
    /// not, is non-finite.
    pub fn to_json(&self) -> SessionResult<Value> {
        serde_json::to_value(&self.0).map_err(|e| SessionError::Serialization(e.to_string()))
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_map(f, &self.0)
    }
}

impl FromIterator<(String, MetricValue)> for Report {
    fn from_iter<I: IntoIterator<Item = (String, MetricValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Report {
    type Item = (String, MetricValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, MetricValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
