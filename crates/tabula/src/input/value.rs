//! Cell values.

use std::fmt;

use serde::{Serialize, Serializer};

/// Markers read as a missing cell. Matched exactly, case included.
const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single cell of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A finite number.
    Number(f64),
    /// Any non-numeric content.
    Text(String),
    /// Absent value.
    Missing,
}

impl Value {
    /// Build a numeric value. Non-finite input becomes [`Value::Missing`].
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Value::Number(value)
        } else {
            Value::Missing
        }
    }

    /// Build a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    /// Interpret a raw delimited-text cell.
    pub fn parse(raw: &str) -> Self {
        if Self::is_null_marker(raw) {
            return Value::Missing;
        }
        match parse_number(raw) {
            Some(n) => Value::Number(n),
            None => Value::Text(raw.to_string()),
        }
    }

    /// Convert a decoded JSON value.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Missing,
            serde_json::Value::Number(n) => n.as_f64().map(Value::number).unwrap_or(Value::Missing),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            other => Value::Text(other.to_string()),
        }
    }

    /// Check if a raw string represents a missing value.
    pub fn is_null_marker(value: &str) -> bool {
        NULL_MARKERS.contains(&value)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric reading of the value, if it has one.
    ///
    /// Text that parses as a finite number counts as numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_number(s),
            Value::Missing => None,
        }
    }

    /// Key that identifies the exact cell content, used for duplicate detection.
    pub(crate) fn identity_key(&self) -> String {
        match self {
            Value::Number(n) => format!("n:{}", n.to_bits()),
            Value::Text(s) => format!("t:{s}"),
            Value::Missing => "\u{0}null".to_string(),
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Integral values within the exactly representable range are written as integers.
fn as_exact_integer(n: f64) -> Option<i64> {
    const LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
    (n.fract() == 0.0 && n.abs() <= LIMIT).then_some(n as i64)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => match as_exact_integer(*n) {
                Some(i) => write!(f, "{i}"),
                None => write!(f, "{n}"),
            },
            Value::Text(s) => f.write_str(s),
            Value::Missing => f.write_str("null"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => match as_exact_integer(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Value::Text(s) => serializer.serialize_str(s),
            Value::Missing => serializer.serialize_none(),
        }
    }
}
