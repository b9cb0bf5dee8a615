//! Core types for fieldrules

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw field value handed to the engine by a host.
///
/// Hosts carry rows with mixed column types; the engine only ever works on
/// the string form (see the `Display` impl), except for `Null` which
/// short-circuits the whole rule chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent value (SQL NULL, JSON null)
    #[default]
    Null,

    /// Boolean column
    Bool(bool),

    /// Integral column
    Integer(i64),

    /// Floating point column
    Float(f64),

    /// Text column
    Text(String),
}

impl FieldValue {
    /// Whether this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// String form of the value, `None` for null
    pub fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write_float(f, *x),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Integral floats keep one fractional digit (`25.0`) and infinities are
/// spelled out, matching the string form upstream exporters produce.
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_infinite() {
        f.write_str(if x > 0.0 { "Infinity" } else { "-Infinity" })
    } else if x.fract() == 0.0 && x.abs() < 1e7 {
        write!(f, "{:.1}", x)
    } else {
        write!(f, "{}", x)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Text(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Integer(i64::from(i))
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Integer(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_forms() {
        assert_eq!(FieldValue::from(25).to_text(), Some("25".to_string()));
        assert_eq!(FieldValue::from("Ada").to_text(), Some("Ada".to_string()));
        assert_eq!(FieldValue::from(true).to_text(), Some("true".to_string()));
        assert_eq!(FieldValue::from(2.5).to_text(), Some("2.5".to_string()));
        assert_eq!(FieldValue::from(25.0).to_text(), Some("25.0".to_string()));
        assert_eq!(FieldValue::from(-3.0).to_text(), Some("-3.0".to_string()));
        assert_eq!(FieldValue::from(f64::INFINITY).to_text(), Some("Infinity".to_string()));
        assert_eq!(FieldValue::Null.to_text(), None);
    }

    #[test]
    fn test_option_conversion() {
        assert!(FieldValue::from(None::<i32>).is_null());
        assert_eq!(FieldValue::from(Some(41)), FieldValue::Integer(41));
    }

    #[test]
    fn test_untagged_deserialization() {
        let values: Vec<FieldValue> =
            serde_json::from_str(r#"[null, 30, "x", 1.5, false]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Null,
                FieldValue::Integer(30),
                FieldValue::Text("x".to_string()),
                FieldValue::Float(1.5),
                FieldValue::Bool(false),
            ]
        );
    }
}
