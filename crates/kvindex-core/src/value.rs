//! Schemaless attribute values.
//!
//! A `Value` is what a record holds under one attribute name. Index
//! derivation needs exactly two views of it: a string form (for hash keys)
//! and a numeric form (for range keys).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Value {
    /// A UTF-8 string.
    String(String),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A point in time.
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Coerce the value to a floating-point number.
    ///
    /// Timestamps become fractional seconds since the Unix epoch. Strings are
    /// parsed after trimming; anything unparseable coerces to `0.0`, as does
    /// `false`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .unwrap_or(0.0),
            Self::Int(i) => *i as f64,
            Self::Float(f) => *f,
            Self::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Timestamp(t) => {
                t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) / 1_000_000_000.0
            }
        }
    }

    /// True if the string form of this value is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Parse a textual value, inferring the most specific type.
    ///
    /// Integers, finite floats, `true`/`false` and RFC 3339 timestamps are
    /// recognised; everything else is kept as a string.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        if let Ok(i) = input.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = input.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        match input {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(t) = DateTime::parse_from_rfc3339(input) {
            return Self::Timestamp(t.with_timezone(&Utc));
        }
        Self::String(input.to_string())
    }
}

/// The string form used for hash key segments.
///
/// Floats use Rust's shortest round-trip form and always carry a fractional
/// part or exponent: `2.0`, `1.5`, `1e21`, `1e-7`. Timestamps use RFC 3339.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Timestamp(t) => f.write_str(&t.to_rfc3339()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn string_forms() {
        assert_eq!(Value::from("Josh").to_string(), "Josh");
        assert_eq!(Value::from(42_i64).to_string(), "42");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(2.0).to_string(), "2.0");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(1e21).to_string(), "1e21");
    }

    #[test]
    fn timestamp_to_f64_keeps_fraction() {
        let t = Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap();
        let value = Value::from(t);
        assert!((value.to_f64() - 1_700_000_000.5).abs() < 1e-6);
    }

    #[test]
    fn string_coercion_defaults_to_zero() {
        assert!((Value::from(" 12.5 ").to_f64() - 12.5).abs() < f64::EPSILON);
        assert!(Value::from("abc").to_f64().abs() < f64::EPSILON);
        assert!(Value::from("NaN").to_f64().abs() < f64::EPSILON);
    }

    #[test]
    fn blank_detection() {
        assert!(Value::from("").is_blank());
        assert!(Value::from("   ").is_blank());
        assert!(!Value::from("x").is_blank());
        assert!(!Value::from(0_i64).is_blank());
    }

    #[test]
    fn parse_infers_types() {
        assert_eq!(Value::parse("7"), Value::Int(7));
        assert_eq!(Value::parse("7.25"), Value::Float(7.25));
        assert_eq!(Value::parse("false"), Value::Bool(false));
        assert_eq!(Value::parse("Josh"), Value::from("Josh"));
        assert_eq!(Value::parse("inf"), Value::from("inf"));
        assert!(matches!(
            Value::parse("2024-01-02T03:04:05Z"),
            Value::Timestamp(_)
        ));
    }

    #[test]
    fn serde_json_tagged() {
        let json = serde_json::to_string(&Value::from("Josh")).unwrap();
        assert_eq!(json, r#"{"type":"string","value":"Josh"}"#);
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Value::from("Josh"));
    }
}
