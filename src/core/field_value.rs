//! Rendered field values carried by a log entry

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::time::Duration;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Float32(f32),
    Bool(bool),
    Duration(Duration),
    Time(DateTime<Utc>),
    Json(serde_json::Value),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => f.write_str(&format_float(*fl)),
            FieldValue::Float32(fl) => f.write_str(&format_float32(*fl)),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Duration(d) => write!(f, "{:?}", d),
            FieldValue::Time(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            FieldValue::Json(v) => write!(f, "{}", v),
        }
    }
}

/// Non-finite floats render as `NaN`, `+Inf` and `-Inf`.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

/// Shortest single-precision rendering, so `0.1f32` prints as `0.1`.
fn format_float32(value: f32) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        format_float(f64::from(value))
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    ///
    /// Durations are written as fractional milliseconds. Non-finite floats,
    /// which JSON cannot represent, are written as strings.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Uint(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(format_float(*f))),
            FieldValue::Float32(f) => format_float32(*f)
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(format_float32(*f))),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Duration(d) => serde_json::Number::from_f64(d.as_nanos() as f64 / 1_000_000.0)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Time(t) => {
                serde_json::Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            FieldValue::Json(v) => v.clone(),
        }
    }

    /// Whether the logfmt layout must quote this value
    pub(crate) fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldValue::String(_) | FieldValue::Time(_) | FieldValue::Json(_)
        )
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::Uint(u)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::from("alice").to_string(), "alice");
        assert_eq!(FieldValue::from(3i64).to_string(), "3");
        assert_eq!(FieldValue::from(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(FieldValue::from(true).to_string(), "true");
        assert_eq!(FieldValue::Duration(Duration::from_millis(250)).to_string(), "250ms");
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(FieldValue::Float(f64::NAN).to_string(), "NaN");
        assert_eq!(FieldValue::Float(f64::INFINITY).to_string(), "+Inf");
        assert_eq!(
            FieldValue::Float(f64::NEG_INFINITY).to_json_value(),
            serde_json::json!("-Inf")
        );
        assert_eq!(FieldValue::Float(1.5).to_json_value(), serde_json::json!(1.5));
        assert_eq!(FieldValue::Float32(0.1).to_string(), "0.1");
        assert_eq!(FieldValue::Float32(0.1).to_json_value(), serde_json::json!(0.1));
        assert_eq!(FieldValue::Float32(f32::NAN).to_json_value(), serde_json::json!("NaN"));
    }

    #[test]
    fn test_json_values() {
        assert_eq!(
            FieldValue::Duration(Duration::from_micros(1500)).to_json_value(),
            serde_json::json!(1.5)
        );
        let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
        assert_eq!(
            FieldValue::Time(at).to_json_value(),
            serde_json::json!("2025-01-08T10:30:45Z")
        );
        assert_eq!(
            FieldValue::Json(serde_json::json!({"a": 1})).to_json_value(),
            serde_json::json!({"a": 1})
        );
    }
}
