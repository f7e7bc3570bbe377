//! Cell value representation for loaded sheets

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single spreadsheet cell, typed the way the sheet stored it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Empty cell
    #[default]
    Null,
    /// Text cell
    String(String),
    /// Whole number
    Int(i64),
    /// Decimal number
    Float(f64),
    /// Boolean cell
    Bool(bool),
    /// Date or date-time cell (workbooks carry no zone)
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Build a value from a float, collapsing whole numbers to integers
    pub fn from_number(f: f64) -> Self {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            CellValue::Int(f as i64)
        } else {
            CellValue::Float(f)
        }
    }

    /// Infer a typed value from raw text (used for CSV input).
    ///
    /// Numbers are only recognised when they print back as the exact raw
    /// text, so `00123`, `+1555...` or `1e3` stay strings.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = raw.parse::<i64>() {
            if i.to_string() == raw {
                return CellValue::Int(i);
            }
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() && raw.contains('.') && f.to_string() == raw {
                return CellValue::Float(f);
            }
        }
        match raw {
            "true" | "TRUE" | "True" => CellValue::Bool(true),
            "false" | "FALSE" | "False" => CellValue::Bool(false),
            _ => CellValue::String(raw.to_string()),
        }
    }

    /// Convert to JSON for event payloads
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Null => serde_json::Value::Null,
            CellValue::String(s) => serde_json::Value::String(s.clone()),
            CellValue::Int(i) => serde_json::json!(*i),
            // Non-finite floats have no JSON form
            CellValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::DateTime(dt) => serde_json::Value::String(format_naive(dt)),
        }
    }
}

fn format_naive(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// String form used for identifiers and hashing. Empty for `Null`.
impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", format_naive(dt)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_whole_floats_become_ints() {
        assert_eq!(CellValue::from_number(42.0), CellValue::Int(42));
        assert_eq!(CellValue::from_number(4.5), CellValue::Float(4.5));
    }

    #[test]
    fn test_infer() {
        assert_eq!(CellValue::infer(""), CellValue::Null);
        assert_eq!(CellValue::infer("12"), CellValue::Int(12));
        assert_eq!(CellValue::infer("1.25"), CellValue::Float(1.25));
        assert_eq!(CellValue::infer("TRUE"), CellValue::Bool(true));
        assert_eq!(
            CellValue::infer("Gold"),
            CellValue::String("Gold".to_string())
        );
        assert_eq!(CellValue::infer("-7"), CellValue::Int(-7));
        assert_eq!(CellValue::infer("-0.5"), CellValue::Float(-0.5));
        // Phone numbers with punctuation stay text
        assert_eq!(
            CellValue::infer("(555) 123-4567"),
            CellValue::String("(555) 123-4567".to_string())
        );
    }

    #[test]
    fn test_infer_keeps_text_that_would_change() {
        for raw in [
            "00123",
            "02134",
            "+15551234567",
            "1e3",
            "2.50",
            ".5",
            "99999999999999999999",
            "NaN",
            "inf",
        ] {
            assert_eq!(
                CellValue::infer(raw),
                CellValue::String(raw.to_string()),
                "raw={raw}"
            );
            assert_eq!(CellValue::infer(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_to_json_preserves_type() {
        assert_eq!(CellValue::Int(3).to_json(), serde_json::json!(3));
        assert_eq!(CellValue::Float(2.5).to_json(), serde_json::json!(2.5));
        assert_eq!(
            CellValue::String("x".into()).to_json(),
            serde_json::json!("x")
        );
        assert_eq!(CellValue::Null.to_json(), serde_json::Value::Null);

        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(
            CellValue::DateTime(dt).to_json(),
            serde_json::json!("2024-03-01T09:30:00")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Int(1001).to_string(), "1001");
        assert_eq!(CellValue::Float(0.5).to_string(), "0.5");
    }
}
