//! # Lenient Coercion
//!
//! Serde helpers for input that comes from a language model, a browser form
//! or an old draft. None of them fail: a value that cannot be understood
//! degrades to zero, an empty string, `None` or an empty list.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input                         number()     string()     date()         │
//! │  ─────────────────────────     ─────────    ─────────    ───────────    │
//! │  12.5                          12.5         "12.5"       None           │
//! │  "1,250.00"                    1250.0       "1,250.00"   None           │
//! │  "abc"                         0.0          "abc"        None           │
//! │  null / missing                0.0          ""           None           │
//! │  "2024-03-01"                  0.0          "2024-03-01" 2024-03-01     │
//! │  "2024-03-01T10:00:00Z"        0.0          (as is)      2024-03-01     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every helper goes through [`serde_json::Value`], so they require a
//! self-describing format (JSON everywhere in this workspace).
//!
//! ## Usage
//! ```rust
//! use paylance_core::coerce;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Row {
//!     #[serde(default, deserialize_with = "coerce::number")]
//!     rate: f64,
//! }
//!
//! let row: Row = serde_json::from_str(r#"{"rate": "oops"}"#).unwrap();
//! assert_eq!(row.rate, 0.0);
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::{InvoiceStatus, SurchargeKind};

// =============================================================================
// Value Conversions
// =============================================================================

/// Converts any JSON value to a finite number, falling back to zero.
pub fn to_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_numeric(s),
        _ => 0.0,
    };

    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Parses a numeric string, tolerating whitespace and thousands separators.
pub fn parse_numeric(text: &str) -> f64 {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Converts a JSON value to text. Numbers keep their textual form.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Parses the date part of an ISO 8601 date or timestamp.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

// =============================================================================
// Deserializers
// =============================================================================

/// `deserialize_with` for numeric fields. Pair with `#[serde(default)]`.
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_number(&value))
}

/// `deserialize_with` for optional numeric fields. Unparseable values become `None`.
pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::Number(_) => Some(to_number(&value)),
        Value::String(ref s) if s.trim().is_empty() => None,
        Value::String(_) => Some(to_number(&value)),
        _ => None,
    })
}

/// `deserialize_with` for text fields; `null` becomes the empty string.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_text(&value))
}

/// `deserialize_with` for optional text fields; blank text becomes `None`.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let text = to_text(&value);
    Ok(if text.trim().is_empty() { None } else { Some(text) })
}

/// `deserialize_with` for dates; anything that is not an ISO date becomes `None`.
pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => parse_date(&s),
        _ => None,
    })
}

/// `deserialize_with` for timestamps; anything that is not RFC 3339 becomes `None`.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc)),
        _ => None,
    })
}

/// `deserialize_with` for lists. Non-arrays become empty, bad elements are dropped.
pub fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(elements) => elements
            .into_iter()
            .filter_map(|element| serde_json::from_value(element).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// `deserialize_with` for statuses; unknown or missing values become `Draft`.
pub fn status<'de, D>(deserializer: D) -> Result<InvoiceStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_text(&value).parse().unwrap_or_default())
}

/// Maps a surcharge type label. Only `percentage` (any case) is a percentage.
pub fn surcharge_kind(value: &Value) -> SurchargeKind {
    match value {
        Value::String(s) if s.trim().eq_ignore_ascii_case("percentage") => {
            SurchargeKind::Percentage
        }
        _ => SurchargeKind::Fixed,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&json!(12.5)), 12.5);
        assert_eq!(to_number(&json!("  42 ")), 42.0);
        assert_eq!(to_number(&json!("1,250.50")), 1250.5);
        assert_eq!(to_number(&json!("abc")), 0.0);
        assert_eq!(to_number(&json!("NaN")), 0.0);
        assert_eq!(to_number(&json!("inf")), 0.0);
        assert_eq!(to_number(&json!(null)), 0.0);
        assert_eq!(to_number(&json!(true)), 0.0);
        assert_eq!(to_number(&json!([1, 2])), 0.0);
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(parse_date("2024-03-01"), expected);
        assert_eq!(parse_date("2024-03-01T10:00:00Z"), expected);
        assert_eq!(parse_date("March 1st"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_surcharge_kind_labels() {
        assert_eq!(surcharge_kind(&json!("percentage")), SurchargeKind::Percentage);
        assert_eq!(surcharge_kind(&json!("Percentage")), SurchargeKind::Percentage);
        assert_eq!(surcharge_kind(&json!("fixed")), SurchargeKind::Fixed);
        assert_eq!(surcharge_kind(&json!("percent")), SurchargeKind::Fixed);
        assert_eq!(surcharge_kind(&json!(null)), SurchargeKind::Fixed);
    }

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "number")]
        qty: f64,
        #[serde(default, deserialize_with = "opt_text")]
        note: Option<String>,
        #[serde(default, deserialize_with = "seq")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "status")]
        status: InvoiceStatus,
    }

    #[test]
    fn test_deserializers_never_fail() {
        let probe: Probe = serde_json::from_value(json!({
            "qty": "not a number",
            "note": "   ",
            "tags": ["a", 3, "b"],
            "status": "archived"
        }))
        .unwrap();

        assert_eq!(probe.qty, 0.0);
        assert_eq!(probe.note, None);
        assert_eq!(probe.tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(probe.status, InvoiceStatus::Draft);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let probe: Probe = serde_json::from_value(json!({ "tags": null })).unwrap();
        assert_eq!(probe.qty, 0.0);
        assert!(probe.tags.is_empty());
    }
}
