//! Document and value types handed to the formatter
//!
//! Values are tagged when the Firestore response is decoded, so the formatter
//! never has to guess what kind of value it holds.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::fmt;

/// Integral doubles below this magnitude serialize as JSON integers
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Full resource name of the referenced document
    Reference(String),
    Timestamp(DateTime<Utc>),
    GeoPoint { latitude: f64, longitude: f64 },
    Array(Vec<Value>),
    /// Fields in server order
    Map(Vec<(String, Value)>),
}

/// One retrieved document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Last segment of the resource name
    pub id: String,

    /// Fields in server order
    pub fields: Vec<(String, Value)>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a document from its full resource name
    /// (`projects/.../documents/products/abc`)
    pub fn from_name(name: &str, fields: Vec<(String, Value)>) -> Self {
        Self::new(name.rsplit('/').next().unwrap_or_default(), fields)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl Value {
    /// Convert to JSON for structured rendering.
    ///
    /// Timestamps become `{"_seconds", "_nanoseconds"}` objects, geo points
    /// `{"_latitude", "_longitude"}` objects and bytes a
    /// `{"type": "Buffer", "data": [..]}` object.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Double(d) => double_to_json(*d),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => json!({
                "type": "Buffer",
                "data": bytes,
            }),
            Value::Reference(name) => serde_json::Value::String(reference_path(name).to_string()),
            Value::Timestamp(ts) => json!({
                "_seconds": ts.timestamp(),
                "_nanoseconds": ts.timestamp_subsec_nanos(),
            }),
            Value::GeoPoint {
                latitude,
                longitude,
            } => json!({
                "_latitude": double_to_json(*latitude),
                "_longitude": double_to_json(*longitude),
            }),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Default string form, as used when a value is interpolated or joined.
///
/// Arrays join with `,` and no brackets, maps print `[object Object]` and
/// bytes print as (lossy) UTF-8 text. These are the shapes array elements
/// collapse to in the field listing.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Double(d) => f.write_str(&format_number(*d)),
            Value::String(s) => f.write_str(s),
            Value::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            Value::Reference(name) => f.write_str(reference_path(name)),
            Value::Timestamp(ts) => write!(
                f,
                "Timestamp(seconds={}, nanoseconds={})",
                ts.timestamp(),
                ts.timestamp_subsec_nanos()
            ),
            Value::GeoPoint { .. } | Value::Map(_) => f.write_str("[object Object]"),
            Value::Array(items) => f.write_str(&join_elements(items, ",")),
        }
    }
}

/// Join array elements by their default string form; nulls become empty
pub fn join_elements(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Shortest round-trip rendering of a double.
///
/// Integral values drop the fraction, and magnitudes outside
/// `[1e-6, 1e21)` switch to exponent notation with an explicit sign.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // also covers -0
        return "0".to_string();
    }

    let abs = n.abs();
    if !(1e-6..1e21).contains(&abs) {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }

    format!("{}", n)
}

fn double_to_json(d: f64) -> serde_json::Value {
    if !d.is_finite() {
        return serde_json::Value::Null;
    }
    if d.fract() == 0.0 && d.abs() < MAX_SAFE_INTEGER {
        return serde_json::Value::from(d as i64);
    }
    serde_json::Number::from_f64(d)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Path of a referenced document relative to the database root
pub fn reference_path(name: &str) -> &str {
    match name.split_once("/documents/") {
        Some((_, path)) => path,
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(9.99), "9.99");
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-42.0), "-42");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e22), "1.5e+22");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Integer(-7).to_string(), "-7");
        assert_eq!(Value::String("Widget".into()).to_string(), "Widget");
        assert_eq!(Value::Bytes(b"hi".to_vec()).to_string(), "hi");
        assert_eq!(Value::Bytes(vec![0x68, 0xff]).to_string(), "h\u{fffd}");
    }

    #[test]
    fn test_nested_display_collapses() {
        let nested = Value::Array(vec![Value::Integer(2), Value::Integer(3)]);
        assert_eq!(nested.to_string(), "2,3");

        let map = Value::Map(vec![("a".into(), Value::Integer(1))]);
        assert_eq!(map.to_string(), "[object Object]");

        let point = Value::GeoPoint {
            latitude: 1.0,
            longitude: 2.0,
        };
        assert_eq!(point.to_string(), "[object Object]");

        let with_null = Value::Array(vec![Value::Integer(1), Value::Null, Value::Integer(3)]);
        assert_eq!(with_null.to_string(), "1,,3");
    }

    #[test]
    fn test_timestamp_default_string() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            Value::Timestamp(ts).to_string(),
            "Timestamp(seconds=1704067200, nanoseconds=0)"
        );
    }

    #[test]
    fn test_reference_path() {
        let name = "projects/demo/databases/(default)/documents/users/alice";
        assert_eq!(reference_path(name), "users/alice");
        assert_eq!(Value::Reference(name.into()).to_string(), "users/alice");
        assert_eq!(reference_path("users/bob"), "users/bob");
    }

    #[test]
    fn test_to_json_shapes() {
        let ts = Utc.timestamp_opt(1_704_067_200, 500).unwrap();
        let value = Value::Map(vec![
            ("price".into(), Value::Double(10.0)),
            ("ratio".into(), Value::Double(0.5)),
            ("bad".into(), Value::Double(f64::NAN)),
            ("at".into(), Value::Timestamp(ts)),
        ]);

        let json = value.to_json();
        assert_eq!(json["price"], serde_json::json!(10));
        assert!(json["price"].is_i64());
        assert_eq!(json["ratio"], serde_json::json!(0.5));
        assert!(json["bad"].is_null());
        assert_eq!(json["at"]["_seconds"], serde_json::json!(1_704_067_200i64));
        assert_eq!(json["at"]["_nanoseconds"], serde_json::json!(500));
    }

    #[test]
    fn test_bytes_to_json() {
        let json = Value::Bytes(b"hi".to_vec()).to_json();
        assert_eq!(json, serde_json::json!({"type": "Buffer", "data": [104, 105]}));
    }

    #[test]
    fn test_to_json_preserves_order() {
        let value = Value::Map(vec![
            ("zeta".into(), Value::Integer(1)),
            ("alpha".into(), Value::Integer(2)),
        ]);
        let keys: Vec<_> = value
            .to_json()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_document_from_name() {
        let doc = Document::from_name(
            "projects/demo/databases/(default)/documents/products/abc123",
            vec![],
        );
        assert_eq!(doc.id, "abc123");
        assert!(doc.field("missing").is_none());
    }
}
