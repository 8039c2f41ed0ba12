//! Document-to-display-text formatting
//!
//! Every function here is pure: it returns lines and leaves writing to the
//! caller. A line may contain embedded newlines when a structured value is
//! pretty-printed.

use crate::model::{format_number, join_elements, Document, Value};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use std::io;

/// Width of the separator rules
pub const RULE_WIDTH: usize = 80;

const HEAVY_RULE_CHAR: char = '═';
const LIGHT_RULE_CHAR: char = '─';

pub fn heavy_rule() -> String {
    HEAVY_RULE_CHAR.to_string().repeat(RULE_WIDTH)
}

pub fn light_rule() -> String {
    LIGHT_RULE_CHAR.to_string().repeat(RULE_WIDTH)
}

/// Progress line printed before the fetch
pub fn fetching_banner(limit: u32, collection: &str) -> String {
    format!(
        "Fetching {} documents from '{}' collection...",
        limit, collection
    )
}

/// Output for an empty fetch
pub fn empty_result() -> Vec<String> {
    vec!["No documents found.".to_string()]
}

/// Lines printed once before the first document
pub fn listing_header(found: usize) -> Vec<String> {
    vec![
        format!("Found {} documents:", found),
        String::new(),
        heavy_rule(),
    ]
}

/// Header and one line per field for the document at `index` (1-based)
pub fn format_document(doc: &Document, index: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(doc.fields.len() + 3);
    lines.push(String::new());
    lines.push(format!("[{}] Document ID: {}", index, doc.id));
    lines.push(light_rule());

    for (key, value) in &doc.fields {
        lines.push(format_field(key, value));
    }

    lines
}

pub fn format_field(key: &str, value: &Value) -> String {
    format!("  {}: {}", key, display_value(value))
}

/// Render one field value.
///
/// Dispatch order: timestamp, array, structured, scalar. Array elements are
/// joined shallowly, so nested arrays lose their brackets and nested maps
/// collapse to `[object Object]`. Bytes count as structured.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Timestamp(ts) => iso_string(ts),
        Value::Array(items) => format!("[{}]", join_elements(items, ", ")),
        Value::Map(_) | Value::GeoPoint { .. } | Value::Bytes(_) => pretty_json(value),
        scalar => scalar.to_string(),
    }
}

/// ISO-8601 in UTC with millisecond precision (`2024-01-01T00:00:00.000Z`)
pub fn iso_string(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn pretty_json(value: &Value) -> String {
    let json = value.to_json();
    let mut buf = Vec::new();
    let written = {
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, NumberFormatter::new());
        json.serialize(&mut serializer)
    };

    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(e) => {
            tracing::warn!("Failed to pretty-print structured value: {}", e);
            json.to_string()
        }
    }
}

/// Two-space pretty printer whose doubles use [`format_number`]
struct NumberFormatter {
    pretty: PrettyFormatter<'static>,
}

impl NumberFormatter {
    fn new() -> Self {
        Self {
            pretty: PrettyFormatter::new(),
        }
    }
}

impl Formatter for NumberFormatter {
    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(format_number(value).as_bytes())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }
}

/// Closing rule and the count of documents shown
pub fn summary_footer(shown: usize) -> Vec<String> {
    vec![
        String::new(),
        heavy_rule(),
        String::new(),
        format!("Total: {} documents shown", shown),
    ]
}

/// Aggregate count lines, printed only once the count is known
pub fn collection_total(total: u64) -> Vec<String> {
    vec![
        format!("Total documents in collection: {}", total),
        String::new(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn widget() -> Document {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Document::new(
            "abc123",
            vec![
                ("name".into(), Value::String("Widget".into())),
                ("price".into(), Value::Double(9.99)),
                (
                    "tags".into(),
                    Value::Array(vec![Value::String("a".into()), Value::String("b".into())]),
                ),
                ("created".into(), Value::Timestamp(created)),
            ],
        )
    }

    #[test]
    fn test_widget_document() {
        let lines = format_document(&widget(), 1);

        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "[1] Document ID: abc123");
        assert_eq!(lines[2], "─".repeat(80));
        assert_eq!(
            &lines[3..],
            &[
                "  name: Widget",
                "  price: 9.99",
                "  tags: [a, b]",
                "  created: 2024-01-01T00:00:00.000Z",
            ]
        );
    }

    #[test]
    fn test_rules_are_eighty_wide() {
        assert_eq!(heavy_rule().chars().count(), 80);
        assert_eq!(light_rule().chars().count(), 80);
        assert!(heavy_rule().chars().all(|c| c == '═'));
    }

    #[test]
    fn test_field_order_is_kept() {
        let doc = Document::new(
            "x",
            vec![
                ("zeta".into(), Value::Integer(1)),
                ("alpha".into(), Value::Integer(2)),
                ("mid".into(), Value::Integer(3)),
            ],
        );
        let lines = format_document(&doc, 7);
        assert_eq!(lines[1], "[7] Document ID: x");
        assert_eq!(&lines[3..], &["  zeta: 1", "  alpha: 2", "  mid: 3"]);
    }

    #[test]
    fn test_timestamp_truncates_to_millis() {
        let ts = Utc.timestamp_opt(1_704_067_200, 123_456_789).unwrap();
        assert_eq!(
            display_value(&Value::Timestamp(ts)),
            "2024-01-01T00:00:00.123Z"
        );
    }

    #[test]
    fn test_array_join_is_shallow() {
        let value = Value::Array(vec![
            Value::Integer(1),
            Value::Array(vec![Value::Integer(2), Value::Integer(3)]),
        ]);
        assert_eq!(display_value(&value), "[1, 2,3]");
    }

    #[test]
    fn test_array_with_null_and_map() {
        let value = Value::Array(vec![
            Value::Integer(1),
            Value::Null,
            Value::Map(vec![("k".into(), Value::Boolean(true))]),
        ]);
        assert_eq!(display_value(&value), "[1, , [object Object]]");
    }

    #[test]
    fn test_array_with_timestamp_element() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let value = Value::Array(vec![Value::Timestamp(ts)]);
        assert_eq!(
            display_value(&value),
            "[Timestamp(seconds=1704067200, nanoseconds=0)]"
        );
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(display_value(&Value::Array(vec![])), "[]");
    }

    #[test]
    fn test_structured_value_is_pretty_and_reparses() {
        let value = Value::Map(vec![
            ("city".into(), Value::String("Oslo".into())),
            (
                "geo".into(),
                Value::Map(vec![
                    ("lat".into(), Value::Double(59.9)),
                    ("tags".into(), Value::Array(vec![Value::Integer(1), Value::Null])),
                ]),
            ),
        ]);

        let rendered = display_value(&value);
        assert_eq!(
            rendered,
            "{\n  \"city\": \"Oslo\",\n  \"geo\": {\n    \"lat\": 59.9,\n    \"tags\": [\n      1,\n      null\n    ]\n  }\n}"
        );

        let reparsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(reparsed, value.to_json());
    }

    #[test]
    fn test_empty_map() {
        assert_eq!(display_value(&Value::Map(vec![])), "{}");
    }

    #[test]
    fn test_geo_point_is_structured() {
        let value = Value::GeoPoint {
            latitude: 51.5,
            longitude: -0.12,
        };
        assert_eq!(
            display_value(&value),
            "{\n  \"_latitude\": 51.5,\n  \"_longitude\": -0.12\n}"
        );
    }

    #[test]
    fn test_large_doubles_in_structures() {
        let value = Value::Map(vec![
            ("big".into(), Value::Double(1e20)),
            ("p53".into(), Value::Double(9_007_199_254_740_992.0)),
            ("huge".into(), Value::Double(1.5e22)),
            ("small".into(), Value::Double(1e-7)),
        ]);
        assert_eq!(
            display_value(&value),
            "{\n  \"big\": 100000000000000000000,\n  \"p53\": 9007199254740992,\n  \"huge\": 1.5e+22,\n  \"small\": 1e-7\n}"
        );
    }

    #[test]
    fn test_bytes_field_is_structured() {
        let value = Value::Bytes(b"hi".to_vec());
        assert_eq!(
            display_value(&value),
            "{\n  \"type\": \"Buffer\",\n  \"data\": [\n    104,\n    105\n  ]\n}"
        );
    }

    #[test]
    fn test_bytes_in_array_are_text() {
        let value = Value::Array(vec![Value::Bytes(b"hi".to_vec()), Value::Integer(2)]);
        assert_eq!(display_value(&value), "[hi, 2]");
    }

    #[test]
    fn test_null_scalar() {
        assert_eq!(format_field("deleted", &Value::Null), "  deleted: null");
    }

    #[test]
    fn test_header_and_footer() {
        assert_eq!(
            listing_header(3),
            vec!["Found 3 documents:".to_string(), String::new(), heavy_rule()]
        );
        let footer = summary_footer(3);
        assert_eq!(footer[1], heavy_rule());
        assert_eq!(footer[3], "Total: 3 documents shown");
        assert_eq!(collection_total(42)[0], "Total documents in collection: 42");
    }

    #[test]
    fn test_banner() {
        assert_eq!(
            fetching_banner(10, "products"),
            "Fetching 10 documents from 'products' collection..."
        );
    }
}
