//! Firestore REST wire format
//!
//! Request bodies for `runQuery` / `runAggregationQuery` and decoding of their
//! responses into [`Document`] and [`Value`]. Field maps are decoded through
//! order-preserving `serde_json` maps so documents keep server field order.

use crate::firestore::path::CollectionPath;
use crate::model::{Document, Value};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use fire_common::{FireError, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value as Json};

/// Alias of the count aggregation in requests and responses
pub const COUNT_ALIAS: &str = "total";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunQueryItem {
    #[serde(default)]
    document: Option<WireDocument>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Json>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregationItem {
    #[serde(default)]
    result: Option<AggregationResult>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregationResult {
    #[serde(default)]
    aggregate_fields: Map<String, Json>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Google API error payload
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl ErrorBody {
    fn into_error(self, fallback_status: u16) -> FireError {
        let status = self.code.unwrap_or(fallback_status);
        FireError::Api {
            status,
            code: self.status.unwrap_or_else(|| status_code_name(status)),
            message: self.message,
        }
    }
}

/// Body of a `runQuery` request fetching up to `limit` documents
pub fn run_query_body(path: &CollectionPath, limit: u32) -> Json {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": path.collection_id() }],
            "limit": limit,
        }
    })
}

/// Body of a `runAggregationQuery` request counting the whole collection
pub fn count_query_body(path: &CollectionPath) -> Json {
    json!({
        "structuredAggregationQuery": {
            "structuredQuery": {
                "from": [{ "collectionId": path.collection_id() }],
            },
            "aggregations": [{ "alias": COUNT_ALIAS, "count": {} }],
        }
    })
}

/// Decode a `runQuery` response stream.
///
/// Entries without a document (the trailing `readTime` entry, or the only
/// entry of an empty result) are skipped.
pub fn decode_documents(body: &str) -> Result<Vec<Document>> {
    let items: Vec<RunQueryItem> = serde_json::from_str(body)
        .map_err(|e| FireError::Decode(format!("runQuery response: {}", e)))?;

    let mut documents = Vec::new();
    for item in items {
        if let Some(error) = item.error {
            return Err(error.into_error(500));
        }
        if let Some(doc) = item.document {
            documents.push(Document::from_name(&doc.name, decode_fields(&doc.fields)?));
        }
    }
    Ok(documents)
}

/// Decode a `runAggregationQuery` response into the collection count
pub fn decode_count(body: &str) -> Result<u64> {
    let items: Vec<AggregationItem> = serde_json::from_str(body)
        .map_err(|e| FireError::Decode(format!("runAggregationQuery response: {}", e)))?;

    for item in items {
        if let Some(error) = item.error {
            return Err(error.into_error(500));
        }
        let Some(result) = item.result else {
            continue;
        };
        let raw = result.aggregate_fields.get(COUNT_ALIAS).ok_or_else(|| {
            FireError::Decode(format!("aggregation result has no '{}' field", COUNT_ALIAS))
        })?;
        return match decode_value(raw)? {
            Value::Integer(count) if count >= 0 => Ok(count as u64),
            other => Err(FireError::Decode(format!(
                "count is not a non-negative integer: {}",
                other
            ))),
        };
    }

    Err(FireError::Decode(
        "runAggregationQuery returned no result".to_string(),
    ))
}

/// Map an unsuccessful HTTP response to an API error
pub fn decode_error(status: StatusCode, body: &str) -> FireError {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.into_error(status.as_u16());
    }
    if let Ok(mut envelopes) = serde_json::from_str::<Vec<ErrorEnvelope>>(body) {
        if !envelopes.is_empty() {
            return envelopes.remove(0).error.into_error(status.as_u16());
        }
    }

    let message = match body.trim() {
        "" => status.canonical_reason().unwrap_or("request failed").to_string(),
        text => text.to_string(),
    };
    FireError::Api {
        status: status.as_u16(),
        code: status_code_name(status.as_u16()),
        message,
    }
}

/// `404` -> `NOT_FOUND`
fn status_code_name(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(|reason| reason.to_uppercase().replace(|c: char| c == ' ' || c == '-', "_"))
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

pub fn decode_fields(fields: &Map<String, Json>) -> Result<Vec<(String, Value)>> {
    fields
        .iter()
        .map(|(key, raw)| decode_value(raw).map(|value| (key.clone(), value)))
        .collect()
}

/// Decode one typed Firestore value (`{"stringValue": "x"}` and friends)
pub fn decode_value(raw: &Json) -> Result<Value> {
    let object = raw
        .as_object()
        .ok_or_else(|| FireError::Decode(format!("value is not an object: {}", raw)))?;

    let mut entries = object.iter();
    let (kind, payload) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(FireError::Decode(format!(
                "value must have exactly one type key: {}",
                raw
            )))
        }
    };

    let malformed = || FireError::Decode(format!("malformed {}: {}", kind, payload));

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => payload.as_bool().map(Value::Boolean).ok_or_else(malformed),
        "integerValue" => match payload {
            Json::String(text) => text.parse().map(Value::Integer).map_err(|_| malformed()),
            Json::Number(n) => n.as_i64().map(Value::Integer).ok_or_else(malformed),
            _ => Err(malformed()),
        },
        "doubleValue" => decode_double(payload).map(Value::Double).ok_or_else(malformed),
        "timestampValue" => payload
            .as_str()
            .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
            .ok_or_else(malformed),
        "stringValue" => payload
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(malformed),
        "bytesValue" => payload
            .as_str()
            .and_then(|text| STANDARD.decode(text).ok())
            .map(Value::Bytes)
            .ok_or_else(malformed),
        "referenceValue" => payload
            .as_str()
            .map(|s| Value::Reference(s.to_string()))
            .ok_or_else(malformed),
        "geoPointValue" => {
            // proto3 JSON omits zero coordinates
            let coordinate = |name: &str| match payload.get(name) {
                None => Some(0.0),
                Some(v) => decode_double(v),
            };
            match (coordinate("latitude"), coordinate("longitude")) {
                (Some(latitude), Some(longitude)) => Ok(Value::GeoPoint {
                    latitude,
                    longitude,
                }),
                _ => Err(malformed()),
            }
        }
        "arrayValue" => match payload.get("values") {
            None => Ok(Value::Array(Vec::new())),
            Some(Json::Array(values)) => values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Some(_) => Err(malformed()),
        },
        "mapValue" => match payload.get("fields") {
            None => Ok(Value::Map(Vec::new())),
            Some(Json::Object(fields)) => decode_fields(fields).map(Value::Map),
            Some(_) => Err(malformed()),
        },
        other => Err(FireError::Decode(format!(
            "unsupported value type '{}'",
            other
        ))),
    }
}

/// Doubles arrive as numbers, or as strings for the non-finite values
fn decode_double(raw: &Json) -> Option<f64> {
    match raw {
        Json::Number(n) => n.as_f64(),
        Json::String(text) => match text.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            other => other.parse().ok(),
        },
        _ => None,
    }
}
