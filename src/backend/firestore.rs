//! Firestore REST wire format
//!
//! Firestore wraps each field in a typed object (`{"stringValue": "x"}`,
//! `{"integerValue": "5"}`, ...). These helpers convert between that shape and
//! `Fields`, and build `runQuery` request bodies.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tracing::warn;

use super::{BackendError, Direction, Document, FieldValue, Fields, Query};

pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Bool(b) => json!({ "booleanValue": b }),
        // 64-bit integers travel as strings
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(d) => json!({ "doubleValue": d }),
        FieldValue::Timestamp(t) => {
            json!({ "timestampValue": t.to_rfc3339_opts(SecondsFormat::Micros, true) })
        }
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Array(values) => {
            let values: Vec<Value> = values.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        FieldValue::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

pub fn decode_value(value: &Value) -> Result<FieldValue, BackendError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BackendError::Decode(format!("expected typed value, got {}", value)))?;

    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| BackendError::Decode("empty typed value".to_string()))?;

    match kind.as_str() {
        "nullValue" => Ok(FieldValue::Null),
        "booleanValue" => inner
            .as_bool()
            .map(FieldValue::Bool)
            .ok_or_else(|| bad(kind, inner)),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed.map(FieldValue::Integer).ok_or_else(|| bad(kind, inner))
        }
        "doubleValue" => {
            let parsed = match inner {
                Value::Number(n) => n.as_f64(),
                // NaN and Infinity come back as strings
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };
            parsed.map(FieldValue::Double).ok_or_else(|| bad(kind, inner))
        }
        "timestampValue" => inner
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc)))
            .ok_or_else(|| bad(kind, inner)),
        "stringValue" | "referenceValue" => inner
            .as_str()
            .map(|s| FieldValue::String(s.to_string()))
            .ok_or_else(|| bad(kind, inner)),
        "arrayValue" => {
            let values = match inner.get("values").and_then(Value::as_array) {
                Some(values) => values.iter().map(decode_value).collect::<Result<_, _>>()?,
                None => Vec::new(),
            };
            Ok(FieldValue::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(fields) => decode_fields(fields)?,
                None => Fields::new(),
            };
            Ok(FieldValue::Map(fields))
        }
        other => Err(BackendError::Decode(format!(
            "unsupported value type {}",
            other
        ))),
    }
}

fn bad(kind: &str, inner: &Value) -> BackendError {
    BackendError::Decode(format!("malformed {}: {}", kind, inner))
}

pub fn decode_fields(fields: &Value) -> Result<Fields, BackendError> {
    let obj = fields
        .as_object()
        .ok_or_else(|| BackendError::Decode("fields is not an object".to_string()))?;
    obj.iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

/// Last segment of a full document resource name
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Decode a document resource (`{"name": ..., "fields": {...}}`)
pub fn decode_document(doc: &Value) -> Result<Document, BackendError> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::Decode("document without name".to_string()))?;

    let fields = match doc.get("fields") {
        Some(fields) => decode_fields(fields)?,
        None => Fields::new(),
    };

    Ok(Document::new(document_id(name), fields))
}

/// Build the `structuredQuery` body for `documents:runQuery`
pub fn structured_query(query: &Query) -> Value {
    let mut structured = Map::new();
    structured.insert(
        "from".to_string(),
        json!([{ "collectionId": query.collection }]),
    );

    let filters: Vec<Value> = query
        .filters
        .iter()
        .map(|(field, value)| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": encode_value(value),
                }
            })
        })
        .collect();

    match filters.len() {
        0 => {}
        1 => {
            structured.insert("where".to_string(), filters[0].clone());
        }
        _ => {
            structured.insert(
                "where".to_string(),
                json!({ "compositeFilter": { "op": "AND", "filters": filters } }),
            );
        }
    }

    if let Some((field, direction)) = &query.order_by {
        let direction = match direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        structured.insert(
            "orderBy".to_string(),
            json!([{ "field": { "fieldPath": field }, "direction": direction }]),
        );
    }

    if let Some(limit) = query.limit {
        structured.insert("limit".to_string(), json!(limit));
    }

    json!({ "structuredQuery": structured })
}

/// Decode a `runQuery` response: an array of `{document?, readTime}` entries
pub fn decode_query_response(body: &Value) -> Result<Vec<Document>, BackendError> {
    let entries = body
        .as_array()
        .ok_or_else(|| BackendError::Decode("runQuery response is not an array".to_string()))?;

    let documents = entries
        .iter()
        .filter_map(|entry| entry.get("document"))
        .filter_map(|doc| match decode_document(doc) {
            Ok(document) => Some(document),
            Err(e) => {
                let name = doc.get("name").and_then(Value::as_str).unwrap_or("?");
                warn!("skipping document {}: {}", name, e);
                None
            }
        })
        .collect();
    Ok(documents)
}
