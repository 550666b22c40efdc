//! Decoding of Firestore's typed value encoding.
//!
//! Firestore wraps every value in a single-key object naming its type, e.g.
//! `{"integerValue": "10"}` or `{"mapValue": {"fields": {...}}}`. The
//! functions here unwrap that encoding into plain JSON values.

use serde::Deserialize;
use serde_json::{Map, Number, Value};
use shopchat_core::ProductRecord;

use crate::error::{Error, Result};

/// A document as returned by `documents.get`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Document {
    /// Full resource name of the document.
    pub name: String,
    /// Typed fields. Absent for documents without fields.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Decodes the document's fields into a product record.
    pub fn into_record(self) -> Result<ProductRecord> {
        decode_fields(&self.fields)
    }
}

/// Decodes a map of typed Firestore fields into a [`ProductRecord`].
///
/// Field order is preserved. Integers become JSON integers, timestamps,
/// references and bytes stay strings, geo points become
/// `{"latitude": .., "longitude": ..}` objects.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<ProductRecord> {
    fields
        .iter()
        .map(|(name, value)| {
            let decoded = decode_value(value)
                .map_err(|e| Error::decode(format!("field '{name}': {e}")))?;
            Ok((name.clone(), decoded))
        })
        .collect()
}

fn decode_map(fields: &Map<String, Value>) -> Result<Map<String, Value>, String> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode_value(value)?)))
        .collect()
}

fn decode_value(value: &Value) -> Result<Value, String> {
    let Some(encoded) = value.as_object() else {
        return Err(format!("expected a typed value object, found {value}"));
    };

    let mut entries = encoded.iter();
    let (Some((kind, inner)), None) = (entries.next(), entries.next()) else {
        return Err(format!(
            "expected exactly one value type, found {}",
            encoded.len()
        ));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => match inner {
            Value::Bool(_) => Ok(inner.clone()),
            other => Err(format!("booleanValue must be a boolean, found {other}")),
        },
        "integerValue" => decode_integer(inner),
        "doubleValue" => match inner {
            // Whole doubles arrive as `10`, which must stay a float.
            Value::Number(number) => number
                .as_f64()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("doubleValue {number} is not a finite double")),
            // NaN and the infinities are sent as strings.
            Value::String(_) => Ok(inner.clone()),
            other => Err(format!("doubleValue must be a number, found {other}")),
        },
        "stringValue" | "timestampValue" | "bytesValue" | "referenceValue" => match inner {
            Value::String(_) => Ok(inner.clone()),
            other => Err(format!("{kind} must be a string, found {other}")),
        },
        "geoPointValue" => {
            let point = inner.as_object().ok_or("geoPointValue must be an object")?;
            let coordinate =
                |name: &str| Value::from(point.get(name).and_then(Value::as_f64).unwrap_or(0.0));
            Ok(Value::Object(Map::from_iter([
                ("latitude".to_owned(), coordinate("latitude")),
                ("longitude".to_owned(), coordinate("longitude")),
            ])))
        }
        "arrayValue" => {
            let values: Vec<Value> = match inner.get("values") {
                Some(Value::Array(values)) => values.iter().map(decode_value).collect(),
                Some(other) => Err(format!("arrayValue.values must be an array, found {other}")),
                None => Ok(Vec::new()),
            }?;
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(Value::Object(fields)) => decode_map(fields)?,
                Some(other) => return Err(format!("mapValue.fields must be an object, found {other}")),
                None => Map::new(),
            };
            Ok(Value::Object(fields))
        }
        other => Err(format!("unsupported value type '{other}'")),
    }
}

fn decode_integer(inner: &Value) -> Result<Value, String> {
    match inner {
        // int64 values are sent as decimal strings.
        Value::String(digits) => digits
            .parse::<i64>()
            .map(|n| Value::Number(Number::from(n)))
            .map_err(|e| format!("integerValue '{digits}' is not an int64: {e}")),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(inner.clone()),
        other => Err(format!("integerValue must be a string, found {other}")),
    }
}
