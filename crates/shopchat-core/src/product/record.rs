//! Product record and its prompt rendering.

use std::fmt::{self, Write};

use derive_more::{Deref, From, IntoIterator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A product document returned verbatim from the document store.
///
/// No schema is enforced: the record is an ordered field mapping, and an
/// empty record stands for a product that does not exist.
///
/// # Rendering
///
/// [`Display`](fmt::Display) renders the record as a dict literal, which is
/// the form embedded into composed prompts:
///
/// - maps as `{'key': value, ...}`, the empty map as `{}`
/// - strings single-quoted, with `\`, `'`, and control characters escaped
/// - integers as digits, floats in shortest round-trip form (`10.0`), with
///   a signed exponent outside `1e-4..1e16` (`1e+16`, `2.5e-07`)
/// - booleans as `True`/`False`, null as `None`, arrays as `[a, b]`
///
/// Fields keep the order the store returned them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Deref, From, IntoIterator)]
#[serde(transparent)]
pub struct ProductRecord(Map<String, Value>);

impl ProductRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, keeping insertion order.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the underlying field mapping.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl TryFrom<Value> for ProductRecord {
    type Error = Value;

    /// Accepts only JSON objects, handing anything else back unchanged.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(other),
        }
    }
}

impl FromIterator<(String, Value)> for ProductRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ProductRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_map(f, &self.0)
    }
}

fn write_map(f: &mut fmt::Formatter<'_>, fields: &Map<String, Value>) -> fmt::Result {
    f.write_char('{')?;
    for (index, (key, value)) in fields.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write_str_literal(f, key)?;
        f.write_str(": ")?;
        write_value(f, value)?;
    }
    f.write_char('}')
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("None"),
        Value::Bool(true) => f.write_str("True"),
        Value::Bool(false) => f.write_str("False"),
        Value::Number(number) => match number.as_f64() {
            Some(float) if number.is_f64() => write_float(f, float),
            _ => write!(f, "{number}"),
        },
        Value::String(text) => write_str_literal(f, text),
        Value::Array(items) => {
            f.write_char('[')?;
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write_value(f, item)?;
            }
            f.write_char(']')
        }
        Value::Object(fields) => write_map(f, fields),
    }
}

/// Writes the shortest round-trip form, keeping `.0` on whole numbers.
///
/// Magnitudes below `1e-4` or from `1e16` up use a signed exponent of at
/// least two digits, e.g. `1e+16` and `2.5e-07`.
fn write_float(f: &mut fmt::Formatter<'_>, float: f64) -> fmt::Result {
    let shortest = format!("{float:?}");
    match shortest.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            write!(f, "{mantissa}e{sign}{digits:0>2}")
        }
        None => f.write_str(&shortest),
    }
}

fn write_str_literal(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_char('\'')?;
    for ch in text.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '\'' => f.write_str("\\'")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            ch if ch.is_control() => write!(f, "\\x{:02x}", ch as u32)?,
            ch => f.write_char(ch)?,
        }
    }
    f.write_char('\'')
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> ProductRecord {
        ProductRecord::try_from(value).expect("object")
    }

    #[test]
    fn renders_fields_in_store_order() {
        let product = record(json!({"name": "Shirt", "color": "blue"}));
        assert_eq!(product.to_string(), "{'name': 'Shirt', 'color': 'blue'}");
    }

    #[test]
    fn renders_empty_record() {
        assert_eq!(ProductRecord::new().to_string(), "{}");
    }

    #[test]
    fn renders_scalars() {
        let product = record(json!({
            "price": 10,
            "weight": 1.5,
            "whole": 10.0,
            "active": true,
            "discontinued": false,
            "sku": null,
        }));

        assert_eq!(
            product.to_string(),
            "{'price': 10, 'weight': 1.5, 'whole': 10.0, 'active': True, \
             'discontinued': False, 'sku': None}"
        );
    }

    #[test]
    fn renders_float_exponents() {
        let product = record(json!({
            "large": 1e16,
            "huge": -1.5e100,
            "small": 2.5e-7,
            "edge": 1e-4,
            "below": 9999999999999998.0,
        }));

        assert_eq!(
            product.to_string(),
            "{'large': 1e+16, 'huge': -1.5e+100, 'small': 2.5e-07, 'edge': 0.0001, \
             'below': 9999999999999998.0}"
        );
    }

    #[test]
    fn renders_nested_values() {
        let product = record(json!({
            "tags": ["summer", "cotton"],
            "size": {"chest": 42, "unit": "cm"},
        }));

        assert_eq!(
            product.to_string(),
            "{'tags': ['summer', 'cotton'], 'size': {'chest': 42, 'unit': 'cm'}}"
        );
    }

    #[test]
    fn escapes_quotes_and_newlines() {
        let product = ProductRecord::new().with_field("note", "it's a\nback\\slash");
        assert_eq!(product.to_string(), r"{'note': 'it\'s a\nback\\slash'}");
    }

    #[test]
    fn rejects_non_object_values() {
        assert!(ProductRecord::try_from(json!([1, 2])).is_err());
    }

    #[test]
    fn serializes_transparently() -> anyhow::Result<()> {
        let product = ProductRecord::new().with_field("price", 10);
        assert_eq!(serde_json::to_value(&product)?, json!({"price": 10}));
        Ok(())
    }
}
