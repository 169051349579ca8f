//! Schema documents: ordered lists of named, typed fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single `{name, type}` pair.
///
/// Neither string is interpreted; missing keys decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: String,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// An ordered sequence of fields.  Duplicate names are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Decodes the first JSON value in `bytes`, failing on malformed input.
    ///
    /// Anything after the first value is ignored.  Object keys match case-insensitively, and a
    /// top-level `null` is the empty schema.
    pub fn decode_strict(bytes: &[u8]) -> Result<Schema, serde_json::Error> {
        let mut values = serde_json::Deserializer::from_slice(bytes).into_iter::<Value>();
        match values.next() {
            Some(value) => match fold_keys(value?) {
                Value::Null => Ok(Schema::default()),
                value => serde_json::from_value(value),
            },
            // Empty input: let the parser produce its EOF error.
            None => serde_json::from_slice(bytes),
        }
    }

    /// Decodes `bytes`, falling back to the empty schema on malformed input.
    pub fn decode_lenient(bytes: &[u8]) -> Schema {
        Self::decode_strict(bytes).unwrap_or_else(|err| {
            tracing::warn!("Ignoring malformed schema document: {}", err);
            Schema::default()
        })
    }
}

/// Lowercases every object key so `Fields`, `NAME` and `Type` match their fields.
fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), fold_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}
