//! Dual-format serializer.
//!
//! Text is first decoded into a `serde_json::Value` (YAML is transcoded into
//! the same value model), then projected into the format-agnostic
//! [`Document`]. Writing runs the projection the other way for whichever
//! [`WireFormat`] is requested.

mod parameter_codec;
mod reader;
mod schema_codec;
mod security_codec;
mod writer;

pub(crate) use reader::Reader;
pub use reader::detect_format;

use serde_json::{Map, Value};

use crate::core::error::{Error, Result};
use crate::model::{Document, Extensions, WireFormat};

impl Document {
    /// Parses a JSON or YAML document, choosing by the first significant character
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim_start().starts_with('{') {
            Self::from_json(text)
        } else {
            Self::from_yaml(text)
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| Error::parse(format!("invalid JSON: {e}")))?;
        Self::from_value(&value)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| Error::parse(format!("invalid YAML: {e}")))?;
        Self::from_value(&value)
    }

    /// Reads a decoded document; the format is detected from its version key
    pub fn from_value(value: &Value) -> Result<Self> {
        reader::read_document(value)
    }

    /// Projects the document onto `format`
    pub fn to_value(&self, format: WireFormat) -> Result<Value> {
        writer::write_document(self, format)
    }

    pub fn to_json(&self, format: WireFormat) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value(format)?)?)
    }

    pub fn to_yaml(&self, format: WireFormat) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_value(format)?)?)
    }
}

fn str_of(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_of(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

fn strings_of(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Every key not listed in `known`, in input order
fn extensions_of(map: &Map<String, Value>, known: &[&str]) -> Extensions {
    map.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::parse(format!("{what} must be an object")))
}

fn put_str(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value.clone()));
    }
}

fn put_bool(map: &mut Map<String, Value>, key: &str, value: Option<bool>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::Bool(value));
    }
}

fn put_strings(map: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        map.insert(
            key.to_string(),
            Value::Array(values.iter().cloned().map(Value::String).collect()),
        );
    }
}

fn put_extensions(map: &mut Map<String, Value>, extensions: &Extensions) {
    for (key, value) in extensions {
        map.entry(key.clone()).or_insert_with(|| value.clone());
    }
}
