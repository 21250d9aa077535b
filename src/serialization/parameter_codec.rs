//! Parameters and request bodies.
//!
//! Swagger 2.0 carries bodies and form fields as parameters; OpenAPI 3 moves
//! them into `requestBody`. The model keeps the Swagger shape so parameter
//! order survives: the body slot is recorded in `x-position`, its name in
//! `x-name`.

use serde_json::{Map, Value};

use super::reader::Reader;
use super::schema_codec::INLINE_SCHEMA_KEYS;
use super::writer::{Writer, translate_local_pointer};
use super::{as_object, bool_of, extensions_of, put_bool, put_extensions, put_str, str_of};
use crate::core::error::{Error, Result};
use crate::model::{
    CollectionFormat, JsonType, Operation, Parameter, ParameterKind, ParameterStyle, Reference,
    ScopeId, WireFormat,
};
use crate::model::pointer::{encode_segment, value_at};

const PARAMETER_KEYS: &[&str] = &[
    "$ref",
    "name",
    "in",
    "description",
    "required",
    "schema",
    "style",
    "explode",
    "collectionFormat",
    "allowEmptyValue",
    "deprecated",
    "example",
    "x-example",
];

const REQUEST_BODY_KEYS: &[&str] = &["description", "content", "required", "x-name", "x-position"];

const MULTIPART: &str = "multipart/form-data";
const URL_ENCODED: &str = "application/x-www-form-urlencoded";

fn is_form(media: &str) -> bool {
    media == MULTIPART || media == URL_ENCODED
}

impl Reader<'_> {
    pub(crate) fn read_parameter(&mut self, value: &Value) -> Result<Parameter> {
        let map = as_object(value, "parameter")?;
        if let Some(pointer) = str_of(map, "$ref") {
            return Ok(Parameter::reference(self.reference(&pointer)));
        }

        let name = str_of(map, "name").ok_or_else(|| Error::parse("parameter without a name"))?;
        let location = str_of(map, "in")
            .ok_or_else(|| Error::parse(format!("parameter '{name}' has no 'in'")))?;
        let kind = ParameterKind::parse(&location).ok_or_else(|| {
            Error::parse(format!("parameter '{name}' has unknown location '{location}'"))
        })?;

        let mut parameter = Parameter::new(name, kind);
        parameter.description = str_of(map, "description");
        parameter.required = bool_of(map, "required").unwrap_or(kind == ParameterKind::Path);
        parameter.style = map
            .get("style")
            .and_then(Value::as_str)
            .and_then(ParameterStyle::parse);
        parameter.explode = bool_of(map, "explode");
        parameter.collection_format = map
            .get("collectionFormat")
            .and_then(Value::as_str)
            .and_then(CollectionFormat::parse);
        parameter.allow_empty_value = bool_of(map, "allowEmptyValue");
        parameter.deprecated = bool_of(map, "deprecated");
        parameter.example = map.get("example").or(map.get("x-example")).cloned();
        parameter.schema = match map.get("schema") {
            Some(schema) => Some(self.read_schema(schema)?),
            None => self.read_inline_schema(map)?,
        };

        let mut known = PARAMETER_KEYS.to_vec();
        known.extend_from_slice(INLINE_SCHEMA_KEYS);
        parameter.extensions = extensions_of(map, &known);
        Ok(parameter)
    }

    /// Turns an OpenAPI `requestBody` back into body or form parameters
    pub(super) fn read_request_body(&mut self, value: &Value, operation: &mut Operation) -> Result<()> {
        let mut map = as_object(value, "requestBody")?;
        if let Some(pointer) = map.get("$ref").and_then(Value::as_str) {
            if !pointer.starts_with('#') || self.scope != ScopeId::Root {
                return Err(Error::reference_not_found(pointer, "request bodies of this document"));
            }
            let target = value_at(self.root, pointer)
                .ok_or_else(|| Error::reference_not_found(pointer, "<root>"))?;
            map = as_object(target, "requestBody")?;
        }

        let empty = Map::new();
        let content = map
            .get("content")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        if operation.consumes.is_empty() {
            operation.consumes = content.keys().cloned().collect();
        }
        let required = bool_of(map, "required").unwrap_or(false);

        let form_fields = content
            .iter()
            .find(|(media, _)| is_form(media))
            .filter(|_| content.keys().all(|media| is_form(media)))
            .and_then(|(_, media)| media.get("schema"))
            .filter(|schema| schema.get("$ref").is_none())
            .and_then(|schema| schema.as_object());
        if let Some(form) = form_fields {
            let required_fields = super::strings_of(form, "required");
            if let Some(properties) = form.get("properties").and_then(Value::as_object) {
                for (name, value) in properties {
                    let mut parameter = Parameter::new(name.clone(), ParameterKind::FormData);
                    parameter.required = required_fields.contains(name);
                    parameter.description = value
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    parameter.schema = Some(self.read_schema(value)?);
                    operation.parameters.push(parameter);
                }
                return Ok(());
            }
        }

        let media = content
            .iter()
            .find(|(media, _)| media.contains("json"))
            .or_else(|| content.iter().next());
        let mut body = Parameter::new(
            str_of(map, "x-name").unwrap_or_else(|| "body".to_string()),
            ParameterKind::Body,
        );
        body.required = required;
        body.description = str_of(map, "description");
        body.schema = match media.and_then(|(_, media)| media.get("schema")) {
            Some(schema) => Some(self.read_schema(schema)?),
            None => None,
        };
        body.extensions = extensions_of(map, REQUEST_BODY_KEYS);

        let position = map
            .get("x-position")
            .and_then(Value::as_u64)
            .map(|p| (p.max(1) - 1) as usize)
            .unwrap_or(operation.parameters.len())
            .min(operation.parameters.len());
        operation.parameters.insert(position, body);
        Ok(())
    }
}

impl Writer<'_> {
    pub(super) fn write_parameter(&self, parameter: &Parameter) -> Result<Value> {
        if let Some(reference) = &parameter.reference {
            let mut map = Map::new();
            map.insert(
                "$ref".to_string(),
                Value::String(self.parameter_pointer(reference)),
            );
            return Ok(Value::Object(map));
        }

        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(parameter.name.clone()));
        map.insert("in".to_string(), Value::from(parameter.kind.as_str()));
        put_str(&mut map, "description", &parameter.description);
        if parameter.required || parameter.kind == ParameterKind::Path {
            map.insert("required".to_string(), Value::Bool(true));
        }
        put_bool(&mut map, "deprecated", parameter.deprecated);
        put_bool(&mut map, "allowEmptyValue", parameter.allow_empty_value);

        // an unresolved external schema is written as its reference
        let is_array = parameter
            .schema
            .is_some_and(|id| self.document.actual_schema(id).is_ok_and(|schema| schema.is_array()));
        match (self.format, parameter.kind) {
            (WireFormat::Swagger2, ParameterKind::Body) | (WireFormat::OpenApi3, _) => {
                if let Some(id) = parameter.schema {
                    map.insert("schema".to_string(), self.write_schema(id)?);
                }
            }
            (WireFormat::Swagger2, kind) => {
                if let Some(id) = parameter.schema {
                    let mut inline = self.write_inline_schema(id)?;
                    let binary = inline.get("format").and_then(Value::as_str) == Some("binary");
                    if kind == ParameterKind::FormData && binary {
                        inline.insert("type".to_string(), Value::from(JsonType::File.as_str()));
                        inline.remove("format");
                    }
                    for (key, value) in inline {
                        map.entry(key).or_insert(value);
                    }
                }
            }
        }

        match self.format {
            WireFormat::Swagger2 => {
                let collection_format = parameter.collection_format.or_else(|| {
                    parameter.style.map(|style| {
                        CollectionFormat::from_style(
                            style,
                            parameter.explode.unwrap_or(style == ParameterStyle::Form),
                        )
                    })
                });
                if let Some(collection_format) = collection_format.filter(|_| is_array) {
                    map.insert(
                        "collectionFormat".to_string(),
                        Value::from(collection_format.as_str()),
                    );
                }
                if let Some(example) = &parameter.example {
                    map.insert("x-example".to_string(), example.clone());
                }
            }
            WireFormat::OpenApi3 => {
                let style = match (parameter.style, parameter.collection_format) {
                    (Some(style), _) => Some((style, parameter.explode)),
                    (None, Some(collection_format)) if is_array => {
                        let (style, explode) = collection_format.to_style();
                        let style = match parameter.kind {
                            ParameterKind::Path | ParameterKind::Header
                                if style == ParameterStyle::Form =>
                            {
                                ParameterStyle::Simple
                            }
                            _ => style,
                        };
                        Some((style, Some(explode)))
                    }
                    _ => None,
                };
                if let Some((style, explode)) = style {
                    map.insert("style".to_string(), Value::from(style.as_str()));
                    put_bool(&mut map, "explode", explode);
                }
                if let Some(example) = &parameter.example {
                    map.insert("example".to_string(), example.clone());
                }
            }
        }

        put_extensions(&mut map, &parameter.extensions);
        Ok(Value::Object(map))
    }

    /// Builds the OpenAPI `requestBody` from body or form parameters
    pub(super) fn write_request_body(&self, operation: &Operation) -> Result<Option<Value>> {
        let mut body = None;
        let mut form = Vec::new();
        for (index, parameter) in operation.parameters.iter().enumerate() {
            let Some(actual) = self.followed_parameter(parameter)? else {
                continue;
            };
            match actual.kind {
                ParameterKind::Body => body = Some((index, actual)),
                ParameterKind::FormData => form.push(actual),
                _ => {}
            }
        }
        let consumes = operation.actual_consumes(self.document);

        if let Some((index, parameter)) = body {
            let mut schema = Map::new();
            if let Some(id) = parameter.schema {
                schema.insert("schema".to_string(), self.write_schema(id)?);
            }
            let media_types: Vec<&str> = if consumes.is_empty() {
                vec!["application/json"]
            } else {
                consumes.iter().map(String::as_str).collect()
            };
            let content: Map<String, Value> = media_types
                .into_iter()
                .map(|media| (media.to_string(), Value::Object(schema.clone())))
                .collect();

            let mut map = Map::new();
            map.insert("x-name".to_string(), Value::String(parameter.name.clone()));
            put_str(&mut map, "description", &parameter.description);
            map.insert("content".to_string(), Value::Object(content));
            if parameter.required {
                map.insert("required".to_string(), Value::Bool(true));
            }
            map.insert("x-position".to_string(), Value::from(index + 1));
            put_extensions(&mut map, &parameter.extensions);
            return Ok(Some(Value::Object(map)));
        }

        if form.is_empty() {
            return Ok(None);
        }
        let mut properties = Map::new();
        let mut required = Vec::new();
        let mut has_file = false;
        for parameter in &form {
            let mut property = match parameter.schema {
                Some(id) => {
                    let actual = self.document.actual_schema(id)?;
                    has_file |= actual.has_type(JsonType::File)
                        || actual.format.as_deref() == Some("binary");
                    self.write_schema(id)?
                }
                None => Value::Object(Map::new()),
            };
            if let (Some(description), Some(object)) =
                (&parameter.description, property.as_object_mut())
            {
                object
                    .entry("description")
                    .or_insert_with(|| Value::String(description.clone()));
            }
            properties.insert(parameter.name.clone(), property);
            if parameter.required {
                required.push(Value::String(parameter.name.clone()));
            }
        }
        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::from("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }

        let mut media_types: Vec<&str> = consumes
            .iter()
            .map(String::as_str)
            .filter(|media| is_form(media))
            .collect();
        if media_types.is_empty() {
            media_types.push(if has_file { MULTIPART } else { URL_ENCODED });
        }
        let mut media = Map::new();
        media.insert("schema".to_string(), Value::Object(schema));
        let content: Map<String, Value> = media_types
            .into_iter()
            .map(|media_type| (media_type.to_string(), Value::Object(media.clone())))
            .collect();

        let mut map = Map::new();
        map.insert("content".to_string(), Value::Object(content));
        Ok(Some(Value::Object(map)))
    }

    /// The parameter a slot stands for, or `None` when it references a
    /// document that was never loaded. Such a slot is written back as its `$ref`.
    pub(super) fn followed_parameter<'p>(
        &'p self,
        parameter: &'p Parameter,
    ) -> Result<Option<&'p Parameter>> {
        match self.document.actual_parameter(parameter) {
            Ok(actual) => Ok(Some(actual)),
            Err(Error::ReferenceNotFound { .. }) if parameter.reference.is_some() => Ok(None),
            Err(error) => Err(error),
        }
    }

    pub(super) fn parameter_pointer(&self, reference: &Reference<Parameter>) -> String {
        if reference.scope != ScopeId::Root || !(reference.pointer.is_empty() || reference.is_local()) {
            return reference.pointer.clone();
        }
        if let Some(target) = reference.target {
            if let Some((name, _)) = self.document.parameters.iter().find(|(_, id)| **id == target) {
                return format!("{}{}", self.format.parameters_prefix(), encode_segment(name));
            }
        }
        translate_local_pointer(&reference.pointer, self.format)
    }
}
