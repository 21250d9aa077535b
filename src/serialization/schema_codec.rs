//! Schema nodes on the wire.
//!
//! OpenAPI 3 keeps `$ref` siblings by wrapping the pointer: nullable
//! references become `{nullable: true, oneOf: [{$ref}]}`, other siblings go
//! next to `allOf: [{$ref}]`. Swagger 2.0 writes the siblings beside `$ref`
//! with `x-nullable`. Reading folds both spellings back into one reference
//! node.

use serde_json::{Map, Value};

use super::reader::Reader;
use super::writer::Writer;
use super::{as_object, bool_of, extensions_of, put_bool, put_str, put_strings, str_of, strings_of};
use crate::core::error::{Error, Result};
use crate::model::{
    AdditionalProperties, Discriminator, Id, JsonType, Schema, WireFormat,
};

/// Keys a Swagger 2.0 non-body parameter or header carries inline instead of a `schema`
pub(super) const INLINE_SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "items",
    "default",
    "enum",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
    "x-nullable",
];

const SCHEMA_KEYS: &[&str] = &[
    "$ref",
    "title",
    "description",
    "type",
    "format",
    "properties",
    "required",
    "items",
    "additionalProperties",
    "allOf",
    "oneOf",
    "anyOf",
    "not",
    "x-oneOf",
    "x-anyOf",
    "x-not",
    "enum",
    "default",
    "example",
    "nullable",
    "x-nullable",
    "readOnly",
    "writeOnly",
    "x-writeOnly",
    "deprecated",
    "x-deprecated",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
    "minProperties",
    "maxProperties",
    "discriminator",
];

/// Keys that make a wrapper more than a reference with siblings
const STRUCTURAL_KEYS: &[&str] = &[
    "$ref",
    "type",
    "properties",
    "items",
    "additionalProperties",
    "anyOf",
    "not",
    "enum",
];

impl Reader<'_> {
    /// Reads a nested schema; single-element `oneOf`/`allOf` reference
    /// wrappers collapse into a reference node
    pub(crate) fn read_schema(&mut self, value: &Value) -> Result<Id<Schema>> {
        self.read_schema_node(value, true)
    }

    /// Reads a registered definition, which keeps its composition as written
    pub(crate) fn read_named_schema(&mut self, value: &Value) -> Result<Id<Schema>> {
        self.read_schema_node(value, false)
    }

    /// Builds a schema from the inline keys of a Swagger parameter or header
    pub(super) fn read_inline_schema(
        &mut self,
        map: &Map<String, Value>,
    ) -> Result<Option<Id<Schema>>> {
        let inline: Map<String, Value> = map
            .iter()
            .filter(|(key, _)| INLINE_SCHEMA_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if inline.is_empty() {
            return Ok(None);
        }
        self.read_schema(&Value::Object(inline)).map(Some)
    }

    fn read_schema_node(&mut self, value: &Value, collapse: bool) -> Result<Id<Schema>> {
        // Reserve the slot first so a parent always precedes its children
        let id = self.document.schemas.alloc(Schema::default());
        let schema = match value {
            Value::Bool(_) => Schema::default(),
            Value::Object(map) => self.read_schema_fields(map, collapse)?,
            other => {
                return Err(Error::parse(format!(
                    "schema must be an object, found '{other}'"
                )));
            }
        };
        self.document.schemas[id] = schema;
        Ok(id)
    }

    fn read_schema_fields(&mut self, map: &Map<String, Value>, collapse: bool) -> Result<Schema> {
        let wrapped = if collapse { wrapped_reference(map) } else { None };
        let pointer = str_of(map, "$ref").or(wrapped.map(str::to_string));

        let mut schema = Schema {
            title: str_of(map, "title"),
            description: str_of(map, "description"),
            types: read_types(map)?,
            format: str_of(map, "format"),
            required: strings_of(map, "required"),
            enumeration: map
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            default: map.get("default").cloned(),
            example: map.get("example").cloned(),
            nullable: bool_of(map, "nullable").or(bool_of(map, "x-nullable")),
            read_only: bool_of(map, "readOnly"),
            write_only: bool_of(map, "writeOnly").or(bool_of(map, "x-writeOnly")),
            deprecated: bool_of(map, "deprecated").or(bool_of(map, "x-deprecated")),
            minimum: number_of(map, "minimum"),
            maximum: number_of(map, "maximum"),
            exclusive_minimum: bool_of(map, "exclusiveMinimum"),
            exclusive_maximum: bool_of(map, "exclusiveMaximum"),
            multiple_of: number_of(map, "multipleOf"),
            min_length: map.get("minLength").and_then(Value::as_u64),
            max_length: map.get("maxLength").and_then(Value::as_u64),
            pattern: str_of(map, "pattern"),
            min_items: map.get("minItems").and_then(Value::as_u64),
            max_items: map.get("maxItems").and_then(Value::as_u64),
            unique_items: bool_of(map, "uniqueItems"),
            min_properties: map.get("minProperties").and_then(Value::as_u64),
            max_properties: map.get("maxProperties").and_then(Value::as_u64),
            discriminator: read_discriminator(map.get("discriminator")),
            reference: pointer.map(|pointer| self.reference(&pointer)),
            extensions: extensions_of(map, SCHEMA_KEYS),
            ..Default::default()
        };

        if let Some(properties) = map.get("properties") {
            for (name, value) in as_object(properties, "properties")? {
                let property = self.read_schema(value)?;
                schema.properties.insert(name.clone(), property);
            }
        }
        if let Some(items) = map.get("items") {
            schema.items = Some(self.read_schema(items)?);
        }
        schema.additional_properties = match map.get("additionalProperties") {
            Some(Value::Bool(allowed)) => Some(AdditionalProperties::Allowed(*allowed)),
            Some(value) => Some(AdditionalProperties::Schema(self.read_schema(value)?)),
            None => None,
        };
        if wrapped.is_none() {
            schema.all_of = self.read_schema_list(map, "allOf")?;
            schema.one_of = self.read_schema_list(map, "oneOf")?;
        }
        schema.any_of = self.read_schema_list(map, "anyOf")?;
        if schema.one_of.is_empty() {
            schema.one_of = self.read_schema_list(map, "x-oneOf")?;
        }
        if schema.any_of.is_empty() {
            schema.any_of = self.read_schema_list(map, "x-anyOf")?;
        }
        if let Some(not) = map.get("not").or(map.get("x-not")) {
            schema.not = Some(self.read_schema(not)?);
        }
        Ok(schema)
    }

    fn read_schema_list(&mut self, map: &Map<String, Value>, key: &str) -> Result<Vec<Id<Schema>>> {
        let Some(list) = map.get(key) else {
            return Ok(Vec::new());
        };
        let items = list
            .as_array()
            .ok_or_else(|| Error::parse(format!("'{key}' must be an array")))?;
        items.iter().map(|item| self.read_schema(item)).collect()
    }
}

/// Pointer of a `{oneOf|allOf: [{$ref}]}` wrapper with nothing structural beside it
fn wrapped_reference(map: &Map<String, Value>) -> Option<&str> {
    if STRUCTURAL_KEYS.iter().any(|key| map.contains_key(*key)) {
        return None;
    }
    let list = match (
        map.get("oneOf").and_then(Value::as_array),
        map.get("allOf").and_then(Value::as_array),
    ) {
        (Some(list), None) | (None, Some(list)) if list.len() == 1 => list,
        _ => return None,
    };
    let inner = list[0].as_object()?;
    if inner.len() != 1 {
        return None;
    }
    inner.get("$ref")?.as_str()
}

fn read_types(map: &Map<String, Value>) -> Result<Vec<JsonType>> {
    let parse = |text: &str| {
        JsonType::parse(text).ok_or_else(|| Error::parse(format!("unknown schema type '{text}'")))
    };
    match map.get("type") {
        None => Ok(Vec::new()),
        Some(Value::String(text)) => Ok(vec![parse(text)?]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| Error::parse("schema type entries must be strings"))
                    .and_then(parse)
            })
            .collect(),
        Some(other) => Err(Error::parse(format!("invalid schema type '{other}'"))),
    }
}

fn read_discriminator(value: Option<&Value>) -> Option<Discriminator> {
    match value? {
        Value::String(name) => Some(Discriminator {
            property_name: name.clone(),
            mapping: Default::default(),
        }),
        Value::Object(map) => Some(Discriminator {
            property_name: str_of(map, "propertyName")?,
            mapping: map
                .get("mapping")
                .and_then(Value::as_object)
                .map(|mapping| {
                    mapping
                        .iter()
                        .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                        .collect()
                })
                .unwrap_or_default(),
        }),
        _ => None,
    }
}

fn number_of(map: &Map<String, Value>, key: &str) -> Option<serde_json::Number> {
    map.get(key).and_then(Value::as_number).cloned()
}

impl Writer<'_> {
    pub(super) fn write_schema(&self, id: Id<Schema>) -> Result<Value> {
        let schema = &self.document.schemas[id];
        if schema.reference.is_some() {
            return Ok(self.write_reference_schema(schema));
        }
        let swagger = self.format == WireFormat::Swagger2;

        let mut map = Map::new();
        put_str(&mut map, "title", &schema.title);
        put_str(&mut map, "description", &schema.description);

        let mut nullable = schema.nullable;
        if schema.has_type(JsonType::Null) {
            nullable = Some(true);
        }
        let mut format = schema.format.clone();
        let types: Vec<Value> = schema
            .types
            .iter()
            .filter(|ty| **ty != JsonType::Null)
            .map(|ty| match ty {
                JsonType::File if !swagger => {
                    format.get_or_insert_with(|| "binary".to_string());
                    Value::from("string")
                }
                other => Value::from(other.as_str()),
            })
            .collect();
        match types.len() {
            0 => {}
            1 => {
                map.insert("type".to_string(), types[0].clone());
            }
            _ => {
                map.insert("type".to_string(), Value::Array(types));
            }
        }
        put_str(&mut map, "format", &format);
        put_bool(&mut map, if swagger { "x-nullable" } else { "nullable" }, nullable);

        if !schema.properties.is_empty() {
            let mut properties = Map::new();
            for (name, property) in &schema.properties {
                properties.insert(name.clone(), self.write_schema(*property)?);
            }
            map.insert("properties".to_string(), Value::Object(properties));
        }
        put_strings(&mut map, "required", &schema.required);
        if let Some(items) = schema.items {
            map.insert("items".to_string(), self.write_schema(items)?);
        }
        match schema.additional_properties {
            Some(AdditionalProperties::Allowed(allowed)) => {
                map.insert("additionalProperties".to_string(), Value::Bool(allowed));
            }
            Some(AdditionalProperties::Schema(id)) => {
                map.insert("additionalProperties".to_string(), self.write_schema(id)?);
            }
            None => {}
        }

        self.write_schema_list(&mut map, "allOf", &schema.all_of)?;
        // No Swagger 2.0 keyword exists for these, keep them under vendor keys
        let (one_of, any_of, not) = if swagger {
            ("x-oneOf", "x-anyOf", "x-not")
        } else {
            ("oneOf", "anyOf", "not")
        };
        if swagger && (!schema.one_of.is_empty() || !schema.any_of.is_empty() || schema.not.is_some()) {
            tracing::warn!("oneOf/anyOf/not written as vendor extensions for Swagger 2.0");
        }
        self.write_schema_list(&mut map, one_of, &schema.one_of)?;
        self.write_schema_list(&mut map, any_of, &schema.any_of)?;
        if let Some(id) = schema.not {
            map.insert(not.to_string(), self.write_schema(id)?);
        }

        if !schema.enumeration.is_empty() {
            map.insert("enum".to_string(), Value::Array(schema.enumeration.clone()));
        }
        if let Some(default) = &schema.default {
            map.insert("default".to_string(), default.clone());
        }
        if let Some(example) = &schema.example {
            map.insert("example".to_string(), example.clone());
        }
        put_bool(&mut map, "readOnly", schema.read_only);
        put_bool(
            &mut map,
            if swagger { "x-writeOnly" } else { "writeOnly" },
            schema.write_only,
        );
        put_bool(
            &mut map,
            if swagger { "x-deprecated" } else { "deprecated" },
            schema.deprecated,
        );

        for (key, value) in [
            ("minimum", &schema.minimum),
            ("maximum", &schema.maximum),
            ("multipleOf", &schema.multiple_of),
        ] {
            if let Some(number) = value {
                map.insert(key.to_string(), Value::Number(number.clone()));
            }
        }
        put_bool(&mut map, "exclusiveMinimum", schema.exclusive_minimum);
        put_bool(&mut map, "exclusiveMaximum", schema.exclusive_maximum);
        for (key, value) in [
            ("minLength", schema.min_length),
            ("maxLength", schema.max_length),
            ("minItems", schema.min_items),
            ("maxItems", schema.max_items),
            ("minProperties", schema.min_properties),
            ("maxProperties", schema.max_properties),
        ] {
            if let Some(value) = value {
                map.insert(key.to_string(), Value::from(value));
            }
        }
        put_str(&mut map, "pattern", &schema.pattern);
        put_bool(&mut map, "uniqueItems", schema.unique_items);

        if let Some(discriminator) = &schema.discriminator {
            let value = if swagger {
                if !discriminator.mapping.is_empty() {
                    tracing::warn!(
                        "Discriminator mapping on '{}' dropped for Swagger 2.0",
                        discriminator.property_name
                    );
                }
                Value::String(discriminator.property_name.clone())
            } else {
                let mut object = Map::new();
                object.insert(
                    "propertyName".to_string(),
                    Value::String(discriminator.property_name.clone()),
                );
                if !discriminator.mapping.is_empty() {
                    let mapping = discriminator
                        .mapping
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect();
                    object.insert("mapping".to_string(), Value::Object(mapping));
                }
                Value::Object(object)
            };
            map.insert("discriminator".to_string(), value);
        }

        super::put_extensions(&mut map, &schema.extensions);
        Ok(Value::Object(map))
    }

    /// Writes the node at the end of the reference chain without its title
    /// or description, for Swagger 2.0 parameters and headers
    pub(super) fn write_inline_schema(&self, id: Id<Schema>) -> Result<Map<String, Value>> {
        let actual = self.document.actual_schema_id(id)?;
        let mut value = self.write_schema(actual)?;
        let mut map = match value.as_object_mut() {
            Some(map) => std::mem::take(map),
            None => Map::new(),
        };
        map.remove("title");
        map.remove("description");
        if let Some(nullable) = self.document.schemas[id].nullable {
            map.insert("x-nullable".to_string(), Value::Bool(nullable));
        }
        Ok(map)
    }

    fn write_reference_schema(&self, schema: &Schema) -> Value {
        let pointer = schema
            .reference
            .as_ref()
            .map(|reference| self.schema_pointer(reference))
            .unwrap_or_default();
        let mut target = Map::new();
        target.insert("$ref".to_string(), Value::String(pointer));

        let mut siblings = Map::new();
        put_str(&mut siblings, "title", &schema.title);
        put_str(&mut siblings, "description", &schema.description);
        if let Some(default) = &schema.default {
            siblings.insert("default".to_string(), default.clone());
        }
        if let Some(example) = &schema.example {
            siblings.insert("example".to_string(), example.clone());
        }
        put_bool(&mut siblings, "readOnly", schema.read_only);
        let swagger = self.format == WireFormat::Swagger2;
        put_bool(
            &mut siblings,
            if swagger { "x-writeOnly" } else { "writeOnly" },
            schema.write_only,
        );
        put_bool(
            &mut siblings,
            if swagger { "x-deprecated" } else { "deprecated" },
            schema.deprecated,
        );
        super::put_extensions(&mut siblings, &schema.extensions);

        match self.format {
            WireFormat::Swagger2 => {
                put_bool(&mut target, "x-nullable", schema.nullable);
                target.extend(siblings);
                Value::Object(target)
            }
            WireFormat::OpenApi3 => {
                let mut wrapper = Map::new();
                if schema.nullable == Some(true) {
                    wrapper.insert("nullable".to_string(), Value::Bool(true));
                    wrapper.insert("oneOf".to_string(), Value::Array(vec![Value::Object(target)]));
                } else if siblings.is_empty() {
                    return Value::Object(target);
                } else {
                    wrapper.insert("allOf".to_string(), Value::Array(vec![Value::Object(target)]));
                }
                wrapper.extend(siblings);
                Value::Object(wrapper)
            }
        }
    }

    fn write_schema_list(
        &self,
        map: &mut Map<String, Value>,
        key: &str,
        list: &[Id<Schema>],
    ) -> Result<()> {
        if list.is_empty() {
            return Ok(());
        }
        let values = list
            .iter()
            .map(|id| self.write_schema(*id))
            .collect::<Result<Vec<_>>>()?;
        map.insert(key.to_string(), Value::Array(values));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Document, JsonType, ScopeId, WireFormat};
    use serde_json::json;

    fn swagger_with(definitions: serde_json::Value) -> Document {
        Document::from_value(&json!({
            "swagger": "2.0",
            "info": { "title": "T", "version": "1" },
            "paths": {},
            "definitions": definitions
        }))
        .unwrap()
    }

    #[test]
    fn test_reads_nullable_spellings() {
        let document = Document::from_value(&json!({
            "openapi": "3.0.0",
            "info": { "title": "T", "version": "1" },
            "paths": {},
            "components": { "schemas": {
                "A": {
                    "type": "object",
                    "nullable": true,
                    "properties": { "b": { "type": "string", "nullable": true } },
                    "additionalProperties": { "type": "integer", "nullable": true }
                }
            } }
        }))
        .unwrap();

        let a = &document.schemas[document.definitions["A"]];
        assert_eq!(a.nullable, Some(true));
        assert_eq!(document.schemas[a.properties["b"]].nullable, Some(true));
        let Some(crate::model::AdditionalProperties::Schema(extra)) = a.additional_properties else {
            panic!("expected schema-valued additionalProperties");
        };
        assert_eq!(document.schemas[extra].nullable, Some(true));
    }

    #[test]
    fn test_collapses_nullable_one_of_wrapper() {
        let document = Document::from_value(&json!({
            "openapi": "3.0.0",
            "info": { "title": "T", "version": "1" },
            "paths": {},
            "components": { "schemas": {
                "Color": { "type": "string", "enum": ["Red", "Green"] },
                "Car": { "type": "object", "properties": {
                    "color": {
                        "nullable": true,
                        "default": "Red",
                        "oneOf": [ { "$ref": "#/components/schemas/Color" } ]
                    }
                } }
            } }
        }))
        .unwrap();

        let car = &document.schemas[document.definitions["Car"]];
        let color = &document.schemas[car.properties["color"]];
        let reference = color.reference.as_ref().unwrap();
        assert_eq!(reference.pointer, "#/components/schemas/Color");
        assert_eq!(reference.scope, ScopeId::Root);
        assert_eq!(color.nullable, Some(true));
        assert_eq!(color.default, Some(json!("Red")));
        assert!(color.one_of.is_empty());
    }

    #[test]
    fn test_named_definition_keeps_single_all_of() {
        let document = swagger_with(json!({
            "Base": { "type": "object" },
            "Derived": { "allOf": [ { "$ref": "#/definitions/Base" } ] }
        }));
        let derived = &document.schemas[document.definitions["Derived"]];
        assert!(derived.reference.is_none());
        assert_eq!(derived.all_of.len(), 1);
    }

    #[test]
    fn test_rejects_unknown_type() {
        let result = Document::from_value(&json!({
            "swagger": "2.0",
            "info": { "title": "T", "version": "1" },
            "definitions": { "A": { "type": "decimal" } }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_type_projects_to_binary_string() {
        let document = swagger_with(json!({ "Upload": { "type": "file" } }));
        assert_eq!(
            document.schemas[document.definitions["Upload"]].types,
            vec![JsonType::File]
        );

        let openapi = document.to_value(WireFormat::OpenApi3).unwrap();
        assert_eq!(
            openapi["components"]["schemas"]["Upload"],
            json!({ "type": "string", "format": "binary" })
        );
        let swagger = document.to_value(WireFormat::Swagger2).unwrap();
        assert_eq!(swagger["definitions"]["Upload"], json!({ "type": "file" }));
    }

    #[test]
    fn test_nullable_reference_wrapping_per_format() {
        let document = swagger_with(json!({
            "Color": { "type": "string", "enum": ["Red"] },
            "Car": { "type": "object", "properties": {
                "color": { "$ref": "#/definitions/Color", "x-nullable": true, "default": "Red" },
                "owner": { "$ref": "#/definitions/Color", "description": "Owner color" }
            } }
        }));

        let openapi = document.to_value(WireFormat::OpenApi3).unwrap();
        let properties = &openapi["components"]["schemas"]["Car"]["properties"];
        assert_eq!(
            properties["color"],
            json!({
                "nullable": true,
                "oneOf": [ { "$ref": "#/components/schemas/Color" } ],
                "default": "Red"
            })
        );
        assert_eq!(
            properties["owner"],
            json!({
                "allOf": [ { "$ref": "#/components/schemas/Color" } ],
                "description": "Owner color"
            })
        );

        let swagger = document.to_value(WireFormat::Swagger2).unwrap();
        assert_eq!(
            swagger["definitions"]["Car"]["properties"]["color"],
            json!({ "$ref": "#/definitions/Color", "x-nullable": true, "default": "Red" })
        );
    }

    #[test]
    fn test_discriminator_projection() {
        let document = swagger_with(json!({
            "Pet": { "type": "object", "discriminator": "petType",
                     "properties": { "petType": { "type": "string" } } }
        }));
        let openapi = document.to_value(WireFormat::OpenApi3).unwrap();
        assert_eq!(
            openapi["components"]["schemas"]["Pet"]["discriminator"],
            json!({ "propertyName": "petType" })
        );
        let swagger = document.to_value(WireFormat::Swagger2).unwrap();
        assert_eq!(swagger["definitions"]["Pet"]["discriminator"], json!("petType"));
    }
}
