//! JSON-Schema node used for definitions, parameters, bodies and responses.

use indexmap::IndexMap;
use serde_json::{Number, Value};
use std::collections::HashSet;
use std::fmt;

use super::Extensions;
use super::arena::{Arena, Id};
use super::reference::Reference;
use crate::core::error::{Error, Result};

/// Primitive kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
    /// Swagger 2.0 `type: file`
    File,
}

impl JsonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Null => "null",
            JsonType::File => "file",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(JsonType::String),
            "number" => Some(JsonType::Number),
            "integer" => Some(JsonType::Integer),
            "boolean" => Some(JsonType::Boolean),
            "object" => Some(JsonType::Object),
            "array" => Some(JsonType::Array),
            "null" => Some(JsonType::Null),
            "file" => Some(JsonType::File),
            _ => None,
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `additionalProperties` is either a flag or a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Id<Schema>),
}

/// Polymorphism discriminator.
///
/// Swagger 2.0 only carries the property name; the mapping is an
/// OpenAPI 3 addition and is dropped when writing Swagger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discriminator {
    pub property_name: String,
    pub mapping: IndexMap<String, String>,
}

/// One JSON-Schema node.
///
/// When `reference` is set the node is an alias: consumers look at the
/// referenced node for its structure, while the sibling fields here
/// (`nullable`, `default`, `description`, extensions) still apply to the use
/// site.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Empty means any type
    pub types: Vec<JsonType>,
    pub format: Option<String>,
    pub properties: IndexMap<String, Id<Schema>>,
    pub required: Vec<String>,
    pub items: Option<Id<Schema>>,
    pub additional_properties: Option<AdditionalProperties>,
    pub all_of: Vec<Id<Schema>>,
    pub one_of: Vec<Id<Schema>>,
    pub any_of: Vec<Id<Schema>>,
    pub not: Option<Id<Schema>>,
    pub enumeration: Vec<Value>,
    pub default: Option<Value>,
    pub example: Option<Value>,
    /// `None` means inherited from policy/format convention
    pub nullable: Option<bool>,
    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub deprecated: Option<bool>,
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: Option<bool>,
    pub exclusive_maximum: Option<bool>,
    pub multiple_of: Option<Number>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: Option<bool>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
    pub discriminator: Option<Discriminator>,
    pub reference: Option<Reference<Schema>>,
    pub extensions: Extensions,
}

impl Schema {
    pub fn new(ty: JsonType) -> Self {
        Self {
            types: vec![ty],
            ..Default::default()
        }
    }

    /// A schema with a type and a format, e.g. `integer`/`int64`
    pub fn with_format(ty: JsonType, format: impl Into<String>) -> Self {
        Self {
            types: vec![ty],
            format: Some(format.into()),
            ..Default::default()
        }
    }

    /// A node that links to `target`
    pub fn reference_to(target: Id<Schema>) -> Self {
        Self {
            reference: Some(Reference::to(target)),
            ..Default::default()
        }
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    pub fn has_type(&self, ty: JsonType) -> bool {
        self.types.contains(&ty)
    }

    /// First declared type other than `null`
    pub fn primary_type(&self) -> Option<JsonType> {
        self.types.iter().copied().find(|t| *t != JsonType::Null)
    }

    /// True when the node places no constraint on its instances
    pub fn is_any_type(&self) -> bool {
        self.primary_type().is_none()
            && self.reference.is_none()
            && self.properties.is_empty()
            && self.items.is_none()
            && self.all_of.is_empty()
            && self.one_of.is_empty()
            && self.any_of.is_empty()
            && self.enumeration.is_empty()
    }

    pub fn is_object(&self) -> bool {
        self.has_type(JsonType::Object) || !self.properties.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.has_type(JsonType::Array) || self.items.is_some()
    }

    pub fn is_enumeration(&self) -> bool {
        !self.enumeration.is_empty()
    }

    /// Whether `name` is listed in `required`
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Explicit nullability: the `nullable` flag or a `null` member of the type set
    pub fn explicit_nullable(&self) -> Option<bool> {
        if self.has_type(JsonType::Null) {
            return Some(true);
        }
        self.nullable
    }
}

impl Arena<Schema> {
    /// Follows the reference chain starting at `id` to the first node
    /// without a reference slot.
    ///
    /// Fails with [`Error::Cycle`] when the chain loops without ever reaching
    /// a structural node, and with [`Error::ReferenceNotFound`] when a slot on
    /// the way is still unresolved.
    pub fn actual(&self, id: Id<Schema>) -> Result<Id<Schema>> {
        self.actual_with(id, |_| None)
    }

    /// Like [`Arena::actual`], asking `lookup` for the target of unresolved slots
    pub fn actual_with(
        &self,
        id: Id<Schema>,
        lookup: impl Fn(&Reference<Schema>) -> Option<Id<Schema>>,
    ) -> Result<Id<Schema>> {
        let mut current = id;
        let mut visited = HashSet::new();
        loop {
            let node = &self[current];
            let Some(reference) = &node.reference else {
                return Ok(current);
            };
            if !visited.insert(current) {
                return Err(Error::Cycle(format!(
                    "schema {current:?} ('{}') references itself without a base case",
                    reference.pointer
                )));
            }
            current = reference
                .target
                .or_else(|| lookup(reference))
                .ok_or_else(|| {
                    Error::reference_not_found(reference.pointer.clone(), "unresolved document")
                })?;
        }
    }

    /// The node at the end of the reference chain
    pub fn actual_node(&self, id: Id<Schema>) -> Result<&Schema> {
        self.actual(id).map(|actual| &self[actual])
    }
}
