//! Maps schemas to language-neutral type references and declarations.

use std::collections::{HashMap, HashSet};

use heck::ToPascalCase;

use crate::core::error::{Error, Result};
use crate::generation::descriptors::{
    DeclarationKind, EnumMember, Primitive, PropertyDescriptor, TypeDeclaration, TypeRef,
};
use crate::generation::naming::{UniqueNames, to_pascal_identifier};
use crate::generation::settings::NullHandling;
use crate::model::{AdditionalProperties, Document, Id, JsonType, Schema, ScopeId};
use serde_json::Value;

/// Assigns type names to schemas and maps schema uses to [`TypeRef`]s.
///
/// Named definitions that need a nominal type are registered up front.
/// Inline object schemas met while mapping get a name derived from where
/// they were found and are declared after the named ones.
pub struct TypeMapper<'a> {
    document: &'a Document,
    null_handling: NullHandling,
    /// DTOs disabled: object types collapse to `Any`
    opaque: bool,
    names: UniqueNames,
    named: HashMap<Id<Schema>, String>,
    /// Named definitions in registry order
    definitions: Vec<(String, Id<Schema>)>,
    anonymous: Vec<(String, Id<Schema>)>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(document: &'a Document, null_handling: NullHandling, generate_dto_types: bool) -> Self {
        let mut mapper = Self {
            document,
            null_handling,
            opaque: !generate_dto_types,
            names: UniqueNames::new(),
            named: HashMap::new(),
            definitions: Vec::new(),
            anonymous: Vec::new(),
        };
        for (name, &id) in &document.definitions {
            if mapper.is_declarable(id) {
                let type_name = mapper.names.claim(&type_name(name));
                mapper.named.insert(id, type_name.clone());
                mapper.definitions.push((type_name, id));
            }
        }
        mapper
    }

    /// One step along a reference slot. Local pointers that were never
    /// linked are looked up directly.
    fn target_of(&self, schema: &Schema) -> Result<Option<Id<Schema>>> {
        let Some(reference) = &schema.reference else {
            return Ok(None);
        };
        reference
            .target
            .or_else(|| {
                (reference.scope == ScopeId::Root && reference.is_local())
                    .then(|| self.document.schema_at(&reference.pointer))
                    .flatten()
            })
            .map(Some)
            .ok_or_else(|| {
                Error::reference_not_found(reference.pointer.clone(), "unresolved document")
            })
    }

    fn is_declarable(&self, id: Id<Schema>) -> bool {
        let Ok(actual) = self.document.actual_schema(id) else {
            return false;
        };
        if actual.is_enumeration() {
            // neither target language has boolean enums
            return actual.primary_type() != Some(JsonType::Boolean);
        }
        if !actual.properties.is_empty() {
            return true;
        }
        match actual.primary_type() {
            Some(JsonType::Object) => {
                !actual.all_of.is_empty()
                    || !matches!(
                        actual.additional_properties,
                        Some(AdditionalProperties::Schema(_))
                    )
            }
            None => !actual.all_of.is_empty(),
            _ => false,
        }
    }

    /// Declared name reached from `id` by following references
    fn declared_name(&self, id: Id<Schema>) -> Result<Option<String>> {
        let mut current = id;
        let mut visited = HashSet::new();
        loop {
            if let Some(name) = self.named.get(&current) {
                return Ok(Some(name.clone()));
            }
            let schema = &self.document.schemas[current];
            match self.target_of(schema)? {
                Some(next) if visited.insert(current) => current = next,
                Some(_) => return Err(cycle(schema)),
                None => return Ok(None),
            }
        }
    }

    /// Type of a schema use site. `hint` names inline objects.
    pub fn type_of(&mut self, id: Id<Schema>, hint: &str) -> Result<TypeRef> {
        let document = self.document;
        let mut current = id;
        let mut visited = HashSet::new();
        loop {
            if let Some(name) = self.named.get(&current) {
                let node = document.actual_schema(current)?;
                return Ok(match (self.opaque, node.is_enumeration()) {
                    (false, is_enum) => TypeRef::Named {
                        name: name.clone(),
                        is_enum,
                    },
                    (true, true) => TypeRef::primitive(enum_primitive(node)),
                    (true, false) => TypeRef::Any,
                });
            }
            let schema = &document.schemas[current];
            match self.target_of(schema)? {
                Some(next) if visited.insert(current) => current = next,
                Some(_) => return Err(cycle(schema)),
                None => break,
            }
        }
        self.structural_type(current, hint)
    }

    fn structural_type(&mut self, id: Id<Schema>, hint: &str) -> Result<TypeRef> {
        let schema = &self.document.schemas[id];
        if schema.is_enumeration() {
            return Ok(TypeRef::primitive(enum_primitive(schema)));
        }
        if let [single] = schema.all_of.as_slice() {
            if schema.properties.is_empty() {
                return self.type_of(*single, hint);
            }
        }

        let format = schema.format.as_deref();
        let ty = match schema.primary_type() {
            Some(JsonType::String) => TypeRef::primitive(match format {
                Some("date-time") => Primitive::DateTime,
                Some("date") => Primitive::Date,
                Some("uuid") | Some("guid") => Primitive::Uuid,
                Some("byte") => Primitive::Bytes,
                Some("binary") => Primitive::File,
                _ => Primitive::String,
            }),
            Some(JsonType::Integer) => TypeRef::primitive(match format {
                Some("int64") => Primitive::Long,
                _ => Primitive::Integer,
            }),
            Some(JsonType::Number) => TypeRef::primitive(match format {
                Some("float") => Primitive::Float,
                Some("decimal") => Primitive::Decimal,
                _ => Primitive::Number,
            }),
            Some(JsonType::Boolean) => TypeRef::primitive(Primitive::Boolean),
            Some(JsonType::File) => TypeRef::primitive(Primitive::File),
            Some(JsonType::Array) => match schema.items {
                Some(items) => TypeRef::array(self.type_of(items, &format!("{hint}Item"))?),
                None => TypeRef::array(TypeRef::Any),
            },
            Some(JsonType::Object) | None => {
                if !schema.properties.is_empty() || !schema.all_of.is_empty() {
                    return Ok(self.anonymous_type(id, hint));
                }
                match schema.additional_properties {
                    Some(AdditionalProperties::Schema(value)) => {
                        TypeRef::map(self.type_of(value, &format!("{hint}Value"))?)
                    }
                    Some(AdditionalProperties::Allowed(true))
                        if schema.has_type(JsonType::Object) =>
                    {
                        TypeRef::map(TypeRef::Any)
                    }
                    _ => TypeRef::Any,
                }
            }
            Some(JsonType::Null) => TypeRef::Any,
        };
        Ok(ty)
    }

    fn anonymous_type(&mut self, id: Id<Schema>, hint: &str) -> TypeRef {
        if self.opaque {
            return TypeRef::Any;
        }
        if let Some((name, _)) = self.anonymous.iter().find(|(_, known)| *known == id) {
            return TypeRef::Named {
                name: name.clone(),
                is_enum: false,
            };
        }
        let base = match &self.document.schemas[id].title {
            Some(title) => type_name(title),
            None => type_name(hint),
        };
        let name = self.names.claim(&base);
        self.anonymous.push((name.clone(), id));
        TypeRef::Named {
            name,
            is_enum: false,
        }
    }

    /// Effective nullability of a use site: the first explicit flag along
    /// the reference chain, then the configured default, then `convention`.
    pub fn is_nullable(&self, id: Id<Schema>, convention: Option<bool>) -> bool {
        self.nullable_of(Some(id), convention)
    }

    /// [`Self::is_nullable`] for use sites that may carry no schema
    pub fn nullable_of(&self, schema: Option<Id<Schema>>, convention: Option<bool>) -> bool {
        schema
            .and_then(|id| self.explicit_nullable(id))
            .or(self.null_handling.as_flag())
            .or(convention)
            .unwrap_or(false)
    }

    fn explicit_nullable(&self, id: Id<Schema>) -> Option<bool> {
        let mut current = id;
        let mut visited = HashSet::new();
        loop {
            let schema = &self.document.schemas[current];
            if let Some(flag) = schema.explicit_nullable() {
                return Some(flag);
            }
            match self.target_of(schema) {
                Ok(Some(next)) if visited.insert(current) => current = next,
                _ => return None,
            }
        }
    }

    /// Declarations for every named definition and every inline object
    /// registered so far, in that order
    pub fn declarations(&mut self) -> Result<Vec<TypeDeclaration>> {
        if self.opaque {
            return Ok(Vec::new());
        }
        let mut declarations = Vec::new();
        for (name, id) in self.definitions.clone() {
            declarations.push(self.declaration(&name, id)?);
        }
        // declaring can register further inline objects
        let mut index = 0;
        while let Some((name, id)) = self.anonymous.get(index).cloned() {
            declarations.push(self.declaration(&name, id)?);
            index += 1;
        }
        Ok(declarations)
    }

    fn declaration(&mut self, name: &str, id: Id<Schema>) -> Result<TypeDeclaration> {
        let document = self.document;
        let schema = &document.schemas[id];
        match self.target_of(schema)? {
            // an alias of another declared type extends it
            Some(target) => match self.declared_name(target)? {
                Some(base) => Ok(TypeDeclaration {
                    name: name.to_string(),
                    description: schema.description.clone(),
                    kind: DeclarationKind::Class {
                        base: Some(base),
                        properties: Vec::new(),
                    },
                }),
                None => {
                    let actual = document.actual_schema_id(target)?;
                    self.declaration_body(name, actual)
                }
            },
            None => self.declaration_body(name, id),
        }
    }

    fn declaration_body(&mut self, name: &str, id: Id<Schema>) -> Result<TypeDeclaration> {
        let document = self.document;
        let schema = &document.schemas[id];
        if schema.is_enumeration() {
            return Ok(TypeDeclaration {
                name: name.to_string(),
                description: schema.description.clone(),
                kind: enum_declaration(schema),
            });
        }

        let mut base: Option<String> = None;
        let mut kinds: Vec<JsonType> = schema.primary_type().into_iter().collect();
        let mut parts: Vec<&Schema> = Vec::new();
        for &member in &schema.all_of {
            if document.schemas[member].is_reference() {
                if let Some(member_name) = self.declared_name(member)? {
                    if let Some(existing) = &base {
                        return Err(Error::unsupported_schema(
                            name,
                            format!("allOf extends both '{existing}' and '{member_name}'"),
                        ));
                    }
                    base = Some(member_name);
                    continue;
                }
            }
            let part = document.actual_schema(member)?;
            kinds.extend(part.primary_type());
            parts.push(part);
        }
        parts.push(schema);

        if let Some(other) = kinds.iter().find(|kind| **kind != JsonType::Object) {
            return Err(Error::unsupported_schema(
                name,
                format!("allOf combines an object with a '{other}' schema"),
            ));
        }

        let mut entries: Vec<(String, Id<Schema>, TypeRef)> = Vec::new();
        let mut required: HashSet<&str> = HashSet::new();
        for part in parts {
            required.extend(part.required.iter().map(String::as_str));
            for (wire_name, &property) in &part.properties {
                let ty = self.type_of(property, &format!("{name}{}", wire_name.to_pascal_case()))?;
                match entries.iter().find(|(known, _, _)| known == wire_name) {
                    Some((_, _, known_ty)) if *known_ty != ty => {
                        return Err(Error::unsupported_schema(
                            name,
                            format!("property '{wire_name}' is declared with conflicting types"),
                        ));
                    }
                    Some(_) => {}
                    None => entries.push((wire_name.clone(), property, ty)),
                }
            }
        }

        let properties = entries
            .into_iter()
            .map(|(wire_name, property, ty)| {
                let is_required = required.contains(wire_name.as_str());
                PropertyDescriptor {
                    nullable: self.is_nullable(property, Some(!is_required)),
                    description: document.schemas[property].description.clone(),
                    wire_name,
                    ty,
                    required: is_required,
                }
            })
            .collect();

        Ok(TypeDeclaration {
            name: name.to_string(),
            description: schema.description.clone(),
            kind: DeclarationKind::Class { base, properties },
        })
    }
}

fn cycle(schema: &Schema) -> Error {
    let pointer = schema
        .reference
        .as_ref()
        .map(|reference| reference.pointer.as_str())
        .unwrap_or_default();
    Error::Cycle(format!("alias chain through '{pointer}' never reaches a type"))
}

fn type_name(raw: &str) -> String {
    match to_pascal_identifier(raw) {
        name if name.is_empty() => "Anonymous".to_string(),
        name => name,
    }
}

fn enum_primitive(schema: &Schema) -> Primitive {
    match schema.primary_type() {
        Some(JsonType::Integer) if schema.format.as_deref() == Some("int64") => Primitive::Long,
        Some(JsonType::Integer) => Primitive::Integer,
        Some(JsonType::Number) => Primitive::Number,
        Some(JsonType::Boolean) => Primitive::Boolean,
        _ => Primitive::String,
    }
}

fn enum_declaration(schema: &Schema) -> DeclarationKind {
    let mut names = UniqueNames::new();
    let members = schema
        .enumeration
        .iter()
        .filter(|value| !value.is_null())
        .map(|value| {
            let base = match value {
                Value::String(text) => text.to_pascal_case(),
                Value::Bool(flag) => flag.to_string().to_pascal_case(),
                other => format!("_{}", other.to_string().replace(['-', '.'], "_")),
            };
            let base = match base {
                name if name.is_empty() => "Empty".to_string(),
                name if name.starts_with(|ch: char| ch.is_ascii_digit()) => format!("_{name}"),
                name => name,
            };
            EnumMember {
                name: names.claim(&base),
                value: value.clone(),
            }
        })
        .collect();
    DeclarationKind::Enum {
        primitive: enum_primitive(schema),
        members,
    }
}
