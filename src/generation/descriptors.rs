//! Language-neutral descriptors produced by the builder and consumed by
//! language binders.

use serde::Serialize;
use serde_json::Value;

use crate::model::HttpMethod;

/// Built-in scalar kinds a schema can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    String,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    Long,
    /// Double precision number
    Number,
    Float,
    Decimal,
    Boolean,
    DateTime,
    Date,
    Uuid,
    /// Base64 encoded bytes
    Bytes,
    /// Uploaded or downloaded file content
    File,
}

impl Primitive {
    /// Whether the kind is a value type that needs a marker to hold null
    pub fn is_value_type(&self) -> bool {
        !matches!(self, Primitive::String | Primitive::Bytes | Primitive::File)
    }
}

/// Reference to a type from a property, parameter or result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    Primitive { primitive: Primitive },
    Array { item: Box<TypeRef> },
    /// String-keyed dictionary
    Map { value: Box<TypeRef> },
    /// A declared type
    Named { name: String, is_enum: bool },
    /// No constraint, or an opaque body
    Any,
}

impl TypeRef {
    pub fn primitive(primitive: Primitive) -> Self {
        TypeRef::Primitive { primitive }
    }

    pub fn array(item: TypeRef) -> Self {
        TypeRef::Array {
            item: Box::new(item),
        }
    }

    pub fn map(value: TypeRef) -> Self {
        TypeRef::Map {
            value: Box::new(value),
        }
    }

    pub fn is_value_type(&self) -> bool {
        match self {
            TypeRef::Primitive { primitive } => primitive.is_value_type(),
            TypeRef::Named { is_enum, .. } => *is_enum,
            _ => false,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(
            self,
            TypeRef::Primitive {
                primitive: Primitive::File
            }
        )
    }
}

/// A type plus whether null is a legal value of the use site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeUse {
    pub ty: TypeRef,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    /// Key in the wire object
    pub wire_name: String,
    pub ty: TypeRef,
    pub required: bool,
    pub nullable: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    /// PascalCase member name
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclarationKind {
    Class {
        /// Declared type this one extends
        base: Option<String>,
        properties: Vec<PropertyDescriptor>,
    },
    Enum {
        /// Underlying primitive of the member values
        primitive: Primitive,
        members: Vec<EnumMember>,
    },
}

/// One nominal type to emit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDeclaration {
    pub name: String,
    pub description: Option<String>,
    pub kind: DeclarationKind,
}

/// Where an operation parameter is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSource {
    Path,
    Query,
    Header,
    Cookie,
    Body,
    Form,
    /// Trailing cancellation/abort parameter added by the generator
    Cancellation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    /// Identifier-safe variable name
    pub name: String,
    /// Name on the wire
    pub wire_name: String,
    pub source: ParameterSource,
    pub ty: TypeRef,
    pub required: bool,
    pub nullable: bool,
    /// Declared with a default value so callers may omit it
    pub optional: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescriptor {
    /// PascalCase method name, unique within its controller
    pub method_name: String,
    pub operation_id: Option<String>,
    pub http_method: String,
    /// Path template as written, e.g. `/pets/{petId}`
    pub path: String,
    /// Path template without the leading slash
    pub route: String,
    pub route_name: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<ParameterDescriptor>,
    /// Success body type; `None` when the operation returns no content
    pub result: Option<TypeUse>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub deprecated: bool,
}

impl OperationDescriptor {
    pub fn method(&self) -> Option<HttpMethod> {
        HttpMethod::parse(&self.http_method)
    }

    /// Parameters bound from a given source
    pub fn parameters_from(
        &self,
        source: ParameterSource,
    ) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.iter().filter(move |p| p.source == source)
    }
}

/// Operations generated into one class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerDescriptor {
    /// Group name taken from the operation ids; may be empty
    pub name: String,
    /// Class name after applying the class name template
    pub class_name: String,
    pub operations: Vec<OperationDescriptor>,
}

/// Everything a binder needs to emit one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationModel {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub base_url: Option<String>,
    pub types: Vec<TypeDeclaration>,
    pub controllers: Vec<ControllerDescriptor>,
}

impl GenerationModel {
    pub fn operations(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.controllers.iter().flat_map(|c| c.operations.iter())
    }

    pub fn type_named(&self, name: &str) -> Option<&TypeDeclaration> {
        self.types.iter().find(|t| t.name == name)
    }
}
