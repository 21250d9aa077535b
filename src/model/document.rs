//! The root aggregate.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use super::Extensions;
use super::arena::{Arena, Id};
use super::operation::{Parameter, PathItem, Response, follow};
use super::reference::{Reference, ScopeId};
use super::schema::Schema;
use super::security::SecurityScheme;
use crate::core::error::Result;

/// Wire format a document is read from or written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    Swagger2,
    OpenApi3,
}

impl WireFormat {
    /// Version text written into the `swagger`/`openapi` key by default
    pub fn default_version(&self) -> &'static str {
        match self {
            WireFormat::Swagger2 => "2.0",
            WireFormat::OpenApi3 => "3.0.0",
        }
    }

    /// Prefix of the named schema registry in a local pointer
    pub fn definitions_prefix(&self) -> &'static str {
        match self {
            WireFormat::Swagger2 => "#/definitions/",
            WireFormat::OpenApi3 => "#/components/schemas/",
        }
    }

    pub fn parameters_prefix(&self) -> &'static str {
        match self {
            WireFormat::Swagger2 => "#/parameters/",
            WireFormat::OpenApi3 => "#/components/parameters/",
        }
    }

    pub fn responses_prefix(&self) -> &'static str {
        match self {
            WireFormat::Swagger2 => "#/responses/",
            WireFormat::OpenApi3 => "#/components/responses/",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Swagger2 => write!(f, "Swagger 2.0"),
            WireFormat::OpenApi3 => write!(f, "OpenAPI 3"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerVariable {
    pub default: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Base url of the API. Swagger `host`/`basePath`/`schemes` are read into
/// one server per scheme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariable>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Server {
    /// Splits the url into scheme, host and base path
    pub fn parts(&self) -> (Option<&str>, Option<&str>, &str) {
        let (scheme, rest) = match self.url.split_once("://") {
            Some((scheme, rest)) => (Some(scheme), rest),
            None => (None, self.url.as_str()),
        };
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        if scheme.is_none() && rest.starts_with('/') {
            return (None, None, rest);
        }
        let (host, path) = match rest.find('/') {
            Some(slash) => rest.split_at(slash),
            None => (rest, ""),
        };
        // `https:///v2` keeps the scheme of a Swagger document without a host
        (scheme, Some(host).filter(|host| !host.is_empty()), path)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
    pub extensions: Extensions,
}

/// Scheme name → required scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// A document loaded while resolving external references.
///
/// Nodes parsed out of it are stored in the owning document's arenas and
/// memoized by fragment, so every pointer into the same spot links to the
/// same node.
#[derive(Debug, Clone)]
pub struct ExternalDocument {
    /// Canonical url the document was loaded from
    pub location: String,
    pub format: WireFormat,
    pub root: Value,
    pub schemas: HashMap<String, Id<Schema>>,
    pub parameters: HashMap<String, Id<Parameter>>,
    pub responses: HashMap<String, Id<Response>>,
    pub path_items: HashMap<String, Id<PathItem>>,
}

impl ExternalDocument {
    pub fn new(location: impl Into<String>, format: WireFormat, root: Value) -> Self {
        Self {
            location: location.into(),
            format,
            root,
            schemas: HashMap::new(),
            parameters: HashMap::new(),
            responses: HashMap::new(),
            path_items: HashMap::new(),
        }
    }
}

/// A Swagger 2.0 or OpenAPI 3 API description.
///
/// The shape is format-agnostic; [`WireFormat`] only records where the
/// document came from and is the default target when writing it back.
#[derive(Debug, Clone)]
pub struct Document {
    pub format: WireFormat,
    /// Exact `swagger`/`openapi` version text
    pub version: String,
    pub info: Info,
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    /// Named schemas (`definitions` / `components.schemas`)
    pub definitions: IndexMap<String, Id<Schema>>,
    pub parameters: IndexMap<String, Id<Parameter>>,
    pub responses: IndexMap<String, Id<Response>>,
    pub security_schemes: IndexMap<String, SecurityScheme>,
    pub security: Vec<SecurityRequirement>,
    pub tags: Vec<Tag>,
    /// Swagger only; empty for OpenAPI input
    pub produces: Vec<String>,
    /// Swagger only; empty for OpenAPI input
    pub consumes: Vec<String>,
    pub external_docs: Option<ExternalDocs>,
    pub extensions: Extensions,
    /// `components` sections without a model (`requestBodies`, `examples`, ...),
    /// kept verbatim for OpenAPI 3 output
    pub component_extras: Extensions,

    pub schemas: Arena<Schema>,
    pub parameter_nodes: Arena<Parameter>,
    pub response_nodes: Arena<Response>,
    pub path_item_nodes: Arena<PathItem>,

    /// Documents pulled in by external references, see `ScopeId::External`
    pub externals: Vec<ExternalDocument>,
    /// Location the document was read from; base for relative external references
    pub source: Option<String>,
}

impl Document {
    pub fn new(format: WireFormat) -> Self {
        Self {
            format,
            version: format.default_version().to_string(),
            info: Info::default(),
            servers: Vec::new(),
            paths: IndexMap::new(),
            definitions: IndexMap::new(),
            parameters: IndexMap::new(),
            responses: IndexMap::new(),
            security_schemes: IndexMap::new(),
            security: Vec::new(),
            tags: Vec::new(),
            produces: Vec::new(),
            consumes: Vec::new(),
            external_docs: None,
            extensions: Extensions::new(),
            component_extras: Extensions::new(),
            schemas: Arena::new(),
            parameter_nodes: Arena::new(),
            response_nodes: Arena::new(),
            path_item_nodes: Arena::new(),
            externals: Vec::new(),
            source: None,
        }
    }

    /// Stores `schema` and registers it under `name`
    pub fn add_definition(&mut self, name: impl Into<String>, schema: Schema) -> Id<Schema> {
        let id = self.schemas.alloc(schema);
        self.definitions.insert(name.into(), id);
        id
    }

    /// Name under which `id` is registered, if any
    pub fn definition_name(&self, id: Id<Schema>) -> Option<&str> {
        self.definitions
            .iter()
            .find(|(_, candidate)| **candidate == id)
            .map(|(name, _)| name.as_str())
    }

    /// Follows the reference chain of a schema. Local pointers that were
    /// never resolved are looked up in this document.
    pub fn actual_schema(&self, id: Id<Schema>) -> Result<&Schema> {
        self.actual_schema_id(id).map(|actual| &self.schemas[actual])
    }

    pub fn actual_schema_id(&self, id: Id<Schema>) -> Result<Id<Schema>> {
        self.schemas
            .actual_with(id, |r| local(r).and_then(|pointer| self.schema_at(pointer)))
    }

    pub fn actual_parameter<'a>(&'a self, parameter: &'a Parameter) -> Result<&'a Parameter> {
        follow(
            &self.parameter_nodes,
            parameter,
            |p| p.reference.as_ref(),
            |r| local(r).and_then(|pointer| self.parameter_at(pointer)),
            "parameter",
        )
    }

    pub fn actual_response<'a>(&'a self, response: &'a Response) -> Result<&'a Response> {
        follow(
            &self.response_nodes,
            response,
            |r| r.reference.as_ref(),
            |r| local(r).and_then(|pointer| self.response_at(pointer)),
            "response",
        )
    }

    /// Follows an external path reference. Path items are only linked by the resolver.
    pub fn actual_path_item<'a>(&'a self, path_item: &'a PathItem) -> Result<&'a PathItem> {
        follow(
            &self.path_item_nodes,
            path_item,
            |p| p.reference.as_ref(),
            |_| None,
            "path item",
        )
    }

    /// Distinct url schemes of the servers, in order
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = Vec::new();
        for server in &self.servers {
            if let (Some(scheme), _, _) = server.parts() {
                if !schemes.iter().any(|s| s == scheme) {
                    schemes.push(scheme.to_string());
                }
            }
        }
        schemes
    }

    /// Base path shared by the servers (Swagger `basePath`)
    pub fn base_path(&self) -> Option<&str> {
        self.servers
            .first()
            .map(|server| server.parts().2)
            .filter(|path| !path.is_empty())
    }
}

/// Pointer text of an unresolved same-document slot
fn local<T>(reference: &Reference<T>) -> Option<&str> {
    (reference.scope == ScopeId::Root && reference.is_local()).then_some(reference.pointer.as_str())
}
