//! Paths, operations, parameters and responses.

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use super::Extensions;
use super::arena::{Arena, Id};
use super::document::{Document, ExternalDocs, SecurityRequirement};
use super::reference::Reference;
use super::schema::Schema;
use crate::core::error::{Error, Result};

/// HTTP methods that may carry an operation, in the order they are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Lower-case key used in a path item
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Query,
    Header,
    Path,
    Cookie,
    /// Swagger `in: formData`; one property of an OpenAPI form request body
    FormData,
    /// Swagger `in: body`; the OpenAPI `requestBody`
    Body,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Query => "query",
            ParameterKind::Header => "header",
            ParameterKind::Path => "path",
            ParameterKind::Cookie => "cookie",
            ParameterKind::FormData => "formData",
            ParameterKind::Body => "body",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "query" => Some(ParameterKind::Query),
            "header" => Some(ParameterKind::Header),
            "path" => Some(ParameterKind::Path),
            "cookie" => Some(ParameterKind::Cookie),
            "formData" => Some(ParameterKind::FormData),
            "body" => Some(ParameterKind::Body),
            _ => None,
        }
    }
}

/// OpenAPI 3 array/object serialization style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterStyle {
    Matrix,
    Label,
    Form,
    Simple,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

impl ParameterStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterStyle::Matrix => "matrix",
            ParameterStyle::Label => "label",
            ParameterStyle::Form => "form",
            ParameterStyle::Simple => "simple",
            ParameterStyle::SpaceDelimited => "spaceDelimited",
            ParameterStyle::PipeDelimited => "pipeDelimited",
            ParameterStyle::DeepObject => "deepObject",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "matrix" => Some(ParameterStyle::Matrix),
            "label" => Some(ParameterStyle::Label),
            "form" => Some(ParameterStyle::Form),
            "simple" => Some(ParameterStyle::Simple),
            "spaceDelimited" => Some(ParameterStyle::SpaceDelimited),
            "pipeDelimited" => Some(ParameterStyle::PipeDelimited),
            "deepObject" => Some(ParameterStyle::DeepObject),
            _ => None,
        }
    }
}

/// Swagger 2.0 array serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionFormat {
    Csv,
    Ssv,
    Tsv,
    Pipes,
    Multi,
}

impl CollectionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionFormat::Csv => "csv",
            CollectionFormat::Ssv => "ssv",
            CollectionFormat::Tsv => "tsv",
            CollectionFormat::Pipes => "pipes",
            CollectionFormat::Multi => "multi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "csv" => Some(CollectionFormat::Csv),
            "ssv" => Some(CollectionFormat::Ssv),
            "tsv" => Some(CollectionFormat::Tsv),
            "pipes" => Some(CollectionFormat::Pipes),
            "multi" => Some(CollectionFormat::Multi),
            _ => None,
        }
    }

    /// Equivalent OpenAPI `style`/`explode` pair
    pub fn to_style(self) -> (ParameterStyle, bool) {
        match self {
            CollectionFormat::Csv => (ParameterStyle::Form, false),
            CollectionFormat::Ssv => (ParameterStyle::SpaceDelimited, false),
            CollectionFormat::Tsv => (ParameterStyle::Form, false),
            CollectionFormat::Pipes => (ParameterStyle::PipeDelimited, false),
            CollectionFormat::Multi => (ParameterStyle::Form, true),
        }
    }

    /// Closest collection format for a `style`/`explode` pair
    pub fn from_style(style: ParameterStyle, explode: bool) -> Self {
        match (style, explode) {
            (ParameterStyle::Form, true) => CollectionFormat::Multi,
            (ParameterStyle::SpaceDelimited, _) => CollectionFormat::Ssv,
            (ParameterStyle::PipeDelimited, _) => CollectionFormat::Pipes,
            _ => CollectionFormat::Csv,
        }
    }
}

/// One operation parameter
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub description: Option<String>,
    pub required: bool,
    /// Type of the value. Swagger inline `type`/`format`/`items`/`default`
    /// on non-body parameters are read into this node as well.
    pub schema: Option<Id<Schema>>,
    pub style: Option<ParameterStyle>,
    pub explode: Option<bool>,
    pub collection_format: Option<CollectionFormat>,
    pub allow_empty_value: Option<bool>,
    pub deprecated: Option<bool>,
    pub example: Option<Value>,
    pub reference: Option<Reference<Parameter>>,
    pub extensions: Extensions,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            required: kind == ParameterKind::Path,
            schema: None,
            style: None,
            explode: None,
            collection_format: None,
            allow_empty_value: None,
            deprecated: None,
            example: None,
            reference: None,
            extensions: Extensions::new(),
        }
    }

    /// A parameter that only links to a shared one
    pub fn reference(reference: Reference<Parameter>) -> Self {
        Self {
            reference: Some(reference),
            ..Self::new("", ParameterKind::Query)
        }
    }

    pub fn with_schema(mut self, schema: Id<Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// Content of one media type in a response or request body
#[derive(Debug, Clone, Default)]
pub struct MediaType {
    pub schema: Option<Id<Schema>>,
    pub example: Option<Value>,
    pub extensions: Extensions,
}

/// Response header
#[derive(Debug, Clone, Default)]
pub struct Header {
    pub description: Option<String>,
    pub schema: Option<Id<Schema>>,
    pub extensions: Extensions,
}

/// One response of an operation, keyed by status code in its owner
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub description: String,
    /// Media type → body. Swagger input is keyed by the operation's produces.
    pub content: IndexMap<String, MediaType>,
    pub headers: IndexMap<String, Header>,
    /// `x-nullable` on the response itself, a documentation-derived hint
    pub nullable: Option<bool>,
    pub reference: Option<Reference<Response>>,
    pub extensions: Extensions,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Body schema, preferring JSON media types
    pub fn schema(&self) -> Option<Id<Schema>> {
        self.content
            .iter()
            .find(|(media, _)| media.contains("json"))
            .or_else(|| self.content.first())
            .and_then(|(_, media)| media.schema)
    }

    /// Sets the same body schema for every listed media type
    pub fn set_schema(&mut self, schema: Id<Schema>, media_types: &[String]) {
        if media_types.is_empty() {
            self.content.insert(
                "application/json".to_string(),
                MediaType {
                    schema: Some(schema),
                    ..Default::default()
                },
            );
        }
        for media in media_types {
            self.content.entry(media.clone()).or_default().schema = Some(schema);
        }
    }
}

/// One HTTP method + path pairing
#[derive(Debug, Clone, Default)]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// Status code (or `default`) → response
    pub responses: IndexMap<String, Response>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub schemes: Vec<String>,
    /// `None` inherits the document requirements; `Some(vec![])` opts out
    pub security: Option<Vec<SecurityRequirement>>,
    pub deprecated: bool,
    pub external_docs: Option<ExternalDocs>,
    pub extensions: Extensions,
}

impl Operation {
    /// Operation consumes if set, else document consumes
    pub fn actual_consumes<'a>(&'a self, document: &'a Document) -> &'a [String] {
        if self.consumes.is_empty() {
            &document.consumes
        } else {
            &self.consumes
        }
    }

    /// Operation produces if set, else document produces
    pub fn actual_produces<'a>(&'a self, document: &'a Document) -> &'a [String] {
        if self.produces.is_empty() {
            &document.produces
        } else {
            &self.produces
        }
    }

    /// Operation schemes if set, else the schemes of the document servers
    pub fn actual_schemes(&self, document: &Document) -> Vec<String> {
        if !self.schemes.is_empty() {
            return self.schemes.clone();
        }
        document.schemes()
    }

    /// Operation security if set, else document security
    pub fn actual_security<'a>(&'a self, document: &'a Document) -> &'a [SecurityRequirement] {
        self.security.as_deref().unwrap_or(&document.security)
    }

    /// Path-level parameters merged with operation-level ones, every entry
    /// dereferenced. An operation parameter replaces a path parameter with
    /// the same name and kind in place.
    pub fn actual_parameters<'a>(
        &'a self,
        path_item: &'a PathItem,
        document: &'a Document,
    ) -> Result<Vec<&'a Parameter>> {
        let mut merged: Vec<&Parameter> = Vec::new();
        for parameter in path_item.parameters.iter().chain(&self.parameters) {
            let actual = document.actual_parameter(parameter)?;
            match merged
                .iter()
                .position(|p| p.name == actual.name && p.kind == actual.kind)
            {
                Some(index) => merged[index] = actual,
                None => merged.push(actual),
            }
        }
        Ok(merged)
    }

    /// Responses with every entry dereferenced, in declaration order
    pub fn actual_responses<'a>(
        &'a self,
        document: &'a Document,
    ) -> Result<IndexMap<&'a str, &'a Response>> {
        self.responses
            .iter()
            .map(|(code, response)| Ok((code.as_str(), document.actual_response(response)?)))
            .collect()
    }

    /// The body parameter, if any
    pub fn body_parameter<'a>(&'a self, document: &'a Document) -> Result<Option<&'a Parameter>> {
        for parameter in &self.parameters {
            let actual = document.actual_parameter(parameter)?;
            if actual.kind == ParameterKind::Body {
                return Ok(Some(actual));
            }
        }
        Ok(None)
    }
}

/// Operations sharing one path template
#[derive(Debug, Clone, Default)]
pub struct PathItem {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operations: IndexMap<HttpMethod, Operation>,
    pub parameters: Vec<Parameter>,
    /// External path reference
    pub reference: Option<Reference<PathItem>>,
    pub extensions: Extensions,
}

impl PathItem {
    pub fn with_operation(mut self, method: HttpMethod, operation: Operation) -> Self {
        self.operations.insert(method, operation);
        self
    }
}

/// Follows a reference chain inside one arena. Slots without a link are
/// looked up through `lookup`, which lets unresolved local pointers work.
pub(crate) fn follow<'a, T>(
    arena: &'a Arena<T>,
    start: &'a T,
    reference_of: impl Fn(&T) -> Option<&Reference<T>>,
    lookup: impl Fn(&Reference<T>) -> Option<Id<T>>,
    kind: &str,
) -> Result<&'a T> {
    let mut current = start;
    let mut visited = HashSet::new();
    while let Some(reference) = reference_of(current) {
        let target = reference.target.or_else(|| lookup(reference)).ok_or_else(|| {
            Error::reference_not_found(reference.pointer.clone(), "unresolved document")
        })?;
        if !visited.insert(target) {
            return Err(Error::Cycle(format!(
                "{kind} reference '{}' loops back on itself",
                reference.pointer
            )));
        }
        current = &arena[target];
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JsonType, WireFormat};

    #[test]
    fn test_http_method_parse_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("connect"), None);
    }

    #[test]
    fn test_collection_format_style_mapping() {
        assert_eq!(
            CollectionFormat::Multi.to_style(),
            (ParameterStyle::Form, true)
        );
        assert_eq!(
            CollectionFormat::from_style(ParameterStyle::Form, true),
            CollectionFormat::Multi
        );
        assert_eq!(
            CollectionFormat::from_style(ParameterStyle::PipeDelimited, false),
            CollectionFormat::Pipes
        );
        assert_eq!(
            CollectionFormat::from_style(ParameterStyle::Simple, false),
            CollectionFormat::Csv
        );
    }

    #[test]
    fn test_actual_consumes_falls_back_to_document() {
        let mut document = Document::new(WireFormat::Swagger2);
        document.consumes = vec!["application/xml".to_string()];

        let mut operation = Operation::default();
        assert_eq!(operation.actual_consumes(&document), ["application/xml"]);

        operation.consumes = vec!["application/json".to_string()];
        assert_eq!(operation.actual_consumes(&document), ["application/json"]);
    }

    #[test]
    fn test_actual_parameters_operation_overrides_path_level() {
        let mut document = Document::new(WireFormat::OpenApi3);
        let string = document.schemas.alloc(Schema::new(JsonType::String));

        let mut path_item = PathItem::default();
        path_item.parameters.push(
            Parameter::new("id", ParameterKind::Path).with_schema(string),
        );
        path_item
            .parameters
            .push(Parameter::new("filter", ParameterKind::Query));

        let mut overriding = Parameter::new("filter", ParameterKind::Query).required(true);
        overriding.description = Some("override".to_string());
        let operation = Operation {
            parameters: vec![overriding, Parameter::new("filter", ParameterKind::Header)],
            ..Default::default()
        };

        let actual = operation.actual_parameters(&path_item, &document).unwrap();
        let names: Vec<_> = actual.iter().map(|p| (p.name.as_str(), p.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("id", ParameterKind::Path),
                ("filter", ParameterKind::Query),
                ("filter", ParameterKind::Header),
            ]
        );
        assert_eq!(actual[1].description.as_deref(), Some("override"));
    }

    #[test]
    fn test_actual_parameters_follow_shared_parameter() {
        let mut document = Document::new(WireFormat::Swagger2);
        let shared = document
            .parameter_nodes
            .alloc(Parameter::new("limit", ParameterKind::Query));
        document.parameters.insert("limit".to_string(), shared);

        let operation = Operation {
            parameters: vec![Parameter::reference(Reference::to(shared))],
            ..Default::default()
        };

        let path_item = PathItem::default();
        let actual = operation
            .actual_parameters(&path_item, &document)
            .unwrap();
        assert_eq!(actual.len(), 1);
        assert_eq!(actual[0].name, "limit");
    }

    #[test]
    fn test_response_schema_prefers_json() {
        let mut document = Document::new(WireFormat::OpenApi3);
        let xml = document.schemas.alloc(Schema::new(JsonType::String));
        let json = document.schemas.alloc(Schema::new(JsonType::Object));

        let mut response = Response::new("OK");
        response.set_schema(xml, &["application/xml".to_string()]);
        response.set_schema(json, &["application/json".to_string()]);

        assert_eq!(response.schema(), Some(json));
    }
}
