//! Wire value → document model.

use serde_json::{Map, Value};

use super::{as_object, bool_of, extensions_of, str_of, strings_of};
use crate::core::error::{Error, Result};
use crate::model::{
    Document, Header, HttpMethod, Info, MediaType, Operation, PathItem, Reference, Response,
    ScopeId, SecurityRequirement, Server, WireFormat,
};

const ROOT_KEYS: &[&str] = &[
    "swagger",
    "openapi",
    "info",
    "host",
    "basePath",
    "schemes",
    "servers",
    "consumes",
    "produces",
    "paths",
    "definitions",
    "parameters",
    "responses",
    "securityDefinitions",
    "components",
    "security",
    "tags",
    "externalDocs",
];

const INFO_KEYS: &[&str] = &[
    "title",
    "version",
    "description",
    "termsOfService",
    "contact",
    "license",
];

const PATH_ITEM_KEYS: &[&str] = &["$ref", "summary", "description", "parameters"];

const OPERATION_KEYS: &[&str] = &[
    "operationId",
    "summary",
    "description",
    "tags",
    "parameters",
    "requestBody",
    "responses",
    "consumes",
    "produces",
    "schemes",
    "security",
    "deprecated",
    "externalDocs",
];

const RESPONSE_KEYS: &[&str] = &[
    "$ref",
    "description",
    "schema",
    "content",
    "headers",
    "examples",
    "x-nullable",
];

/// Selects the wire format from the top-level version key
pub fn detect_format(value: &Value) -> Result<WireFormat> {
    if value.get("swagger").is_some() {
        Ok(WireFormat::Swagger2)
    } else if value.get("openapi").is_some() {
        Ok(WireFormat::OpenApi3)
    } else {
        Err(Error::parse(
            "document has neither a 'swagger' nor an 'openapi' key",
        ))
    }
}

pub(super) fn read_document(value: &Value) -> Result<Document> {
    let format = detect_format(value)?;
    let map = as_object(value, "document")?;
    let mut document = Document::new(format);
    let version_key = match format {
        WireFormat::Swagger2 => "swagger",
        WireFormat::OpenApi3 => "openapi",
    };
    if let Some(version) = map.get(version_key) {
        document.version = match version {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
    }

    Reader::new(&mut document, format, ScopeId::Root, value).read_root(map)?;

    tracing::debug!(
        "Read {} document with {} paths and {} definitions",
        format,
        document.paths.len(),
        document.definitions.len()
    );
    Ok(document)
}

/// Reads wire values into the arenas of one document.
///
/// `scope` tags every `$ref` read so the resolver knows which loaded
/// document the pointer text is relative to.
pub(crate) struct Reader<'a> {
    pub(crate) document: &'a mut Document,
    pub(crate) format: WireFormat,
    pub(crate) scope: ScopeId,
    pub(crate) root: &'a Value,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(
        document: &'a mut Document,
        format: WireFormat,
        scope: ScopeId,
        root: &'a Value,
    ) -> Self {
        Self {
            document,
            format,
            scope,
            root,
        }
    }

    pub(super) fn reference<T>(&self, pointer: &str) -> Reference<T> {
        Reference::unresolved(pointer, self.scope)
    }

    fn read_root(&mut self, map: &Map<String, Value>) -> Result<()> {
        self.document.info = read_info(map.get("info"))?;
        self.document.servers = match self.format {
            WireFormat::Swagger2 => servers_from_swagger(map),
            WireFormat::OpenApi3 => match map.get("servers") {
                Some(servers) => serde_json::from_value(servers.clone())?,
                None => Vec::new(),
            },
        };
        self.document.consumes = strings_of(map, "consumes");
        self.document.produces = strings_of(map, "produces");

        let components = map.get("components").and_then(Value::as_object);
        let format = self.format;
        let definitions = section(format, map, components, "definitions", "schemas");
        let parameters = section(format, map, components, "parameters", "parameters");
        let responses = section(format, map, components, "responses", "responses");
        let schemes =
            section(format, map, components, "securityDefinitions", "securitySchemes");

        for (name, value) in definitions.into_iter().flatten() {
            let id = self.read_named_schema(value)?;
            self.document.definitions.insert(name.clone(), id);
        }
        for (name, value) in parameters.into_iter().flatten() {
            let parameter = self.read_parameter(value)?;
            let id = self.document.parameter_nodes.alloc(parameter);
            self.document.parameters.insert(name.clone(), id);
        }
        let produces = self.document.produces.clone();
        for (name, value) in responses.into_iter().flatten() {
            let response = self.read_response(value, &produces)?;
            let id = self.document.response_nodes.alloc(response);
            self.document.responses.insert(name.clone(), id);
        }
        for (name, value) in schemes.into_iter().flatten() {
            let scheme = self.read_security_scheme(value)?;
            self.document.security_schemes.insert(name.clone(), scheme);
        }
        if let Some(components) = components {
            self.document.component_extras = extensions_of(
                components,
                &["schemas", "parameters", "responses", "securitySchemes"],
            );
        }

        if let Some(security) = map.get("security") {
            self.document.security = read_security_requirements(security)?;
        }
        if let Some(tags) = map.get("tags") {
            self.document.tags = serde_json::from_value(tags.clone())?;
        }
        if let Some(docs) = map.get("externalDocs") {
            self.document.external_docs = Some(serde_json::from_value(docs.clone())?);
        }

        if let Some(paths) = map.get("paths") {
            for (path, value) in as_object(paths, "paths")? {
                let item = self.read_path_item(value, path)?;
                self.document.paths.insert(path.clone(), item);
            }
        }
        self.document.extensions = extensions_of(map, ROOT_KEYS);
        Ok(())
    }

    pub(crate) fn read_path_item(&mut self, value: &Value, path: &str) -> Result<PathItem> {
        let map = as_object(value, &format!("path item '{path}'"))?;
        let mut item = PathItem {
            summary: str_of(map, "summary"),
            description: str_of(map, "description"),
            reference: str_of(map, "$ref").map(|pointer| self.reference(&pointer)),
            ..Default::default()
        };
        if let Some(parameters) = map.get("parameters").and_then(Value::as_array) {
            for parameter in parameters {
                item.parameters.push(self.read_parameter(parameter)?);
            }
        }

        let mut known: Vec<&str> = PATH_ITEM_KEYS.to_vec();
        for (key, value) in map {
            if let Some(method) = HttpMethod::parse(key) {
                let operation = self.read_operation(value, &format!("{key} {path}"))?;
                item.operations.insert(method, operation);
                known.push(key);
            }
        }
        item.extensions = extensions_of(map, &known);
        Ok(item)
    }

    fn read_operation(&mut self, value: &Value, location: &str) -> Result<Operation> {
        let map = as_object(value, &format!("operation '{location}'"))?;
        let mut operation = Operation {
            operation_id: str_of(map, "operationId"),
            summary: str_of(map, "summary"),
            description: str_of(map, "description"),
            tags: strings_of(map, "tags"),
            consumes: strings_of(map, "consumes"),
            produces: strings_of(map, "produces"),
            schemes: strings_of(map, "schemes"),
            deprecated: bool_of(map, "deprecated").unwrap_or(false),
            extensions: extensions_of(map, OPERATION_KEYS),
            ..Default::default()
        };
        if let Some(security) = map.get("security") {
            operation.security = Some(read_security_requirements(security)?);
        }
        if let Some(docs) = map.get("externalDocs") {
            operation.external_docs = Some(serde_json::from_value(docs.clone())?);
        }
        if let Some(parameters) = map.get("parameters").and_then(Value::as_array) {
            for parameter in parameters {
                operation.parameters.push(self.read_parameter(parameter)?);
            }
        }
        if let Some(body) = map.get("requestBody") {
            self.read_request_body(body, &mut operation)?;
        }

        let produces = if operation.produces.is_empty() {
            self.document.produces.clone()
        } else {
            operation.produces.clone()
        };
        if let Some(responses) = map.get("responses") {
            for (code, value) in as_object(responses, &format!("responses of '{location}'"))? {
                let response = self.read_response(value, &produces)?;
                operation.responses.insert(code.clone(), response);
            }
        }
        Ok(operation)
    }

    /// Reads one response. Swagger bodies are keyed by `produces`.
    pub(crate) fn read_response(&mut self, value: &Value, produces: &[String]) -> Result<Response> {
        let map = as_object(value, "response")?;
        if let Some(pointer) = str_of(map, "$ref") {
            return Ok(Response {
                reference: Some(self.reference(&pointer)),
                ..Default::default()
            });
        }

        let mut response = Response {
            description: str_of(map, "description").unwrap_or_default(),
            nullable: bool_of(map, "x-nullable"),
            extensions: extensions_of(map, RESPONSE_KEYS),
            ..Default::default()
        };

        if let Some(content) = map.get("content").and_then(Value::as_object) {
            for (media, value) in content {
                let media_map = as_object(value, &format!("media type '{media}'"))?;
                let schema = match media_map.get("schema") {
                    Some(schema) => Some(self.read_schema(schema)?),
                    None => None,
                };
                response.content.insert(
                    media.clone(),
                    MediaType {
                        schema,
                        example: media_map.get("example").cloned(),
                        extensions: extensions_of(media_map, &["schema", "example"]),
                    },
                );
            }
        }
        if let Some(schema) = map.get("schema") {
            let id = self.read_schema(schema)?;
            response.set_schema(id, produces);
        }
        if let Some(examples) = map.get("examples").and_then(Value::as_object) {
            for (media, example) in examples {
                response.content.entry(media.clone()).or_default().example = Some(example.clone());
            }
        }

        if let Some(headers) = map.get("headers").and_then(Value::as_object) {
            for (name, value) in headers {
                let header_map = as_object(value, &format!("header '{name}'"))?;
                let schema = match header_map.get("schema") {
                    Some(schema) => Some(self.read_schema(schema)?),
                    None => self.read_inline_schema(header_map)?,
                };
                let mut known = vec!["description", "schema"];
                known.extend_from_slice(super::schema_codec::INLINE_SCHEMA_KEYS);
                response.headers.insert(
                    name.clone(),
                    Header {
                        description: str_of(header_map, "description"),
                        schema,
                        extensions: extensions_of(header_map, &known),
                    },
                );
            }
        }
        Ok(response)
    }
}

/// A registry object: top-level under Swagger, inside `components` under OpenAPI
fn section<'m>(
    format: WireFormat,
    map: &'m Map<String, Value>,
    components: Option<&'m Map<String, Value>>,
    swagger: &str,
    openapi: &str,
) -> Option<&'m Map<String, Value>> {
    match format {
        WireFormat::Swagger2 => map.get(swagger).and_then(Value::as_object),
        WireFormat::OpenApi3 => components
            .and_then(|c| c.get(openapi))
            .and_then(Value::as_object),
    }
}

fn read_info(value: Option<&Value>) -> Result<Info> {
    let Some(value) = value else {
        return Ok(Info::default());
    };
    let map = as_object(value, "info")?;
    Ok(Info {
        title: str_of(map, "title").unwrap_or_default(),
        version: str_of(map, "version").unwrap_or_default(),
        description: str_of(map, "description"),
        terms_of_service: str_of(map, "termsOfService"),
        contact: map
            .get("contact")
            .map(|c| serde_json::from_value(c.clone()))
            .transpose()?,
        license: map
            .get("license")
            .map(|l| serde_json::from_value(l.clone()))
            .transpose()?,
        extensions: extensions_of(map, INFO_KEYS),
    })
}

fn read_security_requirements(value: &Value) -> Result<Vec<SecurityRequirement>> {
    serde_json::from_value(value.clone())
        .map_err(|e| Error::parse(format!("invalid security requirement: {e}")))
}

/// One server per scheme; a document without schemes keeps a scheme-relative url
fn servers_from_swagger(map: &Map<String, Value>) -> Vec<Server> {
    let host = str_of(map, "host");
    let base_path = str_of(map, "basePath").unwrap_or_default();
    let schemes = strings_of(map, "schemes");
    if host.is_none() && base_path.is_empty() && schemes.is_empty() {
        return Vec::new();
    }

    let server = |url: String| Server {
        url,
        ..Default::default()
    };
    match host {
        Some(host) if schemes.is_empty() => vec![server(format!("//{host}{base_path}"))],
        Some(host) => schemes
            .iter()
            .map(|scheme| server(format!("{scheme}://{host}{base_path}")))
            .collect(),
        None if schemes.is_empty() => vec![server(base_path)],
        // empty authority, read back as no host
        None => schemes
            .iter()
            .map(|scheme| server(format!("{scheme}://{base_path}")))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(&json!({ "swagger": "2.0" })).unwrap(),
            WireFormat::Swagger2
        );
        assert_eq!(
            detect_format(&json!({ "openapi": "3.0.0" })).unwrap(),
            WireFormat::OpenApi3
        );
        assert!(detect_format(&json!({ "info": {} })).is_err());
    }

    #[test]
    fn test_swagger_host_becomes_servers() {
        let document = read_document(&json!({
            "swagger": "2.0",
            "info": { "title": "Petstore", "version": "1.0" },
            "host": "petstore.swagger.io",
            "basePath": "/v2",
            "schemes": ["https", "http"],
            "paths": {}
        }))
        .unwrap();

        let urls: Vec<_> = document.servers.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://petstore.swagger.io/v2", "http://petstore.swagger.io/v2"]
        );
        assert_eq!(document.base_path(), Some("/v2"));
        assert_eq!(document.info.title, "Petstore");
    }

    #[test]
    fn test_swagger_schemes_without_host() {
        let document = read_document(&json!({
            "swagger": "2.0",
            "info": { "title": "T", "version": "1" },
            "basePath": "/v2",
            "schemes": ["https"],
            "paths": {}
        }))
        .unwrap();

        assert_eq!(document.servers.len(), 1);
        assert_eq!(document.servers[0].parts(), (Some("https"), None, "/v2"));
        assert_eq!(document.schemes(), vec!["https".to_string()]);
        assert_eq!(document.base_path(), Some("/v2"));
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let document = read_document(&json!({
            "openapi": "3.0.0",
            "info": { "title": "T", "version": "1", "x-logo": { "url": "logo.png" } },
            "paths": {
                "/items": {
                    "x-swagger-router-controller": { "name": "items" },
                    "description": "Item collection",
                    "get": { "x-code-samples": [1, 2], "responses": {} }
                }
            },
            "x-generator": "hand"
        }))
        .unwrap();

        assert_eq!(document.extensions["x-generator"], json!("hand"));
        assert_eq!(document.info.extensions["x-logo"], json!({ "url": "logo.png" }));
        let item = &document.paths["/items"];
        assert_eq!(item.description.as_deref(), Some("Item collection"));
        assert_eq!(
            item.extensions["x-swagger-router-controller"],
            json!({ "name": "items" })
        );
        assert_eq!(
            item.operations[&HttpMethod::Get].extensions["x-code-samples"],
            json!([1, 2])
        );
    }

    #[test]
    fn test_swagger_response_schema_keyed_by_produces() {
        let document = read_document(&json!({
            "swagger": "2.0",
            "info": { "title": "T", "version": "1" },
            "produces": ["application/xml", "application/json"],
            "paths": {
                "/a": { "get": { "responses": {
                    "200": { "description": "OK", "schema": { "type": "string" }, "x-nullable": true }
                } } }
            }
        }))
        .unwrap();

        let response = &document.paths["/a"].operations[&HttpMethod::Get].responses["200"];
        assert_eq!(response.content.len(), 2);
        assert!(response.schema().is_some());
        assert_eq!(response.nullable, Some(true));
        assert!(response.extensions.is_empty());
    }
}
