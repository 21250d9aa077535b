//! Document model → wire value.

use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{put_bool, put_extensions, put_str, put_strings};
use crate::core::error::Result;
use crate::model::pointer::encode_segment;
use crate::model::{
    Document, Id, Info, Operation, ParameterKind, PathItem, Reference, Response, Schema, ScopeId,
    WireFormat,
};

/// Local pointer prefixes that differ between the formats
const PREFIXES: [(&str, &str); 3] = [
    ("#/definitions/", "#/components/schemas/"),
    ("#/parameters/", "#/components/parameters/"),
    ("#/responses/", "#/components/responses/"),
];

/// Rewrites a same-document pointer into the spelling of `format`
pub(super) fn translate_local_pointer(pointer: &str, format: WireFormat) -> String {
    for (swagger, openapi) in PREFIXES {
        let (from, to) = match format {
            WireFormat::Swagger2 => (openapi, swagger),
            WireFormat::OpenApi3 => (swagger, openapi),
        };
        if let Some(rest) = pointer.strip_prefix(from) {
            return format!("{to}{rest}");
        }
    }
    pointer.to_string()
}

pub(super) fn write_document(document: &Document, format: WireFormat) -> Result<Value> {
    let writer = Writer::new(document, format);
    let value = writer.write_root()?;
    tracing::debug!(
        "Wrote document as {} ({} generated definitions)",
        format,
        writer.generated.len()
    );
    Ok(value)
}

/// Projects one document onto one wire format
pub(crate) struct Writer<'a> {
    pub(super) document: &'a Document,
    pub(super) format: WireFormat,
    /// Registry name of every schema a pointer can be computed for
    names: HashMap<Id<Schema>, String>,
    /// Unnamed link targets that get a registry entry so they can be pointed at
    generated: Vec<(String, Id<Schema>)>,
}

impl<'a> Writer<'a> {
    fn new(document: &'a Document, format: WireFormat) -> Self {
        let mut names: HashMap<Id<Schema>, String> = HashMap::new();
        for (name, id) in &document.definitions {
            names.entry(*id).or_insert_with(|| name.clone());
        }

        let mut generated = Vec::new();
        for (_, schema) in document.schemas.iter() {
            let Some(reference) = &schema.reference else {
                continue;
            };
            let Some(target) = reference.target else {
                continue;
            };
            if !reference.pointer.is_empty() || reference.scope != ScopeId::Root {
                continue;
            }
            if names.contains_key(&target) {
                continue;
            }
            let base = document.schemas[target]
                .title
                .clone()
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| "Anonymous".to_string());
            let mut name = base.clone();
            let mut counter = 2;
            while document.definitions.contains_key(&name)
                || generated.iter().any(|(taken, _)| *taken == name)
            {
                name = format!("{base}{counter}");
                counter += 1;
            }
            names.insert(target, name.clone());
            generated.push((name, target));
        }

        Self {
            document,
            format,
            names,
            generated,
        }
    }

    fn write_root(&self) -> Result<Value> {
        let document = self.document;
        let mut map = Map::new();
        match self.format {
            WireFormat::Swagger2 => {
                let version = match document.format {
                    WireFormat::Swagger2 => document.version.clone(),
                    WireFormat::OpenApi3 => WireFormat::Swagger2.default_version().to_string(),
                };
                map.insert("swagger".to_string(), Value::String(version));
            }
            WireFormat::OpenApi3 => {
                let version = match document.format {
                    WireFormat::OpenApi3 => document.version.clone(),
                    WireFormat::Swagger2 => WireFormat::OpenApi3.default_version().to_string(),
                };
                map.insert("openapi".to_string(), Value::String(version));
            }
        }
        map.insert("info".to_string(), write_info(&document.info)?);

        match self.format {
            WireFormat::Swagger2 => {
                if let Some(server) = document.servers.first() {
                    let (_, host, base_path) = server.parts();
                    if let Some(host) = host {
                        map.insert("host".to_string(), Value::from(host));
                    }
                    if !base_path.is_empty() {
                        map.insert("basePath".to_string(), Value::from(base_path));
                    }
                }
                put_strings(&mut map, "schemes", &document.schemes());
                put_strings(&mut map, "consumes", &document.consumes);
                put_strings(&mut map, "produces", &document.produces);
            }
            WireFormat::OpenApi3 => {
                if !document.servers.is_empty() {
                    map.insert(
                        "servers".to_string(),
                        serde_json::to_value(&document.servers)?,
                    );
                }
            }
        }

        let mut paths = Map::new();
        for (path, item) in &document.paths {
            paths.insert(path.clone(), self.write_path_item(item)?);
        }
        map.insert("paths".to_string(), Value::Object(paths));

        let mut definitions = Map::new();
        for (name, id) in &document.definitions {
            definitions.insert(name.clone(), self.write_schema(*id)?);
        }
        for (name, id) in &self.generated {
            definitions.insert(name.clone(), self.write_schema(*id)?);
        }

        let mut parameters = Map::new();
        for (name, id) in &document.parameters {
            let parameter = &document.parameter_nodes[*id];
            if self.format == WireFormat::OpenApi3
                && matches!(parameter.kind, ParameterKind::Body | ParameterKind::FormData)
                && parameter.reference.is_none()
            {
                tracing::warn!(
                    "Shared {} parameter '{name}' has no OpenAPI 3 component form, operations inline it",
                    parameter.kind.as_str()
                );
                continue;
            }
            parameters.insert(name.clone(), self.write_parameter(parameter)?);
        }

        let mut responses = Map::new();
        for (name, id) in &document.responses {
            responses.insert(name.clone(), self.write_response(&document.response_nodes[*id])?);
        }

        let mut schemes = Map::new();
        for (name, scheme) in &document.security_schemes {
            schemes.insert(name.clone(), self.write_security_scheme(name, scheme)?);
        }

        match self.format {
            WireFormat::Swagger2 => {
                insert_non_empty(&mut map, "definitions", definitions);
                insert_non_empty(&mut map, "parameters", parameters);
                insert_non_empty(&mut map, "responses", responses);
                insert_non_empty(&mut map, "securityDefinitions", schemes);
                if !document.component_extras.is_empty() {
                    tracing::warn!(
                        "Dropping components sections {:?} that Swagger 2.0 cannot express",
                        document.component_extras.keys().collect::<Vec<_>>()
                    );
                }
            }
            WireFormat::OpenApi3 => {
                let mut components = Map::new();
                insert_non_empty(&mut components, "schemas", definitions);
                insert_non_empty(&mut components, "parameters", parameters);
                insert_non_empty(&mut components, "responses", responses);
                insert_non_empty(&mut components, "securitySchemes", schemes);
                put_extensions(&mut components, &document.component_extras);
                insert_non_empty(&mut map, "components", components);
            }
        }

        if !document.security.is_empty() {
            map.insert("security".to_string(), serde_json::to_value(&document.security)?);
        }
        if !document.tags.is_empty() {
            map.insert("tags".to_string(), serde_json::to_value(&document.tags)?);
        }
        if let Some(docs) = &document.external_docs {
            map.insert("externalDocs".to_string(), serde_json::to_value(docs)?);
        }
        put_extensions(&mut map, &document.extensions);
        Ok(Value::Object(map))
    }

    fn write_path_item(&self, item: &PathItem) -> Result<Value> {
        let mut map = Map::new();
        if let Some(reference) = &item.reference {
            map.insert("$ref".to_string(), Value::String(reference.pointer.clone()));
        }
        put_str(&mut map, "summary", &item.summary);
        put_str(&mut map, "description", &item.description);
        for (method, operation) in &item.operations {
            map.insert(method.as_str().to_string(), self.write_operation(operation)?);
        }
        if !item.parameters.is_empty() {
            let parameters = item
                .parameters
                .iter()
                .map(|parameter| self.write_parameter(parameter))
                .collect::<Result<Vec<_>>>()?;
            map.insert("parameters".to_string(), Value::Array(parameters));
        }
        put_extensions(&mut map, &item.extensions);
        Ok(Value::Object(map))
    }

    fn write_operation(&self, operation: &Operation) -> Result<Value> {
        let swagger = self.format == WireFormat::Swagger2;
        let mut map = Map::new();
        put_strings(&mut map, "tags", &operation.tags);
        put_str(&mut map, "summary", &operation.summary);
        put_str(&mut map, "description", &operation.description);
        if let Some(docs) = &operation.external_docs {
            map.insert("externalDocs".to_string(), serde_json::to_value(docs)?);
        }
        put_str(&mut map, "operationId", &operation.operation_id);
        if swagger {
            put_strings(&mut map, "consumes", &operation.consumes);
            put_strings(&mut map, "produces", &operation.produces);
        }

        let mut parameters = Vec::new();
        for parameter in &operation.parameters {
            let Some(actual) = self.followed_parameter(parameter)? else {
                parameters.push(self.write_parameter(parameter)?);
                continue;
            };
            match (self.format, actual.kind) {
                (WireFormat::OpenApi3, ParameterKind::Body | ParameterKind::FormData) => continue,
                (WireFormat::Swagger2, ParameterKind::Cookie) => {
                    tracing::warn!(
                        "Cookie parameter '{}' dropped, Swagger 2.0 has no cookie parameters",
                        actual.name
                    );
                    continue;
                }
                _ => parameters.push(self.write_parameter(parameter)?),
            }
        }
        if !parameters.is_empty() {
            map.insert("parameters".to_string(), Value::Array(parameters));
        }
        if !swagger {
            if let Some(body) = self.write_request_body(operation)? {
                map.insert("requestBody".to_string(), body);
            }
        }

        let mut responses = Map::new();
        for (code, response) in &operation.responses {
            responses.insert(code.clone(), self.write_response(response)?);
        }
        map.insert("responses".to_string(), Value::Object(responses));

        if swagger {
            put_strings(&mut map, "schemes", &operation.schemes);
        }
        if operation.deprecated {
            map.insert("deprecated".to_string(), Value::Bool(true));
        }
        if let Some(security) = &operation.security {
            map.insert("security".to_string(), serde_json::to_value(security)?);
        }
        put_extensions(&mut map, &operation.extensions);
        Ok(Value::Object(map))
    }

    fn write_response(&self, response: &Response) -> Result<Value> {
        let mut map = Map::new();
        if let Some(reference) = &response.reference {
            map.insert(
                "$ref".to_string(),
                Value::String(self.response_pointer(reference)),
            );
            return Ok(Value::Object(map));
        }
        map.insert(
            "description".to_string(),
            Value::String(response.description.clone()),
        );

        match self.format {
            WireFormat::Swagger2 => {
                if let Some(schema) = response.schema() {
                    map.insert("schema".to_string(), self.write_schema(schema)?);
                }
                let examples: Map<String, Value> = response
                    .content
                    .iter()
                    .filter_map(|(media, body)| Some((media.clone(), body.example.clone()?)))
                    .collect();
                if !examples.is_empty() {
                    map.insert("examples".to_string(), Value::Object(examples));
                }
            }
            WireFormat::OpenApi3 => {
                let mut content = Map::new();
                for (media, body) in &response.content {
                    let mut entry = Map::new();
                    if let Some(schema) = body.schema {
                        entry.insert("schema".to_string(), self.write_schema(schema)?);
                    }
                    if let Some(example) = &body.example {
                        entry.insert("example".to_string(), example.clone());
                    }
                    put_extensions(&mut entry, &body.extensions);
                    content.insert(media.clone(), Value::Object(entry));
                }
                insert_non_empty(&mut map, "content", content);
            }
        }

        if !response.headers.is_empty() {
            let mut headers = Map::new();
            for (name, header) in &response.headers {
                let mut entry = Map::new();
                put_str(&mut entry, "description", &header.description);
                if let Some(schema) = header.schema {
                    match self.format {
                        WireFormat::Swagger2 => entry.extend(self.write_inline_schema(schema)?),
                        WireFormat::OpenApi3 => {
                            entry.insert("schema".to_string(), self.write_schema(schema)?);
                        }
                    }
                }
                put_extensions(&mut entry, &header.extensions);
                headers.insert(name.clone(), Value::Object(entry));
            }
            map.insert("headers".to_string(), Value::Object(headers));
        }
        put_bool(&mut map, "x-nullable", response.nullable);
        put_extensions(&mut map, &response.extensions);
        Ok(Value::Object(map))
    }

    pub(super) fn schema_pointer(&self, reference: &Reference<Schema>) -> String {
        if reference.scope != ScopeId::Root || !(reference.pointer.is_empty() || reference.is_local()) {
            return reference.pointer.clone();
        }
        if let Some(name) = reference.target.and_then(|target| self.names.get(&target)) {
            return format!("{}{}", self.format.definitions_prefix(), encode_segment(name));
        }
        translate_local_pointer(&reference.pointer, self.format)
    }

    fn response_pointer(&self, reference: &Reference<Response>) -> String {
        if reference.scope != ScopeId::Root || !(reference.pointer.is_empty() || reference.is_local()) {
            return reference.pointer.clone();
        }
        if let Some(target) = reference.target {
            if let Some((name, _)) = self.document.responses.iter().find(|(_, id)| **id == target) {
                return format!("{}{}", self.format.responses_prefix(), encode_segment(name));
            }
        }
        translate_local_pointer(&reference.pointer, self.format)
    }
}

fn write_info(info: &Info) -> Result<Value> {
    let mut map = Map::new();
    map.insert("title".to_string(), Value::String(info.title.clone()));
    put_str(&mut map, "description", &info.description);
    put_str(&mut map, "termsOfService", &info.terms_of_service);
    if let Some(contact) = &info.contact {
        map.insert("contact".to_string(), serde_json::to_value(contact)?);
    }
    if let Some(license) = &info.license {
        map.insert("license".to_string(), serde_json::to_value(license)?);
    }
    map.insert("version".to_string(), Value::String(info.version.clone()));
    put_extensions(&mut map, &info.extensions);
    Ok(Value::Object(map))
}

fn insert_non_empty(map: &mut Map<String, Value>, key: &str, value: Map<String, Value>) {
    if !value.is_empty() {
        map.insert(key.to_string(), Value::Object(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JsonType, Schema};
    use serde_json::json;

    #[test]
    fn test_translate_local_pointer() {
        assert_eq!(
            translate_local_pointer("#/definitions/Pet", WireFormat::OpenApi3),
            "#/components/schemas/Pet"
        );
        assert_eq!(
            translate_local_pointer("#/components/responses/NotFound", WireFormat::Swagger2),
            "#/responses/NotFound"
        );
        assert_eq!(
            translate_local_pointer("#/definitions/Pet", WireFormat::Swagger2),
            "#/definitions/Pet"
        );
    }

    #[test]
    fn test_registry_never_leaks_across_formats() {
        let document = Document::from_value(&json!({
            "swagger": "2.0",
            "info": { "title": "T", "version": "1" },
            "paths": { "/pets": { "get": { "responses": {
                "200": { "description": "OK", "schema": { "$ref": "#/definitions/Pet" } }
            } } } },
            "definitions": { "Pet": { "type": "object" } }
        }))
        .unwrap();

        let openapi = serde_json::to_string(&document.to_value(WireFormat::OpenApi3).unwrap()).unwrap();
        assert!(!openapi.contains("\"definitions\""));
        assert!(!openapi.contains("#/definitions/Pet"));
        assert!(openapi.contains("#/components/schemas/Pet"));

        let swagger = serde_json::to_string(&document.to_value(WireFormat::Swagger2).unwrap()).unwrap();
        assert!(!swagger.contains("\"components\""));
        assert!(swagger.contains("#/definitions/Pet"));
    }

    #[test]
    fn test_programmatic_link_to_unnamed_schema_gets_registered() {
        let mut document = Document::new(WireFormat::OpenApi3);
        let target = document.schemas.alloc(Schema {
            title: Some("Address".to_string()),
            ..Schema::new(JsonType::Object)
        });
        let link = document.schemas.alloc(Schema::reference_to(target));
        let mut person = Schema::new(JsonType::Object);
        person.properties.insert("address".to_string(), link);
        document.add_definition("Person", person);

        let value = document.to_value(WireFormat::OpenApi3).unwrap();
        let schemas = &value["components"]["schemas"];
        assert_eq!(
            schemas["Person"]["properties"]["address"],
            json!({ "$ref": "#/components/schemas/Address" })
        );
        assert_eq!(schemas["Address"]["type"], json!("object"));
    }

    #[test]
    fn test_swagger_servers_projection() {
        let document = Document::from_value(&json!({
            "openapi": "3.0.0",
            "info": { "title": "T", "version": "1" },
            "servers": [ { "url": "https://api.example.com/v1" } ],
            "paths": {}
        }))
        .unwrap();

        let swagger = document.to_value(WireFormat::Swagger2).unwrap();
        assert_eq!(swagger["swagger"], json!("2.0"));
        assert_eq!(swagger["host"], json!("api.example.com"));
        assert_eq!(swagger["basePath"], json!("/v1"));
        assert_eq!(swagger["schemes"], json!(["https"]));
        assert!(swagger.get("servers").is_none());
    }
}
