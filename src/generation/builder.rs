//! Builds the language-neutral [`GenerationModel`] from a resolved document

use heck::ToPascalCase;
use indexmap::IndexMap;
use tracing::debug;

use crate::core::error::{Error, Result};
use crate::generation::descriptors::{
    ControllerDescriptor, GenerationModel, OperationDescriptor, ParameterDescriptor,
    ParameterSource, TypeRef, TypeUse,
};
use crate::generation::naming::{UniqueNames, to_identifier, to_pascal_identifier};
use crate::generation::settings::{GeneratorSettings, RouteNaming};
use crate::generation::type_mapping::TypeMapper;
use crate::model::{Document, HttpMethod, Operation, Parameter, ParameterKind, PathItem};

/// Name of the trailing cancellation parameter before a binder renames it
pub const CANCELLATION_PARAMETER: &str = "cancellationToken";

/// Walks every operation of the document in path order and collects type
/// declarations and controller descriptors.
pub fn build(document: &Document, settings: &GeneratorSettings) -> Result<GenerationModel> {
    ModelBuilder::new(document, settings).build()
}

struct ModelBuilder<'a> {
    document: &'a Document,
    settings: &'a GeneratorSettings,
    types: TypeMapper<'a>,
}

#[derive(Default)]
struct ControllerEntry {
    method_names: UniqueNames,
    operations: Vec<OperationDescriptor>,
}

impl<'a> ModelBuilder<'a> {
    fn new(document: &'a Document, settings: &'a GeneratorSettings) -> Self {
        Self {
            document,
            settings,
            types: TypeMapper::new(
                document,
                settings.default_null_handling,
                settings.generate_dto_types,
            ),
        }
    }

    fn build(mut self) -> Result<GenerationModel> {
        let document = self.document;
        let mut controllers: IndexMap<String, ControllerEntry> = IndexMap::new();

        for (path, item) in &document.paths {
            let item = document.actual_path_item(item)?;
            for (method, operation) in &item.operations {
                let (controller, base_name) = operation_names(operation, *method, path);
                let entry = controllers.entry(controller).or_default();
                let method_name = entry.method_names.claim(&base_name);
                let descriptor = self
                    .operation(path, *method, item, operation, method_name)
                    .map_err(|e| in_operation(e, *method, path))?;
                entry.operations.push(descriptor);
            }
        }

        let types = self.types.declarations()?;
        let controllers: Vec<ControllerDescriptor> = controllers
            .into_iter()
            .map(|(name, entry)| ControllerDescriptor {
                class_name: self.settings.class_name_for(&name),
                name,
                operations: entry.operations,
            })
            .collect();

        debug!(
            "Built generation model with {} types and {} operations in {} controllers",
            types.len(),
            controllers.iter().map(|c| c.operations.len()).sum::<usize>(),
            controllers.len()
        );

        Ok(GenerationModel {
            title: document.info.title.clone(),
            version: document.info.version.clone(),
            description: document.info.description.clone(),
            base_url: document.servers.first().map(|server| server.url.clone()),
            types,
            controllers,
        })
    }

    fn operation(
        &mut self,
        path: &str,
        method: HttpMethod,
        item: &'a PathItem,
        operation: &'a Operation,
        method_name: String,
    ) -> Result<OperationDescriptor> {
        let document = self.document;

        let mut names = UniqueNames::new();
        let mut parameters = Vec::new();
        for parameter in operation.actual_parameters(item, document)? {
            parameters.push(self.parameter(parameter, &method_name, &mut names)?);
        }

        if self.settings.generate_optional_parameters {
            let (required, optional): (Vec<_>, Vec<_>) =
                parameters.into_iter().partition(|p| !p.optional);
            parameters = required.into_iter().chain(optional).collect();
        }
        if self.settings.cancellation_parameter {
            parameters.push(ParameterDescriptor {
                name: names.claim(CANCELLATION_PARAMETER),
                wire_name: String::new(),
                source: ParameterSource::Cancellation,
                ty: TypeRef::Any,
                required: false,
                nullable: false,
                optional: self.settings.generate_optional_parameters,
                default: None,
                description: None,
            });
        }

        let result = self.result(operation, &method_name)?;

        let route_name = match (self.settings.route_naming, &operation.operation_id) {
            (RouteNaming::OperationId, Some(id)) if !id.is_empty() => Some(id.clone()),
            _ => None,
        };

        debug!(
            "Operation {} {} -> {} with {} parameters",
            method,
            path,
            method_name,
            parameters.len()
        );

        Ok(OperationDescriptor {
            method_name,
            operation_id: operation.operation_id.clone(),
            http_method: method.as_str().to_string(),
            path: path.to_string(),
            route: path.trim_start_matches('/').to_string(),
            route_name,
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            parameters,
            result,
            consumes: operation.actual_consumes(document).to_vec(),
            produces: operation.actual_produces(document).to_vec(),
            deprecated: operation.deprecated,
        })
    }

    fn parameter(
        &mut self,
        parameter: &Parameter,
        method_name: &str,
        names: &mut UniqueNames,
    ) -> Result<ParameterDescriptor> {
        let source = match parameter.kind {
            ParameterKind::Query => ParameterSource::Query,
            ParameterKind::Header => ParameterSource::Header,
            ParameterKind::Path => ParameterSource::Path,
            ParameterKind::Cookie => ParameterSource::Cookie,
            ParameterKind::FormData => ParameterSource::Form,
            ParameterKind::Body => ParameterSource::Body,
        };
        let hint = format!("{method_name}{}", parameter.name.to_pascal_case());
        let ty = match parameter.schema {
            Some(schema) => self.types.type_of(schema, &hint)?,
            None => TypeRef::Any,
        };
        let default = match parameter.schema {
            Some(schema) => match &self.document.schemas[schema].default {
                Some(value) => Some(value.clone()),
                None => self.document.actual_schema(schema)?.default.clone(),
            },
            None => None,
        };
        // path parameters are always bound
        let required = parameter.required || parameter.kind == ParameterKind::Path;

        Ok(ParameterDescriptor {
            name: names.claim(&to_identifier(&parameter.name)),
            wire_name: parameter.name.clone(),
            source,
            nullable: self.types.nullable_of(parameter.schema, Some(!required)),
            optional: self.settings.generate_optional_parameters && !required,
            ty,
            required,
            default,
            description: parameter.description.clone(),
        })
    }

    /// Body type of the first success response, or of `default` when no
    /// 2xx response is declared
    fn result(&mut self, operation: &Operation, method_name: &str) -> Result<Option<TypeUse>> {
        let responses = operation.actual_responses(self.document)?;
        let success = responses
            .iter()
            .find(|(code, _)| code.starts_with('2'))
            .or_else(|| responses.iter().find(|(code, _)| **code == "default"));
        let Some((_, response)) = success else {
            return Ok(None);
        };
        let Some(schema) = response.schema() else {
            return Ok(None);
        };
        Ok(Some(TypeUse {
            ty: self.types.type_of(schema, &format!("{method_name}Response"))?,
            nullable: self.types.nullable_of(Some(schema), response.nullable),
        }))
    }
}

/// Controller and method name of an operation.
///
/// `Pets_List` is split into controller `Pets` and method `List`; an id
/// without `_` names the method only. Without an id the method is built
/// from the HTTP method and the literal path segments.
fn operation_names(operation: &Operation, method: HttpMethod, path: &str) -> (String, String) {
    match operation.operation_id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => match id.split_once('_') {
            Some((controller, name)) if !controller.is_empty() && !name.is_empty() => {
                (to_pascal_identifier(controller), to_pascal_identifier(name))
            }
            _ => (String::new(), to_pascal_identifier(id)),
        },
        None => {
            let segments: String = path
                .split('/')
                .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
                .map(|segment| segment.to_pascal_case())
                .collect();
            (String::new(), format!("{}{segments}", method.as_str().to_pascal_case()))
        }
    }
}

/// Names the operation in an unsupported-schema failure
fn in_operation(error: Error, method: HttpMethod, path: &str) -> Error {
    match error {
        Error::UnsupportedSchema { schema, reason } => Error::UnsupportedSchema {
            schema,
            reason: format!("{reason} (operation {} {path})", method.as_str().to_uppercase()),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::descriptors::Primitive;
    use crate::generation::settings::NullHandling;
    use serde_json::{Value, json};

    fn document(value: Value) -> Document {
        Document::from_value(&value).unwrap()
    }

    fn query_operation() -> Document {
        document(json!({
            "swagger": "2.0",
            "info": {"title": "Test", "version": "1"},
            "paths": {
                "/foo": {
                    "get": {
                        "operationId": "Test_Foo",
                        "parameters": [
                            {"name": "a", "in": "query", "type": "string", "required": true},
                            {"name": "c", "in": "query", "type": "string", "default": "x"},
                            {"name": "b", "in": "query", "type": "string", "required": true}
                        ],
                        "responses": {"200": {"description": "ok", "schema": {"type": "string"}}}
                    }
                }
            }
        }))
    }

    #[test]
    fn test_optional_parameters_move_last_before_cancellation() {
        let doc = query_operation();
        let settings = GeneratorSettings {
            generate_optional_parameters: true,
            cancellation_parameter: true,
            ..Default::default()
        };
        let model = build(&doc, &settings).unwrap();
        let operation = &model.controllers[0].operations[0];
        let names: Vec<&str> = operation.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", CANCELLATION_PARAMETER]);
        assert!(operation.parameters[2].optional);
        assert_eq!(operation.parameters[2].default, Some(json!("x")));
        assert_eq!(
            operation.parameters[3].source,
            ParameterSource::Cancellation
        );
    }

    #[test]
    fn test_declared_order_kept_without_optional_generation() {
        let doc = query_operation();
        let model = build(&doc, &GeneratorSettings::default()).unwrap();
        let operation = &model.controllers[0].operations[0];
        let names: Vec<&str> = operation.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "b"]);
        assert!(operation.parameters.iter().all(|p| !p.optional));
    }

    #[test]
    fn test_controller_split_and_route_name() {
        let doc = query_operation();
        let settings = GeneratorSettings {
            route_naming: RouteNaming::OperationId,
            ..Default::default()
        };
        let model = build(&doc, &settings).unwrap();
        let controller = &model.controllers[0];
        assert_eq!(controller.name, "Test");
        assert_eq!(controller.class_name, "TestController");
        let operation = &controller.operations[0];
        assert_eq!(operation.method_name, "Foo");
        assert_eq!(operation.route, "foo");
        assert_eq!(operation.route_name.as_deref(), Some("Test_Foo"));
        assert_eq!(
            operation.result,
            Some(TypeUse {
                ty: TypeRef::primitive(Primitive::String),
                nullable: false
            })
        );
    }

    #[test]
    fn test_duplicate_names_get_suffixes_in_path_order() {
        let doc = document(json!({
            "openapi": "3.0.0",
            "info": {"title": "Dup", "version": "1"},
            "paths": {
                "/a": {"get": {"operationId": "Get", "responses": {"204": {"description": "none"}}}},
                "/b": {"get": {"operationId": "Get", "responses": {"204": {"description": "none"}}}},
                "/c/{id}": {"delete": {"responses": {"204": {"description": "none"}}}}
            }
        }));
        let settings = GeneratorSettings::default();
        let first = build(&doc, &settings).unwrap();
        let names: Vec<&str> = first
            .operations()
            .map(|operation| operation.method_name.as_str())
            .collect();
        assert_eq!(names, vec!["Get", "Get2", "DeleteC"]);
        assert!(first.operations().all(|operation| operation.result.is_none()));

        let second = build(&doc, &settings).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_explicit_nullable_response_wins_over_not_null() {
        let doc = document(json!({
            "openapi": "3.0.0",
            "info": {"title": "Null", "version": "1"},
            "paths": {
                "/pet": {"get": {"operationId": "Pets_Get", "responses": {"200": {
                    "description": "ok",
                    "content": {"application/json": {"schema": {
                        "nullable": true,
                        "oneOf": [{"$ref": "#/components/schemas/Pet"}]
                    }}}
                }}}}
            },
            "components": {"schemas": {"Pet": {"type": "object", "properties": {"name": {"type": "string"}}}}}
        }));
        let settings = GeneratorSettings {
            default_null_handling: NullHandling::NotNull,
            ..Default::default()
        };
        let model = build(&doc, &settings).unwrap();
        let result = model.operations().next().unwrap().result.clone().unwrap();
        assert!(result.nullable);
        assert_eq!(
            result.ty,
            TypeRef::Named {
                name: "Pet".to_string(),
                is_enum: false
            }
        );
    }

    #[test]
    fn test_unsupported_schema_names_operation() {
        let doc = document(json!({
            "openapi": "3.0.0",
            "info": {"title": "Bad", "version": "1"},
            "paths": {
                "/odd": {"post": {"operationId": "Odd_Post", "responses": {"200": {
                    "description": "ok",
                    "content": {"application/json": {"schema": {
                        "allOf": [
                            {"type": "object", "properties": {"a": {"type": "string"}}},
                            {"type": "object", "properties": {"a": {"type": "integer"}}}
                        ]
                    }}}
                }}}}
            }
        }));
        let error = build(&doc, &GeneratorSettings::default()).unwrap_err();
        let Error::UnsupportedSchema { schema, reason } = error else {
            panic!("expected an unsupported schema error");
        };
        assert_eq!(schema, "PostResponse");
        assert!(reason.contains("conflicting types"));
    }

    #[test]
    fn test_body_parameter_and_dto_opt_out() {
        let doc = document(json!({
            "swagger": "2.0",
            "info": {"title": "Body", "version": "1"},
            "paths": {
                "/pets": {"post": {
                    "operationId": "Pets_Create",
                    "parameters": [{"name": "pet", "in": "body", "required": true,
                        "schema": {"$ref": "#/definitions/Pet"}}],
                    "responses": {"201": {"description": "created"}}
                }}
            },
            "definitions": {"Pet": {"type": "object", "properties": {"name": {"type": "string"}}}}
        }));
        let with_types = build(&doc, &GeneratorSettings::default()).unwrap();
        assert_eq!(with_types.types.len(), 1);
        let body = &with_types.operations().next().unwrap().parameters[0];
        assert_eq!(body.source, ParameterSource::Body);
        assert!(!body.nullable);

        let settings = GeneratorSettings {
            generate_dto_types: false,
            ..Default::default()
        };
        let opaque = build(&doc, &settings).unwrap();
        assert!(opaque.types.is_empty());
        assert_eq!(opaque.operations().next().unwrap().parameters[0].ty, TypeRef::Any);
    }
}
