use std::sync::Arc;

use serde_json::json;
use swaggen::Error;
use swaggen::generation::builder::CANCELLATION_PARAMETER;
use swaggen::generation::{
    DocumentSource, GenerationOrchestrator, GeneratorSettings, Language, NullHandling, build,
};
use swaggen::infrastructure::generation::CompositeBinder;
use swaggen::infrastructure::openapi::CompositeLoader;
use swaggen::model::{Document, WireFormat};
use swaggen::resolution::{LoaderOptions, Resolver};

fn orchestrator() -> GenerationOrchestrator {
    let loader = CompositeLoader::new(&LoaderOptions::default()).expect("Failed to build loader");
    GenerationOrchestrator::new(
        Arc::new(Resolver::new(Arc::new(loader))),
        Arc::new(CompositeBinder::with_defaults().expect("Failed to build binders")),
    )
}

#[test]
fn test_optional_parameters_move_last_before_cancellation() {
    let document = Document::from_value(&json!({
        "swagger": "2.0",
        "info": {"title": "Search", "version": "1"},
        "paths": {"/search": {"get": {
            "operationId": "Search_Find",
            "parameters": [
                {"name": "a", "in": "query", "type": "string", "required": true},
                {"name": "c", "in": "query", "type": "string", "default": "all"},
                {"name": "b", "in": "query", "type": "string", "required": true}
            ],
            "responses": {"204": {"description": "none"}}
        }}}
    }))
    .unwrap();
    let settings = GeneratorSettings {
        generate_optional_parameters: true,
        cancellation_parameter: true,
        ..Default::default()
    };

    let model = build(&document, &settings).unwrap();
    let operation = model.operations().next().unwrap();
    let names: Vec<&str> = operation
        .parameters
        .iter()
        .map(|parameter| parameter.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "c", CANCELLATION_PARAMETER]);
    assert_eq!(operation.parameters[2].default, Some(json!("all")));
}

#[test]
fn test_duplicate_names_are_suffixed_deterministically() {
    let document = Document::from_value(&json!({
        "openapi": "3.0.0",
        "info": {"title": "Dup", "version": "1"},
        "paths": {
            "/users": {"get": {"operationId": "Items_List", "responses": {"204": {"description": "none"}}}},
            "/groups": {"get": {"operationId": "Items_List", "responses": {"204": {"description": "none"}}}},
            "/roles": {"get": {"operationId": "Items_List", "responses": {"204": {"description": "none"}}}}
        }
    }))
    .unwrap();
    let settings = GeneratorSettings::for_language(Language::CSharp);
    let orchestrator = orchestrator();

    let model = build(&document, &settings).unwrap();
    let names: Vec<&str> = model
        .operations()
        .map(|operation| operation.method_name.as_str())
        .collect();
    assert_eq!(names, vec!["List", "List2", "List3"]);

    let first = orchestrator.generate(&document, &settings).unwrap();
    let second = orchestrator.generate(&document, &settings).unwrap();
    assert_eq!(first, second);
    assert!(first.content.contains("List3Async("));
}

#[test]
fn test_explicit_nullable_response_survives_round_trip_under_not_null() {
    let document = Document::from_value(&json!({
        "openapi": "3.0.0",
        "info": {"title": "Counts", "version": "1"},
        "paths": {
            "/maybe": {"get": {"operationId": "Counts_Maybe", "responses": {"200": {
                "description": "ok",
                "content": {"application/json": {"schema": {"type": "integer", "nullable": true}}}
            }}}},
            "/always": {"get": {"operationId": "Counts_Always", "responses": {"200": {
                "description": "ok",
                "content": {"application/json": {"schema": {"type": "integer"}}}
            }}}}
        }
    }))
    .unwrap();
    let settings = GeneratorSettings {
        default_null_handling: NullHandling::NotNull,
        ..Default::default()
    };

    for format in [WireFormat::OpenApi3, WireFormat::Swagger2] {
        let reread = Document::from_json(&document.to_json(format).unwrap()).unwrap();
        let file = orchestrator().generate(&reread, &settings).unwrap();

        assert!(file.content.contains(
            "System.Threading.Tasks.Task<Microsoft.AspNetCore.Mvc.ActionResult<int?>> MaybeAsync()"
        ));
        assert!(file.content.contains(
            "System.Threading.Tasks.Task<Microsoft.AspNetCore.Mvc.ActionResult<int>> AlwaysAsync()"
        ));
    }
}

#[test]
fn test_unsupported_composition_names_schema_and_operation() {
    let document = Document::from_value(&json!({
        "openapi": "3.0.0",
        "info": {"title": "Broken", "version": "1"},
        "paths": {"/mixed": {"get": {"operationId": "Mixed_Get", "responses": {"200": {
            "description": "ok",
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Mixed"}}}
        }}}}},
        "components": {"schemas": {
            "Mixed": {"allOf": [
                {"type": "object", "properties": {"id": {"type": "integer"}}},
                {"type": "string"}
            ]}
        }}
    }))
    .unwrap();

    let error = orchestrator()
        .generate(&document, &GeneratorSettings::default())
        .unwrap_err();
    match error {
        Error::UnsupportedSchema { schema, .. } => assert_eq!(schema, "Mixed"),
        other => panic!("expected an unsupported schema, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_typescript_client_from_files() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("api.yaml"),
        r#"openapi: 3.0.0
info:
  title: Pet Store
  version: "1"
servers:
  - url: https://pets.example.com/v1
paths:
  /pets/{id}:
    get:
      operationId: Pets_Get
      summary: Finds a pet
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: integer
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "types.yaml#/Pet"
"#,
    )
    .expect("Failed to write root file");
    std::fs::write(
        dir.path().join("types.yaml"),
        r#"Pet:
  title: Pet
  type: object
  required: [name]
  properties:
    name:
      type: string
"#,
    )
    .expect("Failed to write types file");

    let settings = GeneratorSettings {
        generate_client_interfaces: true,
        ..GeneratorSettings::for_language(Language::TypeScript)
    };
    let location = dir.path().join("api.yaml").display().to_string();
    let file = orchestrator()
        .generate_from(DocumentSource::Location(location), &settings)
        .await
        .unwrap();

    assert_eq!(file.name, "PetStore.ts");
    assert!(file.content.contains("export interface IPetsClient"));
    assert!(file.content.contains("export class PetsClient implements IPetsClient"));
    assert!(file.content.contains("https://pets.example.com/v1"));
    assert!(file.content.contains("get(id: number): Promise<Pet>"));
    assert!(file.content.contains("export interface Pet {"));
    assert!(file.content.contains(" * Finds a pet"));
}

#[tokio::test]
async fn test_settings_file_drives_csharp_output() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let settings_path = dir.path().join("swaggen.toml");
    std::fs::write(
        &settings_path,
        r#"language = "csharp"
controller_style = "abstract"
route_naming = "operation_id"
controller_target = "asp_net_core"
namespace = "Pets.Api"
"#,
    )
    .expect("Failed to write settings");
    let settings = GeneratorSettings::from_toml_file(&settings_path).await.unwrap();

    let document = Document::from_value(&json!({
        "swagger": "2.0",
        "info": {"title": "Pets", "version": "1"},
        "paths": {"/pets": {"get": {
            "operationId": "Pets_List",
            "parameters": [{"name": "limit", "in": "query", "type": "integer"}],
            "responses": {"204": {"description": "none"}}
        }}}
    }))
    .unwrap();
    let file = orchestrator().generate(&document, &settings).unwrap();

    assert_eq!(file.name, "Pets.cs");
    assert!(file.content.contains("namespace Pets.Api"));
    assert!(file.content.contains("public abstract class PetsController"));
    assert!(file.content.contains("Microsoft.AspNetCore.Mvc.Route(\"pets\", Name = \"Pets_List\")"));
    assert!(file.content.contains(
        "List([Microsoft.AspNetCore.Mvc.FromQuery] int? limit)"
    ));
}

#[test]
fn test_csharp_client_optional_parameters_end_with_cancellation_token() {
    let document = Document::from_value(&json!({
        "swagger": "2.0",
        "info": {"title": "Optional", "version": "1"},
        "paths": {"/Test": {"get": {
            "operationId": "Test_Test",
            "parameters": [
                {"name": "c", "in": "query", "type": "string"},
                {"name": "a", "in": "query", "type": "string", "required": true},
                {"name": "b", "in": "query", "type": "string", "required": true}
            ],
            "responses": {"204": {"description": "none"}}
        }}}
    }))
    .unwrap();
    let settings = GeneratorSettings::from_toml_str(
        r#"csharp_output = "client"
generate_optional_parameters = true
generate_client_interfaces = true
"#,
    )
    .unwrap();

    let file = orchestrator().generate(&document, &settings).unwrap();

    assert_eq!(file.name, "Optional.cs");
    assert!(file.content.contains("public partial interface ITestClient"));
    assert!(file.content.contains(
        "TestAsync(string a, string b, string c = null, System.Threading.CancellationToken cancellationToken = default(System.Threading.CancellationToken))"
    ));
    assert!(!file.content.contains("class TestController"));
}
