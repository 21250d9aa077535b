//! Code generation domain
//!
//! A resolved [`Document`](crate::model::Document) is first turned into a
//! language-neutral [`GenerationModel`] by [`build`], then a
//! [`LanguageBinder`] renders that model into source text.

pub mod builder;
pub mod descriptors;
pub mod naming;
pub mod orchestrator;
pub mod sanitizers;
pub mod settings;
pub mod traits;
pub mod type_mapping;
pub mod types;

pub use builder::build;
pub use descriptors::*;
pub use orchestrator::*;
pub use settings::*;
pub use traits::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{Error, Result};
    use crate::infrastructure::generation::CompositeBinder;
    use crate::infrastructure::openapi::FileLoader;
    use crate::model::Document;
    use crate::resolution::Resolver;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    const PETSTORE: &str = r##"{
        "swagger": "2.0",
        "info": {"title": "Pet Store", "version": "1.0"},
        "paths": {
            "/pets/{id}": {
                "get": {
                    "operationId": "Pets_Get",
                    "parameters": [{"name": "id", "in": "path", "required": true, "type": "integer"}],
                    "responses": {"200": {"description": "ok", "schema": {"$ref": "#/definitions/Pet"}}}
                }
            }
        },
        "definitions": {
            "Pet": {"type": "object", "properties": {"name": {"type": "string"}}}
        }
    }"##;

    struct StaticProducer;

    #[async_trait]
    impl DocumentProducer for StaticProducer {
        async fn produce(&self) -> Result<Document> {
            Document::from_json(PETSTORE)
        }
    }

    struct CSharpOnly;

    impl LanguageBinder for CSharpOnly {
        fn supports(&self, language: Language) -> bool {
            language == Language::CSharp
        }

        fn bind(&self, model: &GenerationModel, _settings: &GeneratorSettings) -> Result<String> {
            Ok(format!("// {} controllers", model.controllers.len()))
        }
    }

    fn orchestrator(binder: Arc<dyn LanguageBinder>) -> GenerationOrchestrator {
        GenerationOrchestrator::new(Arc::new(Resolver::new(Arc::new(FileLoader::new()))), binder)
    }

    #[tokio::test]
    async fn test_generate_from_producer() {
        let orchestrator = orchestrator(Arc::new(CompositeBinder::with_defaults().unwrap()));
        let settings = GeneratorSettings::for_language(Language::CSharp);

        let file = orchestrator
            .generate_from(DocumentSource::Producer(Arc::new(StaticProducer)), &settings)
            .await
            .unwrap();

        assert_eq!(file.name, "PetStore.cs");
        assert_eq!(file.language, Language::CSharp);
        assert!(file.content.contains("class PetsController"));
        assert!(file.content.contains("class Pet"));
    }

    #[tokio::test]
    async fn test_generate_from_file_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("petstore.json");
        tokio::fs::write(&path, PETSTORE).await.unwrap();

        let orchestrator = orchestrator(Arc::new(CompositeBinder::with_defaults().unwrap()));
        let settings = GeneratorSettings::for_language(Language::TypeScript);

        let file = orchestrator
            .generate_from(
                DocumentSource::Location(path.display().to_string()),
                &settings,
            )
            .await
            .unwrap();

        assert_eq!(file.name, "PetStore.ts");
        assert!(file.content.contains("class PetsClient"));
        assert!(file.content.contains("interface Pet"));
    }

    #[test]
    fn test_unsupported_language_is_config_error() {
        let orchestrator = orchestrator(Arc::new(CSharpOnly));
        let document = Document::from_value(&json!({
            "openapi": "3.0.0",
            "info": {"title": "", "version": "1"},
            "paths": {}
        }))
        .unwrap();

        let error = orchestrator
            .generate(&document, &GeneratorSettings::for_language(Language::TypeScript))
            .unwrap_err();
        assert!(matches!(error, Error::Config(_)));

        let file = orchestrator
            .generate(&document, &GeneratorSettings::for_language(Language::CSharp))
            .unwrap();
        assert_eq!(file.name, "Generated.cs");
        assert_eq!(file.content, "// 0 controllers");
    }
}
