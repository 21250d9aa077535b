//! Generation orchestration - coordinates loading, model building and binding

use std::sync::Arc;

use heck::ToPascalCase;
use tracing::{debug, info};

use crate::core::error::{Error, Result};
use crate::generation::builder;
use crate::generation::settings::GeneratorSettings;
use crate::generation::traits::{DocumentProducer, LanguageBinder};
use crate::generation::types::GeneratedFile;
use crate::model::Document;
use crate::resolution::Resolver;

/// Where the document to generate from comes from
#[derive(Clone)]
pub enum DocumentSource {
    /// Path or URL of a JSON or YAML document
    Location(String),
    Producer(Arc<dyn DocumentProducer>),
}

/// Orchestrates the code generation workflow
pub struct GenerationOrchestrator {
    resolver: Arc<Resolver>,
    binder: Arc<dyn LanguageBinder>,
}

impl GenerationOrchestrator {
    pub fn new(resolver: Arc<Resolver>, binder: Arc<dyn LanguageBinder>) -> Self {
        Self { resolver, binder }
    }

    /// Load, resolve and generate in one go
    pub async fn generate_from(
        &self,
        source: DocumentSource,
        settings: &GeneratorSettings,
    ) -> Result<GeneratedFile> {
        let document = match source {
            DocumentSource::Location(location) => {
                debug!("Generating from document at {}", location);
                self.resolver.load(&location).await?
            }
            DocumentSource::Producer(producer) => {
                debug!("Generating from produced document");
                let document = producer.produce().await?;
                self.resolver.resolve(document).await?
            }
        };
        self.generate(&document, settings)
    }

    /// Generate one file from a resolved document
    pub fn generate(&self, document: &Document, settings: &GeneratorSettings) -> Result<GeneratedFile> {
        if !self.binder.supports(settings.language) {
            return Err(Error::config(format!(
                "No binder registered for {}",
                settings.language.display_name()
            )));
        }

        let model = builder::build(document, settings)?;
        let content = self.binder.bind(&model, settings)?;

        let stem = match document.info.title.to_pascal_case() {
            title if title.is_empty() => "Generated".to_string(),
            title => title,
        };
        let name = format!("{stem}.{}", settings.language.file_extension());
        info!(
            "Generated {} ({} bytes, {} types)",
            name,
            content.len(),
            model.types.len()
        );

        Ok(GeneratedFile {
            name,
            language: settings.language,
            content,
        })
    }
}
