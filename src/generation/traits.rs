//! Port interfaces for the generation domain

use async_trait::async_trait;

use crate::core::error::Result;
use crate::generation::descriptors::GenerationModel;
use crate::generation::settings::GeneratorSettings;
use crate::generation::types::Language;
use crate::model::Document;

/// Produces a document from something other than document text, such as
/// a reflected description of a running API
#[async_trait]
pub trait DocumentProducer: Send + Sync {
    async fn produce(&self) -> Result<Document>;
}

/// Renders a generation model into the source text of one language
pub trait LanguageBinder: Send + Sync {
    /// Whether this binder emits `language`
    fn supports(&self, language: Language) -> bool;

    /// Render the whole model into one file body
    fn bind(&self, model: &GenerationModel, settings: &GeneratorSettings) -> Result<String>;
}
