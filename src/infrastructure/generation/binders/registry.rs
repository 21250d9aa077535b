//! Registry for language-specific binders

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::core::error::{Error, Result};
use crate::generation::{GenerationModel, GeneratorSettings, Language, LanguageBinder};
use crate::infrastructure::generation::template_renderer::TeraTemplateRenderer;

use super::{CSharpBinder, TypeScriptBinder};

/// Registry that manages language-specific binders
pub struct BinderRegistry {
    binders: HashMap<Language, Arc<dyn LanguageBinder>>,
}

impl BinderRegistry {
    /// Create a registry with the built-in C# and TypeScript binders
    pub fn new() -> Result<Self> {
        let renderer = Arc::new(TeraTemplateRenderer::new()?);
        let mut binders: HashMap<Language, Arc<dyn LanguageBinder>> = HashMap::new();
        binders.insert(
            Language::CSharp,
            Arc::new(CSharpBinder::new(renderer.clone())),
        );
        binders.insert(Language::TypeScript, Arc::new(TypeScriptBinder::new(renderer)));
        Ok(Self { binders })
    }

    /// Register a custom binder for a language
    pub fn register(&mut self, language: Language, binder: Arc<dyn LanguageBinder>) {
        self.binders.insert(language, binder);
    }

    pub fn get(&self, language: Language) -> Result<Arc<dyn LanguageBinder>> {
        self.binders
            .get(&language)
            .cloned()
            .ok_or_else(|| Error::config(format!("No binder registered for {language}")))
    }

    pub fn has_binder(&self, language: Language) -> bool {
        self.binders.contains_key(&language)
    }

    pub fn supported_languages(&self) -> Vec<Language> {
        self.binders.keys().copied().collect()
    }
}

/// Binder that delegates to the registered binder for the configured language
pub struct CompositeBinder {
    registry: Arc<BinderRegistry>,
}

impl CompositeBinder {
    pub fn new(registry: Arc<BinderRegistry>) -> Self {
        Self { registry }
    }

    /// Composite over the built-in binders
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(Arc::new(BinderRegistry::new()?)))
    }
}

impl LanguageBinder for CompositeBinder {
    fn supports(&self, language: Language) -> bool {
        self.registry.has_binder(language)
    }

    fn bind(&self, model: &GenerationModel, settings: &GeneratorSettings) -> Result<String> {
        debug!(
            "CompositeBinder selecting binder for language: {}, operations: {}",
            settings.language,
            model.operations().count()
        );
        let binder = self.registry.get(settings.language)?;
        binder.bind(model, settings)
    }
}
