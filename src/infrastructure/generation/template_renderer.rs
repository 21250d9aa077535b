//! Tera-based template renderer
//!
//! Templates live under `templates/` at the crate root and are compiled into
//! the library, so binding never touches the filesystem.

use std::collections::HashMap;

use serde_json::Value as JsonValue;
use tera::{Context, Tera};
use tracing::debug;

use crate::core::error::Result;

const TEMPLATES: &[(&str, &str)] = &[
    (
        "csharp/file.cs",
        include_str!("../../../templates/csharp/file.cs.tera"),
    ),
    (
        "csharp/controller.cs",
        include_str!("../../../templates/csharp/controller.cs.tera"),
    ),
    (
        "csharp/dto.cs",
        include_str!("../../../templates/csharp/dto.cs.tera"),
    ),
    (
        "csharp/from_header.cs",
        include_str!("../../../templates/csharp/from_header.cs.tera"),
    ),
    (
        "csharp/client.cs",
        include_str!("../../../templates/csharp/client.cs.tera"),
    ),
    (
        "csharp/client_support.cs",
        include_str!("../../../templates/csharp/client_support.cs.tera"),
    ),
    (
        "typescript/file.ts",
        include_str!("../../../templates/typescript/file.ts.tera"),
    ),
    (
        "typescript/client.ts",
        include_str!("../../../templates/typescript/client.ts.tera"),
    ),
    (
        "typescript/axios_client.ts",
        include_str!("../../../templates/typescript/axios_client.ts.tera"),
    ),
    (
        "typescript/types.ts",
        include_str!("../../../templates/typescript/types.ts.tera"),
    ),
];

/// Variables handed to a template
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    variables: HashMap<String, JsonValue>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, key: &str, value: JsonValue) {
        self.variables.insert(key.to_string(), value);
    }

    fn to_tera_context(&self) -> Context {
        let mut context = Context::new();
        for (key, value) in &self.variables {
            context.insert(key, value);
        }
        context
    }
}

/// Renders the embedded templates
pub struct TeraTemplateRenderer {
    tera: Tera,
}

impl TeraTemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        // generated source is not markup
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        debug!("Loaded {} embedded templates", TEMPLATES.len());
        Ok(Self { tera })
    }

    /// Names of the available templates
    pub fn template_names(&self) -> Vec<&str> {
        self.tera.get_template_names().collect()
    }

    pub fn render(&self, template: &str, context: &RenderContext) -> Result<String> {
        debug!("Rendering template {}", template);
        Ok(self.tera.render(template, &context.to_tera_context())?)
    }
}
