//! Generator configuration
//!
//! Settings are plain serde data so they can come from a TOML file, a JSON
//! blob or be built in code. Every field has a default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Error, Result};
use crate::generation::Language;

/// Shape of generated ASP.NET controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerStyle {
    /// Abstract base class with abstract actions
    Abstract,
    /// Partial class forwarding to an `I{Name}Controller` implementation
    #[default]
    Partial,
}

/// What the C# binder emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CSharpOutput {
    /// ASP.NET controllers for a server implementation
    #[default]
    Controllers,
    /// `HttpClient` based clients
    Client,
}

/// Whether route attributes carry a route name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteNaming {
    /// `Name = "{operationId}"`
    OperationId,
    #[default]
    None,
}

/// ASP.NET dialect for generated controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerTarget {
    /// Classic ASP.NET Web API
    AspNet,
    #[default]
    AspNetCore,
}

impl ControllerTarget {
    /// Namespace of the MVC attributes
    pub fn mvc_namespace(&self) -> &'static str {
        match self {
            ControllerTarget::AspNet => "System.Web.Http",
            ControllerTarget::AspNetCore => "Microsoft.AspNetCore.Mvc",
        }
    }
}

/// HTTP stack of generated TypeScript clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeScriptTemplate {
    /// `fetch` with an optional `AbortSignal`
    #[default]
    Fetch,
    /// An `AxiosInstance`; every call takes a trailing `CancelToken`
    Axios,
}

/// Nullability assumed for schemas that do not state it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    Null,
    NotNull,
    /// Leave the decision to format conventions
    #[default]
    Unset,
}

impl NullHandling {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            NullHandling::Null => Some(true),
            NullHandling::NotNull => Some(false),
            NullHandling::Unset => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub language: Language,
    pub csharp_output: CSharpOutput,
    pub controller_style: ControllerStyle,
    pub route_naming: RouteNaming,
    pub generate_optional_parameters: bool,
    pub generate_dto_types: bool,
    pub generate_model_validation_attributes: bool,
    pub controller_target: ControllerTarget,
    pub default_null_handling: NullHandling,
    /// Class name template; `{controller}` is replaced by the controller name
    pub class_name: String,
    pub namespace: String,
    /// Prefix TypeScript declarations with `export`
    pub export_types: bool,
    pub typescript_template: TypeScriptTemplate,
    pub generate_client_interfaces: bool,
    /// Append a cancellation parameter to every operation
    pub cancellation_parameter: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            language: Language::CSharp,
            csharp_output: CSharpOutput::default(),
            controller_style: ControllerStyle::default(),
            route_naming: RouteNaming::default(),
            generate_optional_parameters: false,
            generate_dto_types: true,
            generate_model_validation_attributes: false,
            controller_target: ControllerTarget::default(),
            default_null_handling: NullHandling::default(),
            class_name: String::new(),
            namespace: "GeneratedApi".to_string(),
            export_types: true,
            typescript_template: TypeScriptTemplate::default(),
            generate_client_interfaces: false,
            cancellation_parameter: false,
        }
    }
}

impl GeneratorSettings {
    /// Default settings for one target language
    pub fn for_language(language: Language) -> Self {
        Self {
            language,
            ..Default::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse generator settings: {e}")))
    }

    pub async fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!("Failed to read settings file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse generator settings: {e}")))
    }

    /// Class name for a controller/client group
    pub fn class_name_for(&self, controller: &str) -> String {
        let template = match (self.class_name.is_empty(), self.language, self.csharp_output) {
            (false, _, _) => self.class_name.as_str(),
            (true, Language::CSharp, CSharpOutput::Client) => "{controller}Client",
            (true, language, _) => language.default_class_name(),
        };
        template.replace("{controller}", controller)
    }
}
