//! C# client binder: `HttpClient` based clients sharing the DTOs of the
//! controller output

use std::sync::Arc;

use serde_json::{Value as JsonValue, json};
use tracing::debug;

use crate::core::error::Result;
use crate::generation::builder::CANCELLATION_PARAMETER;
use crate::generation::naming::{UniqueNames, csharp_identifier};
use crate::generation::sanitizers::escape_string_literal;
use crate::generation::{
    ControllerDescriptor, GenerationModel, GeneratorSettings, Language, LanguageBinder,
    OperationDescriptor, ParameterDescriptor, ParameterSource, TypeRef,
};
use crate::infrastructure::generation::template_renderer::{RenderContext, TeraTemplateRenderer};

use super::csharp::{CANCELLATION_TOKEN, Dialect, xml_doc};

const URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Emits one C# file with a client class per controller. Every client method
/// ends with a defaulted `CancellationToken`.
pub struct CSharpClientBinder {
    renderer: Arc<TeraTemplateRenderer>,
}

impl CSharpClientBinder {
    pub fn new(renderer: Arc<TeraTemplateRenderer>) -> Self {
        Self { renderer }
    }

    fn render(&self, template: &str, context: &RenderContext) -> Result<String> {
        let rendered = self.renderer.render(template, context)?;
        Ok(rendered.trim_matches('\n').to_string())
    }
}

impl LanguageBinder for CSharpClientBinder {
    fn supports(&self, language: Language) -> bool {
        language == Language::CSharp
    }

    fn bind(&self, model: &GenerationModel, settings: &GeneratorSettings) -> Result<String> {
        let dialect = Dialect { settings };
        let version = json!(env!("CARGO_PKG_VERSION"));
        let base_url = escape_string_literal(model.base_url.as_deref().unwrap_or_default());

        let mut clients = Vec::new();
        for controller in &model.controllers {
            let mut context = RenderContext::new();
            context.add_variable("generator_version", version.clone());
            context.add_variable("interfaces", json!(settings.generate_client_interfaces));
            context.add_variable("base_url", json!(base_url));
            context.add_variable("client", client(&dialect, controller));
            clients.push(self.render("csharp/client.cs", &context)?);
        }

        let mut types = Vec::new();
        if settings.generate_dto_types {
            for declaration in &model.types {
                let mut context = RenderContext::new();
                context.add_variable("generator_version", version.clone());
                context.add_variable("declaration", dialect.declaration(declaration));
                types.push(self.render("csharp/dto.cs", &context)?);
            }
        }

        let uses_file_parameter = model
            .operations()
            .flat_map(|operation| operation.parameters.iter())
            .any(|parameter| parameter.ty.is_file());
        let mut context = RenderContext::new();
        context.add_variable("generator_version", version.clone());
        context.add_variable("uses_file_parameter", json!(uses_file_parameter));
        let support = self.render("csharp/client_support.cs", &context)?;

        debug!(
            "Binding {} clients and {} types to C#",
            clients.len(),
            types.len()
        );

        let mut context = RenderContext::new();
        context.add_variable("generator_version", version);
        context.add_variable("namespace", json!(settings.namespace));
        context.add_variable("controllers", json!(clients));
        context.add_variable("types", json!(types));
        context.add_variable("support", json!(support));
        self.renderer.render("csharp/file.cs", &context)
    }
}

fn parameter_entry(parameter: &ParameterDescriptor) -> JsonValue {
    json!({
        "name": csharp_identifier(&parameter.name),
        "wire_name": escape_string_literal(&parameter.wire_name),
        "placeholder": escape_string_literal(&format!("{{{}}}", parameter.wire_name)),
        "is_array": matches!(parameter.ty, TypeRef::Array { .. }),
        "is_file": parameter.ty.is_file(),
    })
}

fn operation_context(dialect: &Dialect<'_>, operation: &OperationDescriptor) -> JsonValue {
    let mut declared = Vec::new();
    let mut token = None;
    let mut names = UniqueNames::new();
    for parameter in &operation.parameters {
        let name = csharp_identifier(&parameter.name);
        names.claim(&name);
        if parameter.source == ParameterSource::Cancellation {
            token = Some(name);
            continue;
        }
        let ty = match parameter.ty.is_file() {
            true => "FileParameter".to_string(),
            false => dialect.type_use(&parameter.ty, parameter.nullable || parameter.optional),
        };
        let default = if parameter.optional { " = null" } else { "" };
        declared.push(format!("{ty} {name}{default}"));
    }
    let token = token.unwrap_or_else(|| names.claim(CANCELLATION_PARAMETER));
    declared.push(format!(
        "{CANCELLATION_TOKEN} {token} = default({CANCELLATION_TOKEN})"
    ));

    let form: Vec<&ParameterDescriptor> = operation.parameters_from(ParameterSource::Form).collect();
    let body_parameter = operation.parameters_from(ParameterSource::Body).next();
    let (body, media) = match (body_parameter, form.is_empty()) {
        (Some(body), _) if body.ty.is_file() => (
            "binary",
            operation
                .consumes
                .first()
                .map(String::as_str)
                .unwrap_or("application/octet-stream"),
        ),
        (Some(_), _) => (
            "json",
            operation
                .consumes
                .iter()
                .find(|media| media.contains("json"))
                .map(String::as_str)
                .unwrap_or("application/json"),
        ),
        (None, false) => {
            let url_encoded = operation.consumes.iter().any(|media| media == URL_ENCODED)
                && !form.iter().any(|parameter| parameter.ty.is_file());
            match url_encoded {
                true => ("url_encoded", URL_ENCODED),
                false => ("multipart", "multipart/form-data"),
            }
        }
        (None, true) => ("", ""),
    };

    let (return_type, result_kind, accept) = match &operation.result {
        Some(result) if result.ty.is_file() => (
            "System.Threading.Tasks.Task<byte[]>".to_string(),
            "file",
            operation
                .produces
                .first()
                .map(String::as_str)
                .unwrap_or("application/octet-stream"),
        ),
        Some(result) => (
            format!(
                "System.Threading.Tasks.Task<{}>",
                dialect.type_use(&result.ty, result.nullable)
            ),
            "json",
            operation
                .produces
                .iter()
                .find(|media| media.contains("json"))
                .map(String::as_str)
                .unwrap_or("application/json"),
        ),
        None => ("System.Threading.Tasks.Task".to_string(), "none", ""),
    };
    let result_type = operation
        .result
        .as_ref()
        .map(|result| dialect.type_use(&result.ty, result.nullable));

    json!({
        "method_name": operation.method_name,
        "doc": xml_doc(operation.summary.as_deref(), operation.description.as_deref()),
        "deprecated": operation.deprecated,
        "parameters": declared.join(", "),
        "token": token,
        "method": operation.http_method.to_uppercase(),
        "path": escape_string_literal(operation.path.trim_start_matches('/')),
        "path_parameters": operation.parameters_from(ParameterSource::Path).map(parameter_entry).collect::<Vec<_>>(),
        "query_parameters": operation.parameters_from(ParameterSource::Query).map(parameter_entry).collect::<Vec<_>>(),
        "header_parameters": operation.parameters_from(ParameterSource::Header).map(parameter_entry).collect::<Vec<_>>(),
        "form_parameters": form.iter().map(|parameter| parameter_entry(parameter)).collect::<Vec<_>>(),
        "body": body,
        "media": escape_string_literal(media),
        "body_parameter": body_parameter.map(|parameter| csharp_identifier(&parameter.name)),
        "return_type": return_type,
        "result_type": result_type,
        "result_kind": result_kind,
        "accept": escape_string_literal(accept),
    })
}

fn client(dialect: &Dialect<'_>, controller: &ControllerDescriptor) -> JsonValue {
    let operations: Vec<JsonValue> = controller
        .operations
        .iter()
        .map(|operation| operation_context(dialect, operation))
        .collect();
    json!({
        "class_name": controller.class_name,
        "interface_name": format!("I{}", controller.class_name),
        "operations": operations,
    })
}
