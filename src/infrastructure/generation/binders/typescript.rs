//! TypeScript binder: fetch or axios clients and interfaces for the DTOs

use std::sync::Arc;

use serde_json::{Value as JsonValue, json};
use tracing::debug;

use crate::core::error::Result;
use crate::generation::naming::typescript_identifier;
use crate::generation::sanitizers::{doc_lines, escape_jsdoc, escape_string_literal};
use crate::generation::{
    ControllerDescriptor, DeclarationKind, GenerationModel, GeneratorSettings, Language,
    LanguageBinder, OperationDescriptor, ParameterDescriptor, ParameterSource, Primitive,
    TypeDeclaration, TypeRef, TypeScriptTemplate,
};
use crate::infrastructure::generation::template_renderer::{RenderContext, TeraTemplateRenderer};

const URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Emits one TypeScript module with a client class per controller
pub struct TypeScriptBinder {
    renderer: Arc<TeraTemplateRenderer>,
}

impl TypeScriptBinder {
    pub fn new(renderer: Arc<TeraTemplateRenderer>) -> Self {
        Self { renderer }
    }

    fn render(&self, template: &str, context: &RenderContext) -> Result<String> {
        let rendered = self.renderer.render(template, context)?;
        Ok(rendered.trim_matches('\n').to_string())
    }
}

impl LanguageBinder for TypeScriptBinder {
    fn supports(&self, language: Language) -> bool {
        language == Language::TypeScript
    }

    fn bind(&self, model: &GenerationModel, settings: &GeneratorSettings) -> Result<String> {
        let export = json!(if settings.export_types { "export " } else { "" });
        let base_url = model.base_url.as_deref().unwrap_or_default();
        let template = settings.typescript_template;
        let client_template = match template {
            TypeScriptTemplate::Fetch => "typescript/client.ts",
            TypeScriptTemplate::Axios => "typescript/axios_client.ts",
        };

        let mut clients = Vec::new();
        for controller in &model.controllers {
            let mut context = RenderContext::new();
            context.add_variable("export", export.clone());
            context.add_variable("interfaces", json!(settings.generate_client_interfaces));
            context.add_variable("base_url", json!(escape_string_literal(base_url)));
            context.add_variable("client", client(controller, template));
            clients.push(self.render(client_template, &context)?);
        }

        let mut types = Vec::new();
        if settings.generate_dto_types {
            for declaration in &model.types {
                let mut context = RenderContext::new();
                context.add_variable("export", export.clone());
                context.add_variable("declaration", declaration_context(declaration));
                types.push(self.render("typescript/types.ts", &context)?);
            }
        }

        let uses_file_parameter = model
            .operations()
            .flat_map(|operation| operation.parameters.iter())
            .any(|parameter| parameter.ty.is_file());

        debug!(
            "Binding {} {:?} clients and {} types to TypeScript",
            clients.len(),
            template,
            types.len()
        );

        let mut context = RenderContext::new();
        context.add_variable("generator_version", json!(env!("CARGO_PKG_VERSION")));
        context.add_variable("export", export);
        context.add_variable("axios", json!(template == TypeScriptTemplate::Axios));
        context.add_variable("clients", json!(clients));
        context.add_variable("types", json!(types));
        context.add_variable("uses_file_parameter", json!(uses_file_parameter));
        self.renderer.render("typescript/file.ts", &context)
    }
}

fn type_name(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive { primitive } => match primitive {
            Primitive::Integer
            | Primitive::Long
            | Primitive::Number
            | Primitive::Float
            | Primitive::Decimal => "number".to_string(),
            Primitive::Boolean => "boolean".to_string(),
            Primitive::File => "Blob".to_string(),
            _ => "string".to_string(),
        },
        TypeRef::Array { item } => match item.as_ref() {
            TypeRef::Array { .. } | TypeRef::Map { .. } => format!("({})[]", type_name(item)),
            _ => format!("{}[]", type_name(item)),
        },
        TypeRef::Map { value } => format!("{{ [key: string]: {}; }}", type_name(value)),
        TypeRef::Named { name, .. } => name.clone(),
        TypeRef::Any => "any".to_string(),
    }
}

/// Type of a use site: `| null` for nullable, `| undefined` when the value
/// may be left out
fn type_use(ty: &TypeRef, nullable: bool, omittable: bool) -> String {
    with_markers(type_name(ty), nullable, omittable)
}

fn with_markers(mut rendered: String, nullable: bool, omittable: bool) -> String {
    if nullable {
        rendered.push_str(" | null");
    }
    if omittable {
        rendered.push_str(" | undefined");
    }
    rendered
}

fn jsdoc(
    summary: Option<&str>,
    description: Option<&str>,
    parameters: &[&ParameterDescriptor],
) -> Vec<String> {
    let mut body: Vec<String> = Vec::new();
    for text in [summary, description].into_iter().flatten() {
        body.extend(doc_lines(&escape_jsdoc(text)));
    }
    for parameter in parameters {
        let optional = if parameter.required { "" } else { "(optional) " };
        let description = parameter
            .description
            .as_deref()
            .map(|text| doc_lines(&escape_jsdoc(text)).join(" "))
            .unwrap_or_default();
        let line = format!(
            "@param {} {optional}{description}",
            typescript_identifier(&parameter.name)
        );
        body.push(line.trim_end().to_string());
    }
    if body.is_empty() {
        return body;
    }
    let mut lines = vec!["/**".to_string()];
    lines.extend(body.into_iter().map(|line| format!(" * {line}")));
    lines.push(" */".to_string());
    lines
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn parameter_entry(parameter: &ParameterDescriptor) -> JsonValue {
    json!({
        "name": typescript_identifier(&parameter.name),
        "wire_name": escape_string_literal(&parameter.wire_name),
        "placeholder": escape_string_literal(&format!("{{{}}}", parameter.wire_name)),
        "is_array": matches!(parameter.ty, TypeRef::Array { .. }),
        "is_file": parameter.ty.is_file(),
    })
}

fn operation_context(operation: &OperationDescriptor, template: TypeScriptTemplate) -> JsonValue {
    let mut signature = Vec::new();
    let mut has_signal = false;
    for parameter in &operation.parameters {
        if parameter.source == ParameterSource::Cancellation {
            if template == TypeScriptTemplate::Fetch {
                signature.push("signal?: AbortSignal | undefined".to_string());
                has_signal = true;
            }
            continue;
        }
        let name = typescript_identifier(&parameter.name);
        let ty = match parameter.ty.is_file() {
            true => "FileParameter".to_string(),
            false => type_name(&parameter.ty),
        };
        let declared = match (parameter.optional, parameter.required) {
            (true, _) => format!("{name}?: {}", with_markers(ty, parameter.nullable, true)),
            (false, required) => {
                format!("{name}: {}", with_markers(ty, parameter.nullable, !required))
            }
        };
        signature.push(declared);
    }
    if template == TypeScriptTemplate::Axios {
        signature.push("cancelToken?: CancelToken | undefined".to_string());
    }

    let form: Vec<&ParameterDescriptor> = operation.parameters_from(ParameterSource::Form).collect();
    let body_parameter = operation.parameters_from(ParameterSource::Body).next();
    let mut headers = Vec::new();
    let body = match (body_parameter, form.is_empty()) {
        (Some(body), _) if body.ty.is_file() => {
            let media = operation
                .consumes
                .first()
                .map(String::as_str)
                .unwrap_or("application/octet-stream");
            headers.push(format!("\"Content-Type\": \"{}\"", escape_string_literal(media)));
            "binary"
        }
        (Some(_), _) => {
            let media = operation
                .consumes
                .iter()
                .find(|media| media.contains("json"))
                .map(String::as_str)
                .unwrap_or("application/json");
            headers.push(format!("\"Content-Type\": \"{}\"", escape_string_literal(media)));
            "json"
        }
        (None, false) => {
            let url_encoded = operation.consumes.iter().any(|media| media == URL_ENCODED)
                && !operation.consumes.iter().any(|media| media.starts_with("multipart/"))
                && !form.iter().any(|parameter| parameter.ty.is_file());
            if url_encoded {
                headers.push(format!("\"Content-Type\": \"{URL_ENCODED}\""));
                "url_encoded"
            } else {
                // the browser sets the multipart boundary
                "multipart"
            }
        }
        (None, true) => "",
    };

    for parameter in operation.parameters_from(ParameterSource::Header) {
        let name = typescript_identifier(&parameter.name);
        headers.push(format!(
            "\"{}\": {name} !== undefined && {name} !== null ? \"\" + {name} : \"\"",
            escape_string_literal(&parameter.wire_name)
        ));
    }

    let (result_type, result_kind) = match &operation.result {
        Some(result) if result.ty.is_file() => ("Blob".to_string(), "file"),
        Some(result) => (type_use(&result.ty, result.nullable, false), "json"),
        None => ("void".to_string(), "none"),
    };
    match result_kind {
        "json" => {
            let accept = operation
                .produces
                .iter()
                .find(|media| media.contains("json"))
                .map(String::as_str)
                .unwrap_or("application/json");
            headers.push(format!("\"Accept\": \"{}\"", escape_string_literal(accept)));
        }
        "file" => {
            let accept = operation
                .produces
                .first()
                .map(String::as_str)
                .unwrap_or("application/octet-stream");
            headers.push(format!("\"Accept\": \"{}\"", escape_string_literal(accept)));
        }
        _ => {}
    }

    let documented: Vec<&ParameterDescriptor> = operation
        .parameters
        .iter()
        .filter(|parameter| parameter.source != ParameterSource::Cancellation)
        .collect();

    json!({
        "name": lower_first(&operation.method_name),
        "process_name": operation.method_name,
        "doc": jsdoc(operation.summary.as_deref(), operation.description.as_deref(), &documented),
        "signature": signature.join(", "),
        "has_signal": has_signal,
        "method": operation.http_method.to_uppercase(),
        "path": escape_string_literal(&operation.path),
        "path_parameters": operation.parameters_from(ParameterSource::Path).map(parameter_entry).collect::<Vec<_>>(),
        "query_parameters": operation.parameters_from(ParameterSource::Query).map(parameter_entry).collect::<Vec<_>>(),
        "form_parameters": form.iter().map(|parameter| parameter_entry(parameter)).collect::<Vec<_>>(),
        "body": body,
        "body_parameter": body_parameter.map(|parameter| typescript_identifier(&parameter.name)),
        "headers": headers,
        "result_type": result_type,
        "result_kind": result_kind,
    })
}

fn client(controller: &ControllerDescriptor, template: TypeScriptTemplate) -> JsonValue {
    let operations: Vec<JsonValue> = controller
        .operations
        .iter()
        .map(|operation| operation_context(operation, template))
        .collect();
    json!({
        "class_name": controller.class_name,
        "interface_name": format!("I{}", controller.class_name),
        "operations": operations,
    })
}

fn declaration_context(declaration: &TypeDeclaration) -> JsonValue {
    let doc = jsdoc(declaration.description.as_deref(), None, &[]);
    match &declaration.kind {
        DeclarationKind::Enum { members, .. } => {
            let members: Vec<JsonValue> = members
                .iter()
                .map(|member| json!({"name": member.name, "value": member.value.to_string()}))
                .collect();
            json!({"kind": "enum", "name": declaration.name, "doc": doc, "members": members})
        }
        DeclarationKind::Class { base, properties } => {
            let properties: Vec<JsonValue> = properties
                .iter()
                .map(|property| {
                    let is_identifier = property
                        .wire_name
                        .starts_with(|ch: char| ch.is_alphabetic() || ch == '_' || ch == '$')
                        && property
                            .wire_name
                            .chars()
                            .all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$');
                    let name = match is_identifier {
                        true => property.wire_name.clone(),
                        false => format!("\"{}\"", escape_string_literal(&property.wire_name)),
                    };
                    json!({
                        "name": name,
                        "optional": !property.required,
                        "type": type_use(&property.ty, property.nullable, !property.required),
                        "doc": jsdoc(property.description.as_deref(), None, &[]),
                    })
                })
                .collect();
            json!({
                "kind": "class",
                "name": declaration.name,
                "doc": doc,
                "base": base,
                "properties": properties,
            })
        }
    }
}
