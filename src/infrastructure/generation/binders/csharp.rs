//! C# binder: ASP.NET controllers and DTO classes

use std::sync::Arc;

use serde_json::{Value as JsonValue, json};
use tracing::debug;

use crate::core::error::Result;
use crate::generation::naming::{UniqueNames, csharp_identifier, to_pascal_identifier};
use crate::generation::sanitizers::{doc_lines, escape_string_literal, escape_xml};
use crate::generation::{
    CSharpOutput, ControllerDescriptor, ControllerStyle, ControllerTarget, DeclarationKind,
    GenerationModel, GeneratorSettings, Language, LanguageBinder, OperationDescriptor,
    ParameterDescriptor, ParameterSource, Primitive, TypeDeclaration, TypeRef,
};
use crate::infrastructure::generation::template_renderer::{RenderContext, TeraTemplateRenderer};

use super::CSharpClientBinder;

pub(super) const CANCELLATION_TOKEN: &str = "System.Threading.CancellationToken";

/// Emits one C# file with controllers, DTOs and, for classic ASP.NET, the
/// custom `FromHeader` binding. Client output is handed to [`CSharpClientBinder`].
pub struct CSharpBinder {
    renderer: Arc<TeraTemplateRenderer>,
    client: CSharpClientBinder,
}

impl CSharpBinder {
    pub fn new(renderer: Arc<TeraTemplateRenderer>) -> Self {
        Self {
            client: CSharpClientBinder::new(renderer.clone()),
            renderer,
        }
    }

    fn render(&self, template: &str, context: &RenderContext) -> Result<String> {
        let rendered = self.renderer.render(template, context)?;
        Ok(rendered.trim_matches('\n').to_string())
    }
}

impl LanguageBinder for CSharpBinder {
    fn supports(&self, language: Language) -> bool {
        language == Language::CSharp
    }

    fn bind(&self, model: &GenerationModel, settings: &GeneratorSettings) -> Result<String> {
        if settings.csharp_output == CSharpOutput::Client {
            return self.client.bind(model, settings);
        }
        let dialect = Dialect { settings };
        let version = json!(env!("CARGO_PKG_VERSION"));

        let mut controllers = Vec::new();
        for controller in &model.controllers {
            let mut context = RenderContext::new();
            context.add_variable("generator_version", version.clone());
            context.add_variable(
                "is_abstract",
                json!(settings.controller_style == ControllerStyle::Abstract),
            );
            context.add_variable("controller", dialect.controller(controller));
            controllers.push(self.render("csharp/controller.cs", &context)?);
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

        let needs_from_header = settings.controller_target == ControllerTarget::AspNet
            && model
                .operations()
                .any(|operation| operation.parameters_from(ParameterSource::Header).next().is_some());
        let from_header = if needs_from_header {
            let mut context = RenderContext::new();
            context.add_variable("generator_version", version.clone());
            self.render("csharp/from_header.cs", &context)?
        } else {
            String::new()
        };

        debug!(
            "Binding {} controllers and {} types to C#",
            controllers.len(),
            types.len()
        );

        let mut context = RenderContext::new();
        context.add_variable("generator_version", version);
        context.add_variable("namespace", json!(settings.namespace));
        context.add_variable("controllers", json!(controllers));
        context.add_variable("types", json!(types));
        context.add_variable("support", json!(from_header));
        self.renderer.render("csharp/file.cs", &context)
    }
}

/// Target-framework specific spelling of types and attributes
pub(super) struct Dialect<'a> {
    pub(super) settings: &'a GeneratorSettings,
}

impl Dialect<'_> {
    fn is_core(&self) -> bool {
        self.settings.controller_target == ControllerTarget::AspNetCore
    }

    fn mvc(&self) -> &'static str {
        self.settings.controller_target.mvc_namespace()
    }

    fn type_name(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Primitive { primitive } => primitive_name(*primitive).to_string(),
            TypeRef::Array { item } => format!(
                "System.Collections.Generic.ICollection<{}>",
                self.type_name(item)
            ),
            TypeRef::Map { value } => format!(
                "System.Collections.Generic.IDictionary<string, {}>",
                self.type_name(value)
            ),
            TypeRef::Named { name, .. } => name.clone(),
            TypeRef::Any => "object".to_string(),
        }
    }

    pub(super) fn type_use(&self, ty: &TypeRef, nullable: bool) -> String {
        let name = self.type_name(ty);
        if nullable && ty.is_value_type() {
            format!("{name}?")
        } else {
            name
        }
    }

    fn return_type(&self, operation: &OperationDescriptor) -> String {
        let body = operation.result.as_ref().map(|result| {
            if result.ty.is_file() {
                match self.is_core() {
                    true => "Microsoft.AspNetCore.Mvc.FileResult".to_string(),
                    false => "System.Net.Http.HttpResponseMessage".to_string(),
                }
            } else {
                self.type_use(&result.ty, result.nullable)
            }
        });
        match (self.is_core(), body) {
            (true, Some(body)) => format!(
                "System.Threading.Tasks.Task<Microsoft.AspNetCore.Mvc.ActionResult<{body}>>"
            ),
            (true, None) => {
                "System.Threading.Tasks.Task<Microsoft.AspNetCore.Mvc.IActionResult>".to_string()
            }
            (false, Some(body)) => format!("System.Threading.Tasks.Task<{body}>"),
            (false, None) => "System.Threading.Tasks.Task".to_string(),
        }
    }

    fn http_attribute(&self, operation: &OperationDescriptor) -> String {
        let verb = match operation.http_method.as_str() {
            "get" => "HttpGet",
            "put" => "HttpPut",
            "post" => "HttpPost",
            "delete" => "HttpDelete",
            "options" => "HttpOptions",
            "head" => "HttpHead",
            "patch" => "HttpPatch",
            other => {
                return format!(
                    "{}.AcceptVerbs(\"{}\")",
                    self.mvc(),
                    other.to_uppercase()
                );
            }
        };
        format!("{}.{verb}", self.mvc())
    }

    fn route_attribute(&self, operation: &OperationDescriptor) -> String {
        let route = escape_string_literal(&operation.route);
        match &operation.route_name {
            Some(name) => format!(
                "{}.Route(\"{route}\", Name = \"{}\")",
                self.mvc(),
                escape_string_literal(name)
            ),
            None => format!("{}.Route(\"{route}\")", self.mvc()),
        }
    }

    /// Binding attributes placed before a controller parameter
    fn binding_attributes(&self, parameter: &ParameterDescriptor, name: &str) -> Vec<String> {
        let rename = |attribute: String| {
            if parameter.wire_name == name {
                attribute
            } else {
                format!(
                    "{attribute}(Name = \"{}\")",
                    escape_string_literal(&parameter.wire_name)
                )
            }
        };
        let mut attributes = Vec::new();
        let source = match (parameter.source, self.is_core()) {
            (ParameterSource::Query, true) => Some(rename("Microsoft.AspNetCore.Mvc.FromQuery".into())),
            (ParameterSource::Query, false) => Some(rename("System.Web.Http.FromUri".into())),
            (ParameterSource::Header, true) => {
                Some(rename("Microsoft.AspNetCore.Mvc.FromHeader".into()))
            }
            (ParameterSource::Header, false) => Some(rename("FromHeader".into())),
            (ParameterSource::Body, true) => Some("Microsoft.AspNetCore.Mvc.FromBody".into()),
            (ParameterSource::Body, false) => Some("System.Web.Http.FromBody".into()),
            (ParameterSource::Form, true) => Some(rename("Microsoft.AspNetCore.Mvc.FromForm".into())),
            (ParameterSource::Path, true) if parameter.wire_name != name => {
                Some(rename("Microsoft.AspNetCore.Mvc.FromRoute".into()))
            }
            _ => None,
        };
        attributes.extend(source);
        if self.settings.generate_model_validation_attributes
            && parameter.required
            && self.is_core()
        {
            attributes.push("Microsoft.AspNetCore.Mvc.ModelBinding.BindRequired".to_string());
        }
        attributes
    }

    fn parameter_type(&self, parameter: &ParameterDescriptor) -> String {
        match parameter.source {
            ParameterSource::Cancellation => CANCELLATION_TOKEN.to_string(),
            _ if parameter.ty.is_file() => match self.is_core() {
                true => "Microsoft.AspNetCore.Http.IFormFile".to_string(),
                false => "System.IO.Stream".to_string(),
            },
            _ => self.type_use(&parameter.ty, parameter.nullable || parameter.optional),
        }
    }

    fn operation(&self, operation: &OperationDescriptor) -> JsonValue {
        let mut declared = Vec::new();
        let mut plain = Vec::new();
        let mut arguments = Vec::new();
        for parameter in &operation.parameters {
            let name = csharp_identifier(&parameter.name);
            let default = match (parameter.optional, parameter.source) {
                (false, _) => String::new(),
                (true, ParameterSource::Cancellation) => {
                    format!(" = default({CANCELLATION_TOKEN})")
                }
                (true, _) => " = null".to_string(),
            };
            let declaration = format!("{} {name}{default}", self.parameter_type(parameter));
            let attributes: String = self
                .binding_attributes(parameter, &parameter.name)
                .iter()
                .map(|attribute| format!("[{attribute}] "))
                .collect();
            declared.push(format!("{attributes}{declaration}"));
            plain.push(declaration);
            arguments.push(name);
        }

        json!({
            "method_name": operation.method_name,
            "doc": xml_doc(operation.summary.as_deref(), operation.description.as_deref()),
            "deprecated": operation.deprecated,
            "http_attribute": self.http_attribute(operation),
            "route_attribute": self.route_attribute(operation),
            "return_type": self.return_type(operation),
            "parameters": declared.join(", "),
            "plain_parameters": plain.join(", "),
            "arguments": arguments.join(", "),
        })
    }

    fn controller(&self, controller: &ControllerDescriptor) -> JsonValue {
        let base_class = match self.is_core() {
            true => "Microsoft.AspNetCore.Mvc.ControllerBase",
            false => "System.Web.Http.ApiController",
        };
        let operations: Vec<JsonValue> = controller
            .operations
            .iter()
            .map(|operation| self.operation(operation))
            .collect();
        json!({
            "class_name": controller.class_name,
            "interface_name": format!("I{}", controller.class_name),
            "base_class": base_class,
            "operations": operations,
        })
    }

    pub(super) fn declaration(&self, declaration: &TypeDeclaration) -> JsonValue {
        let doc = xml_doc(declaration.description.as_deref(), None);
        match &declaration.kind {
            DeclarationKind::Enum { primitive, members } => {
                let is_string = !matches!(primitive, Primitive::Integer | Primitive::Long);
                let members: Vec<JsonValue> = members
                    .iter()
                    .enumerate()
                    .map(|(index, member)| {
                        let (value, attribute) = match (&member.value, is_string) {
                            (JsonValue::Number(number), false) => (number.to_string(), None),
                            (JsonValue::String(text), true) => (
                                index.to_string(),
                                Some(format!(
                                    "System.Runtime.Serialization.EnumMember(Value = @\"{}\")",
                                    text.replace('"', "\"\"")
                                )),
                            ),
                            (other, _) => (
                                index.to_string(),
                                Some(format!(
                                    "System.Runtime.Serialization.EnumMember(Value = @\"{}\")",
                                    other.to_string().replace('"', "\"\"")
                                )),
                            ),
                        };
                        json!({"name": member.name, "value": value, "attribute": attribute})
                    })
                    .collect();
                json!({
                    "kind": "enum",
                    "name": declaration.name,
                    "doc": doc,
                    "underlying": if *primitive == Primitive::Long { " : long" } else { "" },
                    "members": members,
                })
            }
            DeclarationKind::Class { base, properties } => {
                let mut names = UniqueNames::new();
                names.claim(&declaration.name);
                let properties: Vec<JsonValue> = properties
                    .iter()
                    .map(|property| {
                        let name = names.claim(&match to_pascal_identifier(&property.wire_name) {
                            name if name.is_empty() => "Property".to_string(),
                            name => name,
                        });
                        let wire_name = escape_string_literal(&property.wire_name);
                        let mut attributes = vec![match self.is_core() {
                            true => format!(
                                "System.Text.Json.Serialization.JsonPropertyName(\"{wire_name}\")"
                            ),
                            false => format!("Newtonsoft.Json.JsonProperty(\"{wire_name}\")"),
                        }];
                        if property.required {
                            attributes
                                .push("System.ComponentModel.DataAnnotations.Required".to_string());
                        }
                        let ty = match &property.ty {
                            TypeRef::Primitive {
                                primitive: Primitive::File,
                            } => "byte[]".to_string(),
                            other => self.type_use(other, property.nullable),
                        };
                        json!({
                            "name": name,
                            "type": ty,
                            "doc": xml_doc(property.description.as_deref(), None),
                            "attributes": attributes,
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
}

fn primitive_name(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::String => "string",
        Primitive::Integer => "int",
        Primitive::Long => "long",
        Primitive::Number => "double",
        Primitive::Float => "float",
        Primitive::Decimal => "decimal",
        Primitive::Boolean => "bool",
        Primitive::DateTime => "System.DateTimeOffset",
        Primitive::Date => "System.DateTime",
        Primitive::Uuid => "System.Guid",
        Primitive::Bytes | Primitive::File => "byte[]",
    }
}

/// `<summary>` and `<remarks>` lines of an XML doc comment
pub(super) fn xml_doc(summary: Option<&str>, remarks: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    for (tag, text) in [("summary", summary), ("remarks", remarks)] {
        let body = text.map(|text| doc_lines(&escape_xml(text))).unwrap_or_default();
        if !body.is_empty() {
            lines.push(format!("<{tag}>"));
            lines.extend(body);
            lines.push(format!("</{tag}>"));
        }
    }
    lines
}
