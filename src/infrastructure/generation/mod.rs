//! Generation infrastructure implementations

pub mod binders;
pub mod template_renderer;

pub use binders::{
    BinderRegistry, CSharpBinder, CSharpClientBinder, CompositeBinder, TypeScriptBinder,
};
pub use template_renderer::{RenderContext, TeraTemplateRenderer};
