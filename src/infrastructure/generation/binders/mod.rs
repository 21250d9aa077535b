//! Language binders turning a generation model into source text

pub mod csharp;
pub mod csharp_client;
pub mod registry;
pub mod typescript;

pub use csharp::CSharpBinder;
pub use csharp_client::CSharpClientBinder;
pub use registry::{BinderRegistry, CompositeBinder};
pub use typescript::TypeScriptBinder;
