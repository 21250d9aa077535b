//! swaggen - Swagger 2.0 / OpenAPI 3 toolkit
//!
//! * [`model`]: format-agnostic document graph
//! * [`serialization`]: reading and writing both wire formats, JSON or YAML
//! * [`resolution`]: linking local and external `$ref`s
//! * [`generation`]: building a language-neutral model and binding it to
//!   C# controllers or a TypeScript client
//!
//! ```no_run
//! use std::sync::Arc;
//! use swaggen::generation::{DocumentSource, GenerationOrchestrator, GeneratorSettings, Language};
//! use swaggen::infrastructure::generation::CompositeBinder;
//! use swaggen::infrastructure::openapi::CompositeLoader;
//! use swaggen::resolution::{LoaderOptions, Resolver};
//!
//! # async fn run() -> swaggen::Result<()> {
//! let loader = CompositeLoader::new(&LoaderOptions::default())?;
//! let orchestrator = GenerationOrchestrator::new(
//!     Arc::new(Resolver::new(Arc::new(loader))),
//!     Arc::new(CompositeBinder::with_defaults()?),
//! );
//! let file = orchestrator
//!     .generate_from(
//!         DocumentSource::Location("petstore.yaml".to_string()),
//!         &GeneratorSettings::for_language(Language::TypeScript),
//!     )
//!     .await?;
//! println!("{}", file.content);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod core;
pub mod generation;
pub mod infrastructure;
pub mod model;
pub mod resolution;
pub mod serialization;

pub use core::error::{Error, Result};
