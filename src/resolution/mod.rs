//! Reference resolution.
//!
//! [`Resolver`] turns the pointer text of every `$ref` slot into a link to
//! the target node, pulling external documents in through a
//! [`SourceLoader`].

pub mod resolver;
pub mod source;

pub use resolver::Resolver;
pub use source::{LoaderOptions, SourceLoader};
