//! In-memory API document model.
//!
//! All schema, shared parameter, shared response and referenced path-item
//! nodes are owned by arenas on [`Document`]; `$ref` slots are non-owning
//! [`Reference`] links into those arenas.

pub mod arena;
pub mod document;
pub mod operation;
pub mod pointer;
pub mod reference;
pub mod schema;
pub mod security;

/// Open mapping of unmodeled keys to values, kept verbatim
pub type Extensions = indexmap::IndexMap<String, serde_json::Value>;

pub use arena::{Arena, Id};
pub use document::{
    Contact, Document, ExternalDocs, ExternalDocument, Info, License, SecurityRequirement, Server,
    ServerVariable, Tag, WireFormat,
};
pub use operation::{
    CollectionFormat, Header, HttpMethod, MediaType, Operation, Parameter, ParameterKind,
    ParameterStyle, PathItem, Response,
};
pub use reference::{Reference, ScopeId};
pub use schema::{AdditionalProperties, Discriminator, JsonType, Schema};
pub use security::{
    ApiKeyLocation, OAuth2Flow, OAuthFlow, OAuthFlows, SecurityScheme, SecuritySchemeType,
};
