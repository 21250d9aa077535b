//! Error handling for the swaggen library.
//!
//! This module defines the main error type `Error` used throughout the crate,
//! along with a convenient `Result` type alias. It uses `thiserror` and
//! implements conversions from the serialization errors the crate bubbles up.
//!
//! # Examples
//!
//! ```
//! use swaggen::core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::parse("unexpected token"))
//! }
//! assert!(might_fail().is_err());
//! ```

use thiserror::Error;

/// Result type for swaggen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for document loading, resolution and code generation
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input text or a document that does not match the object model
    #[error("Parse error: {0}")]
    Parse(String),

    /// A `$ref` pointer that does not resolve inside its target document
    #[error("Reference '{reference}' not found in {document}")]
    ReferenceNotFound { reference: String, document: String },

    /// An external resource could not be fetched or parsed
    #[error("Failed to load '{location}': {message}")]
    Load { location: String, message: String },

    /// A reference chain without a base case, found where an acyclic walk is required
    #[error("Reference cycle detected: {0}")]
    Cycle(String),

    /// A schema shape with no target-language mapping under the current settings
    #[error("Unsupported schema '{schema}': {reason}")]
    UnsupportedSchema { schema: String, reason: String },

    /// A feature that the chosen wire format cannot express and cannot downgrade
    #[error("{feature} cannot be represented in {format}")]
    FormatMismatch { feature: String, format: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template rendering error
    #[error("Render error: {0}")]
    Render(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new load error for `location`
    pub fn load<S: Into<String>, M: Into<String>>(location: S, message: M) -> Self {
        Self::Load {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a new reference-not-found error
    pub fn reference_not_found<R: Into<String>, D: Into<String>>(reference: R, document: D) -> Self {
        Self::ReferenceNotFound {
            reference: reference.into(),
            document: document.into(),
        }
    }

    /// Create a new unsupported-schema error naming the offending schema or operation
    pub fn unsupported_schema<S: Into<String>, R: Into<String>>(schema: S, reason: R) -> Self {
        Self::UnsupportedSchema {
            schema: schema.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(msg: S) -> Self {
        Self::Render(msg.into())
    }
}

impl From<tera::Error> for Error {
    fn from(e: tera::Error) -> Self {
        // tera nests the useful message in the source chain
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        Self::Render(message)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_parse_creation() {
        let error = Error::parse("unexpected end of input");
        assert!(matches!(error, Error::Parse(_)));
        assert_eq!(error.to_string(), "Parse error: unexpected end of input");
    }

    #[test]
    fn test_error_reference_not_found_names_both_sides() {
        let error = Error::reference_not_found("#/definitions/Missing", "<root>");
        assert_eq!(
            error.to_string(),
            "Reference '#/definitions/Missing' not found in <root>"
        );
    }

    #[test]
    fn test_error_unsupported_schema_names_schema() {
        let error = Error::unsupported_schema("Pet", "conflicting allOf members");
        assert!(error.to_string().contains("Pet"));
        assert!(error.to_string().contains("conflicting allOf members"));
    }

    #[test]
    fn test_error_load_creation() {
        let error = Error::load("https://example.com/api.json", "HTTP 404");
        assert!(matches!(error, Error::Load { .. }));
        assert!(error.to_string().contains("HTTP 404"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().contains("File not found"));
    }

    #[test]
    fn test_error_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let error: Error = toml_error.into();
        assert!(matches!(error, Error::Config(_)));
    }
}
