//! Where external documents come from.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::core::error::{Error, Result};

/// Fetches and decodes one document
#[async_trait]
pub trait SourceLoader: Send + Sync {
    /// Load the document at `location`, a url or a file path
    async fn load(&self, location: &str) -> Result<Value>;
}

/// Settings for fetching documents over HTTP
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl LoaderOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Decodes fetched text; JSON when `hint` or the text itself says so, YAML otherwise
pub fn decode(location: &str, text: &str, hint: Option<&str>) -> Result<Value> {
    let json = match hint {
        Some(hint) if hint.contains("json") => true,
        Some(hint) if hint.contains("yaml") || hint.contains("yml") => false,
        _ => text.trim_start().starts_with('{'),
    };
    if json {
        serde_json::from_str(text)
            .map_err(|e| Error::load(location, format!("Failed to parse JSON: {e}")))
    } else {
        serde_yaml::from_str(text)
            .map_err(|e| Error::load(location, format!("Failed to parse YAML: {e}")))
    }
}

/// Absolute url of a document location, without fragment.
///
/// Anything that does not parse as a url is taken as a file path relative
/// to the working directory.
pub fn canonical_location(location: &str) -> Result<Url> {
    // a one-letter scheme is a windows drive letter
    let mut url = match Url::parse(location) {
        Ok(url) if url.scheme().len() > 1 => url,
        _ => {
            let path = std::path::absolute(Path::new(location))
                .map_err(|e| Error::load(location, e.to_string()))?;
            Url::from_file_path(&path)
                .map_err(|_| Error::load(location, "not an absolute file path"))?
        }
    };
    url.set_fragment(None);
    Ok(url)
}

/// Base url for relative references of a document without a location
pub fn working_directory() -> Result<Url> {
    let cwd = std::env::current_dir()?;
    Url::from_directory_path(&cwd)
        .map_err(|_| Error::load(cwd.display().to_string(), "not an absolute directory"))
}

/// Resolves the document part of a `$ref` against `base`
pub fn join(base: &Url, reference: &str) -> Result<Url> {
    let mut url = base
        .join(reference)
        .map_err(|e| Error::load(reference, format!("invalid reference location: {e}")))?;
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_relative_file() {
        let base = Url::parse("file:///specs/api/root.json").unwrap();
        let joined = join(&base, "../common/types.yaml").unwrap();
        assert_eq!(joined.as_str(), "file:///specs/common/types.yaml");
    }

    #[test]
    fn test_join_drops_fragment() {
        let base = Url::parse("https://example.com/api/root.json").unwrap();
        let joined = join(&base, "pets.json#/definitions/Pet").unwrap();
        assert_eq!(joined.as_str(), "https://example.com/api/pets.json");
    }

    #[test]
    fn test_canonical_location_of_url_and_path() {
        let url = canonical_location("https://example.com/a.json#/x").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a.json");

        let path = canonical_location("specs/api.json").unwrap();
        assert_eq!(path.scheme(), "file");
        assert!(path.path().ends_with("/specs/api.json"));
    }

    #[test]
    fn test_decode_by_hint_and_content() {
        let json = decode("a", r#"{"swagger": "2.0"}"#, None).unwrap();
        assert_eq!(json["swagger"], "2.0");

        let yaml = decode("a", "openapi: 3.0.0\n", Some("application/x-yaml")).unwrap();
        assert_eq!(yaml["openapi"], "3.0.0");

        let error = decode("broken.json", "{", Some("application/json")).unwrap_err();
        assert!(matches!(error, Error::Load { location, .. } if location == "broken.json"));
    }

    #[test]
    fn test_default_options() {
        let options = LoaderOptions::default();
        assert_eq!(options.timeout(), Duration::from_secs(30));
        assert!(options.user_agent.starts_with("swaggen/"));
    }
}
