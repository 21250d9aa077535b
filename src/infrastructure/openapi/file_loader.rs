//! File-based document loader

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs;
use url::Url;

use crate::core::error::{Error, Result};
use crate::resolution::source::{SourceLoader, decode};

/// Loads documents from local files
pub struct FileLoader;

impl FileLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceLoader for FileLoader {
    async fn load(&self, location: &str) -> Result<Value> {
        let path = if location.starts_with("file://") {
            Url::parse(location)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| Error::load(location, "invalid file url"))?
        } else {
            PathBuf::from(location)
        };

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| Error::load(location, format!("Failed to read file: {e}")))?;

        let hint = path.extension().and_then(|extension| extension.to_str());
        decode(location, &content, hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_file_loader_reads_yaml_by_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(b"swagger: '2.0'\ninfo:\n  title: Pets\n  version: '1'\npaths: {}\n")
            .expect("Failed to write temp file");

        let value = FileLoader::new()
            .load(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(value["info"]["title"], "Pets");
    }

    #[tokio::test]
    async fn test_file_loader_accepts_file_urls() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(br#"{"openapi": "3.0.0"}"#)
            .expect("Failed to write temp file");
        let url = Url::from_file_path(file.path()).unwrap();

        let value = FileLoader::new().load(url.as_str()).await.unwrap();
        assert_eq!(value["openapi"], "3.0.0");
    }

    #[tokio::test]
    async fn test_file_loader_not_found() {
        let result = FileLoader::new().load("/nonexistent/file.yaml").await;
        assert!(matches!(result, Err(Error::Load { .. })));
    }
}
