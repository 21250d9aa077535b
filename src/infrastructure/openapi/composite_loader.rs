//! Loader that picks a transport from the location

use async_trait::async_trait;
use serde_json::Value;

use super::{FileLoader, HttpLoader};
use crate::core::error::Result;
use crate::resolution::source::{LoaderOptions, SourceLoader};

/// Sends urls to the HTTP loader and everything else to the file loader
pub struct CompositeLoader {
    http: HttpLoader,
    file: FileLoader,
}

impl CompositeLoader {
    pub fn new(options: &LoaderOptions) -> Result<Self> {
        Ok(Self {
            http: HttpLoader::new(options)?,
            file: FileLoader::new(),
        })
    }
}

#[async_trait]
impl SourceLoader for CompositeLoader {
    async fn load(&self, location: &str) -> Result<Value> {
        tracing::debug!("CompositeLoader: Loading from source: {location}");

        if location.starts_with("http://") || location.starts_with("https://") {
            tracing::debug!("CompositeLoader: Using HTTP loader");
            self.http.load(location).await
        } else {
            tracing::debug!("CompositeLoader: Using file loader");
            self.file.load(location).await
        }
    }
}
