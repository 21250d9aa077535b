//! HTTP-based document loader

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::core::error::{Error, Result};
use crate::resolution::source::{LoaderOptions, SourceLoader, decode};

/// Loads documents from HTTP/HTTPS URLs
pub struct HttpLoader {
    client: Client,
}

impl HttpLoader {
    pub fn new(options: &LoaderOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout())
            .user_agent(options.user_agent.as_str())
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl SourceLoader for HttpLoader {
    async fn load(&self, location: &str) -> Result<Value> {
        if !location.starts_with("http://") && !location.starts_with("https://") {
            return Err(Error::load(
                location,
                "HttpLoader only handles HTTP(S) URLs",
            ));
        }

        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| Error::load(location, format!("Failed to fetch: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::load(location, format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let content = response
            .text()
            .await
            .map_err(|e| Error::load(location, format!("Failed to read response body: {e}")))?;

        // the url extension decides when the server sends a generic type
        let hint = if content_type.contains("json") || content_type.contains("yaml") {
            Some(content_type.as_str())
        } else {
            location.rsplit('.').next()
        };
        decode(location, &content, hint)
    }
}
