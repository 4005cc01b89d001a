// src/llm/image.rs

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::ProviderError;

/// Client for an OpenAI-compatible image-generations endpoint.
pub struct ImageClient {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

impl ImageClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: HttpClient::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// POST /images/generations. Returns the URL of the first generated
    /// image; a 2xx response without one is a `MissingImageUrl` error.
    pub async fn generate(&self, request: &ImageRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("(failed to read body: {})", e));
            return Err(ProviderError::Status { status, body });
        }

        let result: ImageResponse = response.json().await?;
        result
            .data
            .first()
            .and_then(|image| image.url.clone())
            .ok_or(ProviderError::MissingImageUrl)
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<GeneratedImageData>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImageData {
    url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = ImageRequest {
            model: "flux-1.1-pro".to_string(),
            prompt: "кот".to_string(),
            n: 1,
            size: "1024x1024".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({ "model": "flux-1.1-pro", "prompt": "кот", "n": 1, "size": "1024x1024" })
        );
    }

    #[test]
    fn test_response_parses_url() {
        let raw = json!({ "data": [{ "url": "http://x/y.png" }] });
        let parsed: ImageResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.data[0].url.as_deref(), Some("http://x/y.png"));
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let parsed: ImageResponse = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.data.is_empty());

        let parsed: ImageResponse = serde_json::from_value(json!({ "data": [{}] })).unwrap();
        assert!(parsed.data[0].url.is_none());
    }
}
