use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{LlmClient, LlmClientError};

use super::status_error;

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    api_version: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        api_version: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://api.anthropic.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            api_version,
            max_tokens,
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        transcript: &str,
    ) -> Result<String, LlmClientError> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = MessagesRequest {
            model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: format!("{}\n\n{}", prompt, transcript),
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error("anthropic", response).await);
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(format!("body: {}", e)))?;
        let text = body
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        tracing::info!(model, chars = text.len(), "Anthropic generation completed");
        Ok(text)
    }
}
