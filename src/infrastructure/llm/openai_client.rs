use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{LlmClient, LlmClientError};

use super::status_error;

/// Client for the OpenAI Responses API.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_output_tokens: u32,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: Option<String>, max_output_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://api.openai.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            max_output_tokens,
        }
    }
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    max_output_tokens: u32,
    input: Vec<InputMessage<'a>>,
}

#[derive(Serialize)]
struct InputMessage<'a> {
    role: &'static str,
    content: Vec<InputText<'a>>,
}

#[derive(Serialize)]
struct InputText<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Deserialize)]
struct OutputContent {
    text: Option<String>,
}

impl ResponsesResponse {
    fn into_text(self) -> String {
        if let Some(text) = self.output_text.filter(|t| !t.is_empty()) {
            return text;
        }
        self.output
            .into_iter()
            .next()
            .map(|item| {
                item.content
                    .into_iter()
                    .filter_map(|c| c.text)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        transcript: &str,
    ) -> Result<String, LlmClientError> {
        let url = format!("{}/v1/responses", self.base_url);
        let request = ResponsesRequest {
            model,
            max_output_tokens: self.max_output_tokens,
            input: vec![InputMessage {
                role: "user",
                content: vec![
                    InputText {
                        kind: "input_text",
                        text: prompt,
                    },
                    InputText {
                        kind: "input_text",
                        text: transcript,
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error("openai", response).await);
        }

        let body: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(format!("body: {}", e)))?;
        let text = body.into_text();

        tracing::info!(model, chars = text.len(), "OpenAI generation completed");
        Ok(text)
    }
}
