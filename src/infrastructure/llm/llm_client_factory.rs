use std::sync::Arc;

use crate::application::services::LlmClientRegistry;
use crate::domain::AiProvider;
use crate::presentation::config::LlmSettings;

use super::{AnthropicClient, DeepSeekClient, GeminiClient, OpenAiClient};

pub struct LlmClientFactory;

impl LlmClientFactory {
    /// Registers a client for every provider that has an API key configured.
    pub fn create(settings: &LlmSettings) -> LlmClientRegistry {
        let mut registry = LlmClientRegistry::new();

        if let Some(key) = configured_key(&settings.openai.api_key) {
            registry.register(
                AiProvider::OpenAi,
                Arc::new(OpenAiClient::new(
                    key,
                    settings.openai.base_url.clone(),
                    settings.max_tokens,
                )),
            );
        }
        if let Some(key) = configured_key(&settings.anthropic.api_key) {
            registry.register(
                AiProvider::Anthropic,
                Arc::new(AnthropicClient::new(
                    key,
                    settings.anthropic.base_url.clone(),
                    settings.anthropic_version.clone(),
                    settings.max_tokens,
                )),
            );
        }
        if let Some(key) = configured_key(&settings.deepseek.api_key) {
            registry.register(
                AiProvider::DeepSeek,
                Arc::new(DeepSeekClient::new(key, settings.deepseek.base_url.clone())),
            );
        }
        if let Some(key) = configured_key(&settings.gemini.api_key) {
            registry.register(
                AiProvider::Gemini,
                Arc::new(GeminiClient::new(key, settings.gemini.base_url.clone())),
            );
        }

        let providers: Vec<&str> = registry.providers().iter().map(|p| p.as_str()).collect();
        tracing::info!(providers = ?providers, "LLM clients configured");
        registry
    }
}

fn configured_key(key: &Option<String>) -> Option<String> {
    key.as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
}
