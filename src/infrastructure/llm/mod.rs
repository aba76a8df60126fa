mod anthropic_client;
mod deepseek_client;
mod gemini_client;
mod llm_client_factory;
mod openai_client;
mod status_error;

use status_error::status_error;

pub use anthropic_client::AnthropicClient;
pub use deepseek_client::DeepSeekClient;
pub use gemini_client::GeminiClient;
pub use llm_client_factory::LlmClientFactory;
pub use openai_client::OpenAiClient;
