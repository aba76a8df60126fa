use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ports::LlmClient;
use crate::domain::AiProvider;

#[derive(Clone, Default)]
pub struct LlmClientRegistry {
    clients: HashMap<AiProvider, Arc<dyn LlmClient>>,
}

impl LlmClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: AiProvider, client: Arc<dyn LlmClient>) -> Self {
        self.register(provider, client);
        self
    }

    pub fn register(&mut self, provider: AiProvider, client: Arc<dyn LlmClient>) {
        self.clients.insert(provider, client);
    }

    pub fn get(&self, provider: AiProvider) -> Option<Arc<dyn LlmClient>> {
        self.clients.get(&provider).cloned()
    }

    pub fn providers(&self) -> Vec<AiProvider> {
        AiProvider::ALL
            .into_iter()
            .filter(|p| self.clients.contains_key(p))
            .collect()
    }
}
