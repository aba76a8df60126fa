use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use super::PipelineError;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub temp_dir: PathBuf,
    pub merged_file_name: String,
    pub pre_webhook_timeout: Duration,
    pub document_timeout: Duration,
    pub signed_url_expiry: Duration,
    pub public_base_url: String,
    pub webhook_token: String,
}

impl PipelineOptions {
    /// Webhook address handed to the transcription provider, with the token
    /// as an encoded query parameter.
    pub fn callback_url(&self) -> Result<String, PipelineError> {
        let base = self.public_base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/assemblyai-webhook", base))
            .map_err(|e| PipelineError::InvalidCallbackUrl(format!("{}: {}", base, e)))?;
        url.query_pairs_mut().append_pair("token", &self.webhook_token);
        Ok(url.into())
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join("scribe-pipeline"),
            merged_file_name: "full.wav".to_string(),
            pre_webhook_timeout: Duration::from_secs(600),
            document_timeout: Duration::from_secs(60),
            signed_url_expiry: Duration::from_secs(3600),
            public_base_url: "http://localhost:3000".to_string(),
            webhook_token: String::new(),
        }
    }
}
