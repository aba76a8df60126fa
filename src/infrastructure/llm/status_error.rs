use reqwest::StatusCode;

use crate::application::ports::LlmClientError;

pub(super) async fn status_error(provider: &str, response: reqwest::Response) -> LlmClientError {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return LlmClientError::RateLimited;
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    LlmClientError::ApiRequestFailed(format!("{} status {}: {}", provider, status, body))
}
