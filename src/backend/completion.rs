//! Text-completion client (OpenAI-compatible chat completions).

use reqwest::Client;
use std::time::Duration;

use crate::backend::client::{classify_status, classify_transport};
use crate::backend::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::config::schema::CompletionConfig;
use crate::resilience::{CallError, CallResult};

pub const MISSING_COMPLETION_KEY_MESSAGE: &str = "OpenAI API key not configured";

#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl CompletionClient {
    /// Fails with an authentication error when no key is configured.
    pub fn new(config: &CompletionConfig) -> CallResult<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| CallError::authentication(MISSING_COMPLETION_KEY_MESSAGE))?
            .to_string();

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CallError::other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// One chat completion; returns the first choice's content.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> CallResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(classify_transport)?;
        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| CallError::malformed(format!("Malformed completion response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CallError::malformed("No response from completion model"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::ErrorKind;

    #[test]
    fn test_missing_key() {
        let err = CompletionClient::new(&CompletionConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.message(), MISSING_COMPLETION_KEY_MESSAGE);
    }

    #[test]
    fn test_endpoint() {
        let config = CompletionConfig {
            base_url: "http://127.0.0.1:1/v1/".into(),
            api_key: Some("sk-test".into()),
            ..CompletionConfig::default()
        };
        let client = CompletionClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:1/v1/chat/completions");
    }
}
