//! Hosted chat-completions client (OpenRouter-compatible).

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{ChatMessage, LlmError, LlmProvider};
use crate::config::HostedConfig;

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

impl ChatCompletion {
    /// `choices[0].message.content`
    pub fn into_content(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

pub struct OpenRouterClient {
    base_url: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl OpenRouterClient {
    /// Build from config, reading the key from its environment variable
    pub fn from_config(config: &HostedConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| LlmError::MissingCredential(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &HostedConfig, api_key: String) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        info!("OpenRouter client initialized for model '{}'", config.model);
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Map a non-success status; 429 is the distinguished rate limit
pub fn status_error(status: StatusCode) -> LlmError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        LlmError::RateLimited
    } else {
        LlmError::HttpStatus(status.as_u16())
    }
}

impl LlmProvider for OpenRouterClient {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    fn generate_response(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::user(prompt)],
        };
        debug!("POST {} ({} prompt bytes)", self.completions_url(), prompt.len());

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| LlmError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let err = status_error(status);
            if err != LlmError::RateLimited {
                error!("An error occurred with OpenRouter client: HTTP {}", status);
            }
            return Err(err);
        }

        let completion: ChatCompletion = response
            .json()
            .map_err(|e| LlmError::InvalidJson(format!("Failed to parse response: {}", e)))?;
        completion.into_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_error(StatusCode::TOO_MANY_REQUESTS), LlmError::RateLimited);
        assert_eq!(status_error(StatusCode::UNAUTHORIZED), LlmError::HttpStatus(401));
        assert_eq!(status_error(StatusCode::BAD_GATEWAY), LlmError::HttpStatus(502));
    }

    #[test]
    fn test_completion_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"<answer>2</answer>"}}]}"#;
        let completion: ChatCompletion = serde_json::from_str(body).unwrap();
        assert_eq!(completion.into_content().unwrap(), "<answer>2</answer>");
    }

    #[test]
    fn test_completion_without_content() {
        let completion: ChatCompletion = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(completion.into_content(), Err(LlmError::EmptyResponse));
        let completion: ChatCompletion =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(completion.into_content(), Err(LlmError::EmptyResponse));
    }

    #[test]
    fn test_request_body() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage::user("hello")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "m", "messages": [{"role": "user", "content": "hello"}]})
        );
    }

    #[test]
    fn test_missing_credential() {
        let config = HostedConfig {
            api_key_env: "SAGE_TEST_UNSET_OPENROUTER_KEY".to_string(),
            ..HostedConfig::default()
        };
        match OpenRouterClient::from_config(&config) {
            Err(LlmError::MissingCredential(name)) => {
                assert_eq!(name, "SAGE_TEST_UNSET_OPENROUTER_KEY")
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("client built without a key"),
        }
    }

    #[test]
    fn test_url_trailing_slash() {
        let config = HostedConfig {
            base_url: "https://example.test/api/v1/".to_string(),
            ..HostedConfig::default()
        };
        let client = OpenRouterClient::new(&config, "key".to_string()).unwrap();
        assert_eq!(client.completions_url(), "https://example.test/api/v1/chat/completions");
        assert_eq!(client.model(), "meta-llama/llama-3-8b-instruct");
    }
}
