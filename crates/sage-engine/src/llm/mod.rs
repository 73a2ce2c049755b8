//! Language-model providers.
//!
//! Two backends share one capability, `generate_response(prompt) -> text`:
//! a hosted chat-completions API and a local Ollama server. The factory
//! picks between them with a one-way fallback to local.

pub mod factory;
pub mod ollama;
pub mod openrouter;

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

pub use factory::{LlmFactory, ProviderState};
pub use ollama::OllamaClient;
pub use openrouter::OpenRouterClient;

/// LLM errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("{0} not found or not set")]
    MissingCredential(String),

    #[error("rate limit reached")]
    RateLimited,

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("LLM returned empty response")]
    EmptyResponse,

    #[error("client not available")]
    NotAvailable,

    #[error("model '{0}' not found")]
    ModelNotFound(String),
}

impl LlmError {
    /// Map a reqwest failure, keeping timeouts apart
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            LlmError::Timeout(timeout_secs)
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}

/// One chat turn, shared by both wire protocols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// A text-generation backend
pub trait LlmProvider: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Generate a complete response to a single user prompt
    fn generate_response(&self, prompt: &str) -> Result<String, LlmError>;
}

impl<P: LlmProvider + ?Sized> LlmProvider for Arc<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn generate_response(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).generate_response(prompt)
    }
}

/// Fake LLM client for testing
pub struct FakeLlmClient {
    name: &'static str,
    responses: Mutex<Vec<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlmClient {
    /// Create a fake client with pre-defined responses.
    ///
    /// Responses are consumed in order; the last one repeats.
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            name: "fake",
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn always_error(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Get the number of calls made
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl LlmProvider for FakeLlmClient {
    fn name(&self) -> &'static str {
        self.name
    }

    fn generate_response(&self, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let mut responses = self.responses.lock().map_err(|_| LlmError::NotAvailable)?;
        match responses.len() {
            0 => Err(LlmError::EmptyResponse),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}
