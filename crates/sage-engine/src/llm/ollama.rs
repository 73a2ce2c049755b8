//! Local Ollama client with fixed-delay retries.
//!
//! Failures never surface as errors. An unusable client answers with a
//! sentinel string, and exhausted retries produce another sentinel, so
//! callers always get text back.

use std::fmt::Display;
use std::io::{BufRead, BufReader};
use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{ChatMessage, LlmError, LlmProvider};
use crate::config::LocalConfig;

pub const CLIENT_NOT_AVAILABLE: &str = "Error: Client not available.";
pub const MAX_RETRIES_REACHED: &str = "Error: Max retries reached.";

/// Final chunk emitted by a stream whose retries ran out
pub fn stream_failure_message(attempts: u32) -> String {
    format!(
        "Error: Failed to get a response from the model after {} attempts.",
        attempts
    )
}

/// Run `op` up to `attempts` times, sleeping `delay` between failures.
///
/// `op` receives the 1-based attempt number. There is no sleep after the
/// last attempt; its error is returned.
pub fn retry_fixed<T, E, F>(attempts: u32, delay: Duration, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                warn!("Attempt {}/{} failed: {}", attempt, attempts, e);
                info!("Retrying in {:?}...", delay);
                thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// A full reply, or one chunk of a streamed one
#[derive(Debug, Deserialize)]
pub struct ChatChunk {
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub done: bool,
}

pub struct OllamaClient {
    host: String,
    model: String,
    retries: u32,
    retry_delay: Duration,
    timeout_secs: u64,
    /// `None` once construction or the connectivity check failed
    client: Option<reqwest::blocking::Client>,
}

impl OllamaClient {
    /// Build a client and verify the model is reachable.
    ///
    /// Never fails: a client that cannot reach its model is returned
    /// unusable and answers with sentinel strings.
    pub fn new(config: &LocalConfig) -> Self {
        let mut client = Self::unchecked(config);
        if let Some(http) = &client.client {
            info!("Verifying connection to Ollama and model availability...");
            let timeout = Duration::from_millis(config.health_check_timeout_ms);
            match verify_model(http, &client.host, &client.model, timeout) {
                Ok(()) => info!(
                    "Successfully connected to Ollama and model '{}' is available",
                    client.model
                ),
                Err(LlmError::ModelNotFound(model)) => {
                    error!(
                        "Model '{}' not found. Please pull it with `ollama pull {}`",
                        model, model
                    );
                    client.client = None;
                }
                Err(e) => {
                    error!("Could not connect to Ollama server. Is it running? Error: {}", e);
                    client.client = None;
                }
            }
        }
        client
    }

    /// Build without the connectivity check
    pub fn unchecked(config: &LocalConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| error!("Failed to initialize Ollama client: {}", e))
            .ok();
        if client.is_some() {
            info!(
                "Ollama client initialized for model '{}' at host '{}'",
                config.model, config.host
            );
        }
        Self {
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            retries: config.retries.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            timeout_secs: config.timeout_secs,
            client,
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// Complete response, or a sentinel string on failure
    pub fn generate_text(&self, prompt: &str) -> String {
        let Some(http) = &self.client else {
            error!("Ollama client is not available. Cannot generate response.");
            return CLIENT_NOT_AVAILABLE.to_string();
        };

        let result = retry_fixed(self.retries, self.retry_delay, |attempt| {
            info!(
                "Sending prompt to '{}' (Attempt {}/{})...",
                self.model, attempt, self.retries
            );
            self.chat(http, prompt)
        });
        result.unwrap_or_else(|e| {
            error!("Max retries reached. Failed to generate response: {}", e);
            MAX_RETRIES_REACHED.to_string()
        })
    }

    /// Stream the response to `sink` chunk by chunk.
    ///
    /// An unusable client emits nothing. When every attempt fails the sink
    /// receives one final error chunk. Chunks sent by a failed attempt are
    /// not retracted.
    pub fn generate_stream(&self, prompt: &str, sink: &mut dyn FnMut(&str)) {
        let Some(http) = &self.client else {
            error!("Ollama client is not available. Cannot generate response.");
            return;
        };

        let result = retry_fixed(self.retries, self.retry_delay, |attempt| {
            info!(
                "Streaming prompt to '{}' (Attempt {}/{})...",
                self.model, attempt, self.retries
            );
            self.chat_stream(http, prompt, sink)
        });
        if let Err(e) = result {
            error!("Max retries reached. Failed to generate response: {}", e);
            sink(&stream_failure_message(self.retries));
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.host)
    }

    fn request<'a>(&'a self, prompt: &str, stream: bool) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::user(prompt)],
            stream,
        }
    }

    fn chat(&self, http: &reqwest::blocking::Client, prompt: &str) -> Result<String, LlmError> {
        let response = http
            .post(self.chat_url())
            .json(&self.request(prompt, false))
            .send()
            .map_err(|e| LlmError::from_reqwest(e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(LlmError::HttpStatus(response.status().as_u16()));
        }

        let reply: ChatChunk = response
            .json()
            .map_err(|e| LlmError::InvalidJson(format!("Failed to parse response: {}", e)))?;
        reply
            .message
            .map(|m| m.content)
            .ok_or(LlmError::EmptyResponse)
    }

    fn chat_stream(
        &self,
        http: &reqwest::blocking::Client,
        prompt: &str,
        sink: &mut dyn FnMut(&str),
    ) -> Result<(), LlmError> {
        let response = http
            .post(self.chat_url())
            .json(&self.request(prompt, true))
            .send()
            .map_err(|e| LlmError::from_reqwest(e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(LlmError::HttpStatus(response.status().as_u16()));
        }
        forward_chunks(BufReader::new(response), sink)
    }
}

/// Read newline-delimited chunks until one reports `done`
pub fn forward_chunks<R: BufRead>(reader: R, sink: &mut dyn FnMut(&str)) -> Result<(), LlmError> {
    for line in reader.lines() {
        let line = line.map_err(|e| LlmError::Transport(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        let chunk: ChatChunk = serde_json::from_str(&line)
            .map_err(|e| LlmError::InvalidJson(format!("Bad stream chunk: {}", e)))?;
        if let Some(message) = &chunk.message {
            sink(&message.content);
        }
        if chunk.done {
            return Ok(());
        }
    }
    Err(LlmError::Transport("stream ended before completion".to_string()))
}

/// `POST /api/show`: 404 means the model has not been pulled
fn verify_model(
    http: &reqwest::blocking::Client,
    host: &str,
    model: &str,
    timeout: Duration,
) -> Result<(), LlmError> {
    let response = http
        .post(format!("{}/api/show", host))
        .timeout(timeout)
        .json(&serde_json::json!({ "model": model }))
        .send()
        .map_err(|e| LlmError::from_reqwest(e, timeout.as_secs()))?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::NOT_FOUND {
        Err(LlmError::ModelNotFound(model.to_string()))
    } else {
        Err(LlmError::HttpStatus(status.as_u16()))
    }
}

impl LlmProvider for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn generate_response(&self, prompt: &str) -> Result<String, LlmError> {
        Ok(self.generate_text(prompt))
    }
}
