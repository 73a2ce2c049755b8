//! Provider selection with a permanent fallback to the local model.
//!
//! A factory starts on the hosted provider when one could be built. The
//! first failure of any kind moves it to the local provider for the rest
//! of its life; the failing call is then answered locally.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, info, warn};

use super::{LlmError, LlmProvider, OllamaClient, OpenRouterClient};
use crate::config::Config;

/// Which provider answers the next call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    /// Hosted provider
    Primary,
    /// Local provider, for the rest of the session
    Fallback,
}

impl std::fmt::Display for ProviderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        };
        write!(f, "{}", s)
    }
}

/// Builds the local provider on first use
pub type LocalBuilder = Box<dyn Fn() -> Result<Box<dyn LlmProvider>, LlmError> + Send + Sync>;

/// Box a closure as a [`LocalBuilder`]
pub fn local_builder<F>(build: F) -> LocalBuilder
where
    F: Fn() -> Result<Box<dyn LlmProvider>, LlmError> + Send + Sync + 'static,
{
    Box::new(build)
}

pub struct LlmFactory {
    primary: Option<Box<dyn LlmProvider>>,
    state: Mutex<ProviderState>,
    local: Mutex<Option<Arc<dyn LlmProvider>>>,
    build_local: LocalBuilder,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // State stays consistent even if a holder panicked
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl LlmFactory {
    /// Start on `primary`, or on the local provider if it could not be built
    pub fn new(primary: Result<Box<dyn LlmProvider>, LlmError>, build_local: LocalBuilder) -> Self {
        let (primary, state) = match primary {
            Ok(provider) => {
                info!("LLMFactory: using {} as the primary client", provider.name());
                (Some(provider), ProviderState::Primary)
            }
            Err(e) => {
                warn!("LLMFactory: {}. Falling back to the local model.", e);
                (None, ProviderState::Fallback)
            }
        };
        Self {
            primary,
            state: Mutex::new(state),
            local: Mutex::new(None),
            build_local,
        }
    }

    /// Hosted client from `[hosted]`, local Ollama client from `[local]`
    pub fn from_config(config: &Config) -> Self {
        let primary = OpenRouterClient::from_config(&config.hosted)
            .map(|client| Box::new(client) as Box<dyn LlmProvider>);
        let local = config.local.clone();
        Self::new(
            primary,
            local_builder(move || Ok(Box::new(OllamaClient::new(&local)) as Box<dyn LlmProvider>)),
        )
    }

    pub fn current_provider(&self) -> ProviderState {
        *lock(&self.state)
    }

    fn fall_back(&self) {
        let mut state = lock(&self.state);
        if *state == ProviderState::Primary {
            *state = ProviderState::Fallback;
            warn!("Switched to the local model for this session");
        }
    }

    /// Cached local provider, built on first use
    fn local(&self) -> Result<Arc<dyn LlmProvider>, LlmError> {
        let mut slot = lock(&self.local);
        if let Some(provider) = slot.as_ref() {
            return Ok(Arc::clone(provider));
        }
        let provider: Arc<dyn LlmProvider> = Arc::from((self.build_local)()?);
        *slot = Some(Arc::clone(&provider));
        Ok(provider)
    }

    /// Generate a response, falling back to local on any hosted failure.
    ///
    /// Errors only when the local provider itself fails.
    pub fn generate_response(&self, prompt: &str) -> Result<String, LlmError> {
        let state = self.current_provider();
        info!("Attempting to generate response using the {} client", state);

        if state == ProviderState::Primary {
            if let Some(primary) = &self.primary {
                match primary.generate_response(prompt) {
                    Ok(text) => return Ok(text),
                    Err(LlmError::RateLimited) => {
                        warn!("{} rate limit hit", primary.name());
                    }
                    Err(e) => {
                        error!("{} failed: {}", primary.name(), e);
                    }
                }
            }
            self.fall_back();
        }

        let local = self.local()?;
        local.generate_response(prompt)
    }
}
