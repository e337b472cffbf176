//! Text generation against a locally hosted model
//!
//! Supported servers:
//! - Hugging Face text-generation-inference (and Inference API compatible endpoints)
//! - Ollama
//!
//! The model itself is never loaded in-process. [`Generator`] is built once
//! at startup and shared by every session.

pub mod hf;
pub mod ollama;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{Backend, GenerationConfig};
use crate::error::GenerationError;

pub use hf::HfTextGenerationClient;
pub use ollama::OllamaClient;

/// Default bound on generated tokens
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 250;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.6;

/// Health probes must answer quickly; generation gets the configured timeout
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Common trait for text-generation servers
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt and return the first candidate
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GenerationError>;

    /// Check whether the server is reachable
    async fn health(&self) -> Result<(), GenerationError> {
        Ok(())
    }

    /// Backend name for status output
    fn name(&self) -> &'static str;
}

/// Shared generation service
#[derive(Clone)]
pub struct Generator {
    backend: Arc<dyn TextGenerator>,
    params: GenerationParams,
    strip_prompt_echo: bool,
}

impl Generator {
    /// Wrap a backend with explicit parameters
    pub fn new(backend: Arc<dyn TextGenerator>, params: GenerationParams, strip_prompt_echo: bool) -> Self {
        Self {
            backend,
            params,
            strip_prompt_echo,
        }
    }

    /// Build the configured HTTP backend
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let backend: Arc<dyn TextGenerator> = match config.backend {
            Backend::Hf => Arc::new(HfTextGenerationClient::new(&config.endpoint, timeout)?),
            Backend::Ollama => Arc::new(OllamaClient::new(&config.endpoint, &config.model, timeout)?),
        };
        info!("Generation backend: {} at {}", backend.name(), config.endpoint);

        let params = GenerationParams {
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
        };
        Ok(Self::new(backend, params, config.strip_prompt_echo))
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Generate with the configured token bound
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.generate_with(prompt, self.params.max_new_tokens).await
    }

    /// Generate with an explicit token bound
    pub async fn generate_with(&self, prompt: &str, max_new_tokens: u32) -> Result<String, GenerationError> {
        let params = GenerationParams {
            max_new_tokens,
            ..self.params
        };
        debug!("Generating with {} (max_new_tokens={}):\n{}", self.backend.name(), max_new_tokens, prompt);

        let raw = self.backend.generate(prompt, &params).await?;
        let text = if self.strip_prompt_echo {
            strip_echoed_prompt(prompt, &raw).to_string()
        } else {
            raw
        };

        // A bare echo of the prompt counts as no output
        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text)
    }

    pub async fn health(&self) -> Result<(), GenerationError> {
        self.backend.health().await
    }
}

/// Drop the prompt when the server echoed it in front of the continuation
pub fn strip_echoed_prompt<'a>(prompt: &str, generated: &'a str) -> &'a str {
    match generated.strip_prefix(prompt) {
        Some(continuation) => continuation.trim(),
        None => generated,
    }
}
