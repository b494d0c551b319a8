//! The seam between orchestrators and the inference server.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Parameters of one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stop: Vec<String>,
    /// Wall-clock budget for the whole call.
    pub timeout: Duration,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: claimwright_core::request::DEFAULT_TEMPERATURE,
            max_tokens: claimwright_core::request::DEFAULT_MAX_TOKENS,
            stop: Vec::new(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Text produced by one successful generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub token_count: u64,
    pub elapsed_ms: f64,
    pub model: String,
}

/// A text generation server.
///
/// [`OllamaClient`](crate::OllamaClient) is the production implementation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Liveness probe. Never errors: any failure reads as `false`.
    async fn check_health(&self) -> bool;

    /// Issue one generation call. No retries at this level.
    async fn generate(&self, request: &GenerationRequest)
    -> Result<GenerationResult, GenerationError>;

    /// Model the backend generates with.
    fn model(&self) -> &str;

    /// Where the backend is reached, for diagnostics.
    fn base_url(&self) -> &str;
}
