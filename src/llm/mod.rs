//! OpenAI Responses API adapter for the chat pipeline.
//!
//! DESIGN
//! ======
//! Configuration comes from environment variables (see [`config::LlmConfig`]).
//! The pipeline depends only on the [`LlmGenerate`] trait so tests can swap in
//! a scripted mock; [`LlmClient`] is the production implementation.

pub mod config;
pub mod openai;
pub mod types;

use config::LlmConfig;
pub use types::LlmGenerate;
use types::{Generation, GenerationRequest, LlmError};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete LLM client backed by the OpenAI Responses API.
pub struct LlmClient {
    inner: openai::OpenAiClient,
    model: String,
}

impl LlmClient {
    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let inner = openai::OpenAiClient::new(config.api_key.clone(), config.base_url.clone(), config.timeouts)?;
        Ok(Self { inner, model: config.model.clone() })
    }

    /// Return the configured model name (e.g. `"gpt-4o-mini"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmGenerate for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        self.inner.responses(request).await
    }
}
